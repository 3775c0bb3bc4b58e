//! Message types.

use serde::{Deserialize, Serialize};

use crate::{Address, ContentType, MailError, RecipientGroups, RecipientRole, Result};

/// A recipient with its role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// The recipient address.
    #[serde(flatten)]
    pub address: Address,
    /// How the recipient receives the message.
    #[serde(default, rename = "type")]
    pub role: RecipientRole,
}

impl Recipient {
    /// Create a recipient. A blank name means no display name.
    pub fn new(
        email: impl Into<String>,
        name: impl Into<String>,
        role: RecipientRole,
    ) -> Result<Self> {
        Ok(Self {
            address: Address::with_name(email, name)?,
            role,
        })
    }

    /// Primary recipient.
    pub fn to(address: Address) -> Self {
        Self {
            address,
            role: RecipientRole::To,
        }
    }

    /// Carbon-copy recipient.
    pub fn cc(address: Address) -> Self {
        Self {
            address,
            role: RecipientRole::Cc,
        }
    }

    /// Blind carbon-copy recipient.
    pub fn bcc(address: Address) -> Self {
        Self {
            address,
            role: RecipientRole::Bcc,
        }
    }

    /// The recipient's email.
    pub fn email(&self) -> &str {
        self.address.email()
    }

    /// The recipient's display name.
    pub fn name(&self) -> Option<&str> {
        self.address.name()
    }
}

/// An immutable email message, ready to be handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: Address,
    #[serde(default)]
    recipients: Vec<Recipient>,
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
}

impl Message {
    /// Create a builder.
    pub fn builder() -> MessageBuilder {
        MessageBuilder::new()
    }

    /// Create a message from its parts.
    pub fn new(
        sender: Address,
        recipients: Vec<Recipient>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            sender,
            recipients,
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The sender.
    pub fn sender(&self) -> &Address {
        &self.sender
    }

    /// All recipients, in insertion order.
    pub fn recipients(&self) -> &[Recipient] {
        &self.recipients
    }

    /// The subject line.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The body.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Recipients split into to/cc/bcc.
    pub fn groups(&self) -> RecipientGroups<'_> {
        RecipientGroups::partition(&self.recipients)
    }

    /// Detected content type of the body.
    pub fn content_type(&self) -> ContentType {
        crate::content_type::classify(&self.body)
    }

    /// Check the message can be sent.
    pub fn validate(&self) -> Result<()> {
        if self.sender.email.trim().is_empty() {
            return Err(MailError::MissingField("sender"));
        }
        if self.recipients.is_empty() {
            return Err(MailError::MissingField("recipients"));
        }
        Ok(())
    }
}

/// Builder for [`Message`].
///
/// Addresses are validated when [`MessageBuilder::build`] is called.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    sender: Option<(String, String)>,
    recipients: Vec<(String, String, RecipientRole)>,
    subject: String,
    body: String,
}

impl MessageBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sender.
    pub fn sender(mut self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.sender = Some((email.into(), name.into()));
        self
    }

    /// Add a recipient with a role tag. Unknown tags become `to`.
    pub fn recipient(
        mut self,
        email: impl Into<String>,
        name: impl Into<String>,
        role: impl Into<RecipientRole>,
    ) -> Self {
        self.recipients.push((email.into(), name.into(), role.into()));
        self
    }

    /// Add a primary recipient.
    pub fn to(self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.recipient(email, name, RecipientRole::To)
    }

    /// Add a carbon-copy recipient.
    pub fn cc(self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.recipient(email, name, RecipientRole::Cc)
    }

    /// Add a blind carbon-copy recipient.
    pub fn bcc(self, email: impl Into<String>, name: impl Into<String>) -> Self {
        self.recipient(email, name, RecipientRole::Bcc)
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Set the body. Plain text or HTML is detected on send.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Build the message.
    pub fn build(self) -> Result<Message> {
        let (email, name) = self.sender.ok_or(MailError::MissingField("sender"))?;
        let sender = Address::with_name(email, name)?;

        let recipients = self
            .recipients
            .into_iter()
            .map(|(email, name, role)| Recipient::new(email, name, role))
            .collect::<Result<Vec<_>>>()?;

        Ok(Message {
            sender,
            recipients,
            subject: self.subject,
            body: self.body,
        })
    }
}
