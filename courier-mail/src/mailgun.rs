//! Mailgun email provider integration.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{EnvSource, ProviderConfig};
use crate::http::{HttpAuth, HttpBody, HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use crate::{ContentType, MailError, Message, Provider, Recipient, Result};

/// Default Mailgun API host.
pub const DEFAULT_BASE_URL: &str = "https://api.mailgun.net";

const PROVIDER: &str = "Mailgun";

/// Mailgun configuration.
#[derive(Debug, Clone)]
pub struct MailgunConfig {
    /// Credentials and transport settings.
    pub provider: ProviderConfig,
    /// Domain the account is an authorized sender for.
    pub domain: String,
    /// API host, without a trailing path.
    pub base_url: String,
}

impl MailgunConfig {
    /// Create a new Mailgun configuration.
    pub fn new(api_key: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            provider: ProviderConfig::new(api_key),
            domain: domain.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Load from `MAILGUN_API_KEY`, `MAILGUN_DOMAIN` and the optional
    /// `MAILGUN_TIMEOUT_SECS` / `MAILGUN_BASE_URL`.
    pub fn from_env() -> Result<Self> {
        let env = EnvSource::load();

        let mut config = Self::new(env.required("MAILGUN_API_KEY")?, env.required("MAILGUN_DOMAIN")?)
            .timeout_secs(env.timeout_secs("MAILGUN_TIMEOUT_SECS")?);

        if let Some(base_url) = env.optional("MAILGUN_BASE_URL") {
            config = config.base_url(base_url);
        }

        Ok(config)
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.provider = self.provider.timeout(timeout);
        self
    }

    /// Set the timeout in whole seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.provider = self.provider.timeout_secs(secs);
        self
    }

    /// Set a custom API host (for testing).
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Accept invalid TLS certificates. For local test servers only.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.provider = self.provider.danger_accept_invalid_certs();
        self
    }

    /// Messages endpoint for the configured domain.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v2/{}/messages",
            self.base_url.trim_end_matches('/'),
            self.domain
        )
    }

    fn validate(&self) -> Result<()> {
        self.provider.validate(PROVIDER)?;

        if self.domain.trim().is_empty() {
            return Err(MailError::Config("Mailgun domain is empty".to_string()));
        }

        url::Url::parse(&self.endpoint())
            .map_err(|e| MailError::Config(format!("invalid Mailgun endpoint: {}", e)))?;

        Ok(())
    }
}

/// Primary recipients of a Mailgun payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryRecipients {
    /// The message's own `to` recipients.
    Listed(Vec<Recipient>),
    /// Mailgun refuses messages that only have cc/bcc recipients, so the
    /// sender's own address stands in as the primary recipient.
    SenderFallback(String),
}

/// Mailgun message body: exactly one of `text` or `html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailgunBody {
    /// Sent as the `text` field.
    Text(String),
    /// Sent as the `html` field.
    Html(String),
}

impl MailgunBody {
    /// Form field name.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Html(_) => "html",
        }
    }

    /// Body content.
    pub fn content(&self) -> &str {
        match self {
            Self::Text(content) | Self::Html(content) => content,
        }
    }

    /// Content type this body is sent as.
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Text(_) => ContentType::TextPlain,
            Self::Html(_) => ContentType::TextHtml,
        }
    }
}

/// Mailgun messages API payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailgunPayload {
    /// `to`; absent when the message has no recipients at all.
    pub to: Option<PrimaryRecipients>,
    /// `cc`; omitted from the form when empty.
    pub cc: Vec<Recipient>,
    /// `bcc`; omitted from the form when empty.
    pub bcc: Vec<Recipient>,
    /// Sender email. Mailgun's `from` carries no display name here.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Body.
    pub body: MailgunBody,
}

impl MailgunPayload {
    /// Flatten into form fields. Recipient fields repeat once per recipient.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();

        match &self.to {
            Some(PrimaryRecipients::Listed(recipients)) => {
                push_recipients(&mut fields, "to", recipients);
            }
            Some(PrimaryRecipients::SenderFallback(email)) => {
                fields.push(("to".to_string(), email.clone()));
            }
            None => {}
        }
        push_recipients(&mut fields, "cc", &self.cc);
        push_recipients(&mut fields, "bcc", &self.bcc);

        fields.push(("from".to_string(), self.from.clone()));
        fields.push(("subject".to_string(), self.subject.clone()));
        fields.push((self.body.field().to_string(), self.body.content().to_string()));

        fields
    }
}

fn push_recipients(fields: &mut Vec<(String, String)>, key: &str, recipients: &[Recipient]) {
    for recipient in recipients {
        fields.push((key.to_string(), recipient.address.to_string()));
    }
}

/// Build the Mailgun payload for a message.
pub fn build_payload(message: &Message) -> MailgunPayload {
    let groups = message.groups();

    let to = if !groups.to.is_empty() {
        Some(PrimaryRecipients::Listed(
            groups.to.iter().map(|r| (*r).clone()).collect(),
        ))
    } else if groups.has_copies() {
        Some(PrimaryRecipients::SenderFallback(
            message.sender().email().to_string(),
        ))
    } else {
        None
    };

    let body = match message.content_type() {
        ContentType::TextHtml => MailgunBody::Html(message.body().to_string()),
        ContentType::TextPlain => MailgunBody::Text(message.body().to_string()),
    };

    MailgunPayload {
        to,
        cc: groups.cc.iter().map(|r| (*r).clone()).collect(),
        bcc: groups.bcc.iter().map(|r| (*r).clone()).collect(),
        from: message.sender().email().to_string(),
        subject: message.subject().to_string(),
        body,
    }
}

/// Interpret a Mailgun response: only a 200 with a body counts as accepted.
pub fn interpret_response(response: &HttpResponse) -> Result<()> {
    if response.status != 200 {
        warn!(status = response.status, "Mailgun rejected the message");
        return Err(MailError::Rejected {
            provider: PROVIDER,
            status: response.status,
            message: None,
        });
    }

    if response.body.is_empty() {
        warn!(status = response.status, "Mailgun returned an empty response");
        return Err(MailError::EmptyResponse {
            provider: PROVIDER,
            status: response.status,
        });
    }

    Ok(())
}

/// Mailgun transport.
pub struct MailgunTransport {
    client: Arc<dyn HttpClient>,
    config: MailgunConfig,
}

impl MailgunTransport {
    /// Create a new Mailgun transport backed by `reqwest`.
    pub fn new(config: MailgunConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::new(config.provider.timeout, config.provider.tls)?;
        Ok(Self::build(config, Arc::new(client)))
    }

    /// Create a Mailgun transport over a custom HTTP client.
    pub fn with_client(config: MailgunConfig, client: Arc<dyn HttpClient>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, client))
    }

    fn build(config: MailgunConfig, client: Arc<dyn HttpClient>) -> Self {
        info!(
            endpoint = %config.endpoint(),
            timeout = ?config.provider.timeout,
            tls = ?config.provider.tls,
            "Mailgun transport initialized"
        );
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MailgunConfig {
        &self.config
    }

    /// Messages endpoint requests are sent to.
    pub fn endpoint(&self) -> String {
        self.config.endpoint()
    }
}

#[async_trait]
impl Provider for MailgunTransport {
    type Payload = MailgunPayload;

    const NAME: &'static str = PROVIDER;

    fn build_payload(&self, message: &Message) -> Result<MailgunPayload> {
        Ok(build_payload(message))
    }

    async fn dispatch(&self, payload: MailgunPayload) -> Result<()> {
        debug!(
            to = ?payload.to,
            cc = payload.cc.len(),
            bcc = payload.bcc.len(),
            body = payload.body.field(),
            "Sending email via Mailgun"
        );

        let request = HttpRequest::post(self.endpoint(), HttpBody::Form(payload.form_fields()))
            .auth(HttpAuth::Basic {
                username: "api".to_string(),
                password: self.config.provider.api_key.clone(),
            });

        let response = self.client.post(request).await?;
        interpret_response(&response)?;

        debug!("Email sent successfully via Mailgun");
        Ok(())
    }
}
