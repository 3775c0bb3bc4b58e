//! SendGrid email provider integration.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{EnvSource, ProviderConfig};
use crate::http::{HttpAuth, HttpBody, HttpClient, HttpRequest, HttpResponse, ReqwestClient};
use crate::{Address, ContentType, MailError, Message, Provider, Recipient, RecipientRole, Result};

/// Default SendGrid mail send endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

const PROVIDER: &str = "SendGrid";

/// SendGrid configuration.
#[derive(Debug, Clone)]
pub struct SendGridConfig {
    /// Credentials and transport settings.
    pub provider: ProviderConfig,
    /// API endpoint (defaults to production).
    pub endpoint: String,
}

impl SendGridConfig {
    /// Create a new SendGrid configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            provider: ProviderConfig::new(api_key),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Load from `SENDGRID_API_KEY` and the optional `SENDGRID_TIMEOUT_SECS` /
    /// `SENDGRID_ENDPOINT`.
    pub fn from_env() -> Result<Self> {
        let env = EnvSource::load();

        let mut config = Self::new(env.required("SENDGRID_API_KEY")?)
            .timeout_secs(env.timeout_secs("SENDGRID_TIMEOUT_SECS")?);

        if let Some(endpoint) = env.optional("SENDGRID_ENDPOINT") {
            config = config.endpoint(endpoint);
        }

        Ok(config)
    }

    /// Set a custom endpoint (for testing).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
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

    /// Accept invalid TLS certificates. For local test servers only.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.provider = self.provider.danger_accept_invalid_certs();
        self
    }

    fn validate(&self) -> Result<()> {
        self.provider.validate(PROVIDER)?;

        url::Url::parse(&self.endpoint)
            .map_err(|e| MailError::Config(format!("invalid SendGrid endpoint: {}", e)))?;

        Ok(())
    }
}

/// SendGrid API payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendGridPayload {
    /// Sender, with both email and name.
    pub from: EmailAddress,
    /// Always exactly one personalization.
    pub personalizations: Vec<Personalization>,
    /// Subject line.
    pub subject: String,
    /// Always exactly one content block.
    pub content: Vec<Content>,
}

/// Recipient lists of a personalization. Empty lists are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personalization {
    /// Primary recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to: Vec<RecipientAddress>,
    /// Carbon-copy recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<RecipientAddress>,
    /// Blind carbon-copy recipients.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<RecipientAddress>,
}

/// Sender object; `name` is always present, empty when unnamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAddress {
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
}

/// Recipient object, tagged with its role as `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientAddress {
    /// Display name, empty when unnamed.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Recipient role.
    #[serde(rename = "type")]
    pub role: RecipientRole,
}

/// Content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// MIME type of `value`.
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Body.
    pub value: String,
}

impl From<&Address> for EmailAddress {
    fn from(address: &Address) -> Self {
        Self {
            email: address.email.clone(),
            name: address.name_or_empty().to_string(),
        }
    }
}

impl From<&Recipient> for RecipientAddress {
    fn from(recipient: &Recipient) -> Self {
        Self {
            name: recipient.address.name_or_empty().to_string(),
            email: recipient.address.email.clone(),
            role: recipient.role,
        }
    }
}

impl SendGridPayload {
    /// Serialize to the JSON request body.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Build the SendGrid payload for a message.
///
/// A message with only cc/bcc recipients yields a personalization without
/// `to`; SendGrid reports that itself.
pub fn build_payload(message: &Message) -> SendGridPayload {
    let groups = message.groups();
    let convert = |group: &[&Recipient]| -> Vec<RecipientAddress> {
        group.iter().map(|r| RecipientAddress::from(*r)).collect()
    };

    SendGridPayload {
        from: EmailAddress::from(message.sender()),
        personalizations: vec![Personalization {
            to: convert(&groups.to),
            cc: convert(&groups.cc),
            bcc: convert(&groups.bcc),
        }],
        subject: message.subject().to_string(),
        content: vec![Content {
            content_type: message.content_type(),
            value: message.body().to_string(),
        }],
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorItem>,
}

#[derive(Debug, Deserialize)]
struct ErrorItem {
    #[serde(default)]
    message: Option<String>,
}

/// First error message of a SendGrid error document, if the body is one.
fn error_message(body: &str) -> Option<String> {
    let response: ErrorResponse = serde_json::from_str(body).ok()?;
    response
        .errors
        .into_iter()
        .next()?
        .message
        .filter(|message| !message.is_empty())
}

/// Interpret a SendGrid response.
///
/// An error message in the body wins over the status code; otherwise only
/// 202 Accepted counts as success.
pub fn interpret_response(response: &HttpResponse) -> Result<()> {
    if !response.body.is_empty()
        && let Some(message) = error_message(&response.body)
    {
        warn!(status = response.status, error = %message, "SendGrid reported an error");
        return Err(MailError::Rejected {
            provider: PROVIDER,
            status: response.status,
            message: Some(message),
        });
    }

    if response.status != 202 {
        warn!(status = response.status, "SendGrid rejected the message");
        return Err(MailError::Rejected {
            provider: PROVIDER,
            status: response.status,
            message: None,
        });
    }

    Ok(())
}

/// SendGrid transport.
pub struct SendGridTransport {
    client: Arc<dyn HttpClient>,
    config: SendGridConfig,
}

impl SendGridTransport {
    /// Create a new SendGrid transport backed by `reqwest`.
    pub fn new(config: SendGridConfig) -> Result<Self> {
        config.validate()?;
        let client = ReqwestClient::new(config.provider.timeout, config.provider.tls)?;
        Ok(Self::build(config, Arc::new(client)))
    }

    /// Create a SendGrid transport over a custom HTTP client.
    pub fn with_client(config: SendGridConfig, client: Arc<dyn HttpClient>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, client))
    }

    fn build(config: SendGridConfig, client: Arc<dyn HttpClient>) -> Self {
        info!(
            endpoint = %config.endpoint,
            timeout = ?config.provider.timeout,
            tls = ?config.provider.tls,
            "SendGrid transport initialized"
        );
        Self { client, config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SendGridConfig {
        &self.config
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl Provider for SendGridTransport {
    type Payload = SendGridPayload;

    const NAME: &'static str = PROVIDER;

    fn build_payload(&self, message: &Message) -> Result<SendGridPayload> {
        Ok(build_payload(message))
    }

    async fn dispatch(&self, payload: SendGridPayload) -> Result<()> {
        let body = payload.to_json()?;

        debug!(
            content_type = ?payload.content.first().map(|c| c.content_type),
            body_len = body.len(),
            "Sending email via SendGrid"
        );

        let content_length = body.len().to_string();
        let request = HttpRequest::post(self.endpoint(), HttpBody::Json(body))
            .header("Content-Type", "application/json")
            .header("Content-Length", content_length)
            .auth(HttpAuth::Bearer(self.config.provider.api_key.clone()));

        let response = self.client.post(request).await?;
        interpret_response(&response)?;

        debug!("Email sent successfully via SendGrid");
        Ok(())
    }
}
