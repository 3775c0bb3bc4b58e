//! HTTP plumbing used by the provider transports.
//!
//! Providers describe the request they need as an [`HttpRequest`] and hand
//! it to an [`HttpClient`]. The default client is backed by `reqwest`; tests
//! and callers with their own stack can plug in a different implementation.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use crate::{MailError, Result};

/// User agent sent with every provider request.
pub const USER_AGENT: &str = concat!("courier-mail/", env!("CARGO_PKG_VERSION"));

/// TLS certificate verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Verify certificates and host names.
    #[default]
    Verify,
    /// Accept any certificate. Only meant for local test servers.
    DangerAcceptInvalidCerts,
}

/// Request authentication.
#[derive(Clone, PartialEq, Eq)]
pub enum HttpAuth {
    /// HTTP Basic authentication.
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// `Authorization: Bearer <token>`.
    Bearer(String),
}

impl fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Bearer(_) => f.debug_tuple("Bearer").field(&"<redacted>").finish(),
        }
    }
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    /// `application/x-www-form-urlencoded` fields, in order. Keys may repeat.
    Form(Vec<(String, String)>),
    /// Pre-serialized JSON document.
    Json(Vec<u8>),
}

/// An outgoing POST request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Target URL.
    pub url: String,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Authentication, if any.
    pub auth: Option<HttpAuth>,
    /// Body.
    pub body: HttpBody,
}

impl HttpRequest {
    /// Create a request with a body and no headers.
    pub fn post(url: impl Into<String>, body: HttpBody) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
            auth: None,
            body,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set authentication.
    pub fn auth(mut self, auth: HttpAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Look up a header value by case-insensitive name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Performs one HTTP round trip.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Send a POST request and return the status and body.
    ///
    /// Any status code is a successful round trip; only failures to get a
    /// response at all are errors.
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Build a client. A zero timeout means no timeout.
    pub fn new(timeout: Duration, tls: TlsMode) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }

        if tls == TlsMode::DangerAcceptInvalidCerts {
            warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| MailError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn post(&self, request: HttpRequest) -> Result<HttpResponse> {
        let mut builder = self.client.post(&request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.auth {
            Some(HttpAuth::Basic { username, password }) => {
                builder.basic_auth(username, Some(password))
            }
            Some(HttpAuth::Bearer(token)) => builder.bearer_auth(token),
            None => builder,
        };

        builder = match request.body {
            HttpBody::Form(fields) => builder.form(&fields),
            HttpBody::Json(bytes) => builder.body(bytes),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, body_len = body.len(), "Received provider response");

        Ok(HttpResponse { status, body })
    }
}
