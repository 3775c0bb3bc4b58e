//! # Courier Mail
//!
//! Transactional email dispatch through provider HTTP APIs.
//!
//! ## Features
//!
//! - **One message model**: sender, to/cc/bcc recipients, subject and a body
//!   whose content type (plain text or HTML) is detected automatically
//! - **Mailgun**: form-encoded messages API with Basic auth
//! - **SendGrid**: v3 JSON mail send API with Bearer auth
//! - **Pluggable HTTP**: the default `reqwest` client can be swapped for any
//!   [`HttpClient`](http::HttpClient)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier_mail::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = MailgunTransport::new(
//!         MailgunConfig::new("key-xxxx", "mg.example.com").timeout_secs(10),
//!     )?;
//!
//!     let message = Message::builder()
//!         .sender("noreply@example.com", "Example")
//!         .to("alice@example.com", "Alice")
//!         .cc("bob@example.com", "Bob")
//!         .subject("Hello from Courier!")
//!         .body("<h1>Hello!</h1>")
//!         .build()?;
//!
//!     transport.send(&message).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Choosing a provider at runtime
//!
//! ```rust,ignore
//! use courier_mail::prelude::*;
//!
//! let transport: Box<dyn Transport> = match provider.as_str() {
//!     "sendgrid" => Box::new(SendGridTransport::new(SendGridConfig::from_env()?)?),
//!     _ => Box::new(MailgunTransport::new(MailgunConfig::from_env()?)?),
//! };
//!
//! transport.send(&message).await?;
//! ```

mod address;
mod content_type;
mod error;
mod message;
mod provider;
mod recipients;

pub mod config;
pub mod http;

#[cfg(feature = "mailgun")]
pub mod mailgun;

#[cfg(feature = "sendgrid")]
pub mod sendgrid;

pub use address::Address;
pub use content_type::{ContentType, classify};
pub use error::{MailError, Result};
pub use message::{Message, MessageBuilder, Recipient};
pub use provider::{Provider, Transport};
pub use recipients::{RecipientGroups, RecipientRole};

#[cfg(feature = "mailgun")]
pub use mailgun::{MailgunConfig, MailgunTransport};

#[cfg(feature = "sendgrid")]
pub use sendgrid::{SendGridConfig, SendGridTransport};

/// Prelude for common imports.
///
/// ```
/// use courier_mail::prelude::*;
/// ```
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::config::ProviderConfig;
    pub use crate::content_type::ContentType;
    pub use crate::error::{MailError, Result};
    pub use crate::message::{Message, MessageBuilder, Recipient};
    pub use crate::provider::{Provider, Transport};
    pub use crate::recipients::RecipientRole;

    #[cfg(feature = "mailgun")]
    pub use crate::mailgun::{MailgunConfig, MailgunTransport};

    #[cfg(feature = "sendgrid")]
    pub use crate::sendgrid::{SendGridConfig, SendGridTransport};
}
