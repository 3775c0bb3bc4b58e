//! The send contract shared by every provider.

use async_trait::async_trait;
use tracing::debug;

use crate::{Message, Result};

/// A transactional email provider, split into its two halves: turning a
/// message into the provider's wire payload, and delivering that payload.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider-specific payload.
    type Payload: Send;

    /// Provider name, used in errors and logs.
    const NAME: &'static str;

    /// Build the payload for a message. Must not perform I/O.
    fn build_payload(&self, message: &Message) -> Result<Self::Payload>;

    /// Submit a payload and interpret the provider's answer.
    async fn dispatch(&self, payload: Self::Payload) -> Result<()>;
}

/// Email transport trait.
///
/// Implemented for every [`Provider`], and usable as a trait object when
/// the provider is chosen at runtime.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Name of the underlying provider.
    fn provider_name(&self) -> &'static str;

    /// Send a message: one HTTP round trip, success or exactly one error.
    async fn send(&self, message: &Message) -> Result<()>;
}

#[async_trait]
impl<P: Provider> Transport for P {
    fn provider_name(&self) -> &'static str {
        P::NAME
    }

    async fn send(&self, message: &Message) -> Result<()> {
        message.validate()?;

        let payload = self.build_payload(message)?;

        debug!(
            provider = P::NAME,
            recipients = message.recipients().len(),
            content_type = %message.content_type(),
            "Dispatching message"
        );

        self.dispatch(payload).await
    }
}
