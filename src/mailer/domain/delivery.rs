//! Delivery results reported by transports.

use super::Envelope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

const FALLBACK_MESSAGE_ID_DOMAIN: &str = "localhost";

/// Information about a message accepted by a transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryInfo {
    /// Message identifier in `<id@domain>` form.
    pub message_id: String,
    /// Envelope used for the transaction.
    pub envelope: Envelope,
    /// Recipients accepted by the remote side.
    pub accepted: Vec<String>,
    /// Recipients rejected by the remote side.
    pub rejected: Vec<String>,
    /// Final response line from the transport.
    pub response: String,
    /// Transport-specific payload, such as a rendered message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<Value>,
}

impl DeliveryInfo {
    /// Creates delivery info for a message where every envelope recipient
    /// was accepted. A fresh message identifier is generated in the sender's
    /// domain.
    #[must_use]
    pub fn accepted(envelope: Envelope, response: impl Into<String>) -> Self {
        let message_id = Self::generate_message_id(envelope.sender_domain());
        Self {
            message_id,
            accepted: envelope.to.clone(),
            rejected: Vec::new(),
            envelope,
            response: response.into(),
            raw: None,
        }
    }

    /// Attaches a transport-specific payload.
    #[must_use]
    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Generates a message identifier for `domain`, falling back to
    /// `localhost`.
    #[must_use]
    pub fn generate_message_id(domain: Option<&str>) -> String {
        format!(
            "<{}@{}>",
            Uuid::new_v4(),
            domain.unwrap_or(FALLBACK_MESSAGE_ID_DOMAIN)
        )
    }
}
