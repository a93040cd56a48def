//! Transport that renders messages to JSON instead of delivering them.

use crate::mailer::{
    domain::{DeliveryInfo, MailMessage, MailerConfig},
    ports::{MailTransport, TransportCallback, TransportError, TransportFactory, TransportResult},
};
use async_trait::async_trait;
use serde_json::{Map, Value};

const RENDERED_RESPONSE: &str = "rendered as JSON";

/// Factory for [`JsonTransport`]. Only accepts [`MailerConfig::Json`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransportFactory;

impl JsonTransportFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for JsonTransportFactory {
    type Config = MailerConfig;
    type Transport = JsonTransport;

    async fn create(&self, config: &MailerConfig) -> TransportResult<JsonTransport> {
        match config {
            MailerConfig::Json(json) => Ok(JsonTransport {
                skip_envelope: json.skip_envelope(),
            }),
            other => Err(TransportError::Unsupported(format!(
                "JSON transport factory cannot create a {} transport",
                other.kind()
            ))),
        }
    }
}

/// Renders each message into the `raw` field of its [`DeliveryInfo`].
///
/// Useful for previews and local development; nothing leaves the process.
#[derive(Debug, Clone, Copy)]
pub struct JsonTransport {
    skip_envelope: bool,
}

impl JsonTransport {
    fn render(self, message: &MailMessage) -> TransportResult<DeliveryInfo> {
        let envelope = message.envelope();
        let info = DeliveryInfo::accepted(envelope.clone(), RENDERED_RESPONSE);

        let mut rendered = Map::new();
        rendered.insert(
            "message_id".to_owned(),
            Value::String(info.message_id.clone()),
        );
        rendered.insert(
            "message".to_owned(),
            serde_json::to_value(message).map_err(TransportError::runtime)?,
        );
        if !self.skip_envelope {
            rendered.insert(
                "envelope".to_owned(),
                serde_json::to_value(&envelope).map_err(TransportError::runtime)?,
            );
        }

        Ok(info.with_raw(Value::Object(rendered)))
    }
}

impl MailTransport for JsonTransport {
    fn verify(&self, callback: TransportCallback<()>) {
        callback(Ok(()));
    }

    fn send_mail(&self, message: MailMessage, callback: TransportCallback<DeliveryInfo>) {
        callback(self.render(&message));
    }
}
