//! Transport that writes messages as raw RFC 5322 text instead of delivering
//! them.

use crate::mailer::{
    domain::{DeliveryInfo, MailMessage, MailerConfig, Newline},
    ports::{MailTransport, TransportCallback, TransportError, TransportFactory, TransportResult},
};
use async_trait::async_trait;
use serde_json::Value;

const RENDERED_RESPONSE: &str = "rendered as message text";

/// Factory for [`StreamTransport`]. Only accepts [`MailerConfig::Stream`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamTransportFactory;

impl StreamTransportFactory {
    /// Creates the factory.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransportFactory for StreamTransportFactory {
    type Config = MailerConfig;
    type Transport = StreamTransport;

    async fn create(&self, config: &MailerConfig) -> TransportResult<StreamTransport> {
        match config {
            MailerConfig::Stream(stream) => Ok(StreamTransport {
                newline: stream.newline(),
            }),
            other => Err(TransportError::Unsupported(format!(
                "stream transport factory cannot create a {} transport",
                other.kind()
            ))),
        }
    }
}

/// Places the message text in the `raw` field of its [`DeliveryInfo`] as a
/// JSON string. `Bcc` is part of the envelope only and never written out.
#[derive(Debug, Clone, Copy)]
pub struct StreamTransport {
    newline: Newline,
}

impl StreamTransport {
    fn render(self, message: &MailMessage) -> DeliveryInfo {
        let info = DeliveryInfo::accepted(message.envelope(), RENDERED_RESPONSE);

        let mut lines = Vec::new();
        if let Some(from) = message.sender() {
            lines.push(format!("From: {from}"));
        }
        if !message.to().is_empty() {
            lines.push(format!("To: {}", message.to().join(", ")));
        }
        if !message.cc().is_empty() {
            lines.push(format!("Cc: {}", message.cc().join(", ")));
        }
        if let Some(reply_to) = message.reply_to() {
            lines.push(format!("Reply-To: {reply_to}"));
        }
        if let Some(subject) = message.subject() {
            lines.push(format!("Subject: {subject}"));
        }
        lines.push(format!("Message-ID: {}", info.message_id));
        lines.extend(
            message
                .headers()
                .iter()
                .map(|(name, value)| format!("{name}: {value}")),
        );

        let (content_type, body) = match (message.text(), message.html()) {
            (Some(text), _) => ("text/plain", text),
            (None, Some(html)) => ("text/html", html),
            (None, None) => ("text/plain", ""),
        };
        lines.push("MIME-Version: 1.0".to_owned());
        lines.push(format!("Content-Type: {content_type}; charset=utf-8"));
        lines.push(String::new());
        lines.extend(body.lines().map(str::to_owned));

        let rendered = lines.join(self.newline.as_str());
        info.with_raw(Value::String(rendered))
    }
}

impl MailTransport for StreamTransport {
    fn verify(&self, callback: TransportCallback<()>) {
        callback(Ok(()));
    }

    fn send_mail(&self, message: MailMessage, callback: TransportCallback<DeliveryInfo>) {
        callback(Ok(self.render(&message)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mailer::{domain::StreamTransportConfig, services::settle};
    use rstest::rstest;

    async fn render(config: MailerConfig, message: MailMessage) -> String {
        let transport = StreamTransportFactory::new()
            .create(&config)
            .await
            .expect("stream config is supported");

        let info = settle(|callback| transport.send_mail(message, callback))
            .await
            .expect("rendering should succeed");

        match info.raw {
            Some(Value::String(text)) => text,
            other => panic!("expected rendered text, got {other:?}"),
        }
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn renders_headers_then_body() {
        let message = MailMessage::new()
            .with_from(r#""Foo, Bar" <foo@example.com>"#)
            .with_to("a@b.com")
            .with_bcc("hidden@b.com")
            .with_subject("Hello")
            .with_header("X-Campaign", "spring")
            .with_text("line one\nline two");

        let text = render(MailerConfig::stream(), message).await;

        assert!(text.starts_with("From: \"Foo, Bar\" <foo@example.com>\nTo: a@b.com\n"));
        assert!(text.contains("\nSubject: Hello\n"));
        assert!(text.contains("@example.com>\n"));
        assert!(text.contains("\nX-Campaign: spring\n"));
        assert!(text.ends_with("\n\nline one\nline two"));
        assert!(!text.contains("hidden@b.com"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn windows_newlines_apply_to_headers_and_body() {
        let config =
            MailerConfig::Stream(StreamTransportConfig::new().with_newline(Newline::Windows));
        let message = MailMessage::new()
            .with_to("a@b.com")
            .with_html("<p>hi</p>\n<p>there</p>");

        let text = render(config, message).await;

        assert!(text.contains("Content-Type: text/html; charset=utf-8\r\n\r\n"));
        assert!(text.ends_with("<p>hi</p>\r\n<p>there</p>"));
        assert!(!text.replace("\r\n", "").contains('\n'));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn other_kinds_are_unsupported() {
        let result = StreamTransportFactory::new()
            .create(&MailerConfig::json())
            .await;

        assert!(matches!(result, Err(TransportError::Unsupported(_))));
    }
}
