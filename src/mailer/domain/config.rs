//! Declarative transport configuration value objects.

use super::MailerDomainError;
use serde::{Deserialize, Serialize};

const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SENDMAIL_PATH: &str = "sendmail";

/// Credentials presented during the SMTP authentication handshake.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpCredentials {
    user: String,
    pass: String,
}

impl SmtpCredentials {
    /// Creates SMTP credentials.
    ///
    /// # Errors
    ///
    /// Returns [`MailerDomainError::EmptySmtpUser`] when `user` is empty after
    /// trimming.
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Result<Self, MailerDomainError> {
        let normalized_user = user.into().trim().to_owned();
        if normalized_user.is_empty() {
            return Err(MailerDomainError::EmptySmtpUser);
        }

        Ok(Self {
            user: normalized_user,
            pass: pass.into(),
        })
    }

    /// Returns the user name.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Returns the password.
    #[must_use]
    pub fn pass(&self) -> &str {
        &self.pass
    }
}

impl std::fmt::Debug for SmtpCredentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

/// Connection settings for an SMTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpTransportConfig {
    host: String,
    #[serde(default = "default_smtp_port")]
    port: u16,
    #[serde(default)]
    secure: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    auth: Option<SmtpCredentials>,
    #[serde(default)]
    pool: bool,
}

const fn default_smtp_port() -> u16 {
    DEFAULT_SMTP_PORT
}

impl SmtpTransportConfig {
    /// Creates an SMTP configuration on the submission port without TLS.
    ///
    /// # Errors
    ///
    /// Returns [`MailerDomainError::EmptySmtpHost`] when `host` is empty after
    /// trimming.
    pub fn new(host: impl Into<String>) -> Result<Self, MailerDomainError> {
        let normalized_host = host.into().trim().to_owned();
        if normalized_host.is_empty() {
            return Err(MailerDomainError::EmptySmtpHost);
        }

        Ok(Self {
            host: normalized_host,
            port: DEFAULT_SMTP_PORT,
            secure: false,
            auth: None,
            pool: false,
        })
    }

    /// Sets the port.
    ///
    /// # Errors
    ///
    /// Returns [`MailerDomainError::InvalidSmtpPort`] when `port` is zero.
    pub fn with_port(mut self, port: u16) -> Result<Self, MailerDomainError> {
        if port == 0 {
            return Err(MailerDomainError::InvalidSmtpPort);
        }
        self.port = port;
        Ok(self)
    }

    /// Enables implicit TLS.
    #[must_use]
    pub const fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn with_auth(mut self, credentials: SmtpCredentials) -> Self {
        self.auth = Some(credentials);
        self
    }

    /// Asks the transport to keep a connection pool.
    #[must_use]
    pub const fn with_pool(mut self, pool: bool) -> Self {
        self.pool = pool;
        self
    }

    /// Returns the host name.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the port.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Returns whether implicit TLS is used.
    #[must_use]
    pub const fn secure(&self) -> bool {
        self.secure
    }

    /// Returns the optional credentials.
    #[must_use]
    pub const fn auth(&self) -> Option<&SmtpCredentials> {
        self.auth.as_ref()
    }

    /// Returns whether pooling was requested.
    #[must_use]
    pub const fn pool(&self) -> bool {
        self.pool
    }

    fn validate(&self) -> Result<(), MailerDomainError> {
        if self.host.trim().is_empty() {
            return Err(MailerDomainError::EmptySmtpHost);
        }
        if self.port == 0 {
            return Err(MailerDomainError::InvalidSmtpPort);
        }
        if self.auth.as_ref().is_some_and(|auth| auth.user.trim().is_empty()) {
            return Err(MailerDomainError::EmptySmtpUser);
        }
        Ok(())
    }
}

/// Line ending used when a message is written out as raw text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Newline {
    /// `\n`
    #[default]
    Unix,
    /// `\r\n`
    Windows,
}

impl Newline {
    /// Returns the line terminator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unix => "\n",
            Self::Windows => "\r\n",
        }
    }
}

/// Settings for a local sendmail transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendmailTransportConfig {
    #[serde(default = "default_sendmail_path")]
    path: String,
    #[serde(default)]
    newline: Newline,
}

fn default_sendmail_path() -> String {
    DEFAULT_SENDMAIL_PATH.to_owned()
}

impl SendmailTransportConfig {
    /// Creates a sendmail configuration for the binary at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MailerDomainError::EmptySendmailPath`] when `path` is empty
    /// after trimming.
    pub fn new(path: impl Into<String>) -> Result<Self, MailerDomainError> {
        let normalized_path = path.into().trim().to_owned();
        if normalized_path.is_empty() {
            return Err(MailerDomainError::EmptySendmailPath);
        }

        Ok(Self {
            path: normalized_path,
            newline: Newline::Unix,
        })
    }

    /// Sets the line ending style.
    #[must_use]
    pub const fn with_newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// Returns the sendmail binary path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the line ending style.
    #[must_use]
    pub const fn newline(&self) -> Newline {
        self.newline
    }
}

impl Default for SendmailTransportConfig {
    fn default() -> Self {
        Self {
            path: default_sendmail_path(),
            newline: Newline::Unix,
        }
    }
}

/// Settings for a transport that renders messages to JSON instead of
/// delivering them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonTransportConfig {
    #[serde(default)]
    skip_envelope: bool,
}

impl JsonTransportConfig {
    /// Creates a JSON transport configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            skip_envelope: false,
        }
    }

    /// Omits the derived envelope from the rendered output.
    #[must_use]
    pub const fn with_skip_envelope(mut self, skip_envelope: bool) -> Self {
        self.skip_envelope = skip_envelope;
        self
    }

    /// Returns whether the envelope is omitted.
    #[must_use]
    pub const fn skip_envelope(&self) -> bool {
        self.skip_envelope
    }
}

/// Settings for a transport that writes each message as raw RFC 5322 text
/// instead of delivering it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTransportConfig {
    #[serde(default)]
    newline: Newline,
}

impl StreamTransportConfig {
    /// Creates a stream configuration with Unix line endings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            newline: Newline::Unix,
        }
    }

    /// Sets the line ending style.
    #[must_use]
    pub const fn with_newline(mut self, newline: Newline) -> Self {
        self.newline = newline;
        self
    }

    /// Returns the line ending style.
    #[must_use]
    pub const fn newline(&self) -> Newline {
        self.newline
    }
}

/// Supported transport configuration variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "transport")]
pub enum MailerConfig {
    /// Delivery over SMTP.
    Smtp(SmtpTransportConfig),
    /// Delivery through a local sendmail binary.
    Sendmail(SendmailTransportConfig),
    /// Rendering to JSON without delivery.
    Json(JsonTransportConfig),
    /// Rendering to raw message text without delivery.
    Stream(StreamTransportConfig),
}

impl MailerConfig {
    /// Creates an `smtp` configuration.
    ///
    /// # Errors
    ///
    /// Returns validation errors from [`SmtpTransportConfig::new`].
    pub fn smtp(host: impl Into<String>) -> Result<Self, MailerDomainError> {
        Ok(Self::Smtp(SmtpTransportConfig::new(host)?))
    }

    /// Creates a `sendmail` configuration using the default binary.
    #[must_use]
    pub fn sendmail() -> Self {
        Self::Sendmail(SendmailTransportConfig::default())
    }

    /// Creates a `json` configuration.
    #[must_use]
    pub const fn json() -> Self {
        Self::Json(JsonTransportConfig::new())
    }

    /// Creates a `stream` configuration.
    #[must_use]
    pub const fn stream() -> Self {
        Self::Stream(StreamTransportConfig::new())
    }

    /// Returns the canonical transport kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Smtp(_) => "smtp",
            Self::Sendmail(_) => "sendmail",
            Self::Json(_) => "json",
            Self::Stream(_) => "stream",
        }
    }

    /// Re-checks invariants for values that bypassed the constructors, such
    /// as those deserialized from configuration files.
    ///
    /// # Errors
    ///
    /// Returns the first [`MailerDomainError`] found.
    pub fn validate(&self) -> Result<(), MailerDomainError> {
        match self {
            Self::Smtp(smtp) => smtp.validate(),
            Self::Sendmail(sendmail) if sendmail.path.trim().is_empty() => {
                Err(MailerDomainError::EmptySendmailPath)
            }
            Self::Sendmail(_) | Self::Json(_) | Self::Stream(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn smtp_defaults_apply_when_deserializing() {
        let config: MailerConfig = serde_json::from_value(json!({
            "transport": "smtp",
            "host": "smtp.example.com",
            "auth": {"user": "mailer", "pass": "secret"}
        }))
        .expect("smtp config should deserialize");

        let MailerConfig::Smtp(smtp) = config else {
            panic!("expected smtp config");
        };
        assert_eq!(smtp.host(), "smtp.example.com");
        assert_eq!(smtp.port(), 587);
        assert!(!smtp.secure());
        assert_eq!(smtp.auth().map(SmtpCredentials::user), Some("mailer"));
    }

    #[test]
    fn sendmail_defaults_apply_when_deserializing() {
        let config: MailerConfig = serde_json::from_value(json!({"transport": "sendmail"}))
            .expect("sendmail config should deserialize");

        assert_eq!(config, MailerConfig::sendmail());
        assert_eq!(config.kind(), "sendmail");
    }

    #[test]
    fn stream_newline_is_read_from_configuration() {
        let config: MailerConfig =
            serde_json::from_value(json!({"transport": "stream", "newline": "windows"}))
                .expect("stream config should deserialize");

        assert_eq!(
            config,
            MailerConfig::Stream(StreamTransportConfig::new().with_newline(Newline::Windows))
        );
        assert_eq!(config.kind(), "stream");
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[case(json!({"transport": "ses"}))]
    #[case(json!({"service": "gmail"}))]
    fn unsupported_transport_options_are_rejected(#[case] value: serde_json::Value) {
        assert!(serde_json::from_value::<MailerConfig>(value).is_err());
    }

    #[test]
    fn validate_rejects_deserialized_blank_host() {
        let config: MailerConfig =
            serde_json::from_value(json!({"transport": "smtp", "host": "  "}))
                .expect("shape is valid");

        assert_eq!(config.validate(), Err(MailerDomainError::EmptySmtpHost));
    }

    #[test]
    fn zero_port_is_rejected() {
        let result = SmtpTransportConfig::new("smtp.example.com")
            .and_then(|config| config.with_port(0));

        assert_eq!(result, Err(MailerDomainError::InvalidSmtpPort));
    }

    #[test]
    fn credentials_debug_output_hides_password() {
        let credentials = SmtpCredentials::new("mailer", "hunter2").expect("valid credentials");
        let rendered = format!("{credentials:?}");

        assert!(rendered.contains("mailer"));
        assert!(!rendered.contains("hunter2"));
    }
}
