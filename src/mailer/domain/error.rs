//! Error types for mailer domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing mailer domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MailerDomainError {
    /// The instance name is empty after trimming.
    #[error("mail transport instance name must not be empty")]
    EmptyInstanceName,

    /// The instance name exceeds the 100-character limit.
    #[error("mail transport instance name exceeds 100 character limit: {0}")]
    InstanceNameTooLong(String),

    /// The SMTP host is empty after trimming.
    #[error("SMTP host must not be empty")]
    EmptySmtpHost,

    /// The SMTP port is zero.
    #[error("SMTP port must be between 1 and 65535")]
    InvalidSmtpPort,

    /// The SMTP user name is empty after trimming.
    #[error("SMTP user must not be empty when credentials are provided")]
    EmptySmtpUser,

    /// The sendmail binary path is empty after trimming.
    #[error("sendmail path must not be empty")]
    EmptySendmailPath,
}

/// Error returned while parsing a handle state from its string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown mail transport handle state: {0}")]
pub struct ParseHandleStateError(pub String);
