//! Domain model for named mail transport instances.
//!
//! The mailer domain models instance names, declarative transport
//! configuration, messages and their envelopes, delivery results, and the
//! materialization state of a registered instance. Transport mechanics remain
//! outside this boundary.

mod config;
mod delivery;
mod error;
mod message;
mod name;
mod state;

pub use config::{
    JsonTransportConfig, MailerConfig, Newline, SendmailTransportConfig, SmtpCredentials,
    SmtpTransportConfig, StreamTransportConfig,
};
pub use delivery::DeliveryInfo;
pub use error::{MailerDomainError, ParseHandleStateError};
pub use message::{Envelope, MailMessage};
pub use name::{DEFAULT_INSTANCE_NAME, InstanceName, instance_or_default};
pub use state::HandleState;
