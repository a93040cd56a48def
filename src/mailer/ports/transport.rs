//! Transport port: construction, verification, and delivery primitives.

use crate::mailer::domain::{DeliveryInfo, MailMessage};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Completion callback handed to a transport primitive.
///
/// Transports invoke it exactly once with either an error or the outcome.
pub type TransportCallback<T> = Box<dyn FnOnce(TransportResult<T>) + Send>;

/// Constructs transports from opaque configuration values.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    /// Configuration accepted by this factory.
    type Config: Send + Sync + 'static;

    /// Transport produced by this factory.
    type Transport: MailTransport + 'static;

    /// Creates an unverified transport from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the configuration cannot be turned into
    /// a transport.
    async fn create(&self, config: &Self::Config) -> TransportResult<Self::Transport>;
}

/// Callback-style contract of a live mail transport.
///
/// Both primitives may complete synchronously or from another task.
pub trait MailTransport: Send + Sync {
    /// Performs the connectivity and credential handshake.
    fn verify(&self, callback: TransportCallback<()>);

    /// Submits `message` for delivery.
    fn send_mail(&self, message: MailMessage, callback: TransportCallback<DeliveryInfo>);
}

/// Errors reported by transports and transport factories.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The remote endpoint could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The remote endpoint rejected the credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The message or one of its recipients was rejected.
    #[error("message rejected: {0}")]
    Rejected(String),

    /// The factory does not support the given configuration.
    #[error("unsupported transport configuration: {0}")]
    Unsupported(String),

    /// The transport dropped its completion callback without invoking it.
    #[error("transport dropped its completion callback")]
    CallbackDropped,

    /// Generic runtime failure.
    #[error("transport runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl TransportError {
    /// Wraps a runtime error from a transport implementation.
    #[must_use]
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}
