//! Capability facade handed to request handlers.

use super::{InstanceHandle, MailerRegistry, MailerRegistryError, settle};
use crate::mailer::{
    domain::{DeliveryInfo, InstanceName, MailMessage},
    ports::{MailTransport, TransportError, TransportFactory},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by [`Mailer`] operations.
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    /// The instance could not be resolved.
    #[error(transparent)]
    Registry(#[from] MailerRegistryError),

    /// The transport reported a delivery failure.
    #[error("mail delivery through '{instance}' failed: {source}")]
    Delivery {
        /// Instance that attempted delivery.
        instance: InstanceName,
        /// Error reported by the transport.
        #[source]
        source: TransportError,
    },
}

impl MailerError {
    /// Returns whether the error means the instance is not registered.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Registry(MailerRegistryError::ServiceNotFound(_))
        )
    }
}

/// Result type for facade operations.
pub type MailerResult<T> = Result<T, MailerError>;

/// Mail capabilities for request handlers.
///
/// Cheap to clone; every clone shares one registry. Operations take an
/// optional instance name and fall back to
/// [`DEFAULT_INSTANCE_NAME`](crate::mailer::domain::DEFAULT_INSTANCE_NAME).
pub struct Mailer<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    registry: Arc<MailerRegistry<F, C>>,
}

impl<F, C> Clone for Mailer<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<F, C> Mailer<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    /// Creates a facade over `registry`.
    #[must_use]
    pub const fn new(registry: Arc<MailerRegistry<F, C>>) -> Self {
        Self { registry }
    }

    /// Returns the underlying registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<MailerRegistry<F, C>> {
        &self.registry
    }

    /// Sends `message` through the named instance.
    ///
    /// The instance is materialized first if needed. Delivery is attempted
    /// exactly once and never retried.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Registry`] when the instance cannot be resolved
    /// and [`MailerError::Delivery`] when the transport reports a failure.
    pub async fn send_mail(
        &self,
        message: MailMessage,
        instance: Option<&str>,
    ) -> MailerResult<DeliveryInfo> {
        let handle = self.registry.resolve(instance).await?;
        let info = settle(|callback| handle.transport().send_mail(message, callback))
            .await
            .map_err(|source| MailerError::Delivery {
                instance: handle.name().clone(),
                source,
            })?;

        tracing::debug!(
            instance = %handle.name(),
            message_id = %info.message_id,
            accepted = info.accepted.len(),
            rejected = info.rejected.len(),
            "mail submitted"
        );
        Ok(info)
    }

    /// Returns the verified handle of the named instance for direct use.
    ///
    /// # Errors
    ///
    /// Returns [`MailerError::Registry`] when the instance is unknown or
    /// failed to materialize.
    pub async fn get_transport(
        &self,
        instance: Option<&str>,
    ) -> MailerResult<InstanceHandle<F::Transport>> {
        Ok(self.registry.resolve(instance).await?)
    }

    /// Returns whether the named instance is registered.
    #[must_use]
    pub fn has_transport(&self, instance: Option<&str>) -> bool {
        self.registry.exists(instance)
    }
}
