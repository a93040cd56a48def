//! Transport construction followed by the mandatory verification handshake.

use super::settle;
use crate::mailer::{
    domain::InstanceName,
    ports::{MailTransport, TransportError, TransportFactory},
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Stage at which materializing an instance failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstructionStage {
    /// The factory could not create the transport.
    Create,
    /// The transport was created but its handshake failed.
    Verify,
}

impl ConstructionStage {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Verify => "verify",
        }
    }
}

impl fmt::Display for ConstructionStage {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Failure to construct or verify a named transport.
///
/// Cached by the registry as the terminal outcome for that instance.
#[derive(Debug, Clone, Error)]
#[error("failed to {stage} mail transport '{instance}': {source}")]
pub struct ConstructionError {
    instance: InstanceName,
    stage: ConstructionStage,
    #[source]
    source: TransportError,
}

impl ConstructionError {
    /// Creates a construction error.
    #[must_use]
    pub const fn new(instance: InstanceName, stage: ConstructionStage, source: TransportError) -> Self {
        Self {
            instance,
            stage,
            source,
        }
    }

    /// Returns the instance that failed.
    #[must_use]
    pub const fn instance(&self) -> &InstanceName {
        &self.instance
    }

    /// Returns the failing stage.
    #[must_use]
    pub const fn stage(&self) -> ConstructionStage {
        self.stage
    }

    /// Returns the underlying transport error.
    #[must_use]
    pub const fn transport_error(&self) -> &TransportError {
        &self.source
    }
}

/// A verified, ready-to-use transport.
pub struct InstanceHandle<T> {
    name: InstanceName,
    transport: Arc<T>,
    verified_at: DateTime<Utc>,
}

impl<T> InstanceHandle<T> {
    /// Returns the instance name.
    #[must_use]
    pub const fn name(&self) -> &InstanceName {
        &self.name
    }

    /// Returns the underlying transport for direct use.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns a shared pointer to the underlying transport.
    #[must_use]
    pub fn shared_transport(&self) -> Arc<T> {
        Arc::clone(&self.transport)
    }

    /// Returns when the handshake succeeded.
    #[must_use]
    pub const fn verified_at(&self) -> DateTime<Utc> {
        self.verified_at
    }

    /// Returns whether both handles refer to the same transport.
    #[must_use]
    pub fn same_transport(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.transport, &other.transport)
    }
}

impl<T> Clone for InstanceHandle<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            transport: Arc::clone(&self.transport),
            verified_at: self.verified_at,
        }
    }
}

impl<T> fmt::Debug for InstanceHandle<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InstanceHandle")
            .field("name", &self.name)
            .field("verified_at", &self.verified_at)
            .finish_non_exhaustive()
    }
}

/// Builds verified transports through a [`TransportFactory`].
pub struct TransportConstructor<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    factory: Arc<F>,
    clock: Arc<C>,
}

impl<F, C> TransportConstructor<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    /// Creates a constructor.
    #[must_use]
    pub const fn new(factory: Arc<F>, clock: Arc<C>) -> Self {
        Self { factory, clock }
    }

    /// Returns the wrapped factory.
    #[must_use]
    pub const fn factory(&self) -> &Arc<F> {
        &self.factory
    }

    /// Creates a transport from `config` and performs its handshake.
    ///
    /// The configuration is passed to the factory untouched. Ownership of the
    /// live transport passes to the returned handle.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError`] tagged with the stage that failed.
    pub async fn construct(
        &self,
        name: &InstanceName,
        config: &F::Config,
    ) -> Result<InstanceHandle<F::Transport>, ConstructionError> {
        let transport = self
            .factory
            .create(config)
            .await
            .map_err(|err| ConstructionError::new(name.clone(), ConstructionStage::Create, err))?;

        settle(|callback| transport.verify(callback))
            .await
            .map_err(|err| ConstructionError::new(name.clone(), ConstructionStage::Verify, err))?;

        Ok(InstanceHandle {
            name: name.clone(),
            transport: Arc::new(transport),
            verified_at: self.clock.utc(),
        })
    }
}
