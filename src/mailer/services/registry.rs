//! Named instance registry with shared, single-flight materialization.

use super::{ConstructionError, InstanceHandle, TransportConstructor};
use crate::mailer::{
    domain::{HandleState, InstanceName, MailerDomainError, instance_or_default},
    ports::TransportFactory,
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::OnceCell;

/// Errors returned by registry registration and lookup.
#[derive(Debug, Clone, Error)]
pub enum MailerRegistryError {
    /// The instance name is invalid.
    #[error(transparent)]
    Domain(#[from] MailerDomainError),

    /// An instance with the same name is already registered.
    #[error("mail transport instance '{0}' is already registered")]
    DuplicateName(InstanceName),

    /// No instance with the given name is registered.
    #[error("mail transport instance '{0}' not found")]
    ServiceNotFound(String),

    /// Materialization failed; the failure is permanent for this instance.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
}

/// Result type for registry operations.
pub type MailerRegistryResult<T> = Result<T, MailerRegistryError>;

type Outcome<T> = Result<InstanceHandle<T>, ConstructionError>;

struct InstanceSlot<Cfg, T> {
    config: Cfg,
    outcome: OnceCell<Outcome<T>>,
    in_flight: AtomicBool,
}

impl<Cfg, T> InstanceSlot<Cfg, T> {
    fn new(config: Cfg) -> Self {
        Self {
            config,
            outcome: OnceCell::new(),
            in_flight: AtomicBool::new(false),
        }
    }

    // `in_flight` is never cleared: once the outcome is stored it takes
    // precedence, and a cancelled attempt is picked up by the next caller.
    fn state(&self) -> HandleState {
        match self.outcome.get() {
            Some(Ok(_)) => HandleState::Ready,
            Some(Err(_)) => HandleState::Failed,
            None if self.in_flight.load(Ordering::Acquire) => HandleState::Materializing,
            None => HandleState::Unmaterialized,
        }
    }
}

/// Collects instance configurations before the registry starts serving.
pub struct MailerRegistryBuilder<F>
where
    F: TransportFactory,
{
    slots: BTreeMap<InstanceName, F::Config>,
}

impl<F> MailerRegistryBuilder<F>
where
    F: TransportFactory,
{
    /// Creates an empty builder.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: BTreeMap::new(),
        }
    }

    /// Registers `config` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MailerRegistryError::Domain`] when the name is invalid or
    /// [`MailerRegistryError::DuplicateName`] when it is already taken. The
    /// existing entry is left untouched.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        config: F::Config,
    ) -> MailerRegistryResult<&mut Self> {
        let instance_name = InstanceName::new(name)?;
        if self.slots.contains_key(&instance_name) {
            return Err(MailerRegistryError::DuplicateName(instance_name));
        }

        self.slots.insert(instance_name, config);
        Ok(self)
    }

    /// Returns whether `name` has been registered so far.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Finishes registration.
    #[must_use]
    pub fn build<C>(self, factory: Arc<F>, clock: Arc<C>) -> MailerRegistry<F, C>
    where
        C: Clock + Send + Sync,
    {
        MailerRegistry {
            constructor: TransportConstructor::new(factory, clock),
            slots: self
                .slots
                .into_iter()
                .map(|(name, config)| (name, InstanceSlot::new(config)))
                .collect(),
        }
    }
}

impl<F> Default for MailerRegistryBuilder<F>
where
    F: TransportFactory,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of named mail transport instances.
///
/// Every registered name is materialized at most once: the first
/// [`resolve`](Self::resolve) constructs and verifies the transport, callers
/// arriving while that is in flight wait for the same outcome, and the outcome
/// (success or failure) is kept for the lifetime of the registry. Failed
/// instances are never retried.
pub struct MailerRegistry<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    constructor: TransportConstructor<F, C>,
    slots: BTreeMap<InstanceName, InstanceSlot<F::Config, F::Transport>>,
}

impl<F, C> MailerRegistry<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    /// Starts collecting instance configurations.
    #[must_use]
    pub const fn builder() -> MailerRegistryBuilder<F> {
        MailerRegistryBuilder::new()
    }

    /// Returns whether `name` (or the default instance) is registered.
    ///
    /// Existence is about configuration, not connectivity: a registered
    /// instance that failed verification still exists.
    #[must_use]
    pub fn exists(&self, name: Option<&str>) -> bool {
        self.slots.contains_key(instance_or_default(name))
    }

    /// Returns the materialization state of `name`, if registered.
    #[must_use]
    pub fn state(&self, name: Option<&str>) -> Option<HandleState> {
        self.slots
            .get(instance_or_default(name))
            .map(InstanceSlot::state)
    }

    /// Returns registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &InstanceName> {
        self.slots.keys()
    }

    /// Returns the verified handle for `name` (or the default instance),
    /// materializing it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`MailerRegistryError::ServiceNotFound`] for unknown names and
    /// [`MailerRegistryError::Construction`] when this or an earlier
    /// materialization of the instance failed.
    pub async fn resolve(
        &self,
        name: Option<&str>,
    ) -> MailerRegistryResult<InstanceHandle<F::Transport>> {
        let requested = instance_or_default(name);
        let (instance_name, slot) = self
            .slots
            .get_key_value(requested)
            .ok_or_else(|| MailerRegistryError::ServiceNotFound(requested.to_owned()))?;

        let outcome = slot
            .outcome
            .get_or_init(|| self.materialize(instance_name, slot))
            .await;

        outcome.clone().map_err(MailerRegistryError::from)
    }

    /// Materializes every registered instance in name order.
    ///
    /// Used by hosts that verify all transports at startup. Every instance is
    /// attempted even after a failure.
    ///
    /// # Errors
    ///
    /// Returns the first [`MailerRegistryError::Construction`] encountered.
    pub async fn materialize_all(&self) -> MailerRegistryResult<()> {
        let mut first_failure = None;
        for name in self.slots.keys() {
            if let Err(err) = self.resolve(Some(name.as_str())).await {
                first_failure.get_or_insert(err);
            }
        }

        first_failure.map_or(Ok(()), Err)
    }

    async fn materialize(
        &self,
        name: &InstanceName,
        slot: &InstanceSlot<F::Config, F::Transport>,
    ) -> Outcome<F::Transport> {
        slot.in_flight.store(true, Ordering::Release);
        tracing::debug!(instance = %name, "materializing mail transport");

        let outcome = self.constructor.construct(name, &slot.config).await;
        match &outcome {
            Ok(handle) => tracing::info!(
                instance = %name,
                verified_at = %handle.verified_at(),
                "mail transport verified"
            ),
            Err(err) => tracing::warn!(
                instance = %name,
                stage = %err.stage(),
                error = %err,
                "mail transport failed verification"
            ),
        }

        outcome
    }
}
