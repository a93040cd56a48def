//! Module descriptor wiring configured instances into a [`Mailer`].

use super::{Mailer, MailerRegistry, MailerRegistryError};
use crate::mailer::{
    domain::{DEFAULT_INSTANCE_NAME, MailerConfig, MailerDomainError},
    ports::TransportFactory,
};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Name under which the mailer registers itself with a host.
pub const MAILER_SERVICE_NAME: &str = "mailer";

/// When registered instances are materialized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaterializationPolicy {
    /// On the first lookup of each instance.
    #[default]
    Lazy,
    /// All at once when the module starts.
    Eager,
}

impl fmt::Display for MaterializationPolicy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Lazy => "lazy",
            Self::Eager => "eager",
        })
    }
}

/// Declarative mailer configuration: a policy and named instances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailerModuleConfig<Cfg> {
    /// Materialization policy.
    #[serde(default)]
    pub policy: MaterializationPolicy,
    /// Instance configurations keyed by instance name.
    pub instances: BTreeMap<String, Cfg>,
}

impl<Cfg> MailerModuleConfig<Cfg> {
    /// Creates an empty lazy configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            policy: MaterializationPolicy::Lazy,
            instances: BTreeMap::new(),
        }
    }

    /// Creates a configuration holding only the default instance.
    #[must_use]
    pub fn default_instance(config: Cfg) -> Self {
        Self::new().with_instance(DEFAULT_INSTANCE_NAME, config)
    }

    /// Sets the materialization policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: MaterializationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Adds or replaces an instance configuration.
    #[must_use]
    pub fn with_instance(mut self, name: impl Into<String>, config: Cfg) -> Self {
        self.instances.insert(name.into(), config);
        self
    }
}

impl<Cfg> Default for MailerModuleConfig<Cfg> {
    fn default() -> Self {
        Self::new()
    }
}

impl MailerModuleConfig<MailerConfig> {
    /// Parses and validates a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`MailerModuleError::Config`] for malformed JSON and
    /// [`MailerModuleError::InvalidInstance`] for values that fail
    /// validation.
    pub fn from_json_str(document: &str) -> Result<Self, MailerModuleError> {
        let config: Self = serde_json::from_str(document)?;
        for (instance, transport) in &config.instances {
            transport
                .validate()
                .map_err(|source| MailerModuleError::InvalidInstance {
                    instance: instance.clone(),
                    source,
                })?;
        }
        Ok(config)
    }
}

/// Errors returned while loading or starting the mailer module.
#[derive(Debug, Error)]
pub enum MailerModuleError {
    /// The configuration document could not be parsed.
    #[error("invalid mailer configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// An instance configuration failed validation.
    #[error("invalid configuration for mail transport instance '{instance}': {source}")]
    InvalidInstance {
        /// Instance name as written in the configuration.
        instance: String,
        /// Validation failure.
        #[source]
        source: MailerDomainError,
    },

    /// Registration or eager materialization failed.
    #[error(transparent)]
    Registry(#[from] MailerRegistryError),
}

/// Declarative mailer module assembled once at process start.
///
/// Holds the service name, the transport factory, and the instance
/// configurations; [`start`](Self::start) turns them into the [`Mailer`]
/// capabilities that request handlers receive.
pub struct MailerModule<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    factory: Arc<F>,
    clock: Arc<C>,
    config: MailerModuleConfig<F::Config>,
}

impl<F, C> MailerModule<F, C>
where
    F: TransportFactory,
    C: Clock + Send + Sync,
{
    /// Creates a module from a full configuration.
    #[must_use]
    pub const fn new(factory: Arc<F>, clock: Arc<C>, config: MailerModuleConfig<F::Config>) -> Self {
        Self {
            factory,
            clock,
            config,
        }
    }

    /// Creates a module with a single default instance.
    #[must_use]
    pub fn with_default(factory: Arc<F>, clock: Arc<C>, config: F::Config) -> Self {
        Self::new(factory, clock, MailerModuleConfig::default_instance(config))
    }

    /// Returns the service name.
    #[must_use]
    pub const fn service_name(&self) -> &'static str {
        MAILER_SERVICE_NAME
    }

    /// Returns the materialization policy.
    #[must_use]
    pub const fn policy(&self) -> MaterializationPolicy {
        self.config.policy
    }

    /// Returns configured instance names in order.
    pub fn instance_names(&self) -> impl Iterator<Item = &str> {
        self.config.instances.keys().map(String::as_str)
    }

    /// Registers every configured instance and returns the capabilities.
    ///
    /// Under [`MaterializationPolicy::Eager`] every instance is verified
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`MailerModuleError::Registry`] when an instance name is
    /// invalid or collides after normalization, or when eager
    /// materialization fails.
    pub async fn start(self) -> Result<Mailer<F, C>, MailerModuleError> {
        let policy = self.config.policy;
        let mut builder = MailerRegistry::<F, C>::builder();
        for (name, config) in self.config.instances {
            builder.register(name, config)?;
        }

        let registry = Arc::new(builder.build(self.factory, self.clock));
        tracing::info!(
            service = MAILER_SERVICE_NAME,
            instances = registry.names().count(),
            policy = %policy,
            "mailer module started"
        );

        if policy == MaterializationPolicy::Eager {
            registry.materialize_all().await?;
        }

        Ok(Mailer::new(registry))
    }
}
