//! Registry, capability facade, and module wiring for mail transports.

mod construct;
mod facade;
mod module;
mod registry;
mod settle;

pub use construct::{ConstructionError, ConstructionStage, InstanceHandle, TransportConstructor};
pub use facade::{Mailer, MailerError, MailerResult};
pub use module::{
    MAILER_SERVICE_NAME, MailerModule, MailerModuleConfig, MailerModuleError,
    MaterializationPolicy,
};
pub use registry::{
    MailerRegistry, MailerRegistryBuilder, MailerRegistryError, MailerRegistryResult,
};
pub use settle::settle;
