//! Shared fixtures for mailer integration tests.

use std::sync::Arc;

use courier::mailer::{
    adapters::InMemoryTransportFactory,
    domain::{MailMessage, MailerConfig},
    services::{Mailer, MailerModule, MailerModuleConfig},
};
use mockable::DefaultClock;
use rstest::fixture;

/// Facade type used by the integration tests.
pub type TestMailer = Mailer<InMemoryTransportFactory, DefaultClock>;

/// Host that no in-memory handshake can reach.
pub const UNREACHABLE_HOST: &str = "smtp.unreachable.example";

/// Provides a fresh factory with [`UNREACHABLE_HOST`] marked unreachable.
#[fixture]
pub fn factory() -> Arc<InMemoryTransportFactory> {
    let factory = Arc::new(InMemoryTransportFactory::new());
    factory
        .set_unreachable(UNREACHABLE_HOST)
        .expect("failure injection should succeed");
    factory
}

/// Returns a module configuration with a working `default` instance and an
/// unreachable `backup` instance.
pub fn default_and_backup() -> MailerModuleConfig<MailerConfig> {
    MailerModuleConfig::new()
        .with_instance(
            "default",
            MailerConfig::smtp("smtp.example.com").expect("valid smtp config"),
        )
        .with_instance(
            "backup",
            MailerConfig::smtp(UNREACHABLE_HOST).expect("valid smtp config"),
        )
}

/// Starts a lazily materializing mailer over `factory`.
pub async fn start_mailer(
    factory: &Arc<InMemoryTransportFactory>,
    config: MailerModuleConfig<MailerConfig>,
) -> TestMailer {
    MailerModule::new(Arc::clone(factory), Arc::new(DefaultClock), config)
        .start()
        .await
        .expect("module should start")
}

/// Builds the message used across scenarios.
pub fn simple_message(to: &str) -> MailMessage {
    MailMessage::new()
        .with_from("noreply@example.com")
        .with_to(to)
        .with_subject("s")
        .with_text("t")
}
