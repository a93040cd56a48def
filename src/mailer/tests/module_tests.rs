//! Unit tests for module descriptor wiring and configuration loading.

use std::sync::Arc;

use crate::mailer::{
    adapters::{InMemoryTransportFactory, JsonTransportFactory},
    domain::{HandleState, MailMessage, MailerConfig, MailerDomainError},
    services::{
        MAILER_SERVICE_NAME, MailerModule, MailerModuleConfig, MailerModuleError,
        MailerRegistryError, MaterializationPolicy,
    },
};
use mockable::DefaultClock;
use rstest::rstest;

const LAZY_DOCUMENT: &str = r#"{
    "instances": {
        "default": {
            "transport": "smtp",
            "host": "smtp.example.com",
            "auth": {"user": "mailer", "pass": "secret"}
        },
        "preview": {"transport": "json"}
    }
}"#;

#[test]
fn json_document_defaults_to_lazy_policy() {
    let config = MailerModuleConfig::from_json_str(LAZY_DOCUMENT).expect("document should parse");

    assert_eq!(config.policy, MaterializationPolicy::Lazy);
    assert_eq!(config.instances.len(), 2);
    assert_eq!(
        config.instances.get("preview"),
        Some(&MailerConfig::json())
    );
}

#[rstest]
#[case(r#"{"instances": {"default": {"transport": "carrier_pigeon"}}}"#)]
#[case(r#"{"policy": "eventually", "instances": {}}"#)]
#[case(r#"{"instances": {"default": {"transport": "ses"}}}"#)]
#[case(r#"{"instances": {"default": {"service": "gmail"}}}"#)]
#[case("not json")]
fn malformed_documents_are_rejected(#[case] document: &str) {
    let result = MailerModuleConfig::from_json_str(document);

    assert!(matches!(result, Err(MailerModuleError::Config(_))));
}

#[test]
fn invalid_instance_values_are_rejected() {
    let document = r#"{"instances": {"default": {"transport": "smtp", "host": " ", "port": 25}}}"#;

    let result = MailerModuleConfig::from_json_str(document);

    assert!(matches!(
        result,
        Err(MailerModuleError::InvalidInstance { ref instance, source: MailerDomainError::EmptySmtpHost })
            if instance == "default"
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn lazy_start_defers_verification() {
    let factory = Arc::new(InMemoryTransportFactory::new());
    let config = MailerModuleConfig::from_json_str(LAZY_DOCUMENT).expect("document should parse");
    let module = MailerModule::new(Arc::clone(&factory), Arc::new(DefaultClock), config);

    assert_eq!(module.service_name(), MAILER_SERVICE_NAME);
    assert_eq!(
        module.instance_names().collect::<Vec<_>>(),
        vec!["default", "preview"]
    );

    let mailer = module.start().await.expect("module should start");

    assert!(mailer.has_transport(None));
    assert!(mailer.has_transport(Some("preview")));
    assert_eq!(
        mailer.registry().state(None),
        Some(HandleState::Unmaterialized)
    );
    assert_eq!(factory.verification_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn eager_start_verifies_every_instance() {
    let factory = Arc::new(InMemoryTransportFactory::new());
    let config = MailerModuleConfig::new()
        .with_policy(MaterializationPolicy::Eager)
        .with_instance("default", MailerConfig::smtp("smtp.example.com").expect("valid config"))
        .with_instance("local", MailerConfig::sendmail());
    let module = MailerModule::new(Arc::clone(&factory), Arc::new(DefaultClock), config);

    let mailer = module.start().await.expect("module should start");

    assert_eq!(mailer.registry().state(None), Some(HandleState::Ready));
    assert_eq!(
        mailer.registry().state(Some("local")),
        Some(HandleState::Ready)
    );
    assert_eq!(factory.verification_count(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn eager_start_fails_fast_on_unreachable_instance() {
    let factory = Arc::new(InMemoryTransportFactory::new());
    factory
        .set_unreachable("smtp.down.example")
        .expect("injection should succeed");
    let config = MailerModuleConfig::default_instance(
        MailerConfig::smtp("smtp.down.example").expect("valid config"),
    )
    .with_policy(MaterializationPolicy::Eager);

    let result = MailerModule::new(factory, Arc::new(DefaultClock), config)
        .start()
        .await;

    assert!(matches!(
        result,
        Err(MailerModuleError::Registry(MailerRegistryError::Construction(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn names_colliding_after_trimming_are_rejected() {
    let config = MailerModuleConfig::new()
        .with_instance("default", MailerConfig::json())
        .with_instance(" default", MailerConfig::json());

    let result = MailerModule::new(
        Arc::new(JsonTransportFactory::new()),
        Arc::new(DefaultClock),
        config,
    )
    .start()
    .await;

    assert!(matches!(
        result,
        Err(MailerModuleError::Registry(MailerRegistryError::DuplicateName(_)))
    ));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_module_renders_through_json_transport() {
    let mailer = MailerModule::with_default(
        Arc::new(JsonTransportFactory::new()),
        Arc::new(DefaultClock),
        MailerConfig::json(),
    )
    .start()
    .await
    .expect("module should start");

    let info = mailer
        .send_mail(
            MailMessage::new().with_to("a@b.com").with_subject("s"),
            None,
        )
        .await
        .expect("rendering should succeed");

    assert!(info.message_id.ends_with("@localhost>"));
    assert!(info.raw.is_some());
}
