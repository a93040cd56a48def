//! Facade operations as a request handler sees them.

use std::sync::Arc;

use courier::mailer::{
    adapters::InMemoryTransportFactory,
    domain::HandleState,
    ports::TransportError,
    services::{ConstructionStage, MailerError, MailerRegistryError},
};
use rstest::rstest;

use super::helpers::{default_and_backup, factory, simple_message, start_mailer};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn default_instance_sends_with_message_id(factory: Arc<InMemoryTransportFactory>) {
    let mailer = start_mailer(&factory, default_and_backup()).await;

    assert!(mailer.has_transport(None));
    let info = mailer
        .send_mail(simple_message("a@b.com"), None)
        .await
        .expect("delivery should succeed");

    assert!(!info.message_id.is_empty());
    assert!(info.message_id.ends_with("@example.com>"));
    assert_eq!(info.accepted, vec!["a@b.com"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_backup_fails_without_reconnecting(factory: Arc<InMemoryTransportFactory>) {
    let mailer = start_mailer(&factory, default_and_backup()).await;

    let first = mailer.get_transport(Some("backup")).await;
    let second = mailer.get_transport(Some("backup")).await;

    for outcome in [first, second] {
        match outcome {
            Err(MailerError::Registry(MailerRegistryError::Construction(error))) => {
                assert_eq!(error.instance().as_str(), "backup");
                assert_eq!(error.stage(), ConstructionStage::Verify);
                assert!(matches!(
                    error.transport_error(),
                    TransportError::Connection(_)
                ));
            }
            other => panic!("expected construction error, got {other:?}"),
        }
    }
    assert_eq!(factory.verification_count(), 1);
    assert_eq!(
        mailer.registry().state(Some("backup")),
        Some(HandleState::Failed)
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_backup_does_not_affect_default(factory: Arc<InMemoryTransportFactory>) {
    let mailer = start_mailer(&factory, default_and_backup()).await;

    assert!(mailer.get_transport(Some("backup")).await.is_err());
    let info = mailer
        .send_mail(simple_message("a@b.com"), None)
        .await
        .expect("default should still deliver");

    assert_eq!(info.rejected.len(), 0);
    assert_eq!(mailer.registry().state(None), Some(HandleState::Ready));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_names_never_touch_the_transport(factory: Arc<InMemoryTransportFactory>) {
    let mailer = start_mailer(&factory, default_and_backup()).await;

    let send = mailer.send_mail(simple_message("a@b.com"), Some("newsletter")).await;
    let fetch = mailer.get_transport(Some("newsletter")).await;

    assert!(send.is_err_and(|err| err.is_not_found()));
    assert!(fetch.is_err_and(|err| err.is_not_found()));
    assert!(!mailer.has_transport(Some("newsletter")));
    assert_eq!(factory.created_count(), 0);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_send_is_delivered_once(factory: Arc<InMemoryTransportFactory>) {
    let mailer = start_mailer(&factory, default_and_backup()).await;

    for recipient in ["a@b.com", "c@d.com", "e@f.com"] {
        mailer
            .send_mail(simple_message(recipient), None)
            .await
            .expect("delivery should succeed");
    }

    assert_eq!(factory.delivered_messages().len(), 3);
    assert_eq!(factory.verification_count(), 1);
}
