//! Shared materialization across concurrent request handlers.

use std::sync::Arc;

use courier::mailer::{adapters::InMemoryTransportFactory, domain::HandleState};
use rstest::rstest;
use tokio::task::JoinSet;

use super::helpers::{default_and_backup, factory, simple_message, start_mailer};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_sends_verify_once(factory: Arc<InMemoryTransportFactory>) {
    let gate = factory
        .hold_verifications()
        .expect("gate should install");
    let mailer = start_mailer(&factory, default_and_backup()).await;

    let mut handlers = JoinSet::new();
    for index in 0..16 {
        let mailer = mailer.clone();
        handlers.spawn(async move {
            mailer
                .send_mail(simple_message(&format!("user{index}@example.com")), None)
                .await
        });
    }

    while mailer.registry().state(None) != Some(HandleState::Materializing) {
        tokio::task::yield_now().await;
    }
    gate.release();

    for outcome in handlers.join_all().await {
        outcome.expect("every send should succeed");
    }
    assert_eq!(factory.created_count(), 1);
    assert_eq!(factory.verification_count(), 1);
    assert_eq!(factory.delivered_messages().len(), 16);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_lookups_of_different_names_are_independent(
    factory: Arc<InMemoryTransportFactory>,
) {
    let mailer = start_mailer(&factory, default_and_backup()).await;

    let mut lookups = JoinSet::new();
    for name in ["default", "backup", "default", "backup"] {
        let mailer = mailer.clone();
        lookups.spawn(async move { (name, mailer.get_transport(Some(name)).await.is_ok()) });
    }

    for (name, succeeded) in lookups.join_all().await {
        assert_eq!(succeeded, name == "default", "unexpected outcome for {name}");
    }
    assert_eq!(factory.verification_count(), 2);
}
