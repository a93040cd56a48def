//! In-memory transport adapter for registry and facade tests.

use crate::mailer::{
    domain::{DeliveryInfo, MailMessage, MailerConfig},
    ports::{MailTransport, TransportCallback, TransportError, TransportFactory, TransportResult},
};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Semaphore;

const ACCEPTED_RESPONSE: &str = "250 2.0.0 OK: queued";

/// In-memory transport factory.
///
/// Transports created here never touch the network. Handshake and delivery
/// outcomes are driven by failure injection on the factory, and every
/// accepted message is recorded so tests can inspect it. The factory also
/// counts creations and handshakes, which makes "no second connection
/// attempt" observable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTransportFactory {
    state: Arc<RwLock<InMemoryTransportState>>,
}

#[derive(Debug, Default)]
struct InMemoryTransportState {
    unreachable_hosts: HashSet<String>,
    rejected_users: HashSet<String>,
    rejected_kinds: HashSet<String>,
    rejected_recipients: HashSet<String>,
    verification_gate: Option<Arc<Semaphore>>,
    created: usize,
    verifications: usize,
    delivered: Vec<MailMessage>,
}

/// Holds back handshakes until released.
///
/// Obtained from [`InMemoryTransportFactory::hold_verifications`]. While
/// held, handshakes complete from a spawned task, so a tokio runtime must be
/// running.
#[derive(Debug, Clone)]
pub struct VerificationGate {
    permits: Arc<Semaphore>,
}

impl VerificationGate {
    /// Lets pending and future handshakes complete.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }
}

fn lock_error(err: impl ToString) -> TransportError {
    TransportError::runtime(std::io::Error::other(err.to_string()))
}

impl InMemoryTransportFactory {
    /// Creates a factory whose transports all verify and deliver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&self, apply: impl FnOnce(&mut InMemoryTransportState)) -> TransportResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        apply(&mut state);
        Ok(())
    }

    /// Makes handshakes against SMTP `host` fail with a connection error.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn set_unreachable(&self, host: impl Into<String>) -> TransportResult<()> {
        let host = host.into();
        self.update(|state| {
            state.unreachable_hosts.insert(host);
        })
    }

    /// Makes handshakes authenticating as `user` fail.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn reject_user(&self, user: impl Into<String>) -> TransportResult<()> {
        let user = user.into();
        self.update(|state| {
            state.rejected_users.insert(user);
        })
    }

    /// Makes creation fail for configurations of the given kind, such as
    /// `sendmail`.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn reject_kind(&self, kind: impl Into<String>) -> TransportResult<()> {
        let kind = kind.into();
        self.update(|state| {
            state.rejected_kinds.insert(kind);
        })
    }

    /// Makes delivery to `address` fail.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn reject_recipient(&self, address: impl Into<String>) -> TransportResult<()> {
        let address = address.into();
        self.update(|state| {
            state.rejected_recipients.insert(address);
        })
    }

    /// Holds every subsequent handshake until the returned gate is released.
    ///
    /// # Errors
    ///
    /// Returns transport runtime errors when lock acquisition fails.
    pub fn hold_verifications(&self) -> TransportResult<VerificationGate> {
        let permits = Arc::new(Semaphore::new(0));
        let gate = VerificationGate {
            permits: Arc::clone(&permits),
        };
        self.update(|state| state.verification_gate = Some(permits))?;
        Ok(gate)
    }

    /// Returns how many transports were created.
    #[must_use]
    pub fn created_count(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).created
    }

    /// Returns how many handshakes were attempted.
    #[must_use]
    pub fn verification_count(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .verifications
    }

    /// Returns every message accepted so far, across all transports.
    #[must_use]
    pub fn delivered_messages(&self) -> Vec<MailMessage> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .delivered
            .clone()
    }
}

#[async_trait]
impl TransportFactory for InMemoryTransportFactory {
    type Config = MailerConfig;
    type Transport = InMemoryTransport;

    async fn create(&self, config: &MailerConfig) -> TransportResult<InMemoryTransport> {
        config
            .validate()
            .map_err(|err| TransportError::Unsupported(err.to_string()))?;

        let mut state = self.state.write().map_err(lock_error)?;
        if state.rejected_kinds.contains(config.kind()) {
            return Err(TransportError::Unsupported(format!(
                "{} transport is disabled",
                config.kind()
            )));
        }
        state.created += 1;

        let (host, user) = match config {
            MailerConfig::Smtp(smtp) => (
                Some(smtp.host().to_owned()),
                smtp.auth().map(|auth| auth.user().to_owned()),
            ),
            MailerConfig::Sendmail(_) | MailerConfig::Json(_) | MailerConfig::Stream(_) => {
                (None, None)
            }
        };

        Ok(InMemoryTransport {
            state: Arc::clone(&self.state),
            kind: config.kind(),
            host,
            user,
        })
    }
}

/// Transport created by [`InMemoryTransportFactory`].
#[derive(Debug)]
pub struct InMemoryTransport {
    state: Arc<RwLock<InMemoryTransportState>>,
    kind: &'static str,
    host: Option<String>,
    user: Option<String>,
}

impl InMemoryTransport {
    /// Returns the configuration kind this transport was created from.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns the SMTP host, if any.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    fn handshake_outcome(&self, state: &InMemoryTransportState) -> TransportResult<()> {
        if let Some(host) = self
            .host
            .as_ref()
            .filter(|host| state.unreachable_hosts.contains(*host))
        {
            return Err(TransportError::Connection(format!(
                "connect ECONNREFUSED {host}"
            )));
        }

        if let Some(user) = self
            .user
            .as_ref()
            .filter(|user| state.rejected_users.contains(*user))
        {
            return Err(TransportError::Authentication(format!(
                "535 invalid login for {user}"
            )));
        }

        Ok(())
    }

    fn deliver(&self, message: MailMessage) -> TransportResult<DeliveryInfo> {
        let mut state = self.state.write().map_err(lock_error)?;

        let envelope = message.envelope();
        if envelope.to.is_empty() {
            return Err(TransportError::Rejected("no recipients defined".to_owned()));
        }

        let (accepted, rejected): (Vec<String>, Vec<String>) = envelope
            .to
            .iter()
            .cloned()
            .partition(|address| !state.rejected_recipients.contains(address));
        if accepted.is_empty() {
            return Err(TransportError::Rejected(format!(
                "all recipients were rejected: {}",
                rejected.join(", ")
            )));
        }

        state.delivered.push(message);
        let mut info = DeliveryInfo::accepted(envelope, ACCEPTED_RESPONSE);
        info.accepted = accepted;
        info.rejected = rejected;
        Ok(info)
    }
}

impl MailTransport for InMemoryTransport {
    fn verify(&self, callback: TransportCallback<()>) {
        let (outcome, gate) = match self.state.write() {
            Ok(mut state) => {
                state.verifications += 1;
                (
                    self.handshake_outcome(&state),
                    state.verification_gate.clone(),
                )
            }
            Err(err) => (Err(lock_error(err)), None),
        };

        match gate {
            Some(permits) => {
                tokio::spawn(async move {
                    let _permit = permits.acquire_owned().await;
                    callback(outcome);
                });
            }
            None => callback(outcome),
        }
    }

    fn send_mail(&self, message: MailMessage, callback: TransportCallback<DeliveryInfo>) {
        callback(self.deliver(message));
    }
}
