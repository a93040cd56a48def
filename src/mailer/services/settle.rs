//! Adapts single-callback transport primitives into futures.

use crate::mailer::ports::{TransportCallback, TransportError, TransportResult};
use tokio::sync::oneshot;

/// Runs a callback-style `primitive` and resolves with the outcome it reports.
///
/// The primitive receives a [`TransportCallback`]; because the callback is
/// `FnOnce`, the returned future settles at most once with the first and only
/// reported outcome. A callback dropped without being invoked settles as
/// [`TransportError::CallbackDropped`].
///
/// # Errors
///
/// Returns the error the primitive reported, or
/// [`TransportError::CallbackDropped`].
pub async fn settle<T, P>(primitive: P) -> TransportResult<T>
where
    T: Send + 'static,
    P: FnOnce(TransportCallback<T>) + Send,
{
    let (sender, receiver) = oneshot::channel();
    let callback: TransportCallback<T> = Box::new(move |outcome| {
        if sender.send(outcome).is_err() {
            tracing::trace!("transport completed after its caller stopped waiting");
        }
    });
    primitive(callback);

    match receiver.await {
        Ok(outcome) => outcome,
        Err(_) => Err(TransportError::CallbackDropped),
    }
}
