//! Port contracts for the underlying mail transport library.

mod transport;

pub use transport::{
    MailTransport, TransportCallback, TransportError, TransportFactory, TransportResult,
};
