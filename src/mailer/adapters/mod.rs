//! Adapter implementations for the mail transport port.

mod json;
mod memory;
mod stream;

pub use json::{JsonTransport, JsonTransportFactory};
pub use memory::{InMemoryTransport, InMemoryTransportFactory, VerificationGate};
pub use stream::{StreamTransport, StreamTransportFactory};
