//! Named mail transport instances for request handlers.
//!
//! This module turns a declarative set of transport configurations into
//! lazily materialized, verified transport handles keyed by instance name,
//! and exposes a small capability facade (`send_mail`, `get_transport`,
//! `has_transport`) that hosts hand to their request handlers. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Registry, facade, and module wiring in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
