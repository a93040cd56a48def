//! Courier: named, verified mail transports for request handlers.
//!
//! This crate turns a declarative set of mail transport configurations into
//! lazily created, connection-verified transport instances keyed by name, and
//! hands request-handling code a small capability facade for sending mail
//! through them.
//!
//! # Architecture
//!
//! Courier follows hexagonal architecture principles:
//!
//! - **Domain**: Pure value types with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the underlying transport library
//! - **Adapters**: Concrete transport implementations
//! - **Services**: Registry, capability facade, and module wiring
//!
//! # Modules
//!
//! - [`mailer`]: Instance registry, verification protocol, and mail facade
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use courier::mailer::{
//!     adapters::JsonTransportFactory,
//!     domain::{MailMessage, MailerConfig},
//!     services::MailerModule,
//! };
//! use mockable::DefaultClock;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = MailerModule::with_default(
//!     Arc::new(JsonTransportFactory::new()),
//!     Arc::new(DefaultClock),
//!     MailerConfig::json(),
//! )
//! .start()
//! .await?;
//!
//! let message = MailMessage::new()
//!     .with_from("noreply@example.com")
//!     .with_to("a@b.com")
//!     .with_subject("Hello")
//!     .with_text("Hello world");
//! let info = mailer.send_mail(message, None).await?;
//! assert!(info.message_id.ends_with("@example.com>"));
//! # Ok(())
//! # }
//! ```

pub mod mailer;
