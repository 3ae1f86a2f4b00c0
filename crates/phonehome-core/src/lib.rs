//! # phonehome-core
//!
//! Recipient resolution and notification dispatch.
//!
//! This crate provides:
//! - A JSON contact directory of users and groups
//! - Sanitizers for phone numbers and email addresses
//! - Resolution of user, group, phone and email specifiers
//! - A message template and SMS carrier gateway stubs
//! - SMTP session setup with fallback to an internal relay
//! - A dispatcher sending one email per address and one SMS fan-out per
//!   mobile number
//!
//! ## Example
//!
//! ```ignore
//! use phonehome_core::{Communicator, SendOptions, Specifier, TransportConfig};
//!
//! let config = TransportConfig::load(&TransportConfig::default_path()?)?;
//! let communicator = Communicator::from_dir("assets".as_ref(), config)?;
//! communicator
//!     .send_msg("Backup finished", &Specifier::from("ops"), Some("backup"), &SendOptions::default())
//!     .await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod contacts;
mod error;
pub mod resolve;
pub mod sanitize;
pub mod service;
pub mod template;

pub use assets::{Assets, CarrierStubs};
pub use config::{SmtpEndpoint, TransportConfig};
pub use contacts::{ContactDirectory, ContactMethods};
pub use error::{Error, Result, SessionFailure};
pub use phonehome_smtp::Security;
pub use resolve::{RESOLUTION_ORDER, ResolvedRecipients, Resolver, Rule, Specifier, resolve};
pub use sanitize::{Sanitized, sanitize_email, sanitize_emails, sanitize_phone_number, sanitize_phone_numbers};
pub use service::{
    Communicator, DispatchReport, Dispatcher, Endpoint, Envelope, MailTransport, SendOptions,
    SmtpTransport, open_session, phone_home,
};
pub use template::MessageTemplate;
