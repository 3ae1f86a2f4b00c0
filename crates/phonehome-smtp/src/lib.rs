//! # phonehome-smtp
//!
//! A small async SMTP client (RFC 5321) covering what a notifier needs:
//! plain, implicit-TLS and STARTTLS connections, AUTH PLAIN/LOGIN, and
//! repeated mail transactions over one session.
//!
//! ## Quick Start
//!
//! ```ignore
//! use phonehome_smtp::{Address, Security, SmtpSession};
//!
//! #[tokio::main]
//! async fn main() -> phonehome_smtp::Result<()> {
//!     let mut session = SmtpSession::connect("smtp.example.com", 587, Security::StartTls)
//!         .await?
//!         .ehlo("client.example.com")
//!         .await?
//!         .starttls("client.example.com")
//!         .await?
//!         .login("user@example.com", "password")
//!         .await?;
//!
//!     let from = Address::new("user@example.com")?;
//!     let to = vec![Address::new("7345555555@txt.att.net")?];
//!     session
//!         .send_mail(&from, &to, b"Subject: Test\r\n\r\nHello!\r\n")
//!         .await?;
//!
//!     session.quit().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`command`]: SMTP command builders
//! - [`reply`]: Reply types and parser
//! - [`extension`]: EHLO capabilities

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod address;
pub mod command;
mod error;
pub mod extension;
pub mod reply;
mod session;
mod stream;

pub use address::Address;
pub use error::{Error, Result};
pub use extension::{AuthMechanism, ServerInfo};
pub use reply::{Reply, ReplyCode};
pub use session::{SendOutcome, SmtpSession};
pub use stream::{Security, SmtpStream};
