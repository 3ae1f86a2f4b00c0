//! # phonehome-mime
//!
//! MIME message generation for notifications.
//!
//! ## Features
//!
//! - **Message generation**: multipart/mixed messages with a plain-text and
//!   HTML alternative, inline images and attachments
//! - **Encoding**: Base64, Quoted-Printable, RFC 2047 header encoding
//! - **Content types**: parameters, quoting, and guessing from file names
//!
//! ## Quick Start
//!
//! ```ignore
//! use phonehome_mime::{Attachment, MessageBuilder};
//!
//! let message = MessageBuilder::new()
//!     .from("alerts@example.com")
//!     .to("oncall@example.com")
//!     .subject("DISK FULL")
//!     .text_body("Volume /data is at 99%")
//!     .html_body("<html><body>Volume /data is at 99%</body></html>")
//!     .attach(Attachment::from_path("df.txt".as_ref())?)
//!     .build()?;
//!
//! let bytes = message.to_bytes();
//! ```
//!
//! A built message can be re-addressed before each send with
//! [`Message::set_header`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod builder;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use builder::{Attachment, InlineImage, MessageBuilder, make_boundary, make_content_id};
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{Body, Message, Part, TransferEncoding};
