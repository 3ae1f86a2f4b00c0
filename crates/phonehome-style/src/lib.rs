//! # phonehome-style
//!
//! 24-bit colour console printing.
//!
//! ```
//! use phonehome_style::{Printer, Style};
//!
//! let mut printer = Printer::new(Vec::new(), true);
//! printer.print("disk full", &Style::new().fg("warning")).unwrap();
//! assert_eq!(printer.into_inner(), b"\x1b[38;2;255;255;0;1mdisk full\x1b[0m\n");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod error;
pub mod palette;
mod printer;
mod style;

pub use error::{Result, StyleError};
pub use palette::Rgb;
pub use printer::{DEMO_TEXT, Printer, fancy_print, should_colorize};
pub use style::{OPTION_KEYS, Style};
