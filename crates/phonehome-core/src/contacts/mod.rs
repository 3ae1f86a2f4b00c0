//! The contact directory: users with contact methods, and named groups of
//! users.

mod model;
mod repository;

pub use model::{ContactDirectory, ContactMethods};
pub use repository::{load_directory, parse_directory};
