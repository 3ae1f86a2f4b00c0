//! Loading the contact directory from JSON.

use std::path::Path;

use tracing::{debug, warn};

use super::model::ContactDirectory;
use crate::error::Result;

/// Parses a contact directory from JSON text.
///
/// # Errors
///
/// Returns an error if the text is not a valid directory document.
pub fn parse_directory(json: &str) -> Result<ContactDirectory> {
    let directory: ContactDirectory = serde_json::from_str(json)?;
    if directory.is_empty() {
        warn!("Contact directory has no users or groups");
    }
    Ok(directory)
}

/// Reads a contact directory file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_directory(path: &Path) -> Result<ContactDirectory> {
    let json = std::fs::read_to_string(path)?;
    let directory = parse_directory(&json)?;
    debug!(
        path = %path.display(),
        users = directory.users.len(),
        groups = directory.groups.len(),
        "loaded contact directory"
    );
    Ok(directory)
}
