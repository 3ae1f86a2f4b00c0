//! On-disk assets: contact directory, carrier stubs, message template and
//! optional logo.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::contacts::{ContactDirectory, load_directory};
use crate::error::{Error, Result};
use crate::template::MessageTemplate;

/// Contact directory file name.
pub const CONTACTS_FILE: &str = "contact_list.json";
/// Carrier stubs file name.
pub const STUBS_FILE: &str = "sms_email_stubs.json";
/// Message template file name.
pub const TEMPLATE_FILE: &str = "email_template.txt";
/// Optional logo file name.
pub const LOGO_FILE: &str = "logo.png";

/// Carrier name to SMS gateway domain suffix (for example `"@txt.att.net"`).
///
/// Iteration follows carrier-name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CarrierStubs(BTreeMap<String, String>);

impl CarrierStubs {
    /// Creates stubs from `(carrier, suffix)` pairs.
    pub fn new<I, K, V>(stubs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            stubs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Reads stubs from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let stubs: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if stubs.is_empty() {
            warn!(path = %path.display(), "No SMS carrier stubs configured");
        }
        Ok(stubs)
    }

    /// Returns the number of carriers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no carriers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns one gateway address per carrier for a mobile number.
    #[must_use]
    pub fn gateway_addresses(&self, mobile: &str) -> Vec<String> {
        self.0
            .values()
            .map(|suffix| format!("{mobile}{suffix}"))
            .collect()
    }
}

/// Everything the notifier loads from its assets directory.
#[derive(Debug, Clone)]
pub struct Assets {
    /// Users and groups.
    pub directory: ContactDirectory,
    /// SMS gateway suffixes.
    pub stubs: CarrierStubs,
    /// Body template.
    pub template: MessageTemplate,
    /// PNG logo shown in the HTML alternative, if present.
    pub logo: Option<Vec<u8>>,
}

impl Assets {
    /// Loads assets from a directory using the fixed file names.
    ///
    /// # Errors
    ///
    /// Returns an error if a required file is missing or invalid.
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let directory = load_directory(&dir.join(CONTACTS_FILE))?;
        let stubs = CarrierStubs::load(&dir.join(STUBS_FILE))?;
        let template = MessageTemplate::load(&dir.join(TEMPLATE_FILE))?;

        let logo_path = dir.join(LOGO_FILE);
        let logo = if logo_path.is_file() {
            Some(std::fs::read(&logo_path)?)
        } else {
            debug!(path = %logo_path.display(), "no logo, sending without one");
            None
        };

        Ok(Self {
            directory,
            stubs,
            template,
            logo,
        })
    }

    /// Default assets directory: `$PHONEHOME_ASSETS`, else
    /// `<config dir>/phonehome`.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration directory can be determined.
    pub fn default_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os("PHONEHOME_ASSETS") {
            return Ok(PathBuf::from(dir));
        }
        dirs::config_dir()
            .map(|dir| dir.join("phonehome"))
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))
    }
}
