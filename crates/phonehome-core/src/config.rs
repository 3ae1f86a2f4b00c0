//! Transport configuration: the SMTP endpoints to try, the fixed CC list,
//! and presentation options.

use std::path::{Path, PathBuf};

use phonehome_smtp::{Address, Security};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "PHONEHOME_CONFIG";
/// Environment variable overriding the external server password.
pub const PASSWORD_ENV: &str = "PHONEHOME_SMTP_PASSWORD";

/// One SMTP server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpEndpoint {
    /// Server hostname.
    pub host: String,
    /// Server port; defaults from the security mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Security mode.
    #[serde(default)]
    pub security: Security,
    /// Username for authentication; no AUTH when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Password for authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Envelope and header sender address.
    pub sender: String,
}

impl SmtpEndpoint {
    /// Get default port for the security mode.
    #[must_use]
    pub const fn default_port(security: Security) -> u16 {
        security.default_port()
    }

    /// The configured port, or the default for the security mode.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or_else(|| Self::default_port(self.security))
    }

    /// Returns the username/password pair when both are set.
    #[must_use]
    pub fn credentials(&self) -> Option<(&str, &str)> {
        self.username.as_deref().zip(self.password.as_deref())
    }

    fn validate(&self, which: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Config(format!("{which} SMTP host is required")));
        }
        if self.port == Some(0) {
            return Err(Error::Config(format!("{which} SMTP port must be 1-65535")));
        }
        Address::new(&self.sender)
            .map_err(|e| Error::Config(format!("{which} sender address: {e}")))?;
        if self.username.is_some() && self.password.is_none() {
            return Err(Error::Config(format!(
                "{which} SMTP username is set but no password (set it in the file or ${PASSWORD_ENV})"
            )));
        }
        Ok(())
    }
}

/// How messages leave the machine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Authenticated server tried first.
    pub external: SmtpEndpoint,
    /// Unauthenticated relay tried when the external server fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<SmtpEndpoint>,
    /// Addresses copied on every outgoing message.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    /// Name announced in EHLO; `localhost` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_hostname: Option<String>,
    /// URL the logo links to in the HTML alternative.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_link: Option<String>,
}

impl TransportConfig {
    /// Reads a JSON config file and applies the password override.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let mut config: Self = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            debug!("using SMTP password from ${PASSWORD_ENV}");
            config.external.password = Some(password);
        }
        config.validate()?;
        Ok(config)
    }

    /// Default config path: `$PHONEHOME_CONFIG`, else
    /// `<config dir>/phonehome/config.json`.
    ///
    /// # Errors
    ///
    /// Returns an error if no configuration directory can be determined.
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }
        dirs::config_dir()
            .map(|dir| dir.join("phonehome").join("config.json"))
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))
    }

    /// Checks endpoints and CC addresses.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.external.validate("external")?;
        if let Some(internal) = &self.internal {
            internal.validate("internal")?;
        }
        for cc in &self.cc {
            Address::new(cc).map_err(|e| Error::Config(format!("cc address: {e}")))?;
        }
        Ok(())
    }

    /// Name announced in EHLO.
    #[must_use]
    pub fn client_hostname(&self) -> &str {
        self.client_hostname.as_deref().unwrap_or("localhost")
    }
}
