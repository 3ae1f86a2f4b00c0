//! Sample files for `phonehome init`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use phonehome_core::assets::{CONTACTS_FILE, STUBS_FILE, TEMPLATE_FILE};

const SAMPLE_CONTACTS: &str = include_str!("../assets/contact_list.json");
const SAMPLE_STUBS: &str = include_str!("../assets/sms_email_stubs.json");
const SAMPLE_TEMPLATE: &str = include_str!("../assets/email_template.txt");
const SAMPLE_CONFIG: &str = include_str!("../assets/config.json");

/// Writes the sample assets into `assets_dir` and the sample transport
/// config to `config_path`, skipping files that already exist.
///
/// Returns the paths written.
pub fn write_samples(assets_dir: &Path, config_path: &Path) -> Result<Vec<PathBuf>> {
    let files = [
        (assets_dir.join(CONTACTS_FILE), SAMPLE_CONTACTS),
        (assets_dir.join(STUBS_FILE), SAMPLE_STUBS),
        (assets_dir.join(TEMPLATE_FILE), SAMPLE_TEMPLATE),
        (config_path.to_path_buf(), SAMPLE_CONFIG),
    ];

    let mut written = Vec::new();
    for (path, contents) in files {
        if path.exists() {
            tracing::debug!(path = %path.display(), "exists, leaving it alone");
            continue;
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use phonehome_core::{Assets, Specifier, TransportConfig};

    #[test]
    fn test_samples_load() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("etc").join("config.json");

        let written = write_samples(dir.path(), &config_path).unwrap();
        assert_eq!(written.len(), 4);

        let assets = Assets::from_dir(dir.path()).unwrap();
        assert_eq!(assets.stubs.len(), 4);
        let physics = phonehome_core::resolve(&assets.directory, &Specifier::from("physics"));
        assert_eq!(physics.emails.len(), 2);
        assert_eq!(physics.mobiles.len(), 2);

        let config: TransportConfig = serde_json::from_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
        assert!(config.internal.is_some());
    }

    #[test]
    fn test_existing_files_are_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        fs::write(dir.path().join(TEMPLATE_FILE), "Mine: $BODY").unwrap();

        let written = write_samples(dir.path(), &config_path).unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(fs::read_to_string(dir.path().join(TEMPLATE_FILE)).unwrap(), "Mine: $BODY");

        assert!(write_samples(dir.path(), &config_path).unwrap().is_empty());
    }
}
