//! Default-install-location lookup from an optional sidecar file.
//!
//! A `locations.json` file next to the config maps package ids to
//! their preferred install directories. Missing file or id means no
//! opinion, and the engine falls back to its generic default root.

use log::debug;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use provision::ManifestSource;

pub struct FileManifest {
    locations: HashMap<String, String>,
}

impl FileManifest {
    /// Load the sidecar next to `config_path`, tolerating its absence.
    pub fn load(config_path: &Path) -> Self {
        let locations = config_path
            .parent()
            .map(|dir| dir.join("locations.json"))
            .and_then(|path| read_locations(&path))
            .unwrap_or_default();
        Self { locations }
    }

    #[cfg(test)]
    fn from_map(locations: HashMap<String, String>) -> Self {
        Self { locations }
    }
}

fn read_locations(path: &Path) -> Option<HashMap<String, String>> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(map) => Some(map),
        Err(err) => {
            debug!("ignoring malformed {}: {err}", path.display());
            None
        }
    }
}

impl ManifestSource for FileManifest {
    fn default_install_location(&self, identifier: &str) -> Option<PathBuf> {
        self.locations
            .get(identifier)
            .map(|path| provision::paths::expand(path))
    }
}
