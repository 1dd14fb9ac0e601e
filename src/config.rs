use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::SetupConfig;

pub const CONFIG_FILE: &str = "winsetup.json";

/// Per-user config directory (%APPDATA%\winsetup on Windows).
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("could not determine the user configuration directory")?;
    Ok(base.join("winsetup"))
}

/// Resolution order: explicit --config path, ./winsetup.json in the
/// working directory, then the per-user config directory.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE);
    if local.exists() {
        return Ok(local);
    }
    Ok(config_dir()?.join(CONFIG_FILE))
}

/// Load and parse the config file at `path`.
pub fn load(path: &Path) -> Result<SetupConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("could not read config file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = locate(Some(Path::new("C:\\custom\\setup.json"))).expect("locate");
        assert_eq!(path, PathBuf::from("C:\\custom\\setup.json"));
    }

    #[test]
    fn load_round_trips_a_config() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "apps": [ { "name": "7zip" } ] }"#).expect("write config");

        let config = load(&path).expect("load config");
        assert_eq!(config.apps.len(), 1);
    }

    #[test]
    fn malformed_json_is_a_readable_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "{ not json").expect("write config");

        let err = load(&path).expect_err("parse fails");
        assert!(format!("{err:#}").contains("invalid JSON"));
    }
}
