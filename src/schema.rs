use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use provision::fonts::FontRequest;
use provision::{DesiredState, Item, ItemExtras, LocationPolicy, Provider};

// ============================================================================
// Main Config Schema
// ============================================================================

/// The winsetup configuration: which phases run and what they manage.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct SetupConfig {
    /// Phase toggles
    #[serde(default)]
    pub phases: PhaseToggles,

    /// Applications to install (or remove)
    #[serde(default)]
    pub apps: Vec<AppEntry>,

    /// Preinstalled applications to remove
    #[serde(default)]
    pub debloat: Vec<DebloatEntry>,

    /// Fonts to install
    #[serde(default)]
    pub fonts: FontsConfig,
}

impl SetupConfig {
    /// Validate every entry. Reports the first problem per section
    /// with enough context to find the offending entry.
    pub fn validate(&self) -> Result<()> {
        for entry in &self.apps {
            entry
                .validate()
                .with_context(|| format!("invalid app entry '{}'", entry.name))?;
        }
        for entry in &self.debloat {
            entry
                .validate()
                .with_context(|| format!("invalid debloat entry '{}'", entry.name))?;
        }
        Ok(())
    }

    /// Convert app entries to items. Invalid entries abort only
    /// themselves: they are returned separately so the caller can
    /// record them as per-item errors.
    pub fn app_items(&self) -> (Vec<Item>, Vec<(String, String)>) {
        partition_items(self.apps.iter().map(|entry| (entry.name.clone(), entry.to_item())))
    }

    /// Convert debloat entries to items, same error contract as
    /// [`Self::app_items`].
    pub fn debloat_items(&self) -> (Vec<Item>, Vec<(String, String)>) {
        partition_items(
            self.debloat
                .iter()
                .map(|entry| (entry.name.clone(), entry.to_item())),
        )
    }
}

fn partition_items(
    entries: impl Iterator<Item = (String, Result<Item>)>,
) -> (Vec<Item>, Vec<(String, String)>) {
    let mut items = Vec::new();
    let mut errors = Vec::new();
    for (name, converted) in entries {
        match converted {
            Ok(item) => items.push(item),
            Err(err) => errors.push((name, format!("{err:#}"))),
        }
    }
    (items, errors)
}

// ============================================================================
// Phases
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct PhaseToggles {
    #[serde(default = "default_true")]
    pub debloat: bool,
    #[serde(default = "default_true")]
    pub fonts: bool,
    #[serde(default = "default_true")]
    pub apps: bool,
    #[serde(default)]
    pub cleanup: bool,
}

impl Default for PhaseToggles {
    fn default() -> Self {
        Self {
            debloat: true,
            fonts: true,
            apps: true,
            cleanup: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_provider() -> String {
    "winget".to_string()
}

// ============================================================================
// Apps
// ============================================================================

/// One application to manage.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppEntry {
    /// Display name, also the fallback package identifier
    pub name: String,

    /// Install this app (the default)
    #[serde(default = "default_true")]
    pub install: bool,

    /// Remove this app instead
    #[serde(default)]
    pub remove: bool,

    /// Provider: winget, choco, scoop, msstore, download, github
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Provider-specific package identifier
    #[serde(default)]
    pub package_id: Option<String>,

    /// Scoop bucket to register first
    #[serde(default)]
    pub bucket: Option<String>,

    /// Explicit install location (also the installed-state marker for
    /// download/github items)
    #[serde(default)]
    pub install_location: Option<String>,

    /// Never pass an install-location argument
    #[serde(default)]
    pub no_install_location: bool,

    /// Arguments for downloaded installers
    #[serde(default)]
    pub install_args: Option<String>,

    /// Direct download URL
    #[serde(default)]
    pub download_url: Option<String>,

    /// Pre-downloaded local installer path
    #[serde(default)]
    pub file: Option<String>,

    /// Installer path inside a downloaded archive
    #[serde(default)]
    pub archive_exe: Option<String>,

    /// GitHub owner/repo for release assets
    #[serde(default)]
    pub repo: Option<String>,

    /// Asset pattern: latest.exe, latest.msi, or a wildcard
    #[serde(default)]
    pub asset_pattern: Option<String>,
}

impl AppEntry {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("app name cannot be empty");
        }
        if self.install && self.remove {
            bail!("install and remove are mutually exclusive");
        }
        if self.install_location.is_some() && self.no_install_location {
            bail!("install_location and no_install_location are mutually exclusive");
        }

        let provider = Provider::parse(&self.provider)
            .ok_or_else(|| anyhow!("unrecognized provider '{}'", self.provider))?;
        match provider {
            Provider::Download => {
                if self.download_url.is_none() && self.file.is_none() {
                    bail!("download provider needs a download_url or file");
                }
            }
            Provider::GithubRelease => {
                if self.repo.is_none() {
                    bail!("github provider needs a repo");
                }
                if self.asset_pattern.is_none() {
                    bail!("github provider needs an asset_pattern");
                }
            }
            _ => {}
        }
        Ok(())
    }

    pub fn to_item(&self) -> Result<Item> {
        self.validate()?;
        let provider = Provider::parse(&self.provider)
            .ok_or_else(|| anyhow!("unrecognized provider '{}'", self.provider))?;

        let location = if self.no_install_location {
            LocationPolicy::Suppressed
        } else if let Some(path) = &self.install_location {
            LocationPolicy::Explicit(path.clone())
        } else {
            LocationPolicy::Auto
        };

        let mut item = Item::new(
            &self.name,
            provider,
            DesiredState::from_flags(self.install, self.remove),
        )
        .with_location(location)
        .with_extras(ItemExtras {
            bucket: self.bucket.clone(),
            install_args: self.install_args.clone(),
            download_url: self.download_url.clone(),
            local_file: self.file.clone(),
            archive_exe: self.archive_exe.clone(),
            repo: self.repo.clone(),
            asset_pattern: self.asset_pattern.clone(),
        });
        if let Some(id) = &self.package_id {
            item = item.with_identifier(id);
        }
        Ok(item)
    }
}

// ============================================================================
// Debloat
// ============================================================================

/// One preinstalled application to remove.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DebloatEntry {
    /// Display name, also the fallback package identifier
    pub name: String,

    /// Remove this app (the default; set to false to keep it listed
    /// but untouched)
    #[serde(default = "default_true")]
    pub remove: bool,

    /// Provider whose uninstall is tried before the AppX fallbacks
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Package identifier for listing and removal
    #[serde(default)]
    pub package_id: Option<String>,
}

impl DebloatEntry {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            bail!("debloat entry name cannot be empty");
        }
        Provider::parse(&self.provider)
            .ok_or_else(|| anyhow!("unrecognized provider '{}'", self.provider))?;
        Ok(())
    }

    pub fn to_item(&self) -> Result<Item> {
        self.validate()?;
        let provider = Provider::parse(&self.provider)
            .ok_or_else(|| anyhow!("unrecognized provider '{}'", self.provider))?;

        let mut item = Item::new(
            &self.name,
            provider,
            DesiredState::from_flags(false, self.remove),
        )
        .with_location(LocationPolicy::Suppressed);
        if let Some(id) = &self.package_id {
            item = item.with_identifier(id);
        }
        Ok(item)
    }
}

// ============================================================================
// Fonts
// ============================================================================

/// Fonts configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FontsConfig {
    /// Nerd Font family names, e.g. "FiraCode", "JetBrains Mono"
    #[serde(default)]
    pub nerd_fonts: Vec<String>,
}

impl FontsConfig {
    pub fn to_request(&self) -> FontRequest {
        FontRequest {
            fonts: self.nerd_fonts.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
