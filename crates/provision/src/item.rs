//! Item model: one manageable unit (application or packaged tool).

use std::fmt;

/// Desired end state for an item, derived from its config flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DesiredState {
    Install,
    Remove,
    /// Neither flag set - the item is listed but left alone this run.
    Ignore,
}

impl DesiredState {
    /// `install` wins when both flags are set; config validation
    /// rejects that combination before items are built, so the
    /// precedence only matters for hand-constructed items.
    pub fn from_flags(install: bool, remove: bool) -> Self {
        if install {
            Self::Install
        } else if remove {
            Self::Remove
        } else {
            Self::Ignore
        }
    }
}

/// Delivery mechanism backing an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Windows Package Manager (the default).
    Winget,
    /// Chocolatey.
    Choco,
    /// Scoop, with an optional bucket.
    Scoop,
    /// Microsoft Store via winget's msstore source.
    Store,
    /// Direct installer download (or a pre-downloaded local file).
    Download,
    /// Latest-release asset from a GitHub repository.
    GithubRelease,
}

impl Provider {
    /// CLI tool that must be present before items of this provider can
    /// be processed, if any.
    pub fn tool(self) -> Option<&'static str> {
        match self {
            Self::Winget | Self::Store => Some("winget"),
            Self::Choco => Some("choco"),
            Self::Scoop => Some("scoop"),
            Self::Download | Self::GithubRelease => None,
        }
    }

    /// Parse a config-file provider name.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "winget" => Some(Self::Winget),
            "choco" | "chocolatey" => Some(Self::Choco),
            "scoop" => Some(Self::Scoop),
            "store" | "msstore" => Some(Self::Store),
            "download" | "url" => Some(Self::Download),
            "github" | "github-release" => Some(Self::GithubRelease),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Winget => "winget",
            Self::Choco => "choco",
            Self::Scoop => "scoop",
            Self::Store => "msstore",
            Self::Download => "download",
            Self::GithubRelease => "github",
        };
        write!(f, "{name}")
    }
}

/// Whether an install-location argument is passed to winget.
///
/// For [`Provider::Download`] and [`Provider::GithubRelease`] items an
/// `Explicit` path doubles as the installed-state hint checked by the
/// probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationPolicy {
    /// Look the default location up, falling back to a generic root.
    Auto,
    /// Use the configured path verbatim (after env expansion).
    Explicit(String),
    /// Omit the location argument entirely.
    Suppressed,
}

/// Provider-specific extras carried by an item.
#[derive(Debug, Clone, Default)]
pub struct ItemExtras {
    /// Scoop bucket to register before installing.
    pub bucket: Option<String>,
    /// Arguments passed to downloaded installers (defaults to `/S`).
    pub install_args: Option<String>,
    /// Direct download URL.
    pub download_url: Option<String>,
    /// Pre-downloaded local installer path.
    pub local_file: Option<String>,
    /// Path of the installer inside an extracted archive.
    pub archive_exe: Option<String>,
    /// GitHub `owner/repo` for release assets.
    pub repo: Option<String>,
    /// Asset name pattern: `latest.exe`, `latest.msi`, or a wildcard.
    pub asset_pattern: Option<String>,
}

/// A single manageable unit, built once per run from the config and
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct Item {
    /// Unique name within its list.
    pub key: String,
    pub state: DesiredState,
    pub provider: Provider,
    /// Provider-specific lookup key; `key` is used when absent.
    pub identifier: Option<String>,
    pub location: LocationPolicy,
    pub extras: ItemExtras,
}

impl Item {
    pub fn new(key: &str, provider: Provider, state: DesiredState) -> Self {
        Self {
            key: key.to_string(),
            state,
            provider,
            identifier: None,
            location: LocationPolicy::Auto,
            extras: ItemExtras::default(),
        }
    }

    pub fn with_identifier(mut self, identifier: &str) -> Self {
        self.identifier = Some(identifier.to_string());
        self
    }

    pub fn with_location(mut self, location: LocationPolicy) -> Self {
        self.location = location;
        self
    }

    pub fn with_extras(mut self, extras: ItemExtras) -> Self {
        self.extras = extras;
        self
    }

    /// Provider-specific lookup key, falling back to the item key.
    pub fn identifier(&self) -> &str {
        self.identifier.as_deref().unwrap_or(&self.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn desired_state_from_flags() {
        assert_eq!(DesiredState::from_flags(true, false), DesiredState::Install);
        assert_eq!(DesiredState::from_flags(false, true), DesiredState::Remove);
        assert_eq!(DesiredState::from_flags(false, false), DesiredState::Ignore);
        // install wins on conflicting flags
        assert_eq!(DesiredState::from_flags(true, true), DesiredState::Install);
    }

    #[test]
    fn provider_parse_aliases() {
        assert_eq!(Provider::parse("winget"), Some(Provider::Winget));
        assert_eq!(Provider::parse("Chocolatey"), Some(Provider::Choco));
        assert_eq!(Provider::parse("msstore"), Some(Provider::Store));
        assert_eq!(Provider::parse("url"), Some(Provider::Download));
        assert_eq!(Provider::parse("github-release"), Some(Provider::GithubRelease));
        assert_eq!(Provider::parse("apt"), None);
    }

    #[test]
    fn identifier_falls_back_to_key() {
        let item = Item::new("VSCode", Provider::Winget, DesiredState::Install);
        assert_eq!(item.identifier(), "VSCode");

        let item = item.with_identifier("Microsoft.VisualStudioCode");
        assert_eq!(item.identifier(), "Microsoft.VisualStudioCode");
    }
}
