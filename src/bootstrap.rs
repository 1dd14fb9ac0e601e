//! Provider availability: check winget, install choco/scoop on demand.

use log::{info, warn};
use std::cell::RefCell;
use std::collections::HashSet;

use provision::{Bootstrap, CommandRunner, Provider};

/// Official Chocolatey install one-liner.
const CHOCO_INSTALL: &str = "Set-ExecutionPolicy Bypass -Scope Process -Force; \
    [System.Net.ServicePointManager]::SecurityProtocol = [System.Net.ServicePointManager]::SecurityProtocol -bor 3072; \
    iex ((New-Object System.Net.WebClient).DownloadString('https://community.chocolatey.org/install.ps1'))";

/// Official Scoop install one-liner.
const SCOOP_INSTALL: &str =
    "Set-ExecutionPolicy RemoteSigned -Scope CurrentUser -Force; irm get.scoop.sh | iex";

/// Ensures provider tooling once per run; repeat calls are cached.
pub struct ProviderBootstrap<'a> {
    runner: &'a dyn CommandRunner,
    ensured: RefCell<HashSet<&'static str>>,
}

impl<'a> ProviderBootstrap<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self {
            runner,
            ensured: RefCell::new(HashSet::new()),
        }
    }

    fn ensure_tool(&self, tool: &'static str, install_script: Option<&str>) -> bool {
        if self.ensured.borrow().contains(tool) {
            return true;
        }
        if self.runner.command_exists(tool) {
            self.ensured.borrow_mut().insert(tool);
            return true;
        }

        // winget ships with Windows; there is nothing we can run to
        // install it.
        let Some(script) = install_script else {
            warn!("{tool} is not available on this system");
            return false;
        };

        info!("{tool} is not installed; running its installer");
        let installed = match self.runner.run(
            "powershell",
            &["-NoProfile", "-ExecutionPolicy", "Bypass", "-Command", script],
        ) {
            Ok(out) if out.success => self.runner.command_exists(tool),
            Ok(out) => {
                warn!("{tool} installer failed: {}", out.stderr.trim());
                false
            }
            Err(err) => {
                warn!("{tool} installer could not run: {err:#}");
                false
            }
        };

        if installed {
            self.ensured.borrow_mut().insert(tool);
        }
        installed
    }
}

impl Bootstrap for ProviderBootstrap<'_> {
    fn ensure(&self, provider: Provider) -> bool {
        match provider.tool() {
            None => true,
            Some("choco") => self.ensure_tool("choco", Some(CHOCO_INSTALL)),
            Some("scoop") => self.ensure_tool("scoop", Some(SCOOP_INSTALL)),
            Some(tool) => self.ensure_tool(tool, None),
        }
    }
}
