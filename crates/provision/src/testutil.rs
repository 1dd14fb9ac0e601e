//! Recording fakes for the collaborator traits.

use anyhow::{Result, anyhow};
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

use crate::context::{
    AssetInfo, Bootstrap, CmdOutput, CommandRunner, Context, Extractor, Fetcher, ManifestSource,
    NoProgress, ReleaseInfo, ReleaseSource,
};
use crate::item::Provider;

/// One recorded invocation: program plus arguments.
pub type Invocation = (String, Vec<String>);

enum Reply {
    Output(CmdOutput),
    SpawnError,
}

struct Rule {
    program: String,
    arg_needle: Option<String>,
    reply: Reply,
}

/// Command runner that replays scripted outputs and records every
/// invocation. Unmatched commands succeed with empty output, which
/// probes read as "not installed" and installs read as success.
#[derive(Default)]
pub struct MockRunner {
    rules: RefCell<Vec<Rule>>,
    pub calls: RefCell<Vec<Invocation>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `program` invocations whose args contain `needle`.
    pub fn on(&self, program: &str, needle: &str, output: CmdOutput) -> &Self {
        self.rules.borrow_mut().push(Rule {
            program: program.to_string(),
            arg_needle: Some(needle.to_string()),
            reply: Reply::Output(output),
        });
        self
    }

    /// Respond to every invocation of `program`.
    pub fn on_any(&self, program: &str, output: CmdOutput) -> &Self {
        self.rules.borrow_mut().push(Rule {
            program: program.to_string(),
            arg_needle: None,
            reply: Reply::Output(output),
        });
        self
    }

    /// Simulate an absent tool: spawning `program` fails outright.
    pub fn spawn_error(&self, program: &str) -> &Self {
        self.rules.borrow_mut().push(Rule {
            program: program.to_string(),
            arg_needle: None,
            reply: Reply::SpawnError,
        });
        self
    }

    pub fn calls_to(&self, program: &str) -> Vec<Invocation> {
        self.calls
            .borrow()
            .iter()
            .filter(|(p, _)| p == program)
            .cloned()
            .collect()
    }

    /// Recorded invocations of `program` whose args contain `needle`.
    pub fn calls_matching(&self, program: &str, needle: &str) -> Vec<Invocation> {
        self.calls_to(program)
            .into_iter()
            .filter(|(_, args)| args.iter().any(|a| a.contains(needle)))
            .collect()
    }
}

impl CommandRunner for MockRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CmdOutput> {
        self.calls.borrow_mut().push((
            program.to_string(),
            args.iter().map(ToString::to_string).collect(),
        ));
        for rule in self.rules.borrow().iter() {
            if rule.program != program {
                continue;
            }
            if let Some(needle) = &rule.arg_needle
                && !args.iter().any(|a| a.contains(needle.as_str()))
            {
                continue;
            }
            return match &rule.reply {
                Reply::Output(out) => Ok(out.clone()),
                Reply::SpawnError => Err(anyhow!("program not found: {program}")),
            };
        }
        Ok(CmdOutput::ok(""))
    }

    fn command_exists(&self, _program: &str) -> bool {
        true
    }
}

/// Fetcher that writes a fixed payload and records every download.
#[derive(Default)]
pub struct MockFetcher {
    pub payload: Vec<u8>,
    pub fail: Cell<bool>,
    pub downloads: RefCell<Vec<(String, PathBuf)>>,
}

impl Fetcher for MockFetcher {
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        self.downloads
            .borrow_mut()
            .push((url.to_string(), dest.to_path_buf()));
        if self.fail.get() {
            return Err(anyhow!("simulated download failure"));
        }
        std::fs::write(dest, &self.payload)?;
        Ok(())
    }
}

/// Extractor that materializes a scripted file list into the
/// destination and records where it extracted.
#[derive(Default)]
pub struct MockExtractor {
    /// Relative paths created inside the destination on extract.
    pub files: RefCell<Vec<String>>,
    pub dests: RefCell<Vec<PathBuf>>,
}

impl MockExtractor {
    pub fn with_files(&self, files: &[&str]) -> &Self {
        *self.files.borrow_mut() = files.iter().map(ToString::to_string).collect();
        self
    }
}

impl Extractor for MockExtractor {
    fn extract_zip(&self, _archive: &Path, dest: &Path) -> Result<()> {
        self.dests.borrow_mut().push(dest.to_path_buf());
        for rel in self.files.borrow().iter() {
            let path = dest.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, b"stub")?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MockManifest {
    pub location: RefCell<Option<PathBuf>>,
    pub queries: RefCell<Vec<String>>,
}

impl ManifestSource for MockManifest {
    fn default_install_location(&self, identifier: &str) -> Option<PathBuf> {
        self.queries.borrow_mut().push(identifier.to_string());
        self.location.borrow().clone()
    }
}

#[derive(Default)]
pub struct MockReleases {
    pub release: RefCell<Option<ReleaseInfo>>,
    pub queries: RefCell<Vec<String>>,
}

impl MockReleases {
    pub fn with_assets(&self, tag: &str, assets: Vec<AssetInfo>) -> &Self {
        *self.release.borrow_mut() = Some(ReleaseInfo {
            tag: tag.to_string(),
            assets,
        });
        self
    }
}

impl ReleaseSource for MockReleases {
    fn latest_release(&self, repo: &str) -> Result<ReleaseInfo> {
        self.queries.borrow_mut().push(repo.to_string());
        self.release
            .borrow()
            .clone()
            .ok_or_else(|| anyhow!("no release scripted for {repo}"))
    }
}

/// Bootstrap with a scripted set of unavailable providers.
#[derive(Default)]
pub struct MockBootstrap {
    pub unavailable: RefCell<Vec<Provider>>,
    pub ensured: RefCell<Vec<Provider>>,
}

impl Bootstrap for MockBootstrap {
    fn ensure(&self, provider: Provider) -> bool {
        self.ensured.borrow_mut().push(provider);
        !self.unavailable.borrow().contains(&provider)
    }
}

/// All fakes plus a scratch font directory, bundled for tests.
pub struct TestHost {
    pub runner: MockRunner,
    pub fetcher: MockFetcher,
    pub extractor: MockExtractor,
    pub manifest: MockManifest,
    pub releases: MockReleases,
    pub bootstrap: MockBootstrap,
    font_dir: tempfile::TempDir,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            runner: MockRunner::new(),
            fetcher: MockFetcher::default(),
            extractor: MockExtractor::default(),
            manifest: MockManifest::default(),
            releases: MockReleases::default(),
            bootstrap: MockBootstrap::default(),
            font_dir: tempfile::tempdir().expect("create scratch font dir"),
        }
    }

    pub fn font_dir_path(&self) -> &Path {
        self.font_dir.path()
    }

    pub fn ctx(&self) -> Context<'_> {
        Context {
            runner: &self.runner,
            fetcher: &self.fetcher,
            extractor: &self.extractor,
            manifest: &self.manifest,
            releases: &self.releases,
            bootstrap: &self.bootstrap,
            progress: &NoProgress,
            font_dir: self.font_dir.path().to_path_buf(),
        }
    }
}
