//! Bundling API.
//!
//! Ties discovery, copying and relinking together for one invocation.

use crate::config::{BundleConfig, Layout};
use crate::copy::copy_artifacts;
use crate::discovery::{Artifact, Discovery, Session};
use crate::inspect::{resolve, DependencySource, Inspector};
use crate::interrupt::Interrupt;
use crate::patch::Patcher;
use crate::prompt::Prompter;
use crate::relink::{RewriteFailure, Relinker};
use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use std::fmt;
use tracing::{debug, info, warn};

/// Runs one bundling session over every root found under the input path.
pub struct Bundler<S, P> {
    config: BundleConfig,
    inspector: Inspector<S>,
    patcher: P,
    interrupt: Interrupt,
}

impl<S: DependencySource, P: Patcher> Bundler<S, P> {
    pub fn new(config: BundleConfig, source: S, patcher: P) -> Self {
        let inspector = Inspector::from_config(source, &config);
        Self {
            config,
            inspector,
            patcher,
            interrupt: Interrupt::new(),
        }
    }

    /// Abandon the current root whenever `interrupt` is raised during discovery.
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn config(&self) -> &BundleConfig {
        &self.config
    }

    /// Discover interactively, then copy and relink everything decided.
    pub fn run<Q: Prompter + ?Sized>(&self, prompter: &mut Q) -> Result<BundleReport, Error> {
        let roots = collect_roots(&self.config.input)?;
        let session = self.discover_all(&roots, prompter)?;

        info!(
            "Discovery complete, {} unique dependencies will be bundled",
            session.bundled().len()
        );

        if session.is_empty() {
            return Err(Error::NothingToBundle);
        }

        let layout = self.config.layout();
        if self.config.dry_run {
            info!("Dry run, leaving {} untouched", layout.root);
            return Ok(BundleReport::new(layout, &session, Vec::new(), true));
        }

        let bundled = session.bundled_artifacts();
        let copies = copy_artifacts(&layout, session.roots(), &bundled)?;

        let relinker = Relinker::new(&self.patcher, session.tree(), session.bundled());
        relinker.set_identities(&copies)?;
        let failures = relinker.rewrite_references(&copies);
        relinker.add_search_paths(&layout, &copies)?;
        if self.config.resign {
            relinker.resign(&copies);
        }

        Ok(BundleReport::new(layout, &session, failures, false))
    }

    /// One discovery run per root; interrupted roots are dropped whole.
    pub fn discover_all<Q: Prompter + ?Sized>(
        &self,
        roots: &[Artifact],
        prompter: &mut Q,
    ) -> Result<Session, Error> {
        let _armed = self.interrupt.arm();
        let mut session = Session::with_interrupt(self.interrupt.clone());

        for root in roots {
            info!("Processing initial file: {}", root.name);
            match session.discover(root, &self.inspector, prompter)? {
                Discovery::Completed(local) => {
                    session.commit(root.clone(), local);
                    info!("Finished processing {}", root.name);
                }
                Discovery::Interrupted => {
                    warn!("Interrupted processing for {}, skipping this file", root.name);
                    self.interrupt.take();
                    prompter.reset();
                    session.interrupt(root.clone());
                }
            }
        }

        Ok(session)
    }
}

/// Root artifacts named by `input`: the file itself, or every `*.dylib`
/// directly inside a directory, in name order.
pub fn collect_roots(input: &Utf8Path) -> Result<Vec<Artifact>, Error> {
    if !input.exists() {
        return Err(Error::InputNotFound(input.to_owned()));
    }

    let candidates: Vec<Utf8PathBuf> = if input.is_dir() {
        let pattern = format!("{}/*.dylib", glob::Pattern::escape(input.as_str()));
        let mut found = Vec::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => match Utf8PathBuf::try_from(path) {
                    Ok(path) => found.push(path),
                    Err(e) => warn!("Skipping {}: {}", e.as_path().display(), e),
                },
                Err(e) => warn!("Failed to read {}: {}", e.path().display(), e),
            }
        }
        found.sort();
        found
    } else {
        vec![input.to_owned()]
    };

    let mut seen = BTreeSet::new();
    let mut roots = Vec::new();
    for candidate in candidates {
        let name = candidate.file_name().unwrap_or(candidate.as_str()).to_string();
        let resolved = resolve(candidate.as_str());
        if !seen.insert(resolved.clone()) {
            debug!("{} resolves to an input already listed", candidate);
            continue;
        }
        roots.push(Artifact::with_name(resolved, name));
    }

    Ok(roots)
}

/// Outcome of a bundling run, printed for the operator at the end.
#[derive(Debug, Clone)]
pub struct BundleReport {
    pub layout: Layout,
    pub dry_run: bool,
    pub roots: Vec<String>,
    pub bundled: Vec<String>,
    /// Roots abandoned by interruption
    pub skipped_roots: Vec<String>,
    /// Original references of dependencies answered "no"; the bundle still
    /// expects the host to provide them
    pub skipped_dependencies: Vec<String>,
    pub failed_rewrites: Vec<RewriteFailure>,
}

impl BundleReport {
    fn new(
        layout: Layout,
        session: &Session,
        failed_rewrites: Vec<RewriteFailure>,
        dry_run: bool,
    ) -> Self {
        let mut skipped_roots: Vec<String> =
            session.interrupted().iter().map(|a| a.name.clone()).collect();
        skipped_roots.sort();
        let mut skipped_dependencies: Vec<String> = session.skipped().values().cloned().collect();
        skipped_dependencies.sort();

        Self {
            layout,
            dry_run,
            roots: session.roots().iter().map(|a| a.name.clone()).collect(),
            bundled: session
                .bundled_artifacts()
                .into_iter()
                .map(|a| a.name)
                .collect(),
            skipped_roots,
            skipped_dependencies,
            failed_rewrites,
        }
    }
}

impl fmt::Display for BundleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            writeln!(f, "--- Dry Run Complete ---")?;
            writeln!(
                f,
                "{} libraries would be placed in: {}",
                self.roots.len(),
                self.layout.primary
            )?;
            writeln!(
                f,
                "{} dependencies would be placed in: {}",
                self.bundled.len(),
                self.layout.support
            )?;
        } else {
            writeln!(f, "--- Bundling Complete! ---")?;
            writeln!(f, "Processed libraries are in: {}", self.layout.primary)?;
            writeln!(f, "Bundled dependencies are in: {}", self.layout.support)?;
        }

        if !self.skipped_roots.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- The following initial files were skipped by user interruption ---")?;
            for name in &self.skipped_roots {
                writeln!(f, "  - {}", name)?;
            }
        }

        if !self.skipped_dependencies.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- The following dependencies were manually skipped (answered 'n') ---")?;
            writeln!(
                f,
                "Your application will expect to find them on the user's system at runtime:"
            )?;
            for reference in &self.skipped_dependencies {
                writeln!(f, "  - {}", reference)?;
            }
        }

        if !self.failed_rewrites.is_empty() {
            writeln!(f)?;
            writeln!(f, "--- The following references could not be rewritten ---")?;
            for failure in &self.failed_rewrites {
                writeln!(f, "  - {}", failure)?;
            }
        }

        Ok(())
    }
}
