//! Interactive dependency discovery.
//!
//! One discovery run per root artifact walks its declared dependencies
//! breadth-first, asking the operator about every target not decided before.
//! A run only touches its own local state; the [`Session`] absorbs that state
//! once the run completes, so an interrupted run leaves no trace.

use crate::inspect::{DependencySource, Inspector};
use crate::interrupt::Interrupt;
use crate::prompt::{Decision, Prompted, Prompter};
use crate::tree::{DependencyTree, Edge};
use crate::Error;
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tracing::{debug, info};

/// A library under consideration, identified by its canonical path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Artifact {
    pub path: Utf8PathBuf,
    /// File name the copy will carry
    pub name: String,
}

impl Artifact {
    pub fn new(path: Utf8PathBuf) -> Self {
        let name = path.file_name().unwrap_or(path.as_str()).to_string();
        Self { path, name }
    }

    pub fn with_name(path: Utf8PathBuf, name: impl Into<String>) -> Self {
        Self {
            path,
            name: name.into(),
        }
    }
}

/// Everything one completed run found: decisions keyed by canonical path,
/// with the reference text that first surfaced each target.
#[derive(Debug, Clone, Default)]
pub struct LocalDiscovery {
    pub bundle: BTreeMap<Utf8PathBuf, String>,
    pub skip: BTreeMap<Utf8PathBuf, String>,
    pub tree: DependencyTree,
}

#[derive(Debug)]
pub enum Discovery {
    Completed(LocalDiscovery),
    Interrupted,
}

/// State shared by every discovery run of one invocation.
#[derive(Debug, Default)]
pub struct Session {
    processed: BTreeSet<Utf8PathBuf>,
    bundled: BTreeMap<Utf8PathBuf, String>,
    skipped: BTreeMap<Utf8PathBuf, String>,
    tree: DependencyTree,
    roots: Vec<Artifact>,
    interrupted: Vec<Artifact>,
    interrupt: Interrupt,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session whose runs give up once `interrupt` is raised.
    pub fn with_interrupt(interrupt: Interrupt) -> Self {
        Self {
            interrupt,
            ..Self::default()
        }
    }

    /// Walk the dependency closure of `root`.
    ///
    /// Targets already decided in this session are recorded as edges but
    /// never asked about again. Returns [`Discovery::Interrupted`] as soon as
    /// the operator abandons the root, either at a prompt or through the
    /// session's [`Interrupt`] while an artifact is inspected or a prompt
    /// is pending.
    pub fn discover<S, P>(
        &self,
        root: &Artifact,
        inspector: &Inspector<S>,
        prompter: &mut P,
    ) -> Result<Discovery, Error>
    where
        S: DependencySource,
        P: Prompter + ?Sized,
    {
        let mut local = LocalDiscovery::default();
        let mut seen: BTreeSet<Utf8PathBuf> = BTreeSet::from([root.path.clone()]);
        let mut queue = VecDeque::from([root.path.clone()]);

        while let Some(current) = queue.pop_front() {
            if self.interrupt.is_raised() {
                return Ok(Discovery::Interrupted);
            }

            debug!("Inspecting {}", current);
            let dependencies = inspector.inspect(&current);
            if self.interrupt.is_raised() {
                return Ok(Discovery::Interrupted);
            }
            local.tree.add_source(&current);

            for dep in dependencies {
                local.tree.insert(
                    &current,
                    Edge {
                        target: dep.path.clone(),
                        reference: dep.reference.clone(),
                    },
                );

                if self.processed.contains(&dep.path) || !seen.insert(dep.path.clone()) {
                    continue;
                }

                let answer = prompter.decide(&dep.reference)?;
                if self.interrupt.is_raised() {
                    return Ok(Discovery::Interrupted);
                }
                match answer {
                    Prompted::Interrupted => return Ok(Discovery::Interrupted),
                    Prompted::Decided(Decision::Bundle) => {
                        info!("Queued for bundling: {}", dep.file_name());
                        queue.push_back(dep.path.clone());
                        local.bundle.insert(dep.path, dep.reference);
                    }
                    Prompted::Decided(Decision::Skip) => {
                        info!("Skipping: {}", dep.file_name());
                        local.skip.insert(dep.path, dep.reference);
                    }
                }
            }
        }

        Ok(Discovery::Completed(local))
    }

    /// Fold a completed run into the session.
    pub fn commit(&mut self, root: Artifact, local: LocalDiscovery) {
        self.processed.extend(local.bundle.keys().cloned());
        self.processed.extend(local.skip.keys().cloned());
        self.bundled.extend(local.bundle);
        self.skipped.extend(local.skip);
        self.tree.merge(local.tree);
        self.roots.push(root);
    }

    /// Record a root whose run was abandoned; nothing it found is kept.
    pub fn interrupt(&mut self, root: Artifact) {
        self.interrupted.push(root);
    }

    pub fn roots(&self) -> &[Artifact] {
        &self.roots
    }

    pub fn interrupted(&self) -> &[Artifact] {
        &self.interrupted
    }

    pub fn bundled(&self) -> &BTreeMap<Utf8PathBuf, String> {
        &self.bundled
    }

    pub fn skipped(&self) -> &BTreeMap<Utf8PathBuf, String> {
        &self.skipped
    }

    pub fn tree(&self) -> &DependencyTree {
        &self.tree
    }

    /// Bundled dependencies as artifacts, named after their canonical file.
    pub fn bundled_artifacts(&self) -> Vec<Artifact> {
        self.bundled
            .keys()
            .map(|path| Artifact::new(path.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty() && self.bundled.is_empty()
    }
}
