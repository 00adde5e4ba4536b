//! Rewriting load paths of the copied artifacts.
//!
//! Passes must run in order: identities, references, search paths, then
//! signatures. Each pass is idempotent.

use crate::config::{install_name, Layout, Location};
use crate::copy::CopiedArtifact;
use crate::patch::{PatchOutcome, Patcher};
use crate::tree::{DependencyTree, Edge};
use crate::Error;
use camino::Utf8PathBuf;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info, warn};

/// A reference that stayed as it was because the rewrite failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteFailure {
    pub artifact: String,
    pub reference: String,
    pub replacement: String,
    pub reason: String,
}

impl fmt::Display for RewriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: '{}' -> '{}' ({})",
            self.artifact, self.reference, self.replacement, self.reason
        )
    }
}

pub struct Relinker<'a, P> {
    patcher: &'a P,
    tree: &'a DependencyTree,
    bundled: &'a BTreeMap<Utf8PathBuf, String>,
}

impl<'a, P: Patcher> Relinker<'a, P> {
    pub fn new(
        patcher: &'a P,
        tree: &'a DependencyTree,
        bundled: &'a BTreeMap<Utf8PathBuf, String>,
    ) -> Self {
        Self {
            patcher,
            tree,
            bundled,
        }
    }

    /// Edges of `copy`'s original whose target was bundled.
    pub fn bundled_edges<'c>(
        &'c self,
        copy: &'c CopiedArtifact,
    ) -> impl Iterator<Item = &'c Edge> + 'c {
        let bundled = self.bundled;
        self.tree
            .edges(&copy.original)
            .filter(move |edge| bundled.contains_key(&edge.target))
    }

    /// Give every support copy an `@rpath/<name>` install name.
    pub fn set_identities(&self, copies: &[CopiedArtifact]) -> Result<(), Error> {
        for copy in copies.iter().filter(|c| c.location == Location::Support) {
            let id = install_name(copy.name());
            match self.patcher.set_id(&copy.copy, &id)? {
                PatchOutcome::Applied => info!("Set id of {} to {}", copy.name(), id),
                PatchOutcome::Unchanged => debug!("Id of {} already {}", copy.name(), id),
            }
        }
        Ok(())
    }

    /// Point every bundled edge at its `@rpath` form.
    ///
    /// Failures are collected rather than propagated; the reference is left
    /// as it was in the copy.
    pub fn rewrite_references(&self, copies: &[CopiedArtifact]) -> Vec<RewriteFailure> {
        let mut failures = Vec::new();

        for copy in copies {
            let mut edges = self.bundled_edges(copy).peekable();
            if edges.peek().is_none() {
                continue;
            }
            info!("Patching dependencies for: {}", copy.name());

            for edge in edges {
                let target_name = edge.target.file_name().unwrap_or(edge.target.as_str());
                let replacement = install_name(target_name);
                match self
                    .patcher
                    .change_reference(&copy.copy, &edge.reference, &replacement)
                {
                    Ok(_) => info!("  Changing '{}' -> '{}'", edge.reference, replacement),
                    Err(e) => {
                        warn!(
                            "Could not change '{}' in {}: {}",
                            edge.reference,
                            copy.name(),
                            e
                        );
                        failures.push(RewriteFailure {
                            artifact: copy.name().to_string(),
                            reference: edge.reference.clone(),
                            replacement,
                            reason: e.to_string(),
                        });
                    }
                }
            }
        }

        failures
    }

    /// Add one search directory to each copy that has a bundled dependency.
    ///
    /// Returns how many copies received one.
    pub fn add_search_paths(
        &self,
        layout: &Layout,
        copies: &[CopiedArtifact],
    ) -> Result<usize, Error> {
        let mut added = 0;
        for copy in copies {
            if self.bundled_edges(copy).next().is_none() {
                debug!("Skipping rpath for {} (no bundled dependencies)", copy.name());
                continue;
            }

            let rpath = layout.search_path(copy.location);
            match self.patcher.add_rpath(&copy.copy, &rpath)? {
                PatchOutcome::Applied => info!("Adding rpath '{}' to {}", rpath, copy.name()),
                PatchOutcome::Unchanged => debug!("{} already has rpath '{}'", copy.name(), rpath),
            }
            added += 1;
        }
        Ok(added)
    }

    /// Ad-hoc sign every copy; a failed signature is only a warning.
    pub fn resign(&self, copies: &[CopiedArtifact]) {
        for copy in copies {
            if let Err(e) = self.patcher.resign(&copy.copy) {
                warn!("Could not re-sign {}: {}", copy.name(), e);
            }
        }
    }
}
