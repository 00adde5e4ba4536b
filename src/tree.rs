//! Per-artifact dependency edges.

use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, BTreeSet};

/// One declared dependency of a source artifact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub target: Utf8PathBuf,
    /// Reference text exactly as the source binary encodes it
    pub reference: String,
}

/// Source artifact → its direct edges, keyed by canonical path.
///
/// Only ever grows. Edges to skipped targets are kept alongside bundled ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyTree {
    edges: BTreeMap<Utf8PathBuf, BTreeSet<Edge>>,
}

impl DependencyTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure `source` has an entry, even if it turns out to have no edges.
    pub fn add_source(&mut self, source: &Utf8Path) {
        self.edges.entry(source.to_owned()).or_default();
    }

    /// Returns `false` if the edge was already recorded.
    pub fn insert(&mut self, source: &Utf8Path, edge: Edge) -> bool {
        self.edges.entry(source.to_owned()).or_default().insert(edge)
    }

    /// Fold `other` in; existing edges of a source are kept, new ones added.
    pub fn merge(&mut self, other: DependencyTree) {
        for (source, edges) in other.edges {
            self.edges.entry(source).or_default().extend(edges);
        }
    }

    pub fn contains_source(&self, source: &Utf8Path) -> bool {
        self.edges.contains_key(source)
    }

    pub fn edges(&self, source: &Utf8Path) -> impl Iterator<Item = &Edge> {
        self.edges.get(source).into_iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(target: &str, reference: &str) -> Edge {
        Edge {
            target: Utf8PathBuf::from(target),
            reference: reference.to_string(),
        }
    }

    #[test]
    fn merge_is_additive() {
        let foo = Utf8Path::new("/src/libfoo.dylib");

        let mut master = DependencyTree::new();
        master.insert(foo, edge("/opt/lib/libbar.dylib", "/opt/lib/libbar.dylib"));

        let mut local = DependencyTree::new();
        local.insert(foo, edge("/opt/lib/libbaz.dylib", "/opt/lib/libbaz.dylib"));
        local.add_source(Utf8Path::new("/opt/lib/libbaz.dylib"));

        master.merge(local);

        let targets: Vec<_> = master.edges(foo).map(|e| e.target.as_str()).collect();
        assert_eq!(targets, vec!["/opt/lib/libbar.dylib", "/opt/lib/libbaz.dylib"]);
        assert!(master.contains_source(Utf8Path::new("/opt/lib/libbaz.dylib")));
        assert_eq!(master.len(), 2);
    }

    #[test]
    fn same_target_keeps_each_reference() {
        let foo = Utf8Path::new("/src/libfoo.dylib");
        let mut tree = DependencyTree::new();
        assert!(tree.insert(foo, edge("/opt/lib/libbar.1.dylib", "/opt/lib/libbar.dylib")));
        assert!(tree.insert(foo, edge("/opt/lib/libbar.1.dylib", "/opt/lib/libbar.1.dylib")));
        assert!(!tree.insert(foo, edge("/opt/lib/libbar.1.dylib", "/opt/lib/libbar.dylib")));
        assert_eq!(tree.edges(foo).count(), 2);
    }

    #[test]
    fn unknown_source_has_no_edges() {
        let tree = DependencyTree::new();
        assert!(tree.is_empty());
        assert_eq!(tree.edges(Utf8Path::new("/nowhere")).count(), 0);
    }
}
