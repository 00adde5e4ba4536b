//! Binary inspection.
//!
//! Turns the raw load-command listing of one artifact into the set of
//! dependencies traversal should consider: self-references, loader-relative
//! tokens and (unless overridden) system libraries are dropped, and every
//! remaining reference is resolved to a symlink-free path.

use crate::config::BundleConfig;
use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, warn};

pub use crate::internal::macho::MachOReader;
pub use crate::internal::otool::{parse_otool_output, Otool};

/// Anything that can list the libraries a binary declares it loads.
///
/// Returns the reference strings exactly as encoded in the binary, in
/// load-command order.
pub trait DependencySource {
    fn load_commands(&self, artifact: &Utf8Path) -> Result<Vec<String>, Error>;
}

impl<S: DependencySource + ?Sized> DependencySource for &S {
    fn load_commands(&self, artifact: &Utf8Path) -> Result<Vec<String>, Error> {
        (**self).load_commands(artifact)
    }
}

/// A direct dependency as found in one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Canonical path of the target, the identity used everywhere else
    pub path: Utf8PathBuf,
    /// Reference text as written inside the inspected binary
    pub reference: String,
}

impl Dependency {
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }
}

pub struct Inspector<S> {
    source: S,
    system_prefixes: Vec<String>,
    include_system: bool,
}

impl<S: DependencySource> Inspector<S> {
    pub fn new(source: S, system_prefixes: Vec<String>, include_system: bool) -> Self {
        Self {
            source,
            system_prefixes,
            include_system,
        }
    }

    pub fn from_config(source: S, config: &BundleConfig) -> Self {
        Self::new(
            source,
            config.system_prefixes.clone(),
            config.include_system,
        )
    }

    pub fn is_system(&self, reference: &str) -> bool {
        self.system_prefixes
            .iter()
            .any(|prefix| reference.starts_with(prefix.as_str()))
    }

    /// Direct dependencies of `artifact`, in listing order.
    ///
    /// Two references that resolve to one target are both kept, since each
    /// has to be rewritten in the copy.
    ///
    /// Inspection failures are not fatal: the artifact is treated as having
    /// no dependencies and a warning is logged.
    pub fn inspect(&self, artifact: &Utf8Path) -> Vec<Dependency> {
        let references = match self.source.load_commands(artifact) {
            Ok(references) => references,
            Err(e) => {
                warn!("Could not process dependencies for {}: {}", artifact, e);
                return Vec::new();
            }
        };

        let mut dependencies: Vec<Dependency> = Vec::new();
        for reference in references {
            if reference == artifact.as_str() || reference.starts_with('@') {
                continue;
            }
            if !self.include_system && self.is_system(&reference) {
                debug!("Ignoring system library {}", reference);
                continue;
            }

            let path = resolve(&reference);
            if path.as_path() == artifact {
                continue;
            }
            if dependencies
                .iter()
                .any(|dep| dep.path == path && dep.reference == reference)
            {
                debug!("{} is listed twice in {}", reference, artifact);
                continue;
            }
            dependencies.push(Dependency { path, reference });
        }

        dependencies
    }
}

/// Canonical form of `path`, or the path itself when it cannot be resolved.
pub fn resolve(path: &str) -> Utf8PathBuf {
    match Utf8Path::new(path).canonicalize_utf8() {
        Ok(resolved) => resolved,
        Err(e) => {
            debug!("Could not resolve {}: {}", path, e);
            Utf8PathBuf::from(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Listing(HashMap<Utf8PathBuf, Vec<String>>);

    impl DependencySource for Listing {
        fn load_commands(&self, artifact: &Utf8Path) -> Result<Vec<String>, Error> {
            self.0
                .get(artifact)
                .cloned()
                .ok_or_else(|| Error::UnsupportedContainer(artifact.to_owned()))
        }
    }

    fn inspector(refs: &[&str], include_system: bool) -> Inspector<Listing> {
        let mut map = HashMap::new();
        map.insert(
            Utf8PathBuf::from("/nonexistent/libfoo.dylib"),
            refs.iter().map(|r| r.to_string()).collect(),
        );
        Inspector::new(
            Listing(map),
            crate::config::default_system_prefixes(),
            include_system,
        )
    }

    #[test]
    fn filters_self_tokens_and_system() {
        let inspector = inspector(
            &[
                "/nonexistent/libfoo.dylib",
                "@rpath/libqux.dylib",
                "@loader_path/libquux.dylib",
                "/usr/lib/libSystem.B.dylib",
                "/System/Library/Frameworks/CoreFoundation.framework/CoreFoundation",
                "/opt/homebrew/lib/libbar.dylib",
            ],
            false,
        );
        let deps = inspector.inspect(Utf8Path::new("/nonexistent/libfoo.dylib"));
        assert_eq!(
            deps,
            vec![Dependency {
                path: Utf8PathBuf::from("/opt/homebrew/lib/libbar.dylib"),
                reference: "/opt/homebrew/lib/libbar.dylib".to_string(),
            }]
        );
    }

    #[test]
    fn override_surfaces_system_libraries() {
        let inspector = inspector(&["/usr/lib/libSystem.B.dylib"], true);
        let deps = inspector.inspect(Utf8Path::new("/nonexistent/libfoo.dylib"));
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].reference, "/usr/lib/libSystem.B.dylib");
    }

    #[test]
    fn inspection_failure_yields_no_dependencies() {
        let inspector = inspector(&["/opt/homebrew/lib/libbar.dylib"], false);
        assert!(inspector
            .inspect(Utf8Path::new("/nonexistent/other.dylib"))
            .is_empty());
    }

    #[test]
    fn resolves_symlinks_and_keeps_reference_text() {
        let temp = tempfile::TempDir::new().unwrap();
        let dir = Utf8PathBuf::try_from(temp.path().canonicalize().unwrap()).unwrap();
        let real = dir.join("libbar.1.2.dylib");
        std::fs::write(&real, b"bar").unwrap();
        let link = dir.join("libbar.dylib");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let inspector = inspector(&[link.as_str(), real.as_str(), link.as_str()], false);
        let deps = inspector.inspect(Utf8Path::new("/nonexistent/libfoo.dylib"));
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].path, real);
        assert_eq!(deps[0].reference, link.as_str());
        assert_eq!(deps[0].file_name(), "libbar.1.2.dylib");
        // the second spelling of the same target is kept for its own rewrite
        assert_eq!(deps[1].path, real);
        assert_eq!(deps[1].reference, real.as_str());
    }
}
