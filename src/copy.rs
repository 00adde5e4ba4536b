//! Copying artifacts into the bundle layout.

use crate::config::{Layout, Location};
use crate::discovery::Artifact;
use crate::Error;
use camino::Utf8PathBuf;
use std::collections::BTreeMap;
use std::fs;
use tracing::info;

/// A file placed in the bundle, remembering which original it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedArtifact {
    /// Canonical path of the original; the dependency tree key
    pub original: Utf8PathBuf,
    pub copy: Utf8PathBuf,
    pub location: Location,
}

impl CopiedArtifact {
    pub fn name(&self) -> &str {
        self.copy.file_name().unwrap_or(self.copy.as_str())
    }
}

/// Refuse to copy when two different originals would share a flat file name.
pub fn check_collisions(roots: &[Artifact], bundled: &[Artifact]) -> Result<(), Error> {
    for group in [roots, bundled] {
        let mut by_name: BTreeMap<&str, &Artifact> = BTreeMap::new();
        for artifact in group {
            if let Some(first) = by_name.insert(&artifact.name, artifact) {
                if first.path != artifact.path {
                    return Err(Error::NameCollision {
                        name: artifact.name.clone(),
                        first: first.path.clone(),
                        second: artifact.path.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Copy roots into the primary directory and dependencies into support.
///
/// Contents are copied verbatim; any failure aborts.
pub fn copy_artifacts(
    layout: &Layout,
    roots: &[Artifact],
    bundled: &[Artifact],
) -> Result<Vec<CopiedArtifact>, Error> {
    check_collisions(roots, bundled)?;
    layout.create()?;

    let placements = roots
        .iter()
        .map(|artifact| (artifact, Location::Primary))
        .chain(bundled.iter().map(|artifact| (artifact, Location::Support)));

    let mut copies = Vec::new();
    for (artifact, location) in placements {
        let copy = layout.dir(location).join(&artifact.name);
        fs::copy(&artifact.path, &copy).map_err(|source| Error::Copy {
            from: artifact.path.clone(),
            to: copy.clone(),
            source,
        })?;
        info!("Copied {} -> {}", artifact.path, copy);

        copies.push(CopiedArtifact {
            original: artifact.path.clone(),
            copy,
            location,
        });
    }

    Ok(copies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn copies_into_flat_layout() {
        let temp = TempDir::new().unwrap();
        let dir = utf8(&temp);
        fs::create_dir_all(dir.join("src")).unwrap();
        fs::write(dir.join("src/libfoo.dylib"), b"foo").unwrap();
        fs::write(dir.join("src/libbar.dylib"), b"bar").unwrap();

        let layout = Layout::new(&dir.join("out"));
        let roots = vec![Artifact::new(dir.join("src/libfoo.dylib"))];
        let bundled = vec![Artifact::new(dir.join("src/libbar.dylib"))];

        let copies = copy_artifacts(&layout, &roots, &bundled).unwrap();
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].location, Location::Primary);
        assert_eq!(copies[1].name(), "libbar.dylib");
        assert_eq!(fs::read(layout.primary.join("libfoo.dylib")).unwrap(), b"foo");
        assert_eq!(fs::read(layout.support.join("libbar.dylib")).unwrap(), b"bar");
    }

    #[test]
    fn missing_original_fails_loudly() {
        let temp = TempDir::new().unwrap();
        let dir = utf8(&temp);
        let layout = Layout::new(&dir.join("out"));
        let roots = vec![Artifact::new(dir.join("gone.dylib"))];

        let err = copy_artifacts(&layout, &roots, &[]).unwrap_err();
        assert!(matches!(err, Error::Copy { .. }));
    }

    #[test]
    fn name_collision_is_rejected() {
        let bundled = vec![
            Artifact::new(Utf8PathBuf::from("/opt/a/libssl.dylib")),
            Artifact::new(Utf8PathBuf::from("/opt/b/libssl.dylib")),
        ];
        let err = check_collisions(&[], &bundled).unwrap_err();
        assert!(err.to_string().contains("libssl.dylib"));
    }
}
