//! Bundle configuration and output layout.

use crate::Error;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Loader token that makes a reference resolve through the embedded search paths.
pub const RPATH_TOKEN: &str = "@rpath";

/// Library roots whose dependencies are left to the host unless overridden.
pub const DEFAULT_SYSTEM_PREFIXES: &[&str] = &["/usr/lib/", "/System/Library/"];

const PRIMARY_DIR: &str = "lib";
const SUPPORT_DIR: &str = "support";

/// Settings for a single bundling run.
#[derive(Debug, Clone, bon::Builder)]
pub struct BundleConfig {
    /// A library, or a directory whose `*.dylib` files are all roots
    #[builder(into)]
    pub input: Utf8PathBuf,
    /// Bundle root; `lib/` and `support/` are created below it
    #[builder(into)]
    pub output: Utf8PathBuf,
    /// Surface dependencies under the system prefixes too
    #[builder(default)]
    pub include_system: bool,
    /// Discover and report only
    #[builder(default)]
    pub dry_run: bool,
    /// Ad-hoc sign every copy after patching
    #[builder(default = true)]
    pub resign: bool,
    #[builder(default = default_system_prefixes())]
    pub system_prefixes: Vec<String>,
}

impl BundleConfig {
    pub fn layout(&self) -> Layout {
        Layout::new(&self.output)
    }
}

pub fn default_system_prefixes() -> Vec<String> {
    DEFAULT_SYSTEM_PREFIXES
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}

/// Where a copied artifact lives inside the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Location {
    /// Copies of the root artifacts
    Primary,
    /// Copies of bundled dependencies
    Support,
}

/// The flat two-directory layout of a finished bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: Utf8PathBuf,
    pub primary: Utf8PathBuf,
    pub support: Utf8PathBuf,
}

impl Layout {
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: root.to_owned(),
            primary: root.join(PRIMARY_DIR),
            support: root.join(SUPPORT_DIR),
        }
    }

    pub fn create(&self) -> Result<(), Error> {
        fs::create_dir_all(&self.primary)?;
        fs::create_dir_all(&self.support)?;
        Ok(())
    }

    pub fn dir(&self, location: Location) -> &Utf8Path {
        match location {
            Location::Primary => &self.primary,
            Location::Support => &self.support,
        }
    }

    /// Search directory added to a copy that has bundled dependencies.
    ///
    /// Support libraries are flat siblings, so they search their own directory;
    /// primary copies reach over into the support sibling.
    pub fn search_path(&self, location: Location) -> String {
        match location {
            Location::Primary => format!("@loader_path/../{}", SUPPORT_DIR),
            Location::Support => "@loader_path/.".to_string(),
        }
    }
}

/// Location-independent reference for a bundled library file name.
pub fn install_name(file_name: &str) -> String {
    format!("{}/{}", RPATH_TOKEN, file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_dirs() {
        let layout = Layout::new(Utf8Path::new("/tmp/out"));
        assert_eq!(layout.dir(Location::Primary).as_str(), "/tmp/out/lib");
        assert_eq!(layout.dir(Location::Support).as_str(), "/tmp/out/support");
    }

    #[test]
    fn search_path_depends_on_location() {
        let layout = Layout::new(Utf8Path::new("/anywhere"));
        assert_eq!(
            layout.search_path(Location::Primary),
            "@loader_path/../support"
        );
        assert_eq!(layout.search_path(Location::Support), "@loader_path/.");
    }

    #[test]
    fn install_name_uses_rpath_token() {
        assert_eq!(install_name("libbar.dylib"), "@rpath/libbar.dylib");
    }

    #[test]
    fn builder_defaults() {
        let config = BundleConfig::builder()
            .input("/in/libfoo.dylib")
            .output("/out")
            .build();
        assert!(!config.include_system);
        assert!(!config.dry_run);
        assert!(config.resign);
        assert_eq!(config.system_prefixes, vec!["/usr/lib/", "/System/Library/"]);
        assert_eq!(config.layout().primary.as_str(), "/out/lib");
    }
}
