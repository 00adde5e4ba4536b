//! Load-path metadata mutation.

use crate::Error;
use camino::Utf8Path;

pub use crate::internal::install_name_tool::{classify, InstallNameTool, NO_CHANGE};

/// Result of a mutation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    Applied,
    /// The binary already carried the requested value
    Unchanged,
}

/// The mutating operations the bundler needs on a copied binary.
///
/// Every operation returns `Ok(PatchOutcome::Unchanged)` instead of an error
/// when the tool reports that nothing had to change.
pub trait Patcher {
    /// Set the library's own install name (`LC_ID_DYLIB`).
    fn set_id(&self, path: &Utf8Path, id: &str) -> Result<PatchOutcome, Error>;

    /// Repoint one existing dependency reference.
    fn change_reference(&self, path: &Utf8Path, old: &str, new: &str)
        -> Result<PatchOutcome, Error>;

    /// Append one `LC_RPATH` search directory.
    fn add_rpath(&self, path: &Utf8Path, rpath: &str) -> Result<PatchOutcome, Error>;

    /// Re-apply an ad-hoc code signature after the other mutations.
    fn resign(&self, path: &Utf8Path) -> Result<PatchOutcome, Error>;
}

impl<P: Patcher + ?Sized> Patcher for &P {
    fn set_id(&self, path: &Utf8Path, id: &str) -> Result<PatchOutcome, Error> {
        (**self).set_id(path, id)
    }

    fn change_reference(
        &self,
        path: &Utf8Path,
        old: &str,
        new: &str,
    ) -> Result<PatchOutcome, Error> {
        (**self).change_reference(path, old, new)
    }

    fn add_rpath(&self, path: &Utf8Path, rpath: &str) -> Result<PatchOutcome, Error> {
        (**self).add_rpath(path, rpath)
    }

    fn resign(&self, path: &Utf8Path) -> Result<PatchOutcome, Error> {
        (**self).resign(path)
    }
}
