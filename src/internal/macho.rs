use crate::inspect::DependencySource;
use crate::Error;
use camino::Utf8Path;
use goblin::mach::{Mach, MachO, SingleArch};
use memmap2::Mmap;
use std::fs::File;

// goblin reserves the first library slot for the image itself
const SELF_SLOT: &str = "self";

/// Reads dylib load commands in-process instead of shelling out to `otool`.
///
/// For universal binaries the first architecture is read; all slices of a
/// well-formed fat binary declare the same dependencies.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachOReader;

impl DependencySource for MachOReader {
    fn load_commands(&self, artifact: &Utf8Path) -> Result<Vec<String>, Error> {
        let file = File::open(artifact)?;
        let mmap = unsafe { Mmap::map(&file)? };

        match Mach::parse(&mmap)? {
            Mach::Binary(macho) => Ok(dylib_references(&macho)),
            Mach::Fat(multi) => match multi.get(0)? {
                SingleArch::MachO(macho) => Ok(dylib_references(&macho)),
                SingleArch::Archive(_) => Err(Error::UnsupportedContainer(artifact.to_owned())),
            },
        }
    }
}

fn dylib_references(macho: &MachO) -> Vec<String> {
    macho
        .libs
        .iter()
        .filter(|lib| **lib != SELF_SLOT && Some(**lib) != macho.name)
        .map(|lib| lib.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_file_is_not_macho() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = camino::Utf8PathBuf::try_from(temp.path().join("notes.txt")).unwrap();
        std::fs::write(&path, "not a binary at all, just some words").unwrap();
        assert!(MachOReader.load_commands(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let result = MachOReader.load_commands(Utf8Path::new("/nonexistent/libfoo.dylib"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
