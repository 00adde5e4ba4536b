use crate::internal::tool;
use crate::patch::{PatchOutcome, Patcher};
use crate::Error;
use camino::Utf8Path;
use std::process::Output;

/// Marker `install_name_tool` prints when a mutation would not alter the file.
///
/// The tool exposes no structured status, so this substring is the contract.
pub const NO_CHANGE: &str = "no change";

const INSTALL_NAME_TOOL: &str = "install_name_tool";
const CODESIGN: &str = "codesign";

/// Patches copies with `install_name_tool` and re-signs them with `codesign`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstallNameTool;

impl InstallNameTool {
    fn run(&self, path: &Utf8Path, args: &[&str]) -> Result<PatchOutcome, Error> {
        let output = tool::run(INSTALL_NAME_TOOL, args, path)?;
        classify(&output).ok_or_else(|| tool::failure(INSTALL_NAME_TOOL, path, &output))
    }
}

impl Patcher for InstallNameTool {
    fn set_id(&self, path: &Utf8Path, id: &str) -> Result<PatchOutcome, Error> {
        self.run(path, &["-id", id])
    }

    fn change_reference(
        &self,
        path: &Utf8Path,
        old: &str,
        new: &str,
    ) -> Result<PatchOutcome, Error> {
        self.run(path, &["-change", old, new])
    }

    fn add_rpath(&self, path: &Utf8Path, rpath: &str) -> Result<PatchOutcome, Error> {
        self.run(path, &["-add_rpath", rpath])
    }

    fn resign(&self, path: &Utf8Path) -> Result<PatchOutcome, Error> {
        let output = tool::run(
            CODESIGN,
            &[
                "-s",
                "-",
                "--force",
                "--preserve-metadata=entitlements,requirements,flags,runtime",
            ],
            path,
        )?;
        if output.status.success() {
            Ok(PatchOutcome::Applied)
        } else {
            Err(tool::failure(CODESIGN, path, &output))
        }
    }
}

/// Map a finished `install_name_tool` run to an outcome, `None` on real failure.
pub fn classify(output: &Output) -> Option<PatchOutcome> {
    if output.status.success() {
        return Some(PatchOutcome::Applied);
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr.contains(NO_CHANGE).then_some(PatchOutcome::Unchanged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::process::ExitStatusExt;
    use std::process::ExitStatus;

    fn output(code: i32, stderr: &str) -> Output {
        Output {
            status: ExitStatus::from_raw(code << 8),
            stdout: Vec::new(),
            stderr: stderr.as_bytes().to_vec(),
        }
    }

    #[test]
    fn success_is_applied() {
        assert_eq!(classify(&output(0, "")), Some(PatchOutcome::Applied));
    }

    #[test]
    fn no_change_is_tolerated() {
        let out = output(
            1,
            "error: install_name_tool: no change for -id: @rpath/libbar.dylib",
        );
        assert_eq!(classify(&out), Some(PatchOutcome::Unchanged));
    }

    #[test]
    fn other_failures_are_errors() {
        let out = output(
            1,
            "error: install_name_tool: can't open file: /tmp/out/lib/libfoo.dylib",
        );
        assert_eq!(classify(&out), None);
    }
}
