//! Spawning the external developer tools.

use crate::Error;
use camino::Utf8Path;
use std::process::{Command, Output};
use tracing::debug;

/// Run `tool args... path` to completion and hand back its raw output.
///
/// A missing executable is reported as [`Error::ToolNotFound`]; exit status
/// is left for the caller to interpret.
pub(crate) fn run(tool: &'static str, args: &[&str], path: &Utf8Path) -> Result<Output, Error> {
    debug!("Executing: {} {} {}", tool, args.join(" "), path);

    match Command::new(tool).args(args).arg(path).output() {
        Ok(output) => Ok(output),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(Error::ToolNotFound(tool)),
        Err(e) => Err(e.into()),
    }
}

/// Build the error for a tool that exited unsuccessfully.
pub(crate) fn failure(tool: &'static str, path: &Utf8Path, output: &Output) -> Error {
    Error::Tool {
        tool,
        path: path.to_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}
