use crate::inspect::DependencySource;
use crate::internal::tool;
use crate::Error;
use camino::Utf8Path;
use regex::Regex;
use std::sync::LazyLock;

// A dependency line: a loader token or absolute path, then version metadata.
static DEPENDENCY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(@\S+|/.+?)\s+\(compatibility version").expect("valid otool pattern")
});

/// Lists dependencies by running `otool -L`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Otool;

impl DependencySource for Otool {
    fn load_commands(&self, artifact: &Utf8Path) -> Result<Vec<String>, Error> {
        let output = tool::run("otool", &["-L"], artifact)?;
        if !output.status.success() {
            return Err(tool::failure("otool", artifact, &output));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(parse_otool_output(&stdout))
    }
}

/// Parse `otool -L` output into the referenced install names.
///
/// Example output:
/// ```text
/// /opt/homebrew/lib/libfoo.dylib:
///     /opt/homebrew/opt/foo/lib/libfoo.1.dylib (compatibility version 2.0.0, current version 2.4.0)
///     @rpath/libbar.dylib (compatibility version 1.0.0, current version 1.0.0)
///     /usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1345.100.2)
/// ```
/// The header line and anything else without version metadata is ignored.
pub fn parse_otool_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| DEPENDENCY_LINE.captures(line))
        .map(|captures| captures[1].to_string())
        .collect()
}
