// Error types for dylib-bundler
use camino::Utf8PathBuf;
use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Mach-O parsing error: {0}")]
    Goblin(#[from] goblin::error::Error),

    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Prompt error: {0}")]
    Prompt(#[from] inquire::InquireError),

    #[error("Could not install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("'{0}' not found - install the Xcode Command Line Tools (xcode-select --install)")]
    ToolNotFound(&'static str),

    #[error("{tool} failed on {path}: {stderr}")]
    Tool {
        tool: &'static str,
        path: Utf8PathBuf,
        stderr: String,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        source: io::Error,
    },

    #[error("Input path '{0}' does not exist")]
    InputNotFound(Utf8PathBuf),

    #[error("No files to bundle")]
    NothingToBundle,

    #[error("{first} and {second} would both be copied as {name}")]
    NameCollision {
        name: String,
        first: Utf8PathBuf,
        second: Utf8PathBuf,
    },

    #[error("Unsupported Mach-O container in {0}")]
    UnsupportedContainer(Utf8PathBuf),
}
