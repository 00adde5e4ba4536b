// dylib-bundler - Relocatable bundles of macOS shared libraries
// MIT, 2025

//! Vendor the non-system dylib dependencies of one or more libraries into a
//! self-contained, relocatable bundle.
//!
//! This library provides:
//! - Dependency listing through `otool -L` or an in-process Mach-O reader
//! - Interactive, breadth-first discovery that asks once per dependency
//! - Copying into a flat `lib/` + `support/` layout
//! - Rewriting install names and references to `@rpath` and adding the
//!   matching `LC_RPATH` entries
//!
//! # Example: Bundle a directory of libraries
//!
//! ```no_run
//! use dylib_bundler::{BundleConfig, Bundler, InstallNameTool, Otool, TerminalPrompter};
//!
//! let config = BundleConfig::builder()
//!     .input("/opt/homebrew/lib/libfoo.dylib")
//!     .output("dist")
//!     .build();
//! let report = Bundler::new(config, Otool, InstallNameTool).run(&mut TerminalPrompter)?;
//! println!("{}", report);
//! # Ok::<(), dylib_bundler::Error>(())
//! ```

mod internal;

pub mod bundler;
pub mod config;
pub mod copy;
pub mod discovery;
pub mod error;
pub mod inspect;
pub mod interrupt;
pub mod patch;
pub mod prompt;
pub mod relink;
pub mod tree;

#[cfg(test)]
mod test_support;

pub use bundler::{collect_roots, BundleReport, Bundler};
pub use config::{BundleConfig, Layout, Location};
pub use discovery::{Artifact, Discovery, Session};
pub use error::Error;
pub use inspect::{DependencySource, Inspector, MachOReader, Otool};
pub use interrupt::Interrupt;
pub use patch::{InstallNameTool, PatchOutcome, Patcher};
pub use prompt::{Decision, LinePrompter, Prompted, Prompter, TerminalPrompter};
pub use tree::{DependencyTree, Edge};
