//! Internal implementation modules.
//!
//! Wrappers around the macOS developer tools and the Mach-O reader. They are
//! exposed through the traits in `inspect` and `patch`, not directly.

pub(crate) mod install_name_tool;
pub(crate) mod macho;
pub(crate) mod otool;
pub(crate) mod tool;
