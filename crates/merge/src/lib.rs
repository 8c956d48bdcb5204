//! Consolidation of generated per-architecture binding modules.
//!
//! Binding generators emit one module per platform and architecture, e.g.
//! `zerrors_linux_amd64.rs` and `zerrors_linux_arm64.rs`, most of whose
//! declarations are identical. This crate hoists the constants, types and
//! functions shared by every architecture of a platform into
//! `zerrors_linux.rs` and strips them from the architecture files.
//!
//! ```no_run
//! use sysmerge::{MergeOptions, Registry};
//!
//! let mut registry = Registry::discover("src/unix", MergeOptions::default())?;
//! registry.build()?;
//! registry.write()?;
//! # Ok::<(), sysmerge::MergeError>(())
//! ```

pub mod emit;
mod error;
pub mod kinds;
mod matcher;
pub mod naming;
mod options;
mod registry;
pub mod stats;

pub use error::{MergeError, Result};
pub use kinds::Kinds;
pub use matcher::Matcher;
pub use options::{CompareMode, FuncMatch, MergeOptions};
pub use registry::{FileEntry, PlatformEntry, Registry};
pub use stats::Stats;
