//! Run configuration.

use crate::naming::Pattern;

/// How two declarations are decided to be the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompareMode {
	/// Compare memoized canonical renderings.
	#[default]
	Rendered,
	/// Walk both syntax trees.
	Structural,
}

/// Which parts of a function must match for two functions to be the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FuncMatch {
	/// Name, signature and body.
	#[default]
	Strict,
	/// Body only. Two differently named functions with the same body are
	/// treated as duplicates, so this can hoist or prune the wrong one.
	BodyOnly,
}

/// Options of one consolidation run.
#[derive(Debug, Clone)]
pub struct MergeOptions {
	/// Prefix marking generated files (`z` in `zerrors_linux_amd64.rs`).
	pub prefix: String,
	/// Source file extension, without the dot.
	pub extension: String,
	/// Declaration comparison strategy.
	pub compare: CompareMode,
	/// Function comparison strictness.
	pub funcs: FuncMatch,
	/// Compute everything but write nothing.
	pub dry_run: bool,
}

impl Default for MergeOptions {
	fn default() -> Self {
		Self {
			prefix: "z".to_string(),
			extension: "rs".to_string(),
			compare: CompareMode::default(),
			funcs: FuncMatch::default(),
			dry_run: false,
		}
	}
}

impl MergeOptions {
	/// Sets the generated-file prefix.
	pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
		self.prefix = prefix.into();
		self
	}

	/// Sets the source file extension.
	pub fn extension(mut self, extension: impl Into<String>) -> Self {
		self.extension = extension.into();
		self
	}

	/// Sets the comparison strategy.
	pub fn compare(mut self, compare: CompareMode) -> Self {
		self.compare = compare;
		self
	}

	/// Sets the function comparison strictness.
	pub fn funcs(mut self, funcs: FuncMatch) -> Self {
		self.funcs = funcs;
		self
	}

	/// Enables or disables dry-run mode.
	pub fn dry_run(mut self, on: bool) -> Self {
		self.dry_run = on;
		self
	}

	/// File-name pattern selecting the per-architecture sources.
	pub fn pattern(&self) -> Pattern {
		Pattern {
			prefix: self.prefix.clone(),
			extension: self.extension.clone(),
		}
	}
}
