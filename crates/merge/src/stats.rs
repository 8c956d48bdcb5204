//! Declaration counts, printed before and after a run.

use std::fmt;

use crate::kinds::Kinds;

/// Declaration counts of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileStats {
	pub name: String,
	pub consts: usize,
	pub types: usize,
	pub funcs: usize,
}

impl FileStats {
	pub fn new(name: &str, kinds: &Kinds) -> Self {
		let mut stats = Self {
			name: name.to_string(),
			..Self::default()
		};
		stats.add(kinds);
		stats
	}

	/// Adds the counts of `kinds`.
	pub fn add(&mut self, kinds: &Kinds) {
		self.consts += kinds.const_count();
		self.types += kinds.types.len();
		self.funcs += kinds.funcs.len();
	}
}

impl fmt::Display for FileStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"file={:?} \t\tconsts={}\t\ttypes={}\t\tfuncs={}",
			self.name, self.consts, self.types, self.funcs
		)
	}
}

/// Counts of a platform's shared declarations and of each architecture.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AggStats {
	pub file: FileStats,
	/// Sorted by architecture name.
	pub arches: Vec<FileStats>,
}

impl fmt::Display for AggStats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "{}", self.file)?;
		for arch in &self.arches {
			writeln!(f, "  {arch}")?;
		}
		Ok(())
	}
}

/// Counts of every platform, sorted by platform name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
	pub agg: Vec<AggStats>,
}

impl fmt::Display for Stats {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for agg in &self.agg {
			writeln!(f, "{agg}")?;
		}
		Ok(())
	}
}
