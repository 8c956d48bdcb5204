//! CLI schema for the sysmerge binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use sysmerge::{CompareMode, FuncMatch, MergeOptions};

/// Declaration comparison strategy, as spelled on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Compare {
	/// Compare cached canonical renderings
	#[default]
	Rendered,
	/// Walk both syntax trees
	Structural,
}

#[derive(Parser, Debug)]
#[command(name = "sysmerge")]
#[command(about = "Hoist declarations shared by every architecture into per-platform files")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Directory holding the generated files
	#[arg(long, value_name = "DIR", default_value = ".")]
	pub path: PathBuf,

	/// Print the elapsed time
	#[arg(long)]
	pub timing: bool,

	/// Print declaration counts before and after
	#[arg(long)]
	pub stats: bool,

	/// Prefix of generated file names
	#[arg(long, value_name = "PREFIX", default_value = "z")]
	pub prefix: String,

	/// Extension of generated file names
	#[arg(long = "ext", value_name = "EXT", default_value = "rs")]
	pub extension: String,

	/// How declarations are compared
	#[arg(long, value_enum, default_value_t = Compare::Rendered)]
	pub compare: Compare,

	/// Treat functions with the same body as the same function
	#[arg(long)]
	pub relaxed_funcs: bool,

	/// Report what would be written without writing
	#[arg(long)]
	pub dry_run: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

impl Cli {
	/// Run options selected by the arguments.
	pub fn options(&self) -> MergeOptions {
		let compare = match self.compare {
			Compare::Rendered => CompareMode::Rendered,
			Compare::Structural => CompareMode::Structural,
		};
		let funcs = if self.relaxed_funcs {
			FuncMatch::BodyOnly
		} else {
			FuncMatch::Strict
		};
		MergeOptions::default()
			.prefix(&self.prefix)
			.extension(&self.extension)
			.compare(compare)
			.funcs(funcs)
			.dry_run(self.dry_run)
	}
}
