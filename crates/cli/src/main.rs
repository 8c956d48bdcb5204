//! sysmerge binary.
//!
//! Consolidates the per-architecture files of a directory in one pass and
//! exits non-zero on the first parse, comparison or I/O error.

mod cli;

use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use sysmerge::Registry;
use tracing::info;

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let start = Instant::now();
	let mut registry = Registry::discover(&cli.path, cli.options())
		.with_context(|| format!("loading {}", cli.path.display()))?;
	info!(platforms = registry.len(), path = %cli.path.display(), "discovered");

	if cli.stats {
		println!("BEFORE");
		println!("{}", registry.stats());
	}

	registry.build().context("consolidating declarations")?;

	if cli.stats {
		println!("AFTER");
		println!("{}", registry.stats());
	}

	let written = registry.write().context("writing consolidated files")?;
	if cli.dry_run {
		for path in &written {
			println!("would write {}", path.display());
		}
	}

	if cli.timing {
		println!("{:?}", start.elapsed());
	}
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("SYSMERGE_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("sysmerge=debug,info")
			} else {
				EnvFilter::new("info")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
