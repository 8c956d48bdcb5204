//! Error types for a consolidation run.

use std::path::PathBuf;

use sysmerge_astutil::UnsupportedShape;
use thiserror::Error;

/// Errors that abort a consolidation run.
///
/// There is no partial success: the tool is rerunnable, so the fix for any
/// of these is to correct the input and run again.
#[derive(Debug, Error)]
pub enum MergeError {
	/// Reading the input directory or a file, or writing an output, failed.
	#[error("I/O error on {path}: {error}")]
	Io {
		/// File or directory involved.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},

	/// A source file is not valid Rust.
	#[error("failed to parse {path}: {error}")]
	Parse {
		/// File that failed to parse.
		path: PathBuf,
		/// The parser diagnostic.
		error: syn::Error,
	},

	/// A file holds a top-level item the extractor cannot classify.
	#[error("cannot extract declarations from {path}: {shape}")]
	Extract {
		/// File holding the item.
		path: PathBuf,
		/// The offending shape.
		shape: UnsupportedShape,
	},

	/// Two declarations of a platform could not be compared.
	#[error("cannot compare declarations of {platform}: {shape}")]
	Unsupported {
		/// Platform being consolidated.
		platform: String,
		/// The offending shape.
		shape: UnsupportedShape,
	},
}

impl MergeError {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |error| Self::Io { path, error }
	}
}

/// Result type for consolidation operations.
pub type Result<T> = std::result::Result<T, MergeError>;
