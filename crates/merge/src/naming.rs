//! Per-architecture file naming: `<prefix><name>_<os>_<arch>.<ext>`.

use std::fmt;

use thiserror::Error;

/// Selects the generated files a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
	/// Generated-file prefix, e.g. `z`.
	pub prefix: String,
	/// Extension without the dot, e.g. `rs`.
	pub extension: String,
}

/// Why a file name was not accepted as a per-architecture source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
	#[error("extension is not .{0}")]
	Extension(String),
	#[error("missing prefix {0:?}")]
	Prefix(String),
	#[error("expected <name>_<os>_<arch>")]
	Shape,
	#[error("invalid character {0:?}")]
	Character(char),
}

/// A parsed per-architecture file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
	prefix: String,
	name: String,
	os: String,
	arch: String,
}

impl FileName {
	/// Parses `file_name` against `pattern`.
	///
	/// The name and os are taken up to the first and second underscore, so
	/// neither may contain one; everything after belongs to the arch.
	/// `zsyscall_aix_ppc64_gc.rs` parses as platform `zsyscall_aix` with
	/// arch `ppc64_gc`.
	pub fn parse(file_name: &str, pattern: &Pattern) -> Result<Self, NameError> {
		let stem = file_name
			.strip_suffix(pattern.extension.as_str())
			.and_then(|s| s.strip_suffix('.'))
			.ok_or_else(|| NameError::Extension(pattern.extension.clone()))?;
		let rest = stem
			.strip_prefix(pattern.prefix.as_str())
			.ok_or_else(|| NameError::Prefix(pattern.prefix.clone()))?;
		if let Some(c) = rest.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '_') {
			return Err(NameError::Character(c));
		}

		let (name, rest) = rest.split_once('_').ok_or(NameError::Shape)?;
		let (os, arch) = rest.split_once('_').ok_or(NameError::Shape)?;
		if name.is_empty()
			|| os.is_empty()
			|| arch.is_empty()
			|| arch.starts_with('_')
			|| arch.ends_with('_')
		{
			return Err(NameError::Shape);
		}

		Ok(Self {
			prefix: pattern.prefix.clone(),
			name: name.to_string(),
			os: os.to_string(),
			arch: arch.to_string(),
		})
	}

	/// Platform key, `<prefix><name>_<os>`.
	pub fn platform(&self) -> String {
		format!("{}{}_{}", self.prefix, self.name, self.os)
	}

	/// Architecture component.
	pub fn arch(&self) -> &str {
		&self.arch
	}

	/// Operating system component.
	pub fn os(&self) -> &str {
		&self.os
	}
}

impl fmt::Display for FileName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}_{}", self.platform(), self.arch)
	}
}

/// File name holding the declarations shared by every architecture of
/// `platform`.
pub fn shared_file(platform: &str, extension: &str) -> String {
	format!("{platform}.{extension}")
}
