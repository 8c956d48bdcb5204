//! Platform registry: groups per-architecture files and drives a run.
//!
//! A run is `discover` → `build` (consolidate, then prune) → `write`.
//! Platforms and architectures are kept in sorted maps, so every phase
//! visits them in the same order regardless of directory listing order.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use sysmerge_astutil::UnsupportedShape;
use tracing::{debug, info, trace, warn};

use crate::emit;
use crate::error::{MergeError, Result};
use crate::kinds::{FileId, Kinds};
use crate::matcher::Matcher;
use crate::naming::{FileName, shared_file};
use crate::options::MergeOptions;
use crate::stats::{AggStats, FileStats, Stats};

/// One parsed source file and the declarations extracted from it.
pub struct FileEntry {
	id: FileId,
	path: PathBuf,
	ast: syn::File,
	kinds: Kinds,
	dirty: bool,
}

impl FileEntry {
	fn new(path: PathBuf, ast: syn::File) -> Self {
		Self {
			id: FileId(0),
			path,
			ast,
			kinds: Kinds::default(),
			dirty: false,
		}
	}

	/// Re-derives the declarations from the current syntax tree under a new
	/// file id, so renderings cached for the previous tree are never reused.
	fn extract(&mut self, next_file: &mut u32) -> Result<()> {
		self.id = FileId(*next_file);
		*next_file += 1;
		self.kinds = Kinds::extract(self.id, &self.ast).map_err(|shape| MergeError::Extract {
			path: self.path.clone(),
			shape,
		})?;
		Ok(())
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn ast(&self) -> &syn::File {
		&self.ast
	}

	pub fn kinds(&self) -> &Kinds {
		&self.kinds
	}

	/// Whether pruning changed the file since it was last written.
	pub fn is_dirty(&self) -> bool {
		self.dirty
	}
}

/// The architecture files of one platform and what they share.
#[derive(Default)]
pub struct PlatformEntry {
	arches: BTreeMap<String, FileEntry>,
	shared: Option<FileEntry>,
	common: Kinds,
}

impl PlatformEntry {
	/// Architecture files, by architecture name.
	pub fn arches(&self) -> &BTreeMap<String, FileEntry> {
		&self.arches
	}

	/// The shared file as found on disk or last written.
	pub fn shared(&self) -> Option<&FileEntry> {
		self.shared.as_ref()
	}

	/// Declarations hoisted by the last consolidation and not written yet.
	pub fn common(&self) -> &Kinds {
		&self.common
	}

	fn consolidates(&self) -> bool {
		self.arches.len() > 1
	}
}

/// Per-architecture files grouped by platform.
pub struct Registry {
	dir: PathBuf,
	options: MergeOptions,
	platforms: BTreeMap<String, PlatformEntry>,
	matcher: Matcher,
	next_file: u32,
}

impl Registry {
	/// Creates an empty registry for files living in `dir`.
	pub fn new(dir: impl Into<PathBuf>, options: MergeOptions) -> Self {
		let matcher = Matcher::new(options.compare, options.funcs);
		Self {
			dir: dir.into(),
			options,
			platforms: BTreeMap::new(),
			matcher,
			next_file: 0,
		}
	}

	/// Scans `dir` for per-architecture files, parses them along with any
	/// existing shared files, and extracts their declarations.
	pub fn discover(dir: impl Into<PathBuf>, options: MergeOptions) -> Result<Self> {
		let mut registry = Self::new(dir, options);
		let dir = registry.dir.clone();
		let pattern = registry.options.pattern();

		let mut names = Vec::new();
		for entry in fs::read_dir(&dir).map_err(MergeError::io(&dir))? {
			let entry = entry.map_err(MergeError::io(&dir))?;
			let path = entry.path();
			match fs::metadata(&path) {
				Ok(meta) if meta.is_file() => {}
				Ok(_) => {
					trace!(file = %path.display(), "skipping non-file entry");
					continue;
				}
				Err(error) => {
					trace!(file = %path.display(), %error, "skipping unreadable entry");
					continue;
				}
			}
			match entry.file_name().into_string() {
				Ok(name) => names.push(name),
				Err(name) => trace!(file = ?name, "skipping non UTF-8 file name"),
			}
		}
		names.sort();

		for name in &names {
			let file_name = match FileName::parse(name, &pattern) {
				Ok(file_name) => file_name,
				Err(reason) => {
					trace!(file = %name, %reason, "skipping");
					continue;
				}
			};
			let path = dir.join(name);
			let source = fs::read_to_string(&path).map_err(MergeError::io(&path))?;
			registry.insert_arch(&file_name, path, &source)?;
		}

		for (platform, entry) in &mut registry.platforms {
			let name = shared_file(platform, &registry.options.extension);
			if names.binary_search(&name).is_ok() {
				let path = dir.join(&name);
				let source = fs::read_to_string(&path).map_err(MergeError::io(&path))?;
				entry.shared = Some(FileEntry::new(path.clone(), parse(&path, &source)?));
				debug!(platform = %platform, file = %name, "found existing shared file");
			}
		}

		if registry.platforms.is_empty() {
			warn!(dir = %dir.display(), "no per-architecture files found");
		}
		registry.build_kinds()?;
		Ok(registry)
	}

	/// Adds an in-memory source under `file_name`. Returns false if the name
	/// does not follow the per-architecture pattern.
	///
	/// Call [`Self::build_kinds`] once all sources are added.
	pub fn add_source(&mut self, file_name: &str, source: &str) -> Result<bool> {
		match FileName::parse(file_name, &self.options.pattern()) {
			Ok(parsed) => {
				let path = self.dir.join(file_name);
				self.insert_arch(&parsed, path, source)?;
				Ok(true)
			}
			Err(reason) => {
				trace!(file = %file_name, %reason, "skipping");
				Ok(false)
			}
		}
	}

	/// Adds an in-memory source as the existing shared file of `platform`.
	pub fn add_shared(&mut self, platform: &str, source: &str) -> Result<()> {
		let path = self.dir.join(shared_file(platform, &self.options.extension));
		let ast = parse(&path, source)?;
		self.platforms.entry(platform.to_string()).or_default().shared = Some(FileEntry::new(path, ast));
		Ok(())
	}

	fn insert_arch(&mut self, name: &FileName, path: PathBuf, source: &str) -> Result<()> {
		let ast = parse(&path, source)?;
		trace!(platform = %name.platform(), arch = name.arch(), "registered");
		self.platforms
			.entry(name.platform())
			.or_default()
			.arches
			.insert(name.arch().to_string(), FileEntry::new(path, ast));
		Ok(())
	}

	/// Extracts the declarations of every file from its current syntax tree.
	pub fn build_kinds(&mut self) -> Result<()> {
		let Self {
			platforms, next_file, ..
		} = self;
		for entry in platforms.values_mut() {
			for file in entry.arches.values_mut().chain(entry.shared.as_mut()) {
				file.extract(next_file)?;
			}
		}
		Ok(())
	}

	/// Computes, per platform, the declarations every architecture shares
	/// that neither the existing shared file nor the pending common set
	/// already holds, and adds them to the common set.
	pub fn consolidate(&mut self) -> Result<()> {
		let Self {
			platforms, matcher, ..
		} = self;
		for (platform, entry) in platforms.iter_mut() {
			if !entry.consolidates() {
				debug!(platform = %platform, arches = entry.arches.len(), "nothing to consolidate");
				continue;
			}
			let unsupported = |shape: UnsupportedShape| MergeError::Unsupported {
				platform: platform.clone(),
				shape,
			};

			let mut acc = None;
			for file in entry.arches.values() {
				Kinds::fold_intersect(&mut acc, &file.kinds, matcher).map_err(unsupported)?;
			}
			let mut found = acc.unwrap_or_default();
			if let Some(shared) = &entry.shared {
				found.difference(&shared.kinds, matcher).map_err(unsupported)?;
			}
			found.difference(&entry.common, matcher).map_err(unsupported)?;
			debug!(
				platform = %platform,
				consts = found.const_count(),
				types = found.types.len(),
				funcs = found.funcs.len(),
				pending = entry.common.len(),
				"consolidated"
			);
			entry.common.append(found).map_err(unsupported)?;
		}
		Ok(())
	}

	/// Removes from every architecture file the declarations held by its
	/// platform's common set or existing shared file.
	pub fn prune(&mut self) -> Result<()> {
		let Self {
			platforms,
			matcher,
			next_file,
			..
		} = self;
		for (platform, entry) in platforms.iter_mut() {
			if !entry.consolidates() {
				continue;
			}
			let unsupported = |shape: UnsupportedShape| MergeError::Unsupported {
				platform: platform.clone(),
				shape,
			};
			for (arch, file) in entry.arches.iter_mut() {
				let before = file.kinds.len();
				file.kinds.difference(&entry.common, matcher).map_err(unsupported)?;
				if let Some(shared) = &entry.shared {
					file.kinds.difference(&shared.kinds, matcher).map_err(unsupported)?;
				}
				if file.kinds.trim_file(file.id, &mut file.ast) {
					file.dirty = true;
					file.extract(next_file)?;
					trace!(
						platform = %platform,
						arch = %arch,
						removed = before - file.kinds.len(),
						"pruned"
					);
				}
			}
		}
		Ok(())
	}

	/// Consolidates, then prunes.
	pub fn build(&mut self) -> Result<()> {
		self.consolidate()?;
		self.prune()?;
		debug!(
			cached = self.matcher.cached(),
			hits = self.matcher.hits(),
			misses = self.matcher.misses(),
			"render cache"
		);
		Ok(())
	}

	/// Writes every shared file that is missing or gained declarations, and
	/// every architecture file changed by pruning. Returns the paths written,
	/// or that would be written in dry-run mode.
	pub fn write(&mut self) -> Result<Vec<PathBuf>> {
		let dry_run = self.options.dry_run;
		let mut written = Vec::new();
		let Self {
			dir,
			options,
			platforms,
			next_file,
			..
		} = self;
		for (platform, entry) in platforms.iter_mut() {
			if entry.shared.is_none() || !entry.common.is_empty() {
				let path = dir.join(shared_file(platform, &options.extension));
				let arches: Vec<&syn::File> = entry.arches.values().map(|f| &f.ast).collect();
				let existing = entry.shared.as_ref().map(|f| &f.ast);
				let ast = emit::shared_file(existing, &entry.common, &arches).map_err(|error| MergeError::Parse {
					path: path.clone(),
					error,
				})?;
				debug!(platform = %platform, hoisted = entry.common.len(), dry_run, "writing shared file");
				if !dry_run {
					emit::write_source(&path, &ast)?;
					let mut shared = FileEntry::new(path.clone(), ast);
					shared.extract(next_file)?;
					entry.shared = Some(shared);
					entry.common = Kinds::default();
				}
				written.push(path);
			}
			for file in entry.arches.values_mut().filter(|f| f.dirty) {
				if !dry_run {
					emit::write_source(&file.path, &file.ast)?;
					file.dirty = false;
				}
				written.push(file.path.clone());
			}
		}
		info!(files = written.len(), dry_run, "write complete");
		Ok(written)
	}

	/// Declaration counts per platform and architecture. The platform line
	/// counts the existing shared file plus anything not written yet.
	pub fn stats(&self) -> Stats {
		let agg = self
			.platforms
			.iter()
			.map(|(platform, entry)| {
				let mut file = FileStats::new(platform, &entry.common);
				if let Some(shared) = &entry.shared {
					file.add(&shared.kinds);
				}
				let arches = entry.arches.iter().map(|(arch, f)| FileStats::new(arch, &f.kinds)).collect();
				AggStats { file, arches }
			})
			.collect();
		Stats { agg }
	}

	/// The platform named `name`, e.g. `zerrors_linux`.
	pub fn platform(&self, name: &str) -> Option<&PlatformEntry> {
		self.platforms.get(name)
	}

	/// Number of platforms.
	pub fn len(&self) -> usize {
		self.platforms.len()
	}

	pub fn is_empty(&self) -> bool {
		self.platforms.is_empty()
	}
}

/// Lists platforms and their architectures.
impl fmt::Display for Registry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (platform, entry) in &self.platforms {
			writeln!(f, "{platform}")?;
			for arch in entry.arches.keys() {
				writeln!(f, "  {arch}")?;
			}
		}
		Ok(())
	}
}

fn parse(path: &Path, source: &str) -> Result<syn::File> {
	syn::parse_file(source).map_err(|error| MergeError::Parse {
		path: path.to_path_buf(),
		error,
	})
}
