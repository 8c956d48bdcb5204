//! Rendering and writing consolidated and trimmed files.
//!
//! Files are rendered from their syntax trees through `prettyplease`.
//! Comments other than doc comments do not survive a rewrite, so every
//! rendered file starts with [`HEADER`].

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use proc_macro2::{TokenStream, TokenTree};
use quote::ToTokens;
use rustc_hash::{FxHashMap, FxHashSet};
use syn::{Attribute, ForeignItem, Item, ItemUse, UseTree};
use sysmerge_astutil::canonical;

use crate::error::{MergeError, Result};
use crate::kinds::{FuncDef, Kinds, TypeDef};

/// First line of every file written by a run.
pub const HEADER: &str = "// Code generated by sysmerge. DO NOT EDIT.";

/// Renders `ast` as formatted source text.
pub fn render_file(ast: &syn::File) -> String {
	let body = prettyplease::unparse(ast);
	if body.trim().is_empty() {
		format!("{HEADER}\n")
	} else {
		format!("{HEADER}\n\n{body}")
	}
}

/// Builds the shared file of a platform.
///
/// With an `existing` shared file, its items are kept, `use` items it lacks
/// are added after its own, and the declarations of `common` are appended.
/// Otherwise the file gets the inner attributes every architecture file
/// carries, the `use` items every architecture file carries that the
/// hoisted declarations refer to, then the declarations: constants, types,
/// functions.
pub fn shared_file(existing: Option<&syn::File>, common: &Kinds, arches: &[&syn::File]) -> syn::Result<syn::File> {
	let decls = declarations(common)?;
	let referenced = referenced_idents(&decls);
	let uses = common_uses(arches)
		.into_iter()
		.filter(|u| provides(&u.tree, &referenced))
		.map(Item::Use);

	let Some(existing) = existing else {
		return Ok(syn::File {
			shebang: None,
			attrs: common_attrs(arches),
			items: uses.chain(decls).collect(),
		});
	};

	let mut file = existing.clone();
	let present: FxHashSet<String> = file
		.items
		.iter()
		.filter(|item| matches!(item, Item::Use(_)))
		.map(canonical)
		.collect();
	let missing: Vec<Item> = uses.filter(|u| !present.contains(&canonical(u))).collect();
	let at = file
		.items
		.iter()
		.rposition(|item| matches!(item, Item::Use(_)))
		.map_or(0, |i| i + 1);
	file.items.splice(at..at, missing);
	file.items.extend(decls);
	Ok(file)
}

/// Items for the declarations of `kinds`. Foreign functions are gathered
/// into one `extern` block per distinct header, placed where the first of
/// them appears.
pub fn declarations(kinds: &Kinds) -> syn::Result<Vec<Item>> {
	let mut items = Vec::with_capacity(kinds.len());
	for group in &kinds.consts {
		for entry in &group.entries {
			items.push(syn::parse2(entry.to_item(&group.ty))?);
		}
	}
	items.extend(kinds.types.iter().map(|t| match &t.node {
		TypeDef::Struct(s) => Item::Struct(s.clone()),
		TypeDef::Enum(e) => Item::Enum(e.clone()),
		TypeDef::Union(u) => Item::Union(u.clone()),
		TypeDef::Alias(a) => Item::Type(a.clone()),
	}));

	let mut blocks: FxHashMap<String, usize> = FxHashMap::default();
	for func in &kinds.funcs {
		match &func.node {
			FuncDef::Item(f) => items.push(Item::Fn(f.clone())),
			FuncDef::Foreign { header, func } => {
				let member = ForeignItem::Fn(func.clone());
				let key = canonical(header);
				match blocks.get(&key) {
					Some(&at) => {
						if let Item::ForeignMod(block) = &mut items[at] {
							block.items.push(member);
						}
					}
					None => {
						let mut block = header.clone();
						block.items.push(member);
						blocks.insert(key, items.len());
						items.push(Item::ForeignMod(block));
					}
				}
			}
		}
	}
	Ok(items)
}

/// Inner attributes present in every file, in the order of the first.
fn common_attrs(arches: &[&syn::File]) -> Vec<Attribute> {
	let Some((first, rest)) = arches.split_first() else {
		return Vec::new();
	};
	let text = |a: &Attribute| a.to_token_stream().to_string();
	first
		.attrs
		.iter()
		.filter(|attr| {
			let attr = text(*attr);
			rest.iter().all(|file| file.attrs.iter().any(|a| text(a) == attr))
		})
		.cloned()
		.collect()
}

/// `use` items present in every file, in the order of the first.
fn common_uses(arches: &[&syn::File]) -> Vec<ItemUse> {
	let Some((first, rest)) = arches.split_first() else {
		return Vec::new();
	};
	let uses = |file: &syn::File| -> FxHashSet<String> {
		file.items
			.iter()
			.filter(|item| matches!(item, Item::Use(_)))
			.map(canonical)
			.collect()
	};
	let others: Vec<FxHashSet<String>> = rest.iter().copied().map(uses).collect();
	first
		.items
		.iter()
		.filter_map(|item| match item {
			Item::Use(u) => Some(u),
			_ => None,
		})
		.filter(|u| {
			let key = canonical(*u);
			others.iter().all(|set| set.contains(&key))
		})
		.cloned()
		.collect()
}

fn referenced_idents(items: &[Item]) -> FxHashSet<String> {
	fn walk(tokens: TokenStream, out: &mut FxHashSet<String>) {
		for tree in tokens {
			match tree {
				TokenTree::Ident(ident) => {
					out.insert(ident.to_string());
				}
				TokenTree::Group(group) => walk(group.stream(), out),
				_ => {}
			}
		}
	}
	let mut out = FxHashSet::default();
	for item in items {
		walk(item.to_token_stream(), &mut out);
	}
	out
}

/// Whether a `use` tree brings a referenced name into scope. Globs and
/// `self` imports always count.
fn provides(tree: &UseTree, referenced: &FxHashSet<String>) -> bool {
	match tree {
		UseTree::Path(p) => provides(&p.tree, referenced),
		UseTree::Name(n) => n.ident == "self" || referenced.contains(&n.ident.to_string()),
		UseTree::Rename(r) => referenced.contains(&r.rename.to_string()),
		UseTree::Glob(_) => true,
		UseTree::Group(g) => g.items.iter().any(|t| provides(t, referenced)),
	}
}

/// A buffered output file that must be closed with [`BufferedFile::finish`]
/// to observe write errors.
pub struct BufferedFile {
	path: PathBuf,
	writer: BufWriter<File>,
}

impl BufferedFile {
	/// Creates or truncates the file at `path`.
	pub fn create(path: &Path) -> Result<Self> {
		let file = File::create(path).map_err(MergeError::io(path))?;
		Ok(Self {
			path: path.to_path_buf(),
			writer: BufWriter::new(file),
		})
	}

	/// Flushes buffered output and closes the file.
	pub fn finish(self) -> Result<()> {
		let Self { path, writer } = self;
		writer.into_inner().map(drop).map_err(|e| MergeError::Io {
			path,
			error: e.into_error(),
		})
	}
}

impl Write for BufferedFile {
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.writer.write(buf)
	}

	fn flush(&mut self) -> io::Result<()> {
		self.writer.flush()
	}
}

/// Renders `ast` into the file at `path`.
pub fn write_source(path: &Path, ast: &syn::File) -> Result<()> {
	let mut out = BufferedFile::create(path)?;
	out.write_all(render_file(ast).as_bytes()).map_err(MergeError::io(path))?;
	out.finish()
}
