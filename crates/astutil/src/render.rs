//! Canonical rendering of syntax nodes, memoized per declaration.
//!
//! A node's canonical form is its token text with every doc attribute
//! removed, at any nesting depth. Spans never reach the text, so two
//! declarations written with different layout or comments render the same.

use std::hash::Hash;
use std::rc::Rc;

use proc_macro2::{Delimiter, Group, TokenStream, TokenTree};
use quote::ToTokens;
use rustc_hash::FxHashMap;

/// Renders `node` to its canonical string.
pub fn canonical<T: ToTokens + ?Sized>(node: &T) -> String {
	strip_docs(node.to_token_stream()).to_string()
}

/// Removes `#[doc = ..]` and `#![doc = ..]` attributes from a token stream.
pub fn strip_docs(tokens: TokenStream) -> TokenStream {
	let trees: Vec<TokenTree> = tokens.into_iter().collect();
	let mut out = Vec::with_capacity(trees.len());
	let mut i = 0;
	while i < trees.len() {
		if let Some(len) = doc_attr_len(&trees[i..]) {
			i += len;
			continue;
		}
		match &trees[i] {
			TokenTree::Group(group) => {
				let inner = Group::new(group.delimiter(), strip_docs(group.stream()));
				out.push(TokenTree::Group(inner));
			}
			tree => out.push(tree.clone()),
		}
		i += 1;
	}
	out.into_iter().collect()
}

/// Number of leading tokens forming a doc attribute, if there is one.
fn doc_attr_len(trees: &[TokenTree]) -> Option<usize> {
	let TokenTree::Punct(pound) = trees.first()? else {
		return None;
	};
	if pound.as_char() != '#' {
		return None;
	}
	let mut len = 1;
	if let Some(TokenTree::Punct(bang)) = trees.get(1)
		&& bang.as_char() == '!'
	{
		len = 2;
	}
	let TokenTree::Group(group) = trees.get(len)? else {
		return None;
	};
	if group.delimiter() != Delimiter::Bracket {
		return None;
	}
	match group.stream().into_iter().next() {
		Some(TokenTree::Ident(ident)) if ident == "doc" => Some(len + 1),
		_ => None,
	}
}

/// Memoized canonical renderings, keyed by declaration identity.
///
/// A cache belongs to one consolidation run. Keys are only meaningful for
/// the files parsed in that run, so a cache must never outlive it.
pub struct RenderCache<K> {
	entries: FxHashMap<K, Rc<str>>,
	hits: usize,
	misses: usize,
}

impl<K: Eq + Hash> RenderCache<K> {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self {
			entries: FxHashMap::default(),
			hits: 0,
			misses: 0,
		}
	}

	/// Returns the canonical rendering of `node`, computing it on first use.
	pub fn render<T: ToTokens + ?Sized>(&mut self, key: K, node: &T) -> Rc<str> {
		self.render_with(key, || node.to_token_stream())
	}

	/// Like [`Self::render`], for nodes that must be assembled before
	/// rendering. `tokens` only runs on a cache miss.
	pub fn render_with(&mut self, key: K, tokens: impl FnOnce() -> TokenStream) -> Rc<str> {
		if let Some(rendered) = self.entries.get(&key) {
			self.hits += 1;
			return Rc::clone(rendered);
		}
		self.misses += 1;
		let rendered: Rc<str> = strip_docs(tokens()).to_string().into();
		self.entries.insert(key, Rc::clone(&rendered));
		rendered
	}

	/// Number of cached renderings.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns true if nothing has been rendered yet.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Lookups answered from the cache.
	pub fn hits(&self) -> usize {
		self.hits
	}

	/// Lookups that had to render.
	pub fn misses(&self) -> usize {
		self.misses
	}
}

impl<K: Eq + Hash> Default for RenderCache<K> {
	fn default() -> Self {
		Self::new()
	}
}
