//! Declaration buckets: the constants, types and functions of one file.
//!
//! A [`Kinds`] holds owned copies of declarations, each tagged with the
//! [`DeclId`] of the item it was extracted from. Set operations narrow a
//! bucket in place; [`Kinds::trim_file`] then projects the surviving ids
//! back onto the file's syntax tree.

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use rustc_hash::FxHashSet;
use syn::parse::{Parse, ParseStream};
use syn::{
	Attribute, Expr, ForeignItem, ForeignItemFn, Ident, Item, ItemEnum, ItemFn, ItemForeignMod,
	ItemStruct, ItemType, ItemUnion, Token, Type, Visibility,
};
use sysmerge_astutil::{UnsupportedShape, equal};

use crate::matcher::Matcher;

type Outcome<T = ()> = Result<T, UnsupportedShape>;

/// Identifies one parsed file within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) u32);

/// Identity of a declaration: the top-level item it came from and, for a
/// foreign function, its position inside the `extern` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId {
	pub file: FileId,
	pub item: usize,
	pub member: Option<usize>,
}

impl DeclId {
	fn item(file: FileId, item: usize) -> Self {
		Self {
			file,
			item,
			member: None,
		}
	}
}

/// A declaration together with its identity.
#[derive(Clone)]
pub struct Decl<T> {
	pub id: DeclId,
	pub node: T,
}

/// One constant binding. The declared type lives on the enclosing
/// [`ConstGroup`].
#[derive(Clone)]
pub struct ConstDecl {
	pub id: DeclId,
	pub attrs: Vec<Attribute>,
	pub vis: Visibility,
	pub ident: Ident,
	/// `None` for the value-less `const NAME: Ty;` form.
	pub value: Option<Expr>,
}

impl ConstDecl {
	/// Rebuilds the full item under `ty`.
	pub fn to_item(&self, ty: &Type) -> TokenStream {
		let Self {
			attrs, vis, ident, ..
		} = self;
		match &self.value {
			Some(value) => quote!(#(#attrs)* #vis const #ident: #ty = #value;),
			None => quote!(#(#attrs)* #vis const #ident: #ty;),
		}
	}

	/// Tokens identifying the binding within its group: attributes,
	/// visibility, name and value.
	pub fn binding_tokens(&self) -> TokenStream {
		let Self {
			attrs,
			vis,
			ident,
			value,
			..
		} = self;
		quote!(#(#attrs)* #vis #ident = #value)
	}
}

/// Constants sharing one declared type, in declaration order.
#[derive(Clone)]
pub struct ConstGroup {
	pub ty: Type,
	pub entries: Vec<ConstDecl>,
}

/// A value-less constant, `const NAME: Ty;`, which `syn` only yields as a
/// verbatim item.
pub struct BareConst {
	pub attrs: Vec<Attribute>,
	pub vis: Visibility,
	pub ident: Ident,
	pub ty: Type,
}

impl Parse for BareConst {
	fn parse(input: ParseStream) -> syn::Result<Self> {
		let attrs = input.call(Attribute::parse_outer)?;
		let vis = input.parse()?;
		input.parse::<Token![const]>()?;
		let ident = input.parse()?;
		input.parse::<Token![:]>()?;
		let ty = input.parse()?;
		input.parse::<Token![;]>()?;
		Ok(Self {
			attrs,
			vis,
			ident,
			ty,
		})
	}
}

/// A type definition.
#[derive(Clone)]
pub enum TypeDef {
	Struct(ItemStruct),
	Enum(ItemEnum),
	Union(ItemUnion),
	Alias(ItemType),
}

impl TypeDef {
	pub fn ident(&self) -> &Ident {
		match self {
			Self::Struct(s) => &s.ident,
			Self::Enum(e) => &e.ident,
			Self::Union(u) => &u.ident,
			Self::Alias(t) => &t.ident,
		}
	}
}

impl ToTokens for TypeDef {
	fn to_tokens(&self, tokens: &mut TokenStream) {
		match self {
			Self::Struct(s) => s.to_tokens(tokens),
			Self::Enum(e) => e.to_tokens(tokens),
			Self::Union(u) => u.to_tokens(tokens),
			Self::Alias(t) => t.to_tokens(tokens),
		}
	}
}

/// A function definition, or a foreign function with the header of the
/// `extern` block declaring it.
#[derive(Clone)]
pub enum FuncDef {
	Item(ItemFn),
	Foreign {
		/// The enclosing block with its items removed.
		header: ItemForeignMod,
		func: ForeignItemFn,
	},
}

impl FuncDef {
	pub fn ident(&self) -> &Ident {
		match self {
			Self::Item(f) => &f.sig.ident,
			Self::Foreign { func, .. } => &func.sig.ident,
		}
	}
}

impl ToTokens for FuncDef {
	/// Item functions render as themselves, foreign functions as a
	/// one-member `extern` block.
	fn to_tokens(&self, tokens: &mut TokenStream) {
		match self {
			Self::Item(f) => f.to_tokens(tokens),
			Self::Foreign { header, func } => {
				let mut block = header.clone();
				block.items.push(ForeignItem::Fn(func.clone()));
				block.to_tokens(tokens);
			}
		}
	}
}

/// The constants, types and functions of a file, or the subset of them
/// shared across files.
#[derive(Clone, Default)]
pub struct Kinds {
	pub consts: Vec<ConstGroup>,
	pub types: Vec<Decl<TypeDef>>,
	pub funcs: Vec<Decl<FuncDef>>,
}

impl Kinds {
	/// Collects the declarations of `ast` in item order.
	pub fn extract(file: FileId, ast: &syn::File) -> Outcome<Self> {
		let mut kinds = Self::default();
		for (index, item) in ast.items.iter().enumerate() {
			let id = DeclId::item(file, index);
			match item {
				Item::Const(c) => {
					let entry = ConstDecl {
						id,
						attrs: c.attrs.clone(),
						vis: c.vis.clone(),
						ident: c.ident.clone(),
						value: Some((*c.expr).clone()),
					};
					kinds.push_const(&c.ty, entry)?;
				}
				Item::Verbatim(tokens) => {
					let bare: BareConst = syn::parse2(tokens.clone())
						.map_err(|_| UnsupportedShape::new("item", tokens))?;
					let entry = ConstDecl {
						id,
						attrs: bare.attrs,
						vis: bare.vis,
						ident: bare.ident,
						value: None,
					};
					kinds.push_const(&bare.ty, entry)?;
				}
				Item::Struct(s) => kinds.push_type(id, TypeDef::Struct(s.clone())),
				Item::Enum(e) => kinds.push_type(id, TypeDef::Enum(e.clone())),
				Item::Union(u) => kinds.push_type(id, TypeDef::Union(u.clone())),
				Item::Type(t) => kinds.push_type(id, TypeDef::Alias(t.clone())),
				Item::Fn(f) => kinds.funcs.push(Decl {
					id,
					node: FuncDef::Item(f.clone()),
				}),
				Item::ForeignMod(block) => {
					let header = ItemForeignMod {
						items: Vec::new(),
						..block.clone()
					};
					for (member, foreign) in block.items.iter().enumerate() {
						if let ForeignItem::Fn(func) = foreign {
							kinds.funcs.push(Decl {
								id: DeclId {
									member: Some(member),
									..id
								},
								node: FuncDef::Foreign {
									header: header.clone(),
									func: func.clone(),
								},
							});
						}
					}
				}
				_ => {}
			}
		}
		Ok(kinds)
	}

	fn push_const(&mut self, ty: &Type, entry: ConstDecl) -> Outcome {
		for group in &mut self.consts {
			if equal::ty(&group.ty, ty)? {
				group.entries.push(entry);
				return Ok(());
			}
		}
		self.consts.push(ConstGroup {
			ty: ty.clone(),
			entries: vec![entry],
		});
		Ok(())
	}

	fn push_type(&mut self, id: DeclId, node: TypeDef) {
		self.types.push(Decl { id, node });
	}

	/// Keeps only the declarations that also appear in `other`.
	pub fn intersect(&mut self, other: &Kinds, matcher: &mut Matcher) -> Outcome {
		for group in &mut self.consts {
			match other.group_of(&group.ty)? {
				Some(theirs) => retain(&mut group.entries, |c| {
					any(&theirs.entries, |o| matcher.same_const(c, o))
				})?,
				None => group.entries.clear(),
			}
		}
		self.consts.retain(|g| !g.entries.is_empty());
		retain(&mut self.types, |t| {
			any(&other.types, |o| matcher.same_type(t, o))
		})?;
		retain(&mut self.funcs, |f| {
			any(&other.funcs, |o| matcher.same_func(f, o))
		})
	}

	/// Removes the declarations that also appear in `other`.
	pub fn difference(&mut self, other: &Kinds, matcher: &mut Matcher) -> Outcome {
		for group in &mut self.consts {
			if let Some(theirs) = other.group_of(&group.ty)? {
				retain(&mut group.entries, |c| {
					Ok(!any(&theirs.entries, |o| matcher.same_const(c, o))?)
				})?;
			}
		}
		self.consts.retain(|g| !g.entries.is_empty());
		retain(&mut self.types, |t| {
			Ok(!any(&other.types, |o| matcher.same_type(t, o))?)
		})?;
		retain(&mut self.funcs, |f| {
			Ok(!any(&other.funcs, |o| matcher.same_func(f, o))?)
		})
	}

	/// Moves every declaration of `other` into `self`, joining constant
	/// groups of equal type.
	pub fn append(&mut self, other: Kinds) -> Outcome {
		for group in other.consts {
			for entry in group.entries {
				self.push_const(&group.ty, entry)?;
			}
		}
		self.types.extend(other.types);
		self.funcs.extend(other.funcs);
		Ok(())
	}

	/// Folds `next` into an accumulator: the first bucket seeds it, every
	/// later one narrows it.
	pub fn fold_intersect(acc: &mut Option<Kinds>, next: &Kinds, matcher: &mut Matcher) -> Outcome {
		match acc {
			Some(acc) => acc.intersect(next, matcher),
			None => {
				*acc = Some(next.clone());
				Ok(())
			}
		}
	}

	fn group_of(&self, ty: &Type) -> Outcome<Option<&ConstGroup>> {
		for group in &self.consts {
			if equal::ty(&group.ty, ty)? {
				return Ok(Some(group));
			}
		}
		Ok(None)
	}

	/// Number of constant bindings across all groups.
	pub fn const_count(&self) -> usize {
		self.consts.iter().map(|g| g.entries.len()).sum()
	}

	/// Total number of declarations.
	pub fn len(&self) -> usize {
		self.const_count() + self.types.len() + self.funcs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Ids of every declaration in the bucket.
	pub fn ids(&self) -> FxHashSet<DeclId> {
		let consts = self.consts.iter().flat_map(|g| g.entries.iter().map(|c| c.id));
		let types = self.types.iter().map(|t| t.id);
		let funcs = self.funcs.iter().map(|f| f.id);
		consts.chain(types).chain(funcs).collect()
	}

	/// Drops from `ast` every declaration of `file` that is not in this
	/// bucket. Other items are left alone and survivors keep their order.
	/// An `extern` block whose functions were all dropped goes with them.
	///
	/// Returns true if anything was removed.
	pub fn trim_file(&self, file: FileId, ast: &mut syn::File) -> bool {
		let keep = self.ids();
		let before = ast.items.len();
		let mut removed = false;
		let mut index = 0;
		ast.items.retain_mut(|item| {
			let id = DeclId::item(file, index);
			index += 1;
			match item {
				Item::Const(_)
				| Item::Verbatim(_)
				| Item::Struct(_)
				| Item::Enum(_)
				| Item::Union(_)
				| Item::Type(_)
				| Item::Fn(_) => keep.contains(&id),
				Item::ForeignMod(block) => {
					let mut member = 0;
					let mut had_funcs = false;
					block.items.retain(|foreign| {
						let id = DeclId {
							member: Some(member),
							..id
						};
						member += 1;
						if !matches!(foreign, ForeignItem::Fn(_)) {
							return true;
						}
						had_funcs = true;
						let kept = keep.contains(&id);
						removed |= !kept;
						kept
					});
					!had_funcs || !block.items.is_empty()
				}
				_ => true,
			}
		});
		removed || ast.items.len() != before
	}
}

/// `Vec::retain` with a fallible predicate. The first error stops further
/// evaluation and is returned; the vector is then left partially filtered.
fn retain<T>(items: &mut Vec<T>, mut keep: impl FnMut(&T) -> Outcome<bool>) -> Outcome {
	let mut failure = None;
	items.retain(|item| {
		if failure.is_some() {
			return true;
		}
		keep(item).unwrap_or_else(|err| {
			failure = Some(err);
			true
		})
	});
	failure.map_or(Ok(()), Err)
}

fn any<T>(items: &[T], mut pred: impl FnMut(&T) -> Outcome<bool>) -> Outcome<bool> {
	for item in items {
		if pred(item)? {
			return Ok(true);
		}
	}
	Ok(false)
}

#[cfg(test)]
mod tests;
