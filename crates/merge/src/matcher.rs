//! Deciding whether two declarations are the same.

use syn::ItemForeignMod;
use sysmerge_astutil::RenderCache;
use sysmerge_astutil::equal::{self, Outcome};

use crate::kinds::{ConstDecl, Decl, DeclId, FuncDef, TypeDef};
use crate::options::{CompareMode, FuncMatch};

/// The part of a declaration a cached rendering covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Facet {
	/// A constant's attributes, visibility, name and value.
	Binding,
	/// A whole declaration.
	Whole,
	/// A function body.
	Body,
}

/// Equality strategy of one run, with the run's rendering cache.
pub struct Matcher {
	compare: CompareMode,
	funcs: FuncMatch,
	cache: RenderCache<(DeclId, Facet)>,
}

impl Matcher {
	pub fn new(compare: CompareMode, funcs: FuncMatch) -> Self {
		Self {
			compare,
			funcs,
			cache: RenderCache::new(),
		}
	}

	/// Two constants of type-equal groups are the same when their
	/// attributes, visibility, name and value are.
	pub fn same_const(&mut self, a: &ConstDecl, b: &ConstDecl) -> Outcome {
		match self.compare {
			CompareMode::Rendered => {
				let left = self.cache.render_with((a.id, Facet::Binding), || a.binding_tokens());
				let right = self.cache.render_with((b.id, Facet::Binding), || b.binding_tokens());
				Ok(left == right)
			}
			CompareMode::Structural => Ok(a.ident == b.ident
				&& equal::vis(&a.vis, &b.vis)
				&& equal::attrs(&a.attrs, &b.attrs)
				&& equal::opt_expr(a.value.as_ref(), b.value.as_ref())?),
		}
	}

	/// Type definitions are compared whole, name included.
	pub fn same_type(&mut self, a: &Decl<TypeDef>, b: &Decl<TypeDef>) -> Outcome {
		match self.compare {
			CompareMode::Rendered => Ok(self.whole(a) == self.whole(b)),
			CompareMode::Structural => match (&a.node, &b.node) {
				(TypeDef::Struct(x), TypeDef::Struct(y)) => equal::item_struct(x, y),
				(TypeDef::Enum(x), TypeDef::Enum(y)) => equal::item_enum(x, y),
				(TypeDef::Union(x), TypeDef::Union(y)) => equal::item_union(x, y),
				(TypeDef::Alias(x), TypeDef::Alias(y)) => equal::item_type(x, y),
				_ => Ok(false),
			},
		}
	}

	/// Functions are compared by name, signature and body, or by body alone
	/// under [`FuncMatch::BodyOnly`]. Foreign functions have no body and are
	/// always compared strictly, `extern` header included.
	pub fn same_func(&mut self, a: &Decl<FuncDef>, b: &Decl<FuncDef>) -> Outcome {
		match (&a.node, &b.node) {
			(FuncDef::Item(x), FuncDef::Item(y)) => match (self.funcs, self.compare) {
				(FuncMatch::Strict, CompareMode::Rendered) => Ok(self.whole(a) == self.whole(b)),
				(FuncMatch::Strict, CompareMode::Structural) => equal::item_fn(x, y),
				(FuncMatch::BodyOnly, CompareMode::Rendered) => {
					let left = self.cache.render((a.id, Facet::Body), &*x.block);
					let right = self.cache.render((b.id, Facet::Body), &*y.block);
					Ok(left == right)
				}
				(FuncMatch::BodyOnly, CompareMode::Structural) => equal::block(&x.block, &y.block),
			},
			(
				FuncDef::Foreign {
					header: hx,
					func: x,
				},
				FuncDef::Foreign {
					header: hy,
					func: y,
				},
			) => match self.compare {
				CompareMode::Rendered => Ok(self.whole(a) == self.whole(b)),
				CompareMode::Structural => Ok(same_header(hx, hy) && equal::foreign_fn(x, y)?),
			},
			_ => Ok(false),
		}
	}

	fn whole<T: quote::ToTokens>(&mut self, decl: &Decl<T>) -> std::rc::Rc<str> {
		self.cache.render((decl.id, Facet::Whole), &decl.node)
	}

	/// Renderings computed so far.
	pub fn cached(&self) -> usize {
		self.cache.len()
	}

	/// Cache lookups answered without rendering.
	pub fn hits(&self) -> usize {
		self.cache.hits()
	}

	/// Cache lookups that rendered.
	pub fn misses(&self) -> usize {
		self.cache.misses()
	}
}

fn same_header(a: &ItemForeignMod, b: &ItemForeignMod) -> bool {
	a.unsafety.is_some() == b.unsafety.is_some()
		&& equal::abi(Some(&a.abi), Some(&b.abi))
		&& equal::attrs(&a.attrs, &b.attrs)
}
