//! Structural equality over `syn` syntax trees.
//!
//! Every comparator returns [`Outcome`]: `Ok(true)` when both nodes have the
//! same shape and the same sub-components, `Ok(false)` when they differ, and
//! `Err` when either side holds a shape this module cannot compare.
//!
//! Spans and doc attributes never take part in the comparison. Leaves with
//! no inner structure (literals, operators, visibility, attributes, macro
//! bodies) compare by their token text, so `0x10` and `16` are different.

use std::ptr;

use quote::ToTokens;
use syn::{
	Abi, AngleBracketedGenericArguments, Arm, Attribute, BareFnArg, Block, BoundLifetimes, Expr,
	ExprClosure, ExprStruct, Field, FieldPat, FieldValue, Fields, FnArg, ForeignItemFn,
	GenericArgument, GenericParam, Generics, Item, ItemConst, ItemEnum, ItemFn, ItemStruct,
	ItemType, ItemUnion, Label, Local, LocalInit, Pat, Path, PathArguments, PathSegment, QSelf,
	ReturnType, Signature, Stmt, Type, TypeBareFn, TypeParamBound, Variant, Visibility,
	WhereClause, WherePredicate,
};

use crate::UnsupportedShape;

/// Result of a structural comparison.
pub type Outcome = Result<bool, UnsupportedShape>;

/// Compares two expressions, outer attributes included.
pub fn expr(a: &Expr, b: &Expr) -> Outcome {
	if ptr::eq(a, b) {
		return Ok(true);
	}
	if let (Some(x), Some(y)) = (expr_attrs(a), expr_attrs(b))
		&& !attrs(x, y)
	{
		return Ok(false);
	}
	match (a, b) {
		(Expr::Array(a), Expr::Array(b)) => pairs(a.elems.iter(), b.elems.iter(), expr),
		(Expr::Assign(a), Expr::Assign(b)) => {
			Ok(expr(&a.left, &b.left)? && expr(&a.right, &b.right)?)
		}
		(Expr::Binary(a), Expr::Binary(b)) => {
			Ok(tokens(&a.op, &b.op) && expr(&a.left, &b.left)? && expr(&a.right, &b.right)?)
		}
		(Expr::Block(a), Expr::Block(b)) => {
			Ok(label(&a.label, &b.label) && block(&a.block, &b.block)?)
		}
		(Expr::Break(a), Expr::Break(b)) => {
			Ok(a.label == b.label && opt(a.expr.as_deref(), b.expr.as_deref(), expr)?)
		}
		(Expr::Call(a), Expr::Call(b)) => {
			Ok(expr(&a.func, &b.func)? && pairs(a.args.iter(), b.args.iter(), expr)?)
		}
		(Expr::Cast(a), Expr::Cast(b)) => Ok(expr(&a.expr, &b.expr)? && ty(&a.ty, &b.ty)?),
		(Expr::Closure(a), Expr::Closure(b)) => closure(a, b),
		(Expr::Continue(a), Expr::Continue(b)) => Ok(a.label == b.label),
		(Expr::Field(a), Expr::Field(b)) => Ok(a.member == b.member && expr(&a.base, &b.base)?),
		(Expr::ForLoop(a), Expr::ForLoop(b)) => Ok(label(&a.label, &b.label)
			&& pat(&a.pat, &b.pat)?
			&& expr(&a.expr, &b.expr)?
			&& block(&a.body, &b.body)?),
		(Expr::Group(a), Expr::Group(b)) => expr(&a.expr, &b.expr),
		(Expr::If(a), Expr::If(b)) => Ok(expr(&a.cond, &b.cond)?
			&& block(&a.then_branch, &b.then_branch)?
			&& opt(
				a.else_branch.as_ref().map(|(_, e)| &**e),
				b.else_branch.as_ref().map(|(_, e)| &**e),
				expr,
			)?),
		(Expr::Index(a), Expr::Index(b)) => {
			Ok(expr(&a.expr, &b.expr)? && expr(&a.index, &b.index)?)
		}
		(Expr::Let(a), Expr::Let(b)) => Ok(pat(&a.pat, &b.pat)? && expr(&a.expr, &b.expr)?),
		(Expr::Lit(a), Expr::Lit(b)) => Ok(tokens(&a.lit, &b.lit)),
		(Expr::Loop(a), Expr::Loop(b)) => {
			Ok(label(&a.label, &b.label) && block(&a.body, &b.body)?)
		}
		(Expr::Macro(a), Expr::Macro(b)) => Ok(tokens(&a.mac, &b.mac)),
		(Expr::Match(a), Expr::Match(b)) => {
			Ok(expr(&a.expr, &b.expr)? && pairs(a.arms.iter(), b.arms.iter(), arm)?)
		}
		(Expr::MethodCall(a), Expr::MethodCall(b)) => Ok(a.method == b.method
			&& opt(a.turbofish.as_ref(), b.turbofish.as_ref(), angle_args)?
			&& expr(&a.receiver, &b.receiver)?
			&& pairs(a.args.iter(), b.args.iter(), expr)?),
		(Expr::Paren(a), Expr::Paren(b)) => expr(&a.expr, &b.expr),
		(Expr::Path(a), Expr::Path(b)) => {
			Ok(opt(a.qself.as_ref(), b.qself.as_ref(), qself)? && path(&a.path, &b.path)?)
		}
		(Expr::Range(a), Expr::Range(b)) => Ok(tokens(&a.limits, &b.limits)
			&& opt(a.start.as_deref(), b.start.as_deref(), expr)?
			&& opt(a.end.as_deref(), b.end.as_deref(), expr)?),
		(Expr::Reference(a), Expr::Reference(b)) => Ok(a.mutability.is_some()
			== b.mutability.is_some()
			&& expr(&a.expr, &b.expr)?),
		(Expr::Repeat(a), Expr::Repeat(b)) => Ok(expr(&a.expr, &b.expr)? && expr(&a.len, &b.len)?),
		(Expr::Return(a), Expr::Return(b)) => opt(a.expr.as_deref(), b.expr.as_deref(), expr),
		(Expr::Struct(a), Expr::Struct(b)) => struct_lit(a, b),
		(Expr::Try(a), Expr::Try(b)) => expr(&a.expr, &b.expr),
		(Expr::Tuple(a), Expr::Tuple(b)) => pairs(a.elems.iter(), b.elems.iter(), expr),
		(Expr::Unary(a), Expr::Unary(b)) => Ok(tokens(&a.op, &b.op) && expr(&a.expr, &b.expr)?),
		(Expr::Unsafe(a), Expr::Unsafe(b)) => block(&a.block, &b.block),
		(Expr::While(a), Expr::While(b)) => Ok(label(&a.label, &b.label)
			&& expr(&a.cond, &b.cond)?
			&& block(&a.body, &b.body)?),
		_ => mismatch(a, b, expr_supported, "expression"),
	}
}

/// Compares two optional expressions. Absent on both sides is equal.
pub fn opt_expr(a: Option<&Expr>, b: Option<&Expr>) -> Outcome {
	opt(a, b, expr)
}

fn expr_supported(e: &Expr) -> bool {
	matches!(
		e,
		Expr::Array(_)
			| Expr::Assign(_)
			| Expr::Binary(_)
			| Expr::Block(_)
			| Expr::Break(_)
			| Expr::Call(_)
			| Expr::Cast(_)
			| Expr::Closure(_)
			| Expr::Continue(_)
			| Expr::Field(_)
			| Expr::ForLoop(_)
			| Expr::Group(_)
			| Expr::If(_)
			| Expr::Index(_)
			| Expr::Let(_)
			| Expr::Lit(_)
			| Expr::Loop(_)
			| Expr::Macro(_)
			| Expr::Match(_)
			| Expr::MethodCall(_)
			| Expr::Paren(_)
			| Expr::Path(_)
			| Expr::Range(_)
			| Expr::Reference(_)
			| Expr::Repeat(_)
			| Expr::Return(_)
			| Expr::Struct(_)
			| Expr::Try(_)
			| Expr::Tuple(_)
			| Expr::Unary(_)
			| Expr::Unsafe(_)
			| Expr::While(_)
	)
}

fn expr_attrs(e: &Expr) -> Option<&[Attribute]> {
	let attrs = match e {
		Expr::Array(e) => &e.attrs,
		Expr::Assign(e) => &e.attrs,
		Expr::Binary(e) => &e.attrs,
		Expr::Block(e) => &e.attrs,
		Expr::Break(e) => &e.attrs,
		Expr::Call(e) => &e.attrs,
		Expr::Cast(e) => &e.attrs,
		Expr::Closure(e) => &e.attrs,
		Expr::Continue(e) => &e.attrs,
		Expr::Field(e) => &e.attrs,
		Expr::ForLoop(e) => &e.attrs,
		Expr::Group(e) => &e.attrs,
		Expr::If(e) => &e.attrs,
		Expr::Index(e) => &e.attrs,
		Expr::Let(e) => &e.attrs,
		Expr::Lit(e) => &e.attrs,
		Expr::Loop(e) => &e.attrs,
		Expr::Macro(e) => &e.attrs,
		Expr::Match(e) => &e.attrs,
		Expr::MethodCall(e) => &e.attrs,
		Expr::Paren(e) => &e.attrs,
		Expr::Path(e) => &e.attrs,
		Expr::Range(e) => &e.attrs,
		Expr::Reference(e) => &e.attrs,
		Expr::Repeat(e) => &e.attrs,
		Expr::Return(e) => &e.attrs,
		Expr::Struct(e) => &e.attrs,
		Expr::Try(e) => &e.attrs,
		Expr::Tuple(e) => &e.attrs,
		Expr::Unary(e) => &e.attrs,
		Expr::Unsafe(e) => &e.attrs,
		Expr::While(e) => &e.attrs,
		_ => return None,
	};
	Some(attrs)
}

fn closure(a: &ExprClosure, b: &ExprClosure) -> Outcome {
	Ok(a.capture.is_some() == b.capture.is_some()
		&& a.asyncness.is_some() == b.asyncness.is_some()
		&& a.constness.is_some() == b.constness.is_some()
		&& pairs(a.inputs.iter(), b.inputs.iter(), pat)?
		&& return_type(&a.output, &b.output)?
		&& expr(&a.body, &b.body)?)
}

fn struct_lit(a: &ExprStruct, b: &ExprStruct) -> Outcome {
	Ok(opt(a.qself.as_ref(), b.qself.as_ref(), qself)?
		&& path(&a.path, &b.path)?
		&& pairs(a.fields.iter(), b.fields.iter(), field_value)?
		&& a.dot2_token.is_some() == b.dot2_token.is_some()
		&& opt(a.rest.as_deref(), b.rest.as_deref(), expr)?)
}

fn field_value(a: &FieldValue, b: &FieldValue) -> Outcome {
	Ok(a.member == b.member && attrs(&a.attrs, &b.attrs) && expr(&a.expr, &b.expr)?)
}

fn arm(a: &Arm, b: &Arm) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& pat(&a.pat, &b.pat)?
		&& opt(
			a.guard.as_ref().map(|(_, g)| &**g),
			b.guard.as_ref().map(|(_, g)| &**g),
			expr,
		)? && expr(&a.body, &b.body)?)
}

fn label(a: &Option<Label>, b: &Option<Label>) -> bool {
	a.as_ref().map(|l| &l.name) == b.as_ref().map(|l| &l.name)
}

/// Compares two types.
pub fn ty(a: &Type, b: &Type) -> Outcome {
	if ptr::eq(a, b) {
		return Ok(true);
	}
	match (a, b) {
		(Type::Array(a), Type::Array(b)) => Ok(ty(&a.elem, &b.elem)? && expr(&a.len, &b.len)?),
		(Type::BareFn(a), Type::BareFn(b)) => bare_fn(a, b),
		(Type::Group(a), Type::Group(b)) => ty(&a.elem, &b.elem),
		(Type::ImplTrait(a), Type::ImplTrait(b)) => {
			pairs(a.bounds.iter(), b.bounds.iter(), bound)
		}
		(Type::Infer(_), Type::Infer(_)) | (Type::Never(_), Type::Never(_)) => Ok(true),
		(Type::Macro(a), Type::Macro(b)) => Ok(tokens(&a.mac, &b.mac)),
		(Type::Paren(a), Type::Paren(b)) => ty(&a.elem, &b.elem),
		(Type::Path(a), Type::Path(b)) => {
			Ok(opt(a.qself.as_ref(), b.qself.as_ref(), qself)? && path(&a.path, &b.path)?)
		}
		(Type::Ptr(a), Type::Ptr(b)) => Ok(a.const_token.is_some() == b.const_token.is_some()
			&& a.mutability.is_some() == b.mutability.is_some()
			&& ty(&a.elem, &b.elem)?),
		(Type::Reference(a), Type::Reference(b)) => Ok(a.lifetime == b.lifetime
			&& a.mutability.is_some() == b.mutability.is_some()
			&& ty(&a.elem, &b.elem)?),
		(Type::Slice(a), Type::Slice(b)) => ty(&a.elem, &b.elem),
		(Type::TraitObject(a), Type::TraitObject(b)) => Ok(a.dyn_token.is_some()
			== b.dyn_token.is_some()
			&& pairs(a.bounds.iter(), b.bounds.iter(), bound)?),
		(Type::Tuple(a), Type::Tuple(b)) => pairs(a.elems.iter(), b.elems.iter(), ty),
		_ => mismatch(a, b, ty_supported, "type"),
	}
}

/// Compares two optional types. Absent on both sides is equal.
pub fn opt_ty(a: Option<&Type>, b: Option<&Type>) -> Outcome {
	opt(a, b, ty)
}

fn ty_supported(t: &Type) -> bool {
	matches!(
		t,
		Type::Array(_)
			| Type::BareFn(_)
			| Type::Group(_)
			| Type::ImplTrait(_)
			| Type::Infer(_)
			| Type::Macro(_)
			| Type::Never(_)
			| Type::Paren(_)
			| Type::Path(_)
			| Type::Ptr(_)
			| Type::Reference(_)
			| Type::Slice(_)
			| Type::TraitObject(_)
			| Type::Tuple(_)
	)
}

fn bare_fn(a: &TypeBareFn, b: &TypeBareFn) -> Outcome {
	Ok(a.unsafety.is_some() == b.unsafety.is_some()
		&& abi(a.abi.as_ref(), b.abi.as_ref())
		&& opt(a.lifetimes.as_ref(), b.lifetimes.as_ref(), bound_lifetimes)?
		&& pairs(a.inputs.iter(), b.inputs.iter(), bare_fn_arg)?
		&& a.variadic.is_some() == b.variadic.is_some()
		&& return_type(&a.output, &b.output)?)
}

fn bare_fn_arg(a: &BareFnArg, b: &BareFnArg) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& a.name.as_ref().map(|(n, _)| n) == b.name.as_ref().map(|(n, _)| n)
		&& ty(&a.ty, &b.ty)?)
}

/// Compares two optional ABI specifiers by their text.
pub fn abi(a: Option<&Abi>, b: Option<&Abi>) -> bool {
	match (a, b) {
		(None, None) => true,
		(Some(a), Some(b)) => tokens(a, b),
		_ => false,
	}
}

fn bound(a: &TypeParamBound, b: &TypeParamBound) -> Outcome {
	match (a, b) {
		(TypeParamBound::Trait(a), TypeParamBound::Trait(b)) => Ok(tokens(&a.modifier, &b.modifier)
			&& opt(a.lifetimes.as_ref(), b.lifetimes.as_ref(), bound_lifetimes)?
			&& path(&a.path, &b.path)?),
		(TypeParamBound::Lifetime(a), TypeParamBound::Lifetime(b)) => Ok(a == b),
		_ => mismatch(
			a,
			b,
			|p| matches!(p, TypeParamBound::Trait(_) | TypeParamBound::Lifetime(_)),
			"bound",
		),
	}
}

fn bound_lifetimes(a: &BoundLifetimes, b: &BoundLifetimes) -> Outcome {
	pairs(a.lifetimes.iter(), b.lifetimes.iter(), generic_param)
}

fn qself(a: &QSelf, b: &QSelf) -> Outcome {
	Ok(a.position == b.position
		&& a.as_token.is_some() == b.as_token.is_some()
		&& ty(&a.ty, &b.ty)?)
}

fn return_type(a: &ReturnType, b: &ReturnType) -> Outcome {
	match (a, b) {
		(ReturnType::Default, ReturnType::Default) => Ok(true),
		(ReturnType::Type(_, a), ReturnType::Type(_, b)) => ty(a, b),
		_ => Ok(false),
	}
}

/// Compares two paths, including their generic arguments.
pub fn path(a: &Path, b: &Path) -> Outcome {
	Ok(a.leading_colon.is_some() == b.leading_colon.is_some()
		&& pairs(a.segments.iter(), b.segments.iter(), segment)?)
}

fn segment(a: &PathSegment, b: &PathSegment) -> Outcome {
	if a.ident != b.ident {
		return Ok(false);
	}
	match (&a.arguments, &b.arguments) {
		(PathArguments::None, PathArguments::None) => Ok(true),
		(PathArguments::AngleBracketed(a), PathArguments::AngleBracketed(b)) => angle_args(a, b),
		(PathArguments::Parenthesized(a), PathArguments::Parenthesized(b)) => {
			Ok(pairs(a.inputs.iter(), b.inputs.iter(), ty)? && return_type(&a.output, &b.output)?)
		}
		_ => Ok(false),
	}
}

fn angle_args(a: &AngleBracketedGenericArguments, b: &AngleBracketedGenericArguments) -> Outcome {
	pairs(a.args.iter(), b.args.iter(), generic_arg)
}

fn generic_arg(a: &GenericArgument, b: &GenericArgument) -> Outcome {
	match (a, b) {
		(GenericArgument::Lifetime(a), GenericArgument::Lifetime(b)) => Ok(a == b),
		(GenericArgument::Type(a), GenericArgument::Type(b)) => ty(a, b),
		(GenericArgument::Const(a), GenericArgument::Const(b)) => expr(a, b),
		(GenericArgument::AssocType(a), GenericArgument::AssocType(b)) => Ok(a.ident == b.ident
			&& opt(a.generics.as_ref(), b.generics.as_ref(), angle_args)?
			&& ty(&a.ty, &b.ty)?),
		_ => mismatch(
			a,
			b,
			|g| {
				matches!(
					g,
					GenericArgument::Lifetime(_)
						| GenericArgument::Type(_)
						| GenericArgument::Const(_)
						| GenericArgument::AssocType(_)
				)
			},
			"generic argument",
		),
	}
}

/// Compares two patterns, outer attributes included.
pub fn pat(a: &Pat, b: &Pat) -> Outcome {
	if let (Some(x), Some(y)) = (pat_attrs(a), pat_attrs(b))
		&& !attrs(x, y)
	{
		return Ok(false);
	}
	match (a, b) {
		(Pat::Ident(a), Pat::Ident(b)) => Ok(a.ident == b.ident
			&& a.by_ref.is_some() == b.by_ref.is_some()
			&& a.mutability.is_some() == b.mutability.is_some()
			&& opt(
				a.subpat.as_ref().map(|(_, p)| &**p),
				b.subpat.as_ref().map(|(_, p)| &**p),
				pat,
			)?),
		(Pat::Lit(a), Pat::Lit(b)) => Ok(tokens(&a.lit, &b.lit)),
		(Pat::Macro(a), Pat::Macro(b)) => Ok(tokens(&a.mac, &b.mac)),
		(Pat::Or(a), Pat::Or(b)) => pairs(a.cases.iter(), b.cases.iter(), pat),
		(Pat::Paren(a), Pat::Paren(b)) => pat(&a.pat, &b.pat),
		(Pat::Path(a), Pat::Path(b)) => {
			Ok(opt(a.qself.as_ref(), b.qself.as_ref(), qself)? && path(&a.path, &b.path)?)
		}
		(Pat::Range(a), Pat::Range(b)) => Ok(tokens(&a.limits, &b.limits)
			&& opt(a.start.as_deref(), b.start.as_deref(), expr)?
			&& opt(a.end.as_deref(), b.end.as_deref(), expr)?),
		(Pat::Reference(a), Pat::Reference(b)) => Ok(a.mutability.is_some()
			== b.mutability.is_some()
			&& pat(&a.pat, &b.pat)?),
		(Pat::Rest(_), Pat::Rest(_)) | (Pat::Wild(_), Pat::Wild(_)) => Ok(true),
		(Pat::Slice(a), Pat::Slice(b)) => pairs(a.elems.iter(), b.elems.iter(), pat),
		(Pat::Struct(a), Pat::Struct(b)) => Ok(opt(a.qself.as_ref(), b.qself.as_ref(), qself)?
			&& path(&a.path, &b.path)?
			&& a.rest.is_some() == b.rest.is_some()
			&& pairs(a.fields.iter(), b.fields.iter(), field_pat)?),
		(Pat::Tuple(a), Pat::Tuple(b)) => pairs(a.elems.iter(), b.elems.iter(), pat),
		(Pat::TupleStruct(a), Pat::TupleStruct(b)) => {
			Ok(opt(a.qself.as_ref(), b.qself.as_ref(), qself)?
				&& path(&a.path, &b.path)?
				&& pairs(a.elems.iter(), b.elems.iter(), pat)?)
		}
		(Pat::Type(a), Pat::Type(b)) => Ok(pat(&a.pat, &b.pat)? && ty(&a.ty, &b.ty)?),
		_ => mismatch(a, b, pat_supported, "pattern"),
	}
}

fn pat_supported(p: &Pat) -> bool {
	matches!(
		p,
		Pat::Ident(_)
			| Pat::Lit(_)
			| Pat::Macro(_)
			| Pat::Or(_)
			| Pat::Paren(_)
			| Pat::Path(_)
			| Pat::Range(_)
			| Pat::Reference(_)
			| Pat::Rest(_)
			| Pat::Slice(_)
			| Pat::Struct(_)
			| Pat::Tuple(_)
			| Pat::TupleStruct(_)
			| Pat::Type(_)
			| Pat::Wild(_)
	)
}

fn pat_attrs(p: &Pat) -> Option<&[Attribute]> {
	let attrs = match p {
		Pat::Ident(p) => &p.attrs,
		Pat::Lit(p) => &p.attrs,
		Pat::Macro(p) => &p.attrs,
		Pat::Or(p) => &p.attrs,
		Pat::Paren(p) => &p.attrs,
		Pat::Path(p) => &p.attrs,
		Pat::Range(p) => &p.attrs,
		Pat::Reference(p) => &p.attrs,
		Pat::Rest(p) => &p.attrs,
		Pat::Slice(p) => &p.attrs,
		Pat::Struct(p) => &p.attrs,
		Pat::Tuple(p) => &p.attrs,
		Pat::TupleStruct(p) => &p.attrs,
		Pat::Type(p) => &p.attrs,
		Pat::Wild(p) => &p.attrs,
		_ => return None,
	};
	Some(attrs)
}

fn field_pat(a: &FieldPat, b: &FieldPat) -> Outcome {
	Ok(a.member == b.member && attrs(&a.attrs, &b.attrs) && pat(&a.pat, &b.pat)?)
}

/// Compares two blocks statement by statement.
pub fn block(a: &Block, b: &Block) -> Outcome {
	pairs(a.stmts.iter(), b.stmts.iter(), stmt)
}

/// Compares two statements.
pub fn stmt(a: &Stmt, b: &Stmt) -> Outcome {
	match (a, b) {
		(Stmt::Local(a), Stmt::Local(b)) => local(a, b),
		(Stmt::Expr(a, sa), Stmt::Expr(b, sb)) => Ok(sa.is_some() == sb.is_some() && expr(a, b)?),
		(Stmt::Macro(a), Stmt::Macro(b)) => Ok(attrs(&a.attrs, &b.attrs)
			&& a.semi_token.is_some() == b.semi_token.is_some()
			&& tokens(&a.mac, &b.mac)),
		(Stmt::Item(a), Stmt::Item(b)) => item(a, b),
		_ => Ok(false),
	}
}

fn local(a: &Local, b: &Local) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& pat(&a.pat, &b.pat)?
		&& opt(a.init.as_ref(), b.init.as_ref(), local_init)?)
}

fn local_init(a: &LocalInit, b: &LocalInit) -> Outcome {
	Ok(expr(&a.expr, &b.expr)?
		&& opt(
			a.diverge.as_ref().map(|(_, e)| &**e),
			b.diverge.as_ref().map(|(_, e)| &**e),
			expr,
		)?)
}

/// Compares two items of the kinds that can appear in generated bindings.
pub fn item(a: &Item, b: &Item) -> Outcome {
	match (a, b) {
		(Item::Const(a), Item::Const(b)) => item_const(a, b),
		(Item::Enum(a), Item::Enum(b)) => item_enum(a, b),
		(Item::Fn(a), Item::Fn(b)) => item_fn(a, b),
		(Item::Struct(a), Item::Struct(b)) => item_struct(a, b),
		(Item::Type(a), Item::Type(b)) => item_type(a, b),
		(Item::Union(a), Item::Union(b)) => item_union(a, b),
		(Item::Use(a), Item::Use(b)) => Ok(attrs(&a.attrs, &b.attrs)
			&& vis(&a.vis, &b.vis)
			&& tokens(&a.tree, &b.tree)),
		_ => mismatch(
			a,
			b,
			|i| {
				matches!(
					i,
					Item::Const(_)
						| Item::Enum(_)
						| Item::Fn(_)
						| Item::Struct(_)
						| Item::Type(_)
						| Item::Union(_)
						| Item::Use(_)
				)
			},
			"item",
		),
	}
}

/// Compares two constant items: name, type, value, visibility, attributes.
pub fn item_const(a: &ItemConst, b: &ItemConst) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& a.ident == b.ident
		&& generics(&a.generics, &b.generics)?
		&& ty(&a.ty, &b.ty)?
		&& expr(&a.expr, &b.expr)?)
}

/// Compares two struct definitions.
pub fn item_struct(a: &ItemStruct, b: &ItemStruct) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& a.ident == b.ident
		&& generics(&a.generics, &b.generics)?
		&& fields(&a.fields, &b.fields)?)
}

/// Compares two enum definitions, variants in order.
pub fn item_enum(a: &ItemEnum, b: &ItemEnum) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& a.ident == b.ident
		&& generics(&a.generics, &b.generics)?
		&& pairs(a.variants.iter(), b.variants.iter(), variant)?)
}

fn variant(a: &Variant, b: &Variant) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& a.ident == b.ident
		&& fields(&a.fields, &b.fields)?
		&& opt(
			a.discriminant.as_ref().map(|(_, e)| e),
			b.discriminant.as_ref().map(|(_, e)| e),
			expr,
		)?)
}

/// Compares two union definitions.
pub fn item_union(a: &ItemUnion, b: &ItemUnion) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& a.ident == b.ident
		&& generics(&a.generics, &b.generics)?
		&& pairs(a.fields.named.iter(), b.fields.named.iter(), field)?)
}

/// Compares two type aliases.
pub fn item_type(a: &ItemType, b: &ItemType) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& a.ident == b.ident
		&& generics(&a.generics, &b.generics)?
		&& ty(&a.ty, &b.ty)?)
}

/// Compares two functions: signature and body.
pub fn item_fn(a: &ItemFn, b: &ItemFn) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& signature(&a.sig, &b.sig)?
		&& block(&a.block, &b.block)?)
}

/// Compares two foreign function declarations.
pub fn foreign_fn(a: &ForeignItemFn, b: &ForeignItemFn) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs) && vis(&a.vis, &b.vis) && signature(&a.sig, &b.sig)?)
}

/// Compares two field lists: same count, positionally equal fields.
pub fn fields(a: &Fields, b: &Fields) -> Outcome {
	match (a, b) {
		(Fields::Named(a), Fields::Named(b)) => pairs(a.named.iter(), b.named.iter(), field),
		(Fields::Unnamed(a), Fields::Unnamed(b)) => {
			pairs(a.unnamed.iter(), b.unnamed.iter(), field)
		}
		(Fields::Unit, Fields::Unit) => Ok(true),
		_ => Ok(false),
	}
}

fn field(a: &Field, b: &Field) -> Outcome {
	Ok(attrs(&a.attrs, &b.attrs)
		&& vis(&a.vis, &b.vis)
		&& a.ident == b.ident
		&& ty(&a.ty, &b.ty)?)
}

/// Compares two function signatures, parameter names included.
pub fn signature(a: &Signature, b: &Signature) -> Outcome {
	Ok(a.ident == b.ident
		&& a.constness.is_some() == b.constness.is_some()
		&& a.asyncness.is_some() == b.asyncness.is_some()
		&& a.unsafety.is_some() == b.unsafety.is_some()
		&& abi(a.abi.as_ref(), b.abi.as_ref())
		&& generics(&a.generics, &b.generics)?
		&& pairs(a.inputs.iter(), b.inputs.iter(), fn_arg)?
		&& a.variadic.is_some() == b.variadic.is_some()
		&& return_type(&a.output, &b.output)?)
}

fn fn_arg(a: &FnArg, b: &FnArg) -> Outcome {
	match (a, b) {
		(FnArg::Typed(a), FnArg::Typed(b)) => {
			Ok(attrs(&a.attrs, &b.attrs) && pat(&a.pat, &b.pat)? && ty(&a.ty, &b.ty)?)
		}
		(FnArg::Receiver(a), FnArg::Receiver(b)) => Ok(attrs(&a.attrs, &b.attrs)
			&& a.reference.is_some() == b.reference.is_some()
			&& a.mutability.is_some() == b.mutability.is_some()
			&& ty(&a.ty, &b.ty)?),
		_ => Ok(false),
	}
}

/// Compares generic parameter lists and where clauses.
pub fn generics(a: &Generics, b: &Generics) -> Outcome {
	Ok(pairs(a.params.iter(), b.params.iter(), generic_param)?
		&& opt(a.where_clause.as_ref(), b.where_clause.as_ref(), where_clause)?)
}

fn generic_param(a: &GenericParam, b: &GenericParam) -> Outcome {
	match (a, b) {
		(GenericParam::Lifetime(a), GenericParam::Lifetime(b)) => Ok(attrs(&a.attrs, &b.attrs)
			&& a.lifetime == b.lifetime
			&& a.bounds.iter().eq(b.bounds.iter())),
		(GenericParam::Type(a), GenericParam::Type(b)) => Ok(attrs(&a.attrs, &b.attrs)
			&& a.ident == b.ident
			&& pairs(a.bounds.iter(), b.bounds.iter(), bound)?
			&& opt(a.default.as_ref(), b.default.as_ref(), ty)?),
		(GenericParam::Const(a), GenericParam::Const(b)) => Ok(attrs(&a.attrs, &b.attrs)
			&& a.ident == b.ident
			&& ty(&a.ty, &b.ty)?
			&& opt(a.default.as_ref(), b.default.as_ref(), expr)?),
		_ => Ok(false),
	}
}

fn where_clause(a: &WhereClause, b: &WhereClause) -> Outcome {
	pairs(a.predicates.iter(), b.predicates.iter(), where_predicate)
}

fn where_predicate(a: &WherePredicate, b: &WherePredicate) -> Outcome {
	match (a, b) {
		(WherePredicate::Lifetime(a), WherePredicate::Lifetime(b)) => {
			Ok(a.lifetime == b.lifetime && a.bounds.iter().eq(b.bounds.iter()))
		}
		(WherePredicate::Type(a), WherePredicate::Type(b)) => {
			Ok(opt(a.lifetimes.as_ref(), b.lifetimes.as_ref(), bound_lifetimes)?
				&& ty(&a.bounded_ty, &b.bounded_ty)?
				&& pairs(a.bounds.iter(), b.bounds.iter(), bound)?)
		}
		_ => mismatch(
			a,
			b,
			|p| matches!(p, WherePredicate::Lifetime(_) | WherePredicate::Type(_)),
			"where predicate",
		),
	}
}

/// Compares attribute lists, skipping doc attributes on both sides.
pub fn attrs(a: &[Attribute], b: &[Attribute]) -> bool {
	let mut a = a.iter().filter(|attr| !is_doc(attr));
	let mut b = b.iter().filter(|attr| !is_doc(attr));
	loop {
		match (a.next(), b.next()) {
			(None, None) => return true,
			(Some(x), Some(y)) if tokens(x, y) => {}
			_ => return false,
		}
	}
}

/// Compares two visibilities.
pub fn vis(a: &Visibility, b: &Visibility) -> bool {
	tokens(a, b)
}

/// Returns true for `#[doc = ".."]`, which is what `///` comments become.
pub fn is_doc(attr: &Attribute) -> bool {
	attr.path().is_ident("doc")
}

fn tokens<T: ToTokens + ?Sized>(a: &T, b: &T) -> bool {
	a.to_token_stream().to_string() == b.to_token_stream().to_string()
}

fn opt<T>(a: Option<&T>, b: Option<&T>, eq: impl FnOnce(&T, &T) -> Outcome) -> Outcome {
	match (a, b) {
		(None, None) => Ok(true),
		(Some(a), Some(b)) if ptr::eq(a, b) => Ok(true),
		(Some(a), Some(b)) => eq(a, b),
		_ => Ok(false),
	}
}

fn pairs<'a, T: 'a>(
	a: impl ExactSizeIterator<Item = &'a T>,
	b: impl ExactSizeIterator<Item = &'a T>,
	mut eq: impl FnMut(&'a T, &'a T) -> Outcome,
) -> Outcome {
	if a.len() != b.len() {
		return Ok(false);
	}
	for (x, y) in a.zip(b) {
		if !eq(x, y)? {
			return Ok(false);
		}
	}
	Ok(true)
}

/// Shapes differ. Fails when either side is a shape nobody taught us.
fn mismatch<T: ToTokens>(a: &T, b: &T, supported: fn(&T) -> bool, kind: &'static str) -> Outcome {
	for node in [a, b] {
		if !supported(node) {
			return Err(UnsupportedShape::new(kind, node));
		}
	}
	Ok(false)
}

#[cfg(test)]
mod tests;
