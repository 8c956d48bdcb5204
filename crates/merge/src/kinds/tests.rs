use pretty_assertions::assert_eq;
use quote::ToTokens;

use super::*;
use crate::options::{CompareMode, FuncMatch};

fn parse(src: &str) -> syn::File {
	syn::parse_file(src).expect("valid source")
}

fn extract(file: u32, src: &str) -> Kinds {
	Kinds::extract(FileId(file), &parse(src)).expect("extractable")
}

fn const_names(kinds: &Kinds) -> Vec<(String, Vec<String>)> {
	kinds
		.consts
		.iter()
		.map(|g| {
			let names = g.entries.iter().map(|c| c.ident.to_string()).collect();
			(g.ty.to_token_stream().to_string(), names)
		})
		.collect()
}

fn type_names(kinds: &Kinds) -> Vec<String> {
	kinds.types.iter().map(|t| t.node.ident().to_string()).collect()
}

fn func_names(kinds: &Kinds) -> Vec<String> {
	kinds.funcs.iter().map(|f| f.node.ident().to_string()).collect()
}

fn matchers() -> [Matcher; 2] {
	[
		Matcher::new(CompareMode::Rendered, FuncMatch::Strict),
		Matcher::new(CompareMode::Structural, FuncMatch::Strict),
	]
}

#[test]
fn extract_groups_constants_by_type() {
	let kinds = extract(
		0,
		r#"
		use libc::c_int;
		pub const EPERM: c_int = 1;
		pub const O_RDONLY: u32 = 0;
		pub const ENOENT: c_int = 2;
		pub const MASK: [u8; 2] = [1, 2];
		"#,
	);
	assert_eq!(
		const_names(&kinds),
		vec![
			("c_int".to_string(), vec!["EPERM".to_string(), "ENOENT".to_string()]),
			("u32".to_string(), vec!["O_RDONLY".to_string()]),
			("[u8 ; 2]".to_string(), vec!["MASK".to_string()]),
		]
	);
	assert_eq!(kinds.const_count(), 4);
	assert!(kinds.types.is_empty());
}

#[test]
fn extract_records_identity() {
	let kinds = extract(
		3,
		r#"
		pub const A: u8 = 1;
		pub struct S;
		extern "C" {
			pub static environ: *const *const u8;
			pub fn getpid() -> i32;
		}
		"#,
	);
	assert_eq!(kinds.consts[0].entries[0].id, DeclId::item(FileId(3), 0));
	assert_eq!(kinds.types[0].id, DeclId::item(FileId(3), 1));
	assert_eq!(
		kinds.funcs[0].id,
		DeclId {
			file: FileId(3),
			item: 2,
			member: Some(1),
		}
	);
}

#[test]
fn extract_value_less_constants() {
	let kinds = extract(0, "pub const A: u32; pub const B: u32 = 2;");
	let group = &kinds.consts[0];
	assert_eq!(group.entries.len(), 2);
	assert!(group.entries[0].value.is_none());
	assert!(group.entries[1].value.is_some());
	assert_eq!(
		group.entries[0].to_item(&group.ty).to_string(),
		"pub const A : u32 ;"
	);
}

#[test]
fn extract_rejects_unknown_verbatim_items() {
	let file = parse("pub fn stub();");
	let err = Kinds::extract(FileId(0), &file).err().expect("bodiless fn is not a declaration");
	assert_eq!(err.kind, "item");
}

#[test]
fn extract_types_and_functions() {
	let kinds = extract(
		0,
		r#"
		#[repr(C)] pub struct timespec { pub tv_sec: i64, pub tv_nsec: i64 }
		pub enum Kind { A, B }
		pub union U { a: u32, b: f32 }
		pub type pid_t = i32;
		pub fn major(dev: u64) -> u32 { (dev >> 8) as u32 }
		extern "C" { pub fn getpid() -> pid_t; pub fn getppid() -> pid_t; }
		impl timespec { pub fn zero() -> Self { todo!() } }
		static X: u8 = 0;
		"#,
	);
	assert_eq!(type_names(&kinds), ["timespec", "Kind", "U", "pid_t"]);
	assert_eq!(func_names(&kinds), ["major", "getpid", "getppid"]);
	assert_eq!(kinds.len(), 7);
}

#[test]
fn intersect_keeps_exact_matches() {
	for mut matcher in matchers() {
		let mut a = extract(
			0,
			r#"
			pub const EPERM: i32 = 1;
			pub const ENOENT: i32 = 2;
			pub const SIZE: usize = 8;
			pub struct Same { pub a: u8 }
			pub struct Differs { pub a: u8 }
			pub fn same() -> u8 { 1 }
			"#,
		);
		let b = extract(
			1,
			r#"
			pub const SIZE: usize = 4;
			pub const ENOENT: i32 = 2;
			pub const EPERM: i32 = 1;
			pub struct Differs { pub a: u16 }
			pub struct Same { pub a: u8 }
			pub fn same() -> u8 { 1 }
			"#,
		);
		a.intersect(&b, &mut matcher).unwrap();
		assert_eq!(
			const_names(&a),
			vec![("i32".to_string(), vec!["EPERM".to_string(), "ENOENT".to_string()])]
		);
		assert_eq!(type_names(&a), ["Same"]);
		assert_eq!(func_names(&a), ["same"]);
	}
}

#[test]
fn intersect_does_not_cross_types() {
	for mut matcher in matchers() {
		let mut a = extract(0, "pub const X: u32 = 1;");
		let b = extract(1, "pub const X: u64 = 1;");
		a.intersect(&b, &mut matcher).unwrap();
		assert!(a.is_empty());
	}
}

#[test]
fn intersect_with_empty_empties() {
	let mut matcher = Matcher::new(CompareMode::Rendered, FuncMatch::Strict);
	let mut a = extract(0, "pub const X: u32 = 1; pub struct S;");
	a.intersect(&Kinds::default(), &mut matcher).unwrap();
	assert!(a.is_empty());
	assert!(a.consts.is_empty());
}

#[test]
fn difference_removes_pairs_only() {
	for mut matcher in matchers() {
		let mut a = extract(
			0,
			r#"
			pub const A: u8 = 1;
			pub const B: u8 = 2;
			pub const B2: u16 = 2;
			pub struct S;
			pub fn f() {}
			pub fn g() {}
			"#,
		);
		let b = extract(
			1,
			r#"
			pub const A: u8 = 1;
			pub const B: u8 = 3;
			pub const B2: u8 = 2;
			pub struct S;
			pub fn g() {}
			"#,
		);
		a.difference(&b, &mut matcher).unwrap();
		assert_eq!(
			const_names(&a),
			vec![
				("u8".to_string(), vec!["B".to_string()]),
				("u16".to_string(), vec!["B2".to_string()]),
			]
		);
		assert!(a.types.is_empty());
		assert_eq!(func_names(&a), ["f"]);
	}
}

#[test]
fn difference_drops_empty_groups() {
	let mut matcher = Matcher::new(CompareMode::Rendered, FuncMatch::Strict);
	let mut a = extract(0, "pub const A: u8 = 1; pub const B: u16 = 1;");
	let b = extract(1, "pub const A: u8 = 1;");
	a.difference(&b, &mut matcher).unwrap();
	assert_eq!(a.consts.len(), 1);
	assert_eq!(a.consts[0].entries[0].ident.to_string(), "B");
}

#[test]
fn fold_seeds_then_narrows() {
	let mut matcher = Matcher::new(CompareMode::Rendered, FuncMatch::Strict);
	let arches = [
		extract(0, "pub const A: u8 = 1; pub const B: u8 = 2;"),
		extract(1, "pub const A: u8 = 1;"),
		extract(2, "pub const A: u8 = 1; pub const B: u8 = 2;"),
	];
	let mut acc = None;
	Kinds::fold_intersect(&mut acc, &arches[0], &mut matcher).unwrap();
	assert_eq!(acc.as_ref().map(Kinds::len), Some(2));
	for arch in &arches[1..] {
		Kinds::fold_intersect(&mut acc, arch, &mut matcher).unwrap();
	}
	let acc = acc.unwrap();
	assert_eq!(const_names(&acc), vec![("u8".to_string(), vec!["A".to_string()])]);
}

#[test]
fn fold_with_an_empty_arch_empties() {
	let mut matcher = Matcher::new(CompareMode::Rendered, FuncMatch::Strict);
	let mut acc = None;
	Kinds::fold_intersect(&mut acc, &extract(0, "pub struct S;"), &mut matcher).unwrap();
	Kinds::fold_intersect(&mut acc, &extract(1, "use x::y;"), &mut matcher).unwrap();
	assert!(acc.unwrap().is_empty());
}

#[test]
fn append_joins_groups_of_equal_type() {
	let mut pending = extract(0, "pub const A: u8 = 1; pub struct S;");
	let found = extract(1, "pub const B: u8 = 2; pub const C: u16 = 3; pub fn f() {}");
	pending.append(found).unwrap();
	assert_eq!(
		const_names(&pending),
		[
			("u8".to_string(), vec!["A".to_string(), "B".to_string()]),
			("u16".to_string(), vec!["C".to_string()]),
		]
	);
	assert_eq!(type_names(&pending), ["S"]);
	assert_eq!(func_names(&pending), ["f"]);
	assert_eq!(pending.consts[0].entries[1].id.file, FileId(1));
}

#[test]
fn relaxed_functions_match_on_body() {
	let a = extract(0, "pub fn f(x: u8) -> u8 { 1 }");
	let b = extract(1, "pub fn g() -> u8 { 1 }");
	for compare in [CompareMode::Rendered, CompareMode::Structural] {
		let mut strict = Matcher::new(compare, FuncMatch::Strict);
		let mut relaxed = Matcher::new(compare, FuncMatch::BodyOnly);
		assert!(!strict.same_func(&a.funcs[0], &b.funcs[0]).unwrap());
		assert!(relaxed.same_func(&a.funcs[0], &b.funcs[0]).unwrap());
	}
}

#[test]
fn foreign_functions_compare_their_header() {
	let a = extract(0, r#"extern "C" { pub fn f(); }"#);
	let b = extract(1, r#"extern "system" { pub fn f(); }"#);
	let c = extract(2, r#"extern "C" { pub fn f(); }"#);
	for mut matcher in matchers() {
		assert!(!matcher.same_func(&a.funcs[0], &b.funcs[0]).unwrap());
		assert!(matcher.same_func(&a.funcs[0], &c.funcs[0]).unwrap());
	}
}

#[test]
fn trim_file_keeps_survivors_in_order() {
	let src = r#"
		use core::ffi::c_int;
		pub const A: c_int = 1;
		pub const B: c_int = 2;
		pub struct S;
		pub struct T;
		extern "C" {
			pub static errno: c_int;
			pub fn f();
		}
		extern "C" {
			pub fn g();
			pub fn h();
		}
		pub fn i() {}
	"#;
	let mut ast = parse(src);
	let mut kinds = extract(0, src);
	let mut matcher = Matcher::new(CompareMode::Rendered, FuncMatch::Strict);
	let shared = extract(1, "use core::ffi::c_int; pub const A: c_int = 1; pub struct T; extern \"C\" { pub fn f(); pub fn g(); pub fn h(); }");
	kinds.difference(&shared, &mut matcher).unwrap();

	assert!(kinds.trim_file(FileId(0), &mut ast));
	let rendered: Vec<String> = ast.items.iter().map(|i| i.to_token_stream().to_string()).collect();
	assert_eq!(
		rendered,
		[
			"use core :: ffi :: c_int ;",
			"pub const B : c_int = 2 ;",
			"pub struct S ;",
			"extern \"C\" { pub static errno : c_int ; }",
			"pub fn i () { }",
		]
	);
}

#[test]
fn trim_file_without_removals_is_unchanged() {
	let src = "pub const A: u8 = 1; extern \"C\" {} pub fn f() {}";
	let mut ast = parse(src);
	let kinds = extract(0, src);
	assert!(!kinds.trim_file(FileId(0), &mut ast));
	assert_eq!(ast.items.len(), 3);
}

#[test]
fn trim_file_ignores_other_files() {
	let src = "pub const A: u8 = 1;";
	let mut ast = parse(src);
	let kinds = extract(0, src);
	assert!(kinds.trim_file(FileId(1), &mut ast));
	assert!(ast.items.is_empty());
}
