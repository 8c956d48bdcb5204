use syn::{Expr, Item, Type, parse_quote};

use super::*;

fn parse_expr(src: &str) -> Expr {
	syn::parse_str(src).expect("valid expression")
}

fn parse_item(src: &str) -> Item {
	syn::parse_str(src).expect("valid item")
}

#[test]
fn identical_expressions_are_equal() {
	let cases = [
		"1",
		"1 << 4",
		"!0u32",
		"-1i64 as u64",
		"[1, 2, 3]",
		"[0u8; 16]",
		"(a, b)",
		"foo(1, bar::BAZ)",
		"x.field",
		"x.0",
		"buf[3]",
		"&mut v[1..]",
		"S { a: 1, b: [0; 4] }",
		"unsafe { libc::getpid() }",
		"|x: u32| x + 1",
		"if a { 1 } else { 2 }",
		"match n { 0 => \"zero\", _ => \"many\" }",
		"<T as Trait>::CONST",
		"v.iter().map(|x| x * 2).collect::<Vec<_>>()",
	];
	for src in cases {
		let a = parse_expr(src);
		let b = parse_expr(src);
		assert!(expr(&a, &b).unwrap(), "expected {src} == {src}");
	}
}

#[test]
fn whitespace_does_not_matter() {
	let a = parse_expr("( 1<<4 )|0x10");
	let b = parse_expr("(1 << 4) | 0x10");
	assert!(expr(&a, &b).unwrap());
}

#[test]
fn literal_text_is_compared() {
	let a = parse_expr("0x10");
	let b = parse_expr("16");
	assert!(!expr(&a, &b).unwrap());
}

#[test]
fn binary_operator_is_compared() {
	let a = parse_expr("1 + 2");
	let b = parse_expr("1 - 2");
	assert!(!expr(&a, &b).unwrap());
}

#[test]
fn different_shapes_are_unequal() {
	let a = parse_expr("foo(1)");
	let b = parse_expr("foo[1]");
	assert!(!expr(&a, &b).unwrap());
}

#[test]
fn struct_literal_fields_are_ordered() {
	let a = parse_expr("S { a: 1, b: 2 }");
	let b = parse_expr("S { b: 2, a: 1 }");
	assert!(!expr(&a, &b).unwrap());
}

#[test]
fn absent_operands() {
	let one = parse_expr("1");
	assert!(opt_expr(None, None).unwrap());
	assert!(!opt_expr(Some(&one), None).unwrap());
	assert!(!opt_expr(None, Some(&one)).unwrap());
	assert!(opt_expr(Some(&one), Some(&one)).unwrap());
}

#[test]
fn unsupported_expression_fails_loudly() {
	let a = parse_expr("async { 1 }");
	let b = parse_expr("async { 1 }");
	let err = expr(&a, &b).unwrap_err();
	assert_eq!(err.kind, "expression");
	assert!(err.shape.contains("async"), "shape was {}", err.shape);
}

#[test]
fn unsupported_shape_on_one_side_fails() {
	let a = parse_expr("x.await");
	let b = parse_expr("1");
	assert!(expr(&a, &b).is_err());
	assert!(expr(&b, &a).is_err());
}

#[test]
fn types() {
	let eq = |a: Type, b: Type| ty(&a, &b).unwrap();
	assert!(eq(parse_quote!(*mut c_void), parse_quote!(*mut c_void)));
	assert!(!eq(parse_quote!(*mut c_void), parse_quote!(*const c_void)));
	assert!(eq(parse_quote!([u8; 16]), parse_quote!([u8; 16])));
	assert!(!eq(parse_quote!([u8; 16]), parse_quote!([u8; 32])));
	assert!(eq(
		parse_quote!(Option<unsafe extern "C" fn(c_int) -> c_int>),
		parse_quote!(Option<unsafe extern "C" fn(c_int) -> c_int>)
	));
	assert!(!eq(
		parse_quote!(Option<extern "C" fn(c_int)>),
		parse_quote!(Option<extern "system" fn(c_int)>)
	));
	assert!(!eq(parse_quote!(c_int), parse_quote!(c_uint)));
	assert!(!eq(parse_quote!(&'a str), parse_quote!(&'b str)));
}

#[test]
fn doc_attributes_are_ignored() {
	let a = parse_item(
		"/// Socket address.\n#[repr(C)]\npub struct sockaddr { /// Family.\n pub sa_family: u16, pub sa_data: [c_char; 14] }",
	);
	let b = parse_item("#[repr(C)] pub struct sockaddr { pub sa_family: u16, pub sa_data: [c_char; 14] }");
	assert!(item(&a, &b).unwrap());
}

#[test]
fn other_attributes_are_compared() {
	let a = parse_item("#[repr(C)] pub struct timespec { pub tv_sec: i64, pub tv_nsec: i64 }");
	let b = parse_item("#[repr(C, packed)] pub struct timespec { pub tv_sec: i64, pub tv_nsec: i64 }");
	assert!(!item(&a, &b).unwrap());
}

#[test]
fn field_lists_compare_positionally() {
	let a = parse_item("struct S { a: u32, b: u64 }");
	let b = parse_item("struct S { b: u64, a: u32 }");
	let c = parse_item("struct S { a: u32 }");
	let d = parse_item("struct S(u32, u64);");
	assert!(!item(&a, &b).unwrap());
	assert!(!item(&a, &c).unwrap());
	assert!(!item(&a, &d).unwrap());
}

#[test]
fn enum_discriminants_are_compared() {
	let a = parse_item("#[repr(i32)] enum E { A = 1, B = 2 }");
	let b = parse_item("#[repr(i32)] enum E { A = 1, B = 3 }");
	assert!(item(&a, &a.clone()).unwrap());
	assert!(!item(&a, &b).unwrap());
}

#[test]
fn constants_compare_name_type_and_value() {
	let a: ItemConst = parse_quote!(pub const EPERM: c_int = 1;);
	let same: ItemConst = parse_quote!(pub const EPERM: c_int = 1;);
	let renamed: ItemConst = parse_quote!(pub const ENOENT: c_int = 1;);
	let retyped: ItemConst = parse_quote!(pub const EPERM: u32 = 1;);
	let private: ItemConst = parse_quote!(const EPERM: c_int = 1;);
	assert!(item_const(&a, &same).unwrap());
	assert!(!item_const(&a, &renamed).unwrap());
	assert!(!item_const(&a, &retyped).unwrap());
	assert!(!item_const(&a, &private).unwrap());
}

#[test]
fn functions_compare_signature_and_body() {
	let base: ItemFn = parse_quote! {
		pub fn major(dev: u64) -> u32 {
			((dev >> 8) & 0xfff) as u32
		}
	};
	let renamed_param: ItemFn = parse_quote! {
		pub fn major(d: u64) -> u32 {
			((d >> 8) & 0xfff) as u32
		}
	};
	let other_body: ItemFn = parse_quote! {
		pub fn major(dev: u64) -> u32 {
			((dev >> 8) & 0xff) as u32
		}
	};
	assert!(item_fn(&base, &base.clone()).unwrap());
	assert!(!item_fn(&base, &renamed_param).unwrap());
	assert!(!item_fn(&base, &other_body).unwrap());
}

#[test]
fn function_bodies_with_statements() {
	let a: ItemFn = parse_quote! {
		pub unsafe fn setsockopt(fd: c_int, level: c_int) -> Result<(), Errno> {
			let ret = unsafe { libc::setsockopt(fd, level, 0, core::ptr::null(), 0) };
			if ret < 0 {
				return Err(Errno::last());
			}
			Ok(())
		}
	};
	assert!(item_fn(&a, &a.clone()).unwrap());
	assert!(block(&a.block, &a.block.clone()).unwrap());
}

#[test]
fn generics_and_where_clauses() {
	let a = parse_item("fn f<T: Copy, const N: usize>(x: [T; N]) -> T where T: Default { x[0] }");
	let b = parse_item("fn f<T: Clone, const N: usize>(x: [T; N]) -> T where T: Default { x[0] }");
	assert!(item(&a, &a.clone()).unwrap());
	assert!(!item(&a, &b).unwrap());
}

#[test]
fn foreign_functions() {
	let a: ForeignItemFn = parse_quote!(pub fn getpid() -> pid_t;);
	let b: ForeignItemFn = parse_quote!(pub fn getppid() -> pid_t;);
	let c: ForeignItemFn = parse_quote!(pub fn ioctl(fd: c_int, req: c_ulong, ...) -> c_int;);
	assert!(foreign_fn(&a, &a.clone()).unwrap());
	assert!(!foreign_fn(&a, &b).unwrap());
	assert!(foreign_fn(&c, &c.clone()).unwrap());
}

#[test]
fn attributes_inside_bodies_are_compared() {
	let pairs = [
		(
			"fn f() { #[cfg(target_arch = \"x86_64\")] fence(); }",
			"fn f() { #[cfg(target_arch = \"aarch64\")] fence(); }",
		),
		(
			"fn f() { #[cfg(target_arch = \"x86_64\")] fence(); }",
			"fn f() { fence(); }",
		),
		(
			"fn f(x: u32) -> u32 { let g = |#[cfg(unix)] y: u32| y; g(x) }",
			"fn f(x: u32) -> u32 { let g = |y: u32| y; g(x) }",
		),
		(
			"fn f(s: S) -> u32 { let S { #[cfg(unix)] a, .. } = s; a }",
			"fn f(s: S) -> u32 { let S { a, .. } = s; a }",
		),
		(
			"fn f() -> S { S { #[cfg(unix)] a: 1 } }",
			"fn f() -> S { S { a: 1 } }",
		),
	];
	for (a, b) in pairs {
		let a = parse_item(a);
		let b = parse_item(b);
		assert!(!item(&a, &b).unwrap(), "expected {} != {}", a.to_token_stream(), b.to_token_stream());
		assert!(item(&a, &a.clone()).unwrap());
	}
}

#[test]
fn doc_attributes_inside_bodies_are_ignored() {
	let a = parse_item("fn f() { #[doc = \"note\"] fence(); }");
	let b = parse_item("fn f() { fence(); }");
	assert!(item(&a, &b).unwrap());
}
