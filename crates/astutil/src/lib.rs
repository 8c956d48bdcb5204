//! Syntax tree helpers for consolidating generated binding modules.
//!
//! Two independent ways of deciding whether two declarations are the same:
//! * [`equal`] walks both trees and compares them shape by shape, failing
//!   with [`UnsupportedShape`] on anything it was not taught to compare.
//! * [`render`] turns a node into a canonical string once and memoizes it in
//!   a [`RenderCache`], so repeated comparisons are a string equality.
//!
//! Both ignore spans and doc comments.

pub mod equal;
mod error;
pub mod render;

pub use error::UnsupportedShape;
pub use render::{RenderCache, canonical, strip_docs};
