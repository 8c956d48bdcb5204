//! Error raised by the structural walker.

use quote::ToTokens;
use thiserror::Error;

/// A syntax shape the comparator does not know how to compare.
///
/// Generated bindings only contain a bounded set of shapes. Hitting this
/// means the generator started emitting something new, and comparing it as
/// "different" would silently change what gets consolidated.
#[derive(Debug, Clone, Error)]
#[error("unsupported {kind} shape: {shape}")]
pub struct UnsupportedShape {
	/// Syntactic category (`expression`, `type`, `pattern`, ...).
	pub kind: &'static str,
	/// Rendered tokens of the offending node.
	pub shape: String,
}

impl UnsupportedShape {
	/// Builds the error from the offending node.
	pub fn new(kind: &'static str, node: &impl ToTokens) -> Self {
		Self {
			kind,
			shape: node.to_token_stream().to_string(),
		}
	}
}
