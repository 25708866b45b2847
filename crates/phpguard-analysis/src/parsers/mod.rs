//! Parser adapter: PHP source text to a normalized, immutable tree.

pub mod ast;
pub mod normalizer;
pub mod php;
