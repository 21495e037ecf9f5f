//! AST: the common representation every codec targets.
//!
//! `Block` and `Inline` are closed sum types. Where the source platforms use
//! class hierarchies (`Node -> BlockNode/InlineNode -> concrete`), kinship
//! here is expressed by which enum a variant belongs to and where the walker
//! lets it appear, not by inheritance.

pub mod nodes;
pub mod traversal;
pub mod validate;

pub use nodes::*;
pub use traversal::{Rewriter, Visitor};
pub use validate::validate_document;
