//! AST-to-AST rewrites: ID->name mapping, user callbacks, and the debug
//! printer. All three ride on the [`crate::ast::Rewriter`]/[`crate::ast::Visitor`]
//! traversal contract.

pub mod callback;
pub mod id_map;
pub mod printer;

pub use callback::{apply_callbacks, CallbackRewriter};
pub use id_map::{apply_id_map, IdNameMapper};
pub use printer::print_ast;
