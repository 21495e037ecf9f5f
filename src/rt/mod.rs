//! Rich-Text codec: JSON tree <-> AST.
//!
//! This is the only place in the crate that touches a raw [`serde_json::Value`].
//! Both directions go through the typed accessors in [`json`]; everything
//! downstream (transformers, the GFM codec) only ever sees `Block`/`Inline`.

pub mod json;
pub mod parse;
pub mod render;

pub use parse::parse_rich_text;
pub use render::render_rich_text;
