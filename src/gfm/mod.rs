//! GitHub-Flavored Markdown codec: GFM text <-> AST.
//!
//! Block tokenization is delegated to `pulldown-cmark`; this package owns
//! recognizing `slack://` deep links on the way in and the rendering rules
//! (code-fence newline handling, deep-link construction, style nesting) on
//! the way out.

pub mod deeplink;
pub mod parse;
pub mod render;

pub use parse::parse_gfm;
pub use render::{render_gfm, GfmRenderOptions};
