//! Per-variant callback transformer: user-supplied closures with the same
//! bottom-up contract as the built-in [`Rewriter`] default traversal.

use crate::ast::traversal::{default_rewrite_block, default_rewrite_inline};
use crate::ast::{Block, Document, Inline, Rewriter};
use crate::error::ConvertError;

type BlockCallback = Box<dyn FnMut(Block) -> anyhow::Result<Block>>;
type InlineCallback = Box<dyn FnMut(Inline) -> anyhow::Result<Inline>>;

/// A rewriter driven by optional user closures. Children are rewritten
/// first (bottom-up, same order as every other `Rewriter`); the callback
/// then sees the already-rewritten node and may replace it again. Callbacks
/// report failure as `anyhow::Error` (they may raise anything that
/// implements `std::error::Error`, or a bare message via `anyhow!`); it is
/// flattened into a `ConvertError::Transform` at the rewriter boundary.
#[derive(Default)]
pub struct CallbackRewriter {
    pub on_block: Option<BlockCallback>,
    pub on_inline: Option<InlineCallback>,
}

impl CallbackRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_block(mut self, f: impl FnMut(Block) -> anyhow::Result<Block> + 'static) -> Self {
        self.on_block = Some(Box::new(f));
        self
    }

    pub fn on_inline(mut self, f: impl FnMut(Inline) -> anyhow::Result<Inline> + 'static) -> Self {
        self.on_inline = Some(Box::new(f));
        self
    }
}

impl Rewriter for CallbackRewriter {
    type Error = ConvertError;

    fn rewrite_block(&mut self, block: Block) -> Result<Block, Self::Error> {
        let block = default_rewrite_block(self, block)?;
        match &mut self.on_block {
            Some(cb) => cb(block).map_err(|e| ConvertError::Transform(e.to_string())),
            None => Ok(block),
        }
    }

    fn rewrite_inline(&mut self, inline: Inline) -> Result<Inline, Self::Error> {
        let inline = default_rewrite_inline(self, inline)?;
        match &mut self.on_inline {
            Some(cb) => cb(inline).map_err(|e| ConvertError::Transform(e.to_string())),
            None => Ok(inline),
        }
    }
}

pub fn apply_callbacks(doc: Document, rewriter: &mut CallbackRewriter) -> Result<Document, ConvertError> {
    rewriter.rewrite_document(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Inline;

    #[test]
    fn smoke_test_inline_callback_rewrites_text() {
        let doc = Document::new(vec![Block::Paragraph {
            inlines: vec![Inline::Text { text: "hi".into() }],
        }]);
        let mut rewriter = CallbackRewriter::new().on_inline(|inline| match inline {
            Inline::Text { text } => Ok(Inline::Text { text: text.to_uppercase() }),
            other => Ok(other),
        });
        let out = apply_callbacks(doc, &mut rewriter).unwrap();
        match &out.blocks[0] {
            Block::Paragraph { inlines } => match &inlines[0] {
                Inline::Text { text } => assert_eq!(text, "HI"),
                _ => panic!("wrong variant"),
            },
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn smoke_test_callback_error_propagates_as_transform_error() {
        let doc = Document::new(vec![Block::Paragraph {
            inlines: vec![Inline::Text { text: "hi".into() }],
        }]);
        let mut rewriter = CallbackRewriter::new().on_inline(|_| Err(anyhow::anyhow!("rejected")));
        let err = apply_callbacks(doc, &mut rewriter).unwrap_err();
        match err {
            ConvertError::Transform(msg) => assert_eq!(msg, "rejected"),
            other => panic!("wrong error kind: {other:?}"),
        }
    }
}
