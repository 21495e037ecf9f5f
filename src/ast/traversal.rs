//! Depth-first, left-to-right walker and the visitor/rewriter contracts.
//!
//! Two contracts share one traversal order:
//!
//! - [`Visitor`] borrows nodes and accumulates state (diagnostics, the debug
//!   printer, feature extraction). It never produces a new tree.
//! - [`Rewriter`] consumes nodes and returns a (possibly different) node of
//!   the same `Block`/`Inline` kind, or a different variant entirely for a
//!   genuine rewrite. The default traversal substitutes each child's result
//!   into a freshly built parent; a rewrite is never re-entered.
//!
//! Both walkers are deterministic and never skip a child.

use super::nodes::{Block, Document, Inline, ListItem, ListItemChild};

/// Read-only visitor. Default method bodies just recurse; override the
/// variants you care about.
pub trait Visitor {
    fn visit_document(&mut self, doc: &Document) {
        walk_blocks(self, &doc.blocks);
    }

    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }

    fn visit_inline(&mut self, inline: &Inline) {
        walk_inline(self, inline);
    }
}

pub fn walk_blocks<V: Visitor + ?Sized>(visitor: &mut V, blocks: &[Block]) {
    for block in blocks {
        visitor.visit_block(block);
    }
}

pub fn walk_inlines<V: Visitor + ?Sized>(visitor: &mut V, inlines: &[Inline]) {
    for inline in inlines {
        visitor.visit_inline(inline);
    }
}

pub fn walk_block<V: Visitor + ?Sized>(visitor: &mut V, block: &Block) {
    match block {
        Block::Paragraph { inlines } | Block::Heading { inlines, .. } => {
            walk_inlines(visitor, inlines);
        }
        Block::CodeBlock { .. } | Block::HorizontalRule => {}
        Block::Quote { blocks } => walk_blocks(visitor, blocks),
        Block::List { items, .. } => {
            for item in items {
                walk_list_item(visitor, item);
            }
        }
    }
}

pub fn walk_list_item<V: Visitor + ?Sized>(visitor: &mut V, item: &ListItem) {
    for child in &item.children {
        match child {
            ListItemChild::Block(b) => visitor.visit_block(b),
            ListItemChild::Inline(i) => visitor.visit_inline(i),
        }
    }
}

pub fn walk_inline<V: Visitor + ?Sized>(visitor: &mut V, inline: &Inline) {
    match inline {
        Inline::Bold { inlines } | Inline::Italic { inlines } | Inline::Strikethrough { inlines } => {
            walk_inlines(visitor, inlines);
        }
        Inline::Link { inlines, .. } => walk_inlines(visitor, inlines),
        Inline::Text { .. }
        | Inline::Code { .. }
        | Inline::UserMention { .. }
        | Inline::ChannelMention { .. }
        | Inline::UsergroupMention { .. }
        | Inline::Broadcast { .. }
        | Inline::Emoji { .. }
        | Inline::DateTimestamp { .. } => {}
    }
}

/// Mutating rewriter. Consumes a node and returns its replacement; the
/// default traversal recurses into children first (bottom-up) and rebuilds
/// the parent from the rewritten children before calling `rewrite_*` on the
/// parent itself.
pub trait Rewriter {
    type Error;

    fn rewrite_document(&mut self, doc: Document) -> Result<Document, Self::Error> {
        let blocks = rewrite_blocks(self, doc.blocks)?;
        Ok(Document { blocks })
    }

    fn rewrite_block(&mut self, block: Block) -> Result<Block, Self::Error> {
        default_rewrite_block(self, block)
    }

    fn rewrite_inline(&mut self, inline: Inline) -> Result<Inline, Self::Error> {
        default_rewrite_inline(self, inline)
    }
}

pub fn rewrite_blocks<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    blocks: Vec<Block>,
) -> Result<Vec<Block>, R::Error> {
    blocks.into_iter().map(|b| rewriter.rewrite_block(b)).collect()
}

pub fn rewrite_inlines<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    inlines: Vec<Inline>,
) -> Result<Vec<Inline>, R::Error> {
    inlines.into_iter().map(|i| rewriter.rewrite_inline(i)).collect()
}

pub fn default_rewrite_block<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    block: Block,
) -> Result<Block, R::Error> {
    Ok(match block {
        Block::Paragraph { inlines } => Block::Paragraph {
            inlines: rewrite_inlines(rewriter, inlines)?,
        },
        Block::Heading { level, inlines } => Block::Heading {
            level,
            inlines: rewrite_inlines(rewriter, inlines)?,
        },
        Block::CodeBlock { content, language } => Block::CodeBlock { content, language },
        Block::Quote { blocks } => Block::Quote {
            blocks: rewrite_blocks(rewriter, blocks)?,
        },
        Block::List { ordered, start, items } => {
            let items = items
                .into_iter()
                .map(|item| rewrite_list_item(rewriter, item))
                .collect::<Result<Vec<_>, _>>()?;
            Block::List { ordered, start, items }
        }
        Block::HorizontalRule => Block::HorizontalRule,
    })
}

pub fn rewrite_list_item<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    item: ListItem,
) -> Result<ListItem, R::Error> {
    let children = item
        .children
        .into_iter()
        .map(|child| match child {
            ListItemChild::Block(b) => rewriter.rewrite_block(b).map(ListItemChild::Block),
            ListItemChild::Inline(i) => rewriter.rewrite_inline(i).map(ListItemChild::Inline),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ListItem { children })
}

pub fn default_rewrite_inline<R: Rewriter + ?Sized>(
    rewriter: &mut R,
    inline: Inline,
) -> Result<Inline, R::Error> {
    Ok(match inline {
        Inline::Bold { inlines } => Inline::Bold {
            inlines: rewrite_inlines(rewriter, inlines)?,
        },
        Inline::Italic { inlines } => Inline::Italic {
            inlines: rewrite_inlines(rewriter, inlines)?,
        },
        Inline::Strikethrough { inlines } => Inline::Strikethrough {
            inlines: rewrite_inlines(rewriter, inlines)?,
        },
        Inline::Link { url, inlines } => Inline::Link {
            url,
            inlines: rewrite_inlines(rewriter, inlines)?,
        },
        other => other,
    })
}
