//! Indented textual tree printer, for debugging only. Pure and
//! side-effect-free: it only ever appends to its own buffer.

use crate::ast::{Block, Document, Inline, ListItem, ListItemChild, Visitor};

pub struct AstPrinter {
    depth: usize,
    out: String,
}

impl AstPrinter {
    fn new() -> Self {
        Self { depth: 0, out: String::new() }
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(&"  ".repeat(self.depth));
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    fn visit_list_item(&mut self, item: &ListItem) {
        self.line("ListItem");
        self.indented(|p| {
            for child in &item.children {
                match child {
                    ListItemChild::Block(b) => p.visit_block(b),
                    ListItemChild::Inline(i) => p.visit_inline(i),
                }
            }
        });
    }
}

impl Visitor for AstPrinter {
    fn visit_document(&mut self, doc: &Document) {
        self.line("Document");
        self.indented(|p| {
            for block in &doc.blocks {
                p.visit_block(block);
            }
        });
    }

    fn visit_block(&mut self, block: &Block) {
        match block {
            Block::Paragraph { inlines } => {
                self.line("Paragraph");
                self.indented(|p| for i in inlines { p.visit_inline(i) });
            }
            Block::Heading { level, inlines } => {
                self.line(&format!("Heading(level={level})"));
                self.indented(|p| for i in inlines { p.visit_inline(i) });
            }
            Block::CodeBlock { content, language } => {
                self.line(&format!("CodeBlock(language={language:?}, content={content:?})"));
            }
            Block::Quote { blocks } => {
                self.line("Quote");
                self.indented(|p| for b in blocks { p.visit_block(b) });
            }
            Block::List { ordered, start, items } => {
                self.line(&format!("List(ordered={ordered}, start={start})"));
                self.indented(|p| for item in items { p.visit_list_item(item) });
            }
            Block::HorizontalRule => self.line("HorizontalRule"),
        }
    }

    fn visit_inline(&mut self, inline: &Inline) {
        match inline {
            Inline::Text { text } => self.line(&format!("Text({text:?})")),
            Inline::Bold { inlines } => {
                self.line("Bold");
                self.indented(|p| for i in inlines { p.visit_inline(i) });
            }
            Inline::Italic { inlines } => {
                self.line("Italic");
                self.indented(|p| for i in inlines { p.visit_inline(i) });
            }
            Inline::Strikethrough { inlines } => {
                self.line("Strikethrough");
                self.indented(|p| for i in inlines { p.visit_inline(i) });
            }
            Inline::Code { content } => self.line(&format!("Code({content:?})")),
            Inline::Link { url, inlines } => {
                self.line(&format!("Link(url={url:?})"));
                self.indented(|p| for i in inlines { p.visit_inline(i) });
            }
            Inline::UserMention { user_id, username } => {
                self.line(&format!("UserMention(user_id={user_id:?}, username={username:?})"));
            }
            Inline::ChannelMention { channel_id, channel_name } => {
                self.line(&format!("ChannelMention(channel_id={channel_id:?}, channel_name={channel_name:?})"));
            }
            Inline::UsergroupMention { usergroup_id, usergroup_name } => {
                self.line(&format!(
                    "UsergroupMention(usergroup_id={usergroup_id:?}, usergroup_name={usergroup_name:?})"
                ));
            }
            Inline::Broadcast { range } => self.line(&format!("Broadcast({})", range.as_str())),
            Inline::Emoji { name, unicode } => self.line(&format!("Emoji(name={name:?}, unicode={unicode:?})")),
            Inline::DateTimestamp { epoch_seconds, format, fallback } => self.line(&format!(
                "DateTimestamp(epoch_seconds={epoch_seconds}, format={format:?}, fallback={fallback:?})"
            )),
        }
    }
}

pub fn print_ast(doc: &Document) -> String {
    let mut printer = AstPrinter::new();
    printer.visit_document(doc);
    printer.out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Block;

    #[test]
    fn smoke_test_prints_indented_tree() {
        let doc = Document::new(vec![Block::Paragraph {
            inlines: vec![Inline::Bold { inlines: vec![Inline::Text { text: "hi".into() }] }],
        }]);
        let out = print_ast(&doc);
        assert_eq!(out, "Document\n  Paragraph\n    Bold\n      Text(\"hi\")\n");
    }

    #[test]
    fn smoke_test_horizontal_rule_is_a_leaf_line() {
        let doc = Document::new(vec![Block::HorizontalRule]);
        let out = print_ast(&doc);
        assert_eq!(out, "Document\n  HorizontalRule\n");
    }
}
