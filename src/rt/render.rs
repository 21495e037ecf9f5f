//! AST -> RT JSON.

use serde_json::{json, Value};

use crate::ast::{Block, Document, Inline, ListItem, ListItemChild};

/// Accumulated style flags while descending through wrapper nodes.
#[derive(Debug, Clone, Copy, Default)]
struct StyleAcc {
    bold: bool,
    italic: bool,
    strike: bool,
    code: bool,
}

impl StyleAcc {
    fn with_bold(self) -> Self {
        Self { bold: true, ..self }
    }
    fn with_italic(self) -> Self {
        Self { italic: true, ..self }
    }
    fn with_strike(self) -> Self {
        Self { strike: true, ..self }
    }
    fn with_code(self) -> Self {
        Self { code: true, ..self }
    }

    fn is_plain(self) -> bool {
        !(self.bold || self.italic || self.strike || self.code)
    }

    fn to_json(self) -> Value {
        json!({
            "bold": self.bold,
            "italic": self.italic,
            "strike": self.strike,
            "code": self.code,
        })
    }
}

pub fn render_rich_text(doc: &Document) -> Value {
    json!({
        "type": "rich_text",
        "elements": doc.blocks.iter().map(render_block).collect::<Vec<_>>(),
    })
}

fn render_block(block: &Block) -> Value {
    match block {
        Block::Paragraph { inlines } => json!({
            "type": "rich_text_section",
            "elements": render_inline_run(inlines),
        }),
        // Slack rich_text has no native heading block; the level is carried
        // as a literal leading '#' run so the text is at least legible.
        Block::Heading { level, inlines } => {
            let mut elements = vec![text_element(&"#".repeat(*level as usize), StyleAcc::default())];
            elements.extend(render_inline_run(inlines));
            json!({ "type": "rich_text_section", "elements": elements })
        }
        Block::CodeBlock { content, .. } => json!({
            "type": "rich_text_preformatted",
            "elements": [text_element(content.trim_end_matches('\n'), StyleAcc::default())],
        }),
        Block::Quote { blocks } => json!({
            "type": "rich_text_quote",
            "elements": render_quote_elements(blocks),
        }),
        Block::List { ordered, items, .. } => json!({
            "type": "rich_text_list",
            "style": if *ordered { "ordered" } else { "bullet" },
            "indent": 0,
            "border": 0,
            "elements": items.iter().map(render_list_item).collect::<Vec<_>>(),
        }),
        // No native thematic break in the RT schema either.
        Block::HorizontalRule => json!({
            "type": "rich_text_section",
            "elements": [text_element("---", StyleAcc::default())],
        }),
    }
}

fn render_quote_elements(blocks: &[Block]) -> Vec<Value> {
    let mut out = Vec::new();
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push(text_element("\n\n", StyleAcc::default()));
        }
        match block {
            Block::Paragraph { inlines } | Block::Heading { inlines, .. } => {
                out.extend(render_inline_run(inlines));
            }
            other => out.push(text_element(&flatten_block_to_text(other), StyleAcc::default())),
        }
    }
    out
}

fn flatten_block_to_text(block: &Block) -> String {
    match block {
        Block::Paragraph { inlines } | Block::Heading { inlines, .. } => {
            crate::ast::flatten_inlines(inlines)
        }
        Block::CodeBlock { content, .. } => content.clone(),
        Block::Quote { blocks } => blocks.iter().map(flatten_block_to_text).collect::<Vec<_>>().join("\n"),
        Block::List { items, .. } => items
            .iter()
            .map(|item| {
                item.children
                    .iter()
                    .map(|c| match c {
                        ListItemChild::Inline(i) => i.flattened(),
                        ListItemChild::Block(b) => flatten_block_to_text(b),
                    })
                    .collect::<Vec<_>>()
                    .join("")
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::HorizontalRule => "---".to_string(),
    }
}

fn render_list_item(item: &ListItem) -> Value {
    let mut inline_run = Vec::new();
    let mut nested = Vec::new();
    for child in &item.children {
        match child {
            ListItemChild::Inline(i) => inline_run.push(i.clone()),
            ListItemChild::Block(b) => nested.push(render_block(b)),
        }
    }
    if nested.is_empty() {
        json!({ "type": "rich_text_section", "elements": render_inline_run(&inline_run) })
    } else if inline_run.is_empty() && nested.len() == 1 {
        nested.into_iter().next().unwrap()
    } else {
        // Mixed inline content and nested blocks in one item: render the
        // inline run as a section and fold the nested elements alongside it.
        let mut elements = vec![json!({
            "type": "rich_text_section",
            "elements": render_inline_run(&inline_run),
        })];
        elements.extend(nested);
        json!({ "type": "rich_text_list", "style": "bullet", "indent": 1, "border": 0, "elements": elements })
    }
}

fn render_inline_run(inlines: &[Inline]) -> Vec<Value> {
    inlines.iter().flat_map(|i| render_inline(i, StyleAcc::default())).collect()
}

fn render_inline(inline: &Inline, acc: StyleAcc) -> Vec<Value> {
    match inline {
        Inline::Bold { inlines } => inlines.iter().flat_map(|i| render_inline(i, acc.with_bold())).collect(),
        Inline::Italic { inlines } => {
            inlines.iter().flat_map(|i| render_inline(i, acc.with_italic())).collect()
        }
        Inline::Strikethrough { inlines } => {
            inlines.iter().flat_map(|i| render_inline(i, acc.with_strike())).collect()
        }
        Inline::Code { content } => vec![text_element(content, acc.with_code())],
        Inline::Text { text } => vec![text_element(text, acc)],
        Inline::Link { url, inlines } => {
            let mut obj = json!({ "type": "link", "url": url });
            if !inlines.is_empty() {
                obj["text"] = json!(crate::ast::flatten_inlines(inlines));
            }
            vec![obj]
        }
        Inline::UserMention { user_id, username } => {
            let mut obj = json!({ "type": "user", "user_id": user_id });
            if let Some(name) = username {
                obj["username"] = json!(name);
            }
            vec![obj]
        }
        Inline::ChannelMention { channel_id, channel_name } => {
            let mut obj = json!({ "type": "channel", "channel_id": channel_id });
            if let Some(name) = channel_name {
                obj["channel_name"] = json!(name);
            }
            vec![obj]
        }
        Inline::UsergroupMention { usergroup_id, usergroup_name } => {
            let mut obj = json!({ "type": "usergroup", "usergroup_id": usergroup_id });
            if let Some(name) = usergroup_name {
                obj["usergroup_name"] = json!(name);
            }
            vec![obj]
        }
        Inline::Broadcast { range } => vec![json!({ "type": "broadcast", "range": range.as_str() })],
        Inline::Emoji { name, unicode } => {
            let mut obj = json!({ "type": "emoji", "name": name });
            if let Some(u) = unicode {
                obj["unicode"] = json!(u);
            }
            vec![obj]
        }
        Inline::DateTimestamp { epoch_seconds, format, fallback } => {
            let mut obj = json!({ "type": "date", "timestamp": epoch_seconds });
            if let Some(f) = format {
                obj["format"] = json!(f);
            }
            if let Some(fb) = fallback {
                obj["fallback"] = json!(fb);
            }
            vec![obj]
        }
    }
}

fn text_element(text: &str, acc: StyleAcc) -> Value {
    if acc.is_plain() {
        json!({ "type": "text", "text": text })
    } else {
        json!({ "type": "text", "text": text, "style": acc.to_json() })
    }
}
