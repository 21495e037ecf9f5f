//! AST node definitions: the common representation both codecs target.
//!
//! `Block` and `Inline` are closed sum types. Where the source platforms use
//! class hierarchies (`Node -> BlockNode/InlineNode -> concrete`), kinship
//! here is expressed by which enum a variant belongs to and where the walker
//! lets it appear, not by inheritance.

/// Root of every parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph { inlines: Vec<Inline> },
    Heading { level: u8, inlines: Vec<Inline> },
    CodeBlock { content: String, language: Option<String> },
    Quote { blocks: Vec<Block> },
    List { ordered: bool, start: i64, items: Vec<ListItem> },
    HorizontalRule,
}

/// A list item's children may themselves be blocks (nested lists, quotes,
/// continuation paragraphs) or bare inlines (a single-line item).
#[derive(Debug, Clone, PartialEq)]
pub enum ListItemChild {
    Block(Block),
    Inline(Inline),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub children: Vec<ListItemChild>,
}

impl ListItem {
    pub fn new(children: Vec<ListItemChild>) -> Self {
        Self { children }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Broadcast {
    Here,
    Channel,
    Everyone,
}

impl Broadcast {
    pub fn as_str(&self) -> &'static str {
        match self {
            Broadcast::Here => "here",
            Broadcast::Channel => "channel",
            Broadcast::Everyone => "everyone",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "here" => Some(Broadcast::Here),
            "channel" => Some(Broadcast::Channel),
            "everyone" => Some(Broadcast::Everyone),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text { text: String },
    Bold { inlines: Vec<Inline> },
    Italic { inlines: Vec<Inline> },
    Strikethrough { inlines: Vec<Inline> },
    Code { content: String },
    Link { url: String, inlines: Vec<Inline> },
    UserMention { user_id: String, username: Option<String> },
    ChannelMention { channel_id: String, channel_name: Option<String> },
    UsergroupMention { usergroup_id: String, usergroup_name: Option<String> },
    Broadcast { range: Broadcast },
    Emoji { name: String, unicode: Option<String> },
    DateTimestamp {
        epoch_seconds: i64,
        format: Option<String>,
        fallback: Option<String>,
    },
}

impl Inline {
    /// Flatten this inline and its children to plain text, the way
    /// preformatted rich-text blocks and link labels do: links emit their
    /// label (or URL), mentions emit their canonical id.
    pub fn flatten_to_text(&self, out: &mut String) {
        match self {
            Inline::Text { text } => out.push_str(text),
            Inline::Bold { inlines }
            | Inline::Italic { inlines }
            | Inline::Strikethrough { inlines } => {
                for i in inlines {
                    i.flatten_to_text(out);
                }
            }
            Inline::Code { content } => out.push_str(content),
            Inline::Link { url, inlines } => {
                if inlines.is_empty() {
                    out.push_str(url);
                } else {
                    for i in inlines {
                        i.flatten_to_text(out);
                    }
                }
            }
            Inline::UserMention { user_id, .. } => out.push_str(user_id),
            Inline::ChannelMention { channel_id, .. } => out.push_str(channel_id),
            Inline::UsergroupMention { usergroup_id, .. } => out.push_str(usergroup_id),
            Inline::Broadcast { range } => out.push_str(range.as_str()),
            Inline::Emoji { name, .. } => {
                out.push(':');
                out.push_str(name);
                out.push(':');
            }
            Inline::DateTimestamp { epoch_seconds, fallback, .. } => match fallback {
                Some(f) => out.push_str(f),
                None => out.push_str(&epoch_seconds.to_string()),
            },
        }
    }

    pub fn flattened(&self) -> String {
        let mut s = String::new();
        self.flatten_to_text(&mut s);
        s
    }
}

pub fn flatten_inlines(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for i in inlines {
        i.flatten_to_text(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_flatten_link_with_label() {
        let link = Inline::Link {
            url: "https://example.com".into(),
            inlines: vec![Inline::Text { text: "click".into() }],
        };
        assert_eq!(link.flattened(), "click");
    }

    #[test]
    fn smoke_test_flatten_link_without_label() {
        let link = Inline::Link {
            url: "https://example.com".into(),
            inlines: vec![],
        };
        assert_eq!(link.flattened(), "https://example.com");
    }

    #[test]
    fn smoke_test_flatten_nested_styles() {
        let node = Inline::Bold {
            inlines: vec![Inline::Italic {
                inlines: vec![Inline::Text { text: "hi".into() }],
            }],
        };
        assert_eq!(node.flattened(), "hi");
    }

    #[test]
    fn smoke_test_broadcast_parse_rejects_unknown() {
        assert!(Broadcast::parse("nobody").is_none());
        assert_eq!(Broadcast::parse("here"), Some(Broadcast::Here));
    }
}
