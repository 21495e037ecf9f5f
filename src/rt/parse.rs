//! RT JSON -> AST.

use serde_json::Value;

use super::json::{array_field, bool_field, element_type, int_field, opt_str_field, str_field};
use crate::ast::{Block, Broadcast, Document, Inline, ListItem, ListItemChild};
use crate::error::{ConvertError, ConvertResult, ParseContext};

/// Parses either `{"type":"rich_text","elements":[...]}` or a bare elements
/// array into a [`Document`].
pub fn parse_rich_text(value: &Value) -> ConvertResult<Document> {
    let elements = top_level_elements(value)?;
    let blocks = elements
        .iter()
        .map(|el| parse_block(el, "rich_text"))
        .collect::<ConvertResult<Vec<_>>>()?;
    Ok(Document::new(blocks))
}

fn top_level_elements(value: &Value) -> ConvertResult<&Vec<Value>> {
    if let Some(arr) = value.as_array() {
        return Ok(arr);
    }
    if value.get("type").and_then(Value::as_str) == Some("rich_text") {
        return array_field(value, "elements", "rich_text");
    }
    Err(ConvertError::Parse(ParseContext::new(
        "top-level RT value must be {\"type\":\"rich_text\",\"elements\":[...]} or a bare array",
    )))
}

fn parse_block(value: &Value, parent_type: &str) -> ConvertResult<Block> {
    let ty = element_type(value, parent_type)?;
    match ty.as_str() {
        "rich_text_section" => {
            let inlines = parse_inline_array(value, &ty)?;
            Ok(Block::Paragraph { inlines })
        }
        "rich_text_preformatted" => {
            let inlines = parse_inline_array(value, &ty)?;
            let content = crate::ast::flatten_inlines(&inlines);
            Ok(Block::CodeBlock { content, language: None })
        }
        "rich_text_quote" => {
            let inlines = parse_inline_array(value, &ty)?;
            Ok(Block::Quote { blocks: vec![Block::Paragraph { inlines }] })
        }
        "rich_text_list" => parse_list(value, &ty),
        other => Err(ConvertError::Parse(
            ParseContext::new("unknown RT block element type")
                .with_element(other)
                .with_parent(parent_type),
        )),
    }
}

fn parse_list(value: &Value, parent_type: &str) -> ConvertResult<Block> {
    let style = str_field(value, "style", parent_type)?;
    let ordered = match style {
        "ordered" => true,
        "bullet" => false,
        other => {
            return Err(ConvertError::Parse(
                ParseContext::new(format!("unknown rich_text_list style \"{other}\""))
                    .with_parent(parent_type),
            ))
        }
    };
    let items = array_field(value, "elements", parent_type)?
        .iter()
        .map(|item| parse_list_item(item, parent_type))
        .collect::<ConvertResult<Vec<_>>>()?;
    Ok(Block::List { ordered, start: 1, items })
}

fn parse_list_item(value: &Value, parent_type: &str) -> ConvertResult<ListItem> {
    let ty = element_type(value, parent_type)?;
    match ty.as_str() {
        "rich_text_section" => {
            let inlines = parse_inline_array(value, &ty)?;
            Ok(ListItem::new(inlines.into_iter().map(ListItemChild::Inline).collect()))
        }
        "rich_text_list" => {
            let nested = parse_list(value, &ty)?;
            Ok(ListItem::new(vec![ListItemChild::Block(nested)]))
        }
        other => Err(ConvertError::Parse(
            ParseContext::new("unsupported rich_text_list item type")
                .with_element(other)
                .with_parent(parent_type),
        )),
    }
}

fn parse_inline_array(value: &Value, parent_type: &str) -> ConvertResult<Vec<Inline>> {
    array_field(value, "elements", parent_type)?
        .iter()
        .map(|el| parse_inline(el, parent_type))
        .collect()
}

fn parse_inline(value: &Value, parent_type: &str) -> ConvertResult<Inline> {
    let ty = element_type(value, parent_type)?;
    match ty.as_str() {
        "text" => {
            let text = str_field(value, "text", &ty)?.to_string();
            Ok(apply_style(Inline::Text { text: text.clone() }, text, value.get("style")))
        }
        "link" => {
            let url = str_field(value, "url", &ty)?.to_string();
            let inlines = match opt_str_field(value, "text") {
                Some(t) if !t.is_empty() => vec![Inline::Text { text: t }],
                _ => Vec::new(),
            };
            Ok(Inline::Link { url, inlines })
        }
        "user" => Ok(Inline::UserMention {
            user_id: str_field(value, "user_id", &ty)?.to_string(),
            username: opt_str_field(value, "username"),
        }),
        "channel" => Ok(Inline::ChannelMention {
            channel_id: str_field(value, "channel_id", &ty)?.to_string(),
            channel_name: opt_str_field(value, "channel_name"),
        }),
        "usergroup" => Ok(Inline::UsergroupMention {
            usergroup_id: str_field(value, "usergroup_id", &ty)?.to_string(),
            usergroup_name: opt_str_field(value, "usergroup_name"),
        }),
        "broadcast" => {
            let range = str_field(value, "range", &ty)?;
            let range = Broadcast::parse(range).ok_or_else(|| {
                ConvertError::Parse(
                    ParseContext::new(format!("unrecognized broadcast range \"{range}\""))
                        .with_element("broadcast")
                        .with_parent(parent_type),
                )
            })?;
            Ok(Inline::Broadcast { range })
        }
        "emoji" => Ok(Inline::Emoji {
            name: str_field(value, "name", &ty)?.to_string(),
            unicode: opt_str_field(value, "unicode"),
        }),
        "date" => Ok(Inline::DateTimestamp {
            epoch_seconds: int_field(value, "timestamp", &ty)?,
            format: opt_str_field(value, "format"),
            fallback: opt_str_field(value, "fallback"),
        }),
        other => Err(ConvertError::Parse(
            ParseContext::new("unknown RT inline element type")
                .with_element(other)
                .with_parent(parent_type),
        )),
    }
}

/// Wraps a text/code leaf in the canonical style nesting order (outermost
/// first): `Strikethrough ⊃ Italic ⊃ Bold ⊃ Code ⊃ Text`.
fn apply_style(plain: Inline, text: String, style: Option<&Value>) -> Inline {
    let Some(style) = style else { return plain };

    let mut node = if bool_field(style, "code") {
        Inline::Code { content: text }
    } else {
        plain
    };
    if bool_field(style, "bold") {
        node = Inline::Bold { inlines: vec![node] };
    }
    if bool_field(style, "italic") {
        node = Inline::Italic { inlines: vec![node] };
    }
    if bool_field(style, "strike") {
        node = Inline::Strikethrough { inlines: vec![node] };
    }
    node
}
