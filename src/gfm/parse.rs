//! GFM text -> AST.
//!
//! Block-level tokenization is delegated to `pulldown-cmark`; this module's
//! own job is turning its event stream into the common AST and recognizing
//! `slack://` deep links among ordinary links.

use std::iter::Peekable;
use std::vec::IntoIter;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::ast::{Block, Broadcast, Document, Inline, ListItem, ListItemChild};

use super::deeplink::parse_slack_url;

type Events = Peekable<IntoIter<Event<'static>>>;

pub fn parse_gfm(source: &str) -> Document {
    let options = Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES | Options::ENABLE_TASKLISTS;
    let events: Vec<Event<'static>> = Parser::new_ext(source, options)
        .map(|event| event.into_static())
        .collect();
    let mut iter = events.into_iter().peekable();
    let mut blocks = Vec::new();
    while iter.peek().is_some() {
        if let Some(block) = parse_one_block(&mut iter) {
            blocks.push(block);
        }
    }
    Document::new(blocks)
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Consumes one block-level construct, returning `None` only when the
/// stream was already empty.
fn parse_one_block(iter: &mut Events) -> Option<Block> {
    let event = iter.next()?;
    Some(match event {
        Event::Start(Tag::Paragraph) => {
            let inlines = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Paragraph)));
            Block::Paragraph { inlines }
        }
        Event::Start(Tag::Heading { level, .. }) => {
            let lvl = heading_level_to_u8(level);
            let inlines = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Heading(_))));
            Block::Heading { level: lvl, inlines }
        }
        Event::Start(Tag::CodeBlock(kind)) => {
            let language = match kind {
                CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                _ => None,
            };
            let mut content = String::new();
            loop {
                match iter.next() {
                    Some(Event::Text(text)) => content.push_str(&text),
                    Some(Event::End(TagEnd::CodeBlock)) | None => break,
                    _ => {}
                }
            }
            Block::CodeBlock { content, language }
        }
        Event::Start(Tag::BlockQuote(_)) => {
            let mut blocks = Vec::new();
            loop {
                match iter.peek() {
                    Some(Event::End(TagEnd::BlockQuote(_))) => {
                        iter.next();
                        break;
                    }
                    None => break,
                    _ => {
                        if let Some(block) = parse_one_block(iter) {
                            blocks.push(block);
                        }
                    }
                }
            }
            Block::Quote { blocks }
        }
        Event::Start(Tag::List(start)) => {
            let ordered = start.is_some();
            let list_start = start.unwrap_or(1) as i64;
            let mut items = Vec::new();
            loop {
                match iter.next() {
                    Some(Event::Start(Tag::Item)) => items.push(parse_list_item(iter)),
                    Some(Event::End(TagEnd::List(_))) | None => break,
                    _ => {}
                }
            }
            Block::List { ordered, start: list_start, items }
        }
        Event::Rule => Block::HorizontalRule,
        // Anything else (tables, footnote definitions, raw HTML blocks, ...)
        // degrades to a paragraph holding its flattened text rather than
        // erroring out on well-formed GFM the AST has no room to model.
        Event::Start(_) => skip_unknown_block(iter),
        _ => Block::Paragraph { inlines: Vec::new() },
    })
}

fn skip_unknown_block(iter: &mut Events) -> Block {
    let mut depth: u32 = 1;
    let mut text = String::new();
    while depth > 0 {
        match iter.next() {
            Some(Event::Start(_)) => depth += 1,
            Some(Event::End(_)) => depth -= 1,
            Some(Event::Text(t)) | Some(Event::Code(t)) => text.push_str(&t),
            None => break,
            _ => {}
        }
    }
    Block::Paragraph { inlines: vec![Inline::Text { text }] }
}

fn parse_list_item(iter: &mut Events) -> ListItem {
    let mut children = Vec::new();
    loop {
        match iter.peek() {
            Some(Event::End(TagEnd::Item)) => {
                iter.next();
                break;
            }
            Some(Event::Start(Tag::Paragraph)) => {
                iter.next();
                let inlines = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Paragraph)));
                children.extend(inlines.into_iter().map(ListItemChild::Inline));
            }
            Some(Event::TaskListMarker(checked)) => {
                let marker = if *checked { "[x] " } else { "[ ] " };
                children.push(ListItemChild::Inline(Inline::Text { text: marker.to_string() }));
                iter.next();
            }
            None => break,
            _ => {
                if let Some(block) = parse_one_block(iter) {
                    children.push(ListItemChild::Block(block));
                }
            }
        }
    }
    ListItem::new(children)
}

/// Consumes inline-level events (recursing into nested emphasis/links/etc.)
/// until `is_end` matches, merging adjacent plain text into single `Text`
/// nodes.
fn parse_inlines_until(iter: &mut Events, is_end: impl Fn(&Event) -> bool) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    loop {
        match iter.peek() {
            Some(event) if is_end(event) => {
                iter.next();
                break;
            }
            None => break,
            _ => {}
        }
        let event = iter.next().unwrap();
        match event {
            Event::Text(text) => push_text(&mut out, &text),
            Event::Code(text) => out.push(Inline::Code { content: text.to_string() }),
            Event::SoftBreak => push_text(&mut out, " "),
            Event::HardBreak => push_text(&mut out, "\n"),
            Event::TaskListMarker(checked) => {
                push_text(&mut out, if checked { "[x] " } else { "[ ] " })
            }
            Event::InlineHtml(html) | Event::Html(html) => push_text(&mut out, &html),
            Event::Start(Tag::Strong) => {
                let inner = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Strong)));
                out.push(Inline::Bold { inlines: inner });
            }
            Event::Start(Tag::Emphasis) => {
                let inner = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Emphasis)));
                out.push(Inline::Italic { inlines: inner });
            }
            Event::Start(Tag::Strikethrough) => {
                let inner = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Strikethrough)));
                out.push(Inline::Strikethrough { inlines: inner });
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                let inner = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Link)));
                out.push(link_or_mention(dest_url.to_string(), inner));
            }
            Event::Start(Tag::Image { dest_url, .. }) => {
                let inner = parse_inlines_until(iter, |e| matches!(e, Event::End(TagEnd::Image)));
                out.push(link_or_mention(dest_url.to_string(), inner));
            }
            // Anything unrecognized at the inline level: drop the wrapper,
            // keep whatever text is nested inside it.
            Event::Start(_) => {
                let inner = parse_inlines_until(iter, |_| false);
                out.extend(inner);
            }
            _ => {}
        }
    }
    out
}

fn push_text(out: &mut Vec<Inline>, text: &str) {
    if let Some(Inline::Text { text: prev }) = out.last_mut() {
        prev.push_str(text);
    } else {
        out.push(Inline::Text { text: text.to_string() });
    }
}

/// A link whose target is a `slack://` deep link becomes a mention or
/// broadcast node instead of a generic [`Inline::Link`].
fn link_or_mention(url: String, label_inlines: Vec<Inline>) -> Inline {
    let Some((entity, params)) = parse_slack_url(&url) else {
        return Inline::Link { url, inlines: label_inlines };
    };
    let label = crate::ast::flatten_inlines(&label_inlines);
    let name_from_label = |prefix: char| -> Option<String> {
        label.strip_prefix(prefix).map(|s| s.to_string()).filter(|s| !s.is_empty())
    };
    match entity {
        "user" => match params.id {
            Some(id) => Inline::UserMention {
                user_id: id,
                username: params.name.or_else(|| name_from_label('@')),
            },
            None => Inline::Link { url, inlines: label_inlines },
        },
        "channel" => match params.id {
            Some(id) => Inline::ChannelMention {
                channel_id: id,
                channel_name: params.name.or_else(|| name_from_label('#')),
            },
            None => Inline::Link { url, inlines: label_inlines },
        },
        "usergroup" => match params.id {
            Some(id) => Inline::UsergroupMention {
                usergroup_id: id,
                usergroup_name: params.name.or_else(|| name_from_label('@')),
            },
            None => Inline::Link { url, inlines: label_inlines },
        },
        "broadcast" => match params.range.as_deref().and_then(Broadcast::parse) {
            Some(range) => Inline::Broadcast { range },
            None => Inline::Link { url, inlines: label_inlines },
        },
        _ => Inline::Link { url, inlines: label_inlines },
    }
}
