//! Mrkdwn linear parser: token stream -> AST.
//!
//! Consumes the stream produced by [`super::tokenizer::tokenize`] and
//! reduces it to blocks in one forward pass. Fences are spliced out first
//! (their content is never line-split or style-scanned); what remains is
//! grouped into runs of "lines" (text between `Newline`/`BlankLine`
//! boundaries) and each run becomes a `Paragraph`, `Quote`, or `List`
//! depending on the marker token that opens its first line.

use super::token::Token;
use crate::ast::{Block, Broadcast, Document, Inline, ListItem, ListItemChild};

pub fn parse_mrkdwn(input: &str) -> Document {
    let tokens = super::tokenizer::tokenize(input);
    let units = splice_fences(tokens);
    Document::new(group_units(units))
}

enum Unit {
    Line(Vec<Token>),
    Blank,
    Code(Block),
}

fn splice_fences(tokens: Vec<Token>) -> Vec<Unit> {
    let mut units = Vec::new();
    let mut current_line: Vec<Token> = Vec::new();
    let mut iter = tokens.into_iter();

    while let Some(tok) = iter.next() {
        match tok {
            Token::FenceOpen => {
                if !current_line.is_empty() {
                    units.push(Unit::Line(std::mem::take(&mut current_line)));
                }
                let mut content = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Token::FenceClose => break,
                        Token::Text(t) => content.push_str(&t),
                        _ => {}
                    }
                }
                if let Some(stripped) = content.strip_prefix('\n') {
                    content = stripped.to_string();
                }
                if let Some(stripped) = content.strip_suffix('\n') {
                    content = stripped.to_string();
                }
                units.push(Unit::Code(Block::CodeBlock { content, language: None }));
            }
            Token::BlankLine => {
                if !current_line.is_empty() {
                    units.push(Unit::Line(std::mem::take(&mut current_line)));
                }
                units.push(Unit::Blank);
            }
            Token::Newline => {
                units.push(Unit::Line(std::mem::take(&mut current_line)));
            }
            other => current_line.push(other),
        }
    }
    if !current_line.is_empty() {
        units.push(Unit::Line(current_line));
    }
    units
}

/// What kind of run a line opens, after peeling off its leading marker.
enum LineKind {
    Plain(Vec<Token>),
    Quote(Vec<Token>),
    List { ordered: bool, start: Option<i64>, rest: Vec<Token> },
}

fn classify_line(mut line: Vec<Token>) -> LineKind {
    if line.is_empty() {
        return LineKind::Plain(line);
    }
    match line[0].clone() {
        Token::QuoteMarker => {
            line.remove(0);
            LineKind::Quote(line)
        }
        Token::ListMarker(ordered, start) => {
            line.remove(0);
            LineKind::List { ordered, start, rest: line }
        }
        _ => LineKind::Plain(line),
    }
}

/// Groups spliced units into top-level blocks. A run of consecutive `Line`
/// units (no `Blank`/`Code` between them) becomes one block, whose kind is
/// decided by the first line's leading marker; lines within the run that
/// don't open their own marker are continuations of the current item.
fn group_units(units: Vec<Unit>) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut iter = units.into_iter().peekable();

    while let Some(unit) = iter.next() {
        match unit {
            Unit::Blank => {}
            Unit::Code(block) => blocks.push(block),
            Unit::Line(first_line) => {
                let mut run = vec![first_line];
                while let Some(Unit::Line(_)) = iter.peek() {
                    if let Some(Unit::Line(l)) = iter.next() {
                        run.push(l);
                    }
                }
                blocks.push(build_run(run));
            }
        }
    }
    blocks
}

fn build_run(run: Vec<Vec<Token>>) -> Block {
    let mut lines = run.into_iter().map(classify_line);
    let first = match lines.next() {
        Some(l) => l,
        None => return Block::Paragraph { inlines: vec![] },
    };

    match first {
        LineKind::Quote(rest) => {
            let mut quoted_lines = vec![rest];
            for line in lines {
                match line {
                    LineKind::Quote(rest) => quoted_lines.push(rest),
                    LineKind::Plain(rest) | LineKind::List { rest, .. } => quoted_lines.push(rest),
                }
            }
            Block::Quote {
                blocks: vec![Block::Paragraph { inlines: join_lines(&quoted_lines) }],
            }
        }
        LineKind::List { ordered, start, rest } => {
            let mut items: Vec<Vec<Vec<Token>>> = vec![vec![rest]];
            let list_start = start.unwrap_or(1);
            for line in lines {
                match line {
                    LineKind::List { rest, .. } => items.push(vec![rest]),
                    LineKind::Plain(rest) | LineKind::Quote(rest) => {
                        if let Some(last) = items.last_mut() {
                            last.push(rest);
                        }
                    }
                }
            }
            let items = items
                .into_iter()
                .map(|item_lines| {
                    ListItem::new(
                        join_lines(&item_lines)
                            .into_iter()
                            .map(ListItemChild::Inline)
                            .collect(),
                    )
                })
                .collect();
            Block::List { ordered, start: list_start, items }
        }
        LineKind::Plain(rest) => {
            let mut plain_lines = vec![rest];
            for line in lines {
                match line {
                    LineKind::Plain(rest) => plain_lines.push(rest),
                    LineKind::Quote(rest) | LineKind::List { rest, .. } => plain_lines.push(rest),
                }
            }
            Block::Paragraph { inlines: join_lines(&plain_lines) }
        }
    }
}

/// Joins each line's inline content with a single space, per the "a single
/// `Newline` becomes a space" rule. Adjacent `Text` runs are merged so a
/// plain multi-line paragraph collapses into one `Text` node.
fn join_lines(lines: &[Vec<Token>]) -> Vec<Inline> {
    let mut out: Vec<Inline> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        let mut new_inlines = build_inlines(line);
        if i == 0 {
            out.extend(new_inlines);
            continue;
        }
        match (out.last_mut(), new_inlines.first_mut()) {
            (Some(Inline::Text { text: prev }), Some(Inline::Text { text: next })) => {
                prev.push(' ');
                prev.push_str(next);
                out.extend(new_inlines.into_iter().skip(1));
            }
            (Some(Inline::Text { text: prev }), _) => {
                prev.push(' ');
                out.extend(new_inlines);
            }
            _ => {
                out.push(Inline::Text { text: " ".to_string() });
                out.extend(new_inlines);
            }
        }
    }
    out
}

/// Style-wrapper frame while folding a line's markers into a nested tree.
struct Frame {
    kind: FrameKind,
    children: Vec<Inline>,
}

#[derive(PartialEq, Eq, Clone, Copy)]
enum FrameKind {
    Bold,
    Italic,
    Strike,
}

fn build_inlines(tokens: &[Token]) -> Vec<Inline> {
    let mut root: Vec<Inline> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    let push_leaf = |stack: &mut Vec<Frame>, root: &mut Vec<Inline>, leaf: Inline| {
        if let Some(top) = stack.last_mut() {
            top.children.push(leaf);
        } else {
            root.push(leaf);
        }
    };

    for tok in tokens {
        match tok {
            Token::Text(t) => push_leaf(&mut stack, &mut root, Inline::Text { text: t.clone() }),
            Token::InlineCodeSpan(c) => push_leaf(&mut stack, &mut root, Inline::Code { content: c.clone() }),
            Token::Link(url, text) => {
                let inlines = text
                    .as_ref()
                    .filter(|t| !t.is_empty())
                    .map(|t| vec![Inline::Text { text: t.clone() }])
                    .unwrap_or_default();
                push_leaf(&mut stack, &mut root, Inline::Link { url: url.clone(), inlines });
            }
            Token::UserMention(id, name) => push_leaf(
                &mut stack,
                &mut root,
                Inline::UserMention { user_id: id.clone(), username: name.clone() },
            ),
            Token::ChannelMention(id, name) => push_leaf(
                &mut stack,
                &mut root,
                Inline::ChannelMention { channel_id: id.clone(), channel_name: name.clone() },
            ),
            Token::UsergroupMention(id, name) => push_leaf(
                &mut stack,
                &mut root,
                Inline::UsergroupMention { usergroup_id: id.clone(), usergroup_name: name.clone() },
            ),
            Token::Broadcast(range) => {
                if let Some(range) = Broadcast::parse(range) {
                    push_leaf(&mut stack, &mut root, Inline::Broadcast { range });
                }
            }
            Token::Emoji(name) => {
                let unicode = emojis::get_by_shortcode(name).map(|e| e.as_str().to_string());
                push_leaf(&mut stack, &mut root, Inline::Emoji { name: name.clone(), unicode });
            }
            Token::DateToken(epoch, format, fallback) => push_leaf(
                &mut stack,
                &mut root,
                Inline::DateTimestamp {
                    epoch_seconds: *epoch,
                    format: format.clone(),
                    fallback: fallback.clone(),
                },
            ),
            Token::BoldMarker => toggle_frame(&mut stack, &mut root, FrameKind::Bold),
            Token::ItalicMarker => toggle_frame(&mut stack, &mut root, FrameKind::Italic),
            Token::StrikeMarker => toggle_frame(&mut stack, &mut root, FrameKind::Strike),
            // Structural tokens never reach here; lines are pre-split on them.
            Token::Newline | Token::BlankLine | Token::FenceOpen | Token::FenceClose
            | Token::QuoteMarker | Token::ListMarker(..) => {}
        }
    }

    // Any frame left open at end of line (crossing delimiters the tokenizer
    // could not fully reconcile) is flushed as-is rather than dropped.
    while let Some(frame) = stack.pop() {
        let wrapped = wrap(frame.kind, frame.children);
        push_leaf(&mut stack, &mut root, wrapped);
    }

    root
}

fn toggle_frame(stack: &mut Vec<Frame>, root: &mut Vec<Inline>, kind: FrameKind) {
    if let Some(pos) = stack.iter().rposition(|f| f.kind == kind) {
        // Close: pop everything above and including this frame. Frames
        // opened after it but never closed (crossing delimiters) are force
        // closed into their parent first.
        let mut popped: Vec<Frame> = stack.split_off(pos);
        let closing = popped.remove(0);
        let mut children = closing.children;
        for inner in popped {
            children.push(wrap(inner.kind, inner.children));
        }
        let wrapped = wrap(kind, children);
        if let Some(top) = stack.last_mut() {
            top.children.push(wrapped);
        } else {
            root.push(wrapped);
        }
    } else {
        stack.push(Frame { kind, children: Vec::new() });
    }
}

fn wrap(kind: FrameKind, inlines: Vec<Inline>) -> Inline {
    match kind {
        FrameKind::Bold => Inline::Bold { inlines },
        FrameKind::Italic => Inline::Italic { inlines },
        FrameKind::Strike => Inline::Strikethrough { inlines },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_paragraph_with_bold() {
        let doc = parse_mrkdwn("hello *world*");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph {
                inlines: vec![
                    Inline::Text { text: "hello ".into() },
                    Inline::Bold { inlines: vec![Inline::Text { text: "world".into() }] },
                ]
            }]
        );
    }

    #[test]
    fn smoke_test_single_newline_becomes_space() {
        let doc = parse_mrkdwn("line one\nline two");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph { inlines: vec![Inline::Text { text: "line one line two".into() }] }]
        );
    }

    #[test]
    fn smoke_test_blank_line_splits_paragraphs() {
        let doc = parse_mrkdwn("one\n\ntwo");
        assert_eq!(doc.blocks.len(), 2);
    }

    #[test]
    fn smoke_test_fenced_code_block() {
        let doc = parse_mrkdwn("```\nfn main() {}\n```");
        assert_eq!(
            doc.blocks,
            vec![Block::CodeBlock { content: "fn main() {}".into(), language: None }]
        );
    }

    #[test]
    fn smoke_test_bullet_list() {
        let doc = parse_mrkdwn("* one\n* two");
        match &doc.blocks[0] {
            Block::List { ordered, items, .. } => {
                assert!(!ordered);
                assert_eq!(items.len(), 2);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn smoke_test_ordered_list_start() {
        let doc = parse_mrkdwn("3. third\n4. fourth");
        match &doc.blocks[0] {
            Block::List { ordered, start, items } => {
                assert!(ordered);
                assert_eq!(*start, 3);
                assert_eq!(items.len(), 2);
            }
            _ => panic!("expected list"),
        }
    }

    #[test]
    fn smoke_test_quote_joins_consecutive_lines() {
        let doc = parse_mrkdwn("> line one\n> line two");
        match &doc.blocks[0] {
            Block::Quote { blocks } => match &blocks[0] {
                Block::Paragraph { inlines } => {
                    assert_eq!(inlines, &vec![Inline::Text { text: "line one line two".into() }]);
                }
                _ => panic!("expected paragraph"),
            },
            _ => panic!("expected quote"),
        }
    }

    #[test]
    fn smoke_test_broadcast_parses_to_ast() {
        let doc = parse_mrkdwn("hello <!channel>");
        assert_eq!(
            doc.blocks,
            vec![Block::Paragraph {
                inlines: vec![
                    Inline::Text { text: "hello ".into() },
                    Inline::Broadcast { range: Broadcast::Channel },
                ]
            }]
        );
    }
}
