//! AST -> GFM text.

use crate::ast::{Block, Broadcast, Document, Inline, ListItem, ListItemChild};

use super::deeplink::build_slack_url;

/// Renderer-wide settings. There is no global/ambient state here by design;
/// everything the renderer needs is passed in explicitly.
#[derive(Debug, Clone, Default)]
pub struct GfmRenderOptions {
    /// Workspace team id. When set, mention deep links include `team=<id>`.
    pub team_id: Option<String>,
}

pub fn render_gfm(doc: &Document, options: &GfmRenderOptions) -> String {
    doc.blocks
        .iter()
        .map(|b| render_block(b, options))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block, options: &GfmRenderOptions) -> String {
    match block {
        Block::Paragraph { inlines } => render_inline_run(inlines, options),
        Block::Heading { level, inlines } => {
            format!("{} {}", "#".repeat((*level).clamp(1, 6) as usize), render_inline_run(inlines, options))
        }
        Block::CodeBlock { content, language } => render_code_block(content, language.as_deref()),
        Block::Quote { blocks } => render_quote(blocks, options),
        Block::List { ordered, start, items } => render_list(*ordered, *start, items, options),
        Block::HorizontalRule => "---".to_string(),
    }
}

fn render_code_block(content: &str, language: Option<&str>) -> String {
    let mut s = String::from("```");
    if let Some(lang) = language {
        s.push_str(lang);
    }
    s.push('\n');
    if !content.is_empty() {
        s.push_str(content);
        if !content.ends_with('\n') {
            s.push('\n');
        }
    }
    s.push_str("```");
    s
}

fn render_quote(blocks: &[Block], options: &GfmRenderOptions) -> String {
    let body = blocks.iter().map(|b| render_block(b, options)).collect::<Vec<_>>().join("\n\n");
    indent_lines(&body, "> ")
}

fn indent_lines(s: &str, prefix: &str) -> String {
    s.lines().map(|line| format!("{prefix}{line}")).collect::<Vec<_>>().join("\n")
}

fn render_list(ordered: bool, start: i64, items: &[ListItem], options: &GfmRenderOptions) -> String {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let marker = if ordered { format!("{}. ", start + idx as i64) } else { "- ".to_string() };
            render_list_item(item, &marker, options)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_list_item(item: &ListItem, marker: &str, options: &GfmRenderOptions) -> String {
    let mut first_line = String::new();
    let mut continuations = Vec::new();
    let mut past_first_line = false;
    for child in &item.children {
        match child {
            ListItemChild::Inline(inline) if !past_first_line => {
                first_line.push_str(&render_inline(inline, options));
            }
            ListItemChild::Inline(inline) => continuations.push(render_inline(inline, options)),
            ListItemChild::Block(block) => {
                past_first_line = true;
                continuations.push(render_block(block, options));
            }
        }
    }
    let mut out = format!("{marker}{first_line}");
    for part in continuations {
        out.push('\n');
        out.push_str(&indent_lines(&part, "  "));
    }
    out
}

fn render_inline_run(inlines: &[Inline], options: &GfmRenderOptions) -> String {
    inlines.iter().map(|i| render_inline(i, options)).collect()
}

fn render_inline(inline: &Inline, options: &GfmRenderOptions) -> String {
    match inline {
        Inline::Text { text } => text.clone(),
        Inline::Bold { inlines } => format!("**{}**", render_inline_run(inlines, options)),
        Inline::Italic { inlines } => format!("*{}*", render_inline_run(inlines, options)),
        Inline::Strikethrough { inlines } => format!("~~{}~~", render_inline_run(inlines, options)),
        Inline::Code { content } => format!("`{content}`"),
        Inline::Link { url, inlines } => {
            let label = render_inline_run(inlines, options);
            let label = if label.is_empty() { url.clone() } else { label };
            format!("[{label}]({url})")
        }
        Inline::UserMention { user_id, username } => {
            let url = build_slack_url("user", options.team_id.as_deref(), Some(user_id), None, username.as_deref());
            let label = username.as_ref().map(|n| format!("@{n}")).unwrap_or_else(|| user_id.clone());
            format!("[{label}]({url})")
        }
        Inline::ChannelMention { channel_id, channel_name } => {
            let url = build_slack_url(
                "channel",
                options.team_id.as_deref(),
                Some(channel_id),
                None,
                channel_name.as_deref(),
            );
            let label = channel_name.as_ref().map(|n| format!("#{n}")).unwrap_or_else(|| channel_id.clone());
            format!("[{label}]({url})")
        }
        Inline::UsergroupMention { usergroup_id, usergroup_name } => {
            let url = build_slack_url(
                "usergroup",
                options.team_id.as_deref(),
                Some(usergroup_id),
                None,
                usergroup_name.as_deref(),
            );
            let label = usergroup_name.as_ref().map(|n| format!("@{n}")).unwrap_or_else(|| usergroup_id.clone());
            format!("[{label}]({url})")
        }
        Inline::Broadcast { range } => {
            let range = range.as_str();
            let url = build_slack_url("broadcast", None, None, Some(range), None);
            format!("[@{range}]({url})")
        }
        Inline::Emoji { name, .. } => format!(":{name}:"),
        Inline::DateTimestamp { epoch_seconds, fallback, .. } => {
            fallback.clone().unwrap_or_else(|| epoch_seconds.to_string())
        }
    }
}
