//! Context-aware Mrkdwn tokenizer: a two-state machine (`OUTSIDE` /
//! `INSIDE_FENCE`) that applies a fixed rule priority at every position, so
//! the same input always tokenizes the same way regardless of scan order.

use super::token::Token;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while, take_while1};
use nom::character::complete::{char, digit1};
use nom::combinator::{opt, recognize, rest};
use nom::sequence::{pair, preceded, tuple};
use nom::IResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Outside,
    InsideFence,
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let chars: Vec<char> = input.chars().collect();
    let n = chars.len();
    let mut tokens = Vec::new();
    let mut i = 0usize;
    let mut state = State::Outside;
    let mut text_buf = String::new();
    let mut at_line_start = true;

    let mut bold_open = false;
    let mut italic_open = false;
    let mut strike_open = false;

    macro_rules! flush_text {
        () => {
            if !text_buf.is_empty() {
                tokens.push(Token::Text(std::mem::take(&mut text_buf)));
            }
        };
    }

    while i < n {
        match state {
            State::Outside => {
                // Structural: newline / blank line collapsing (not one of the
                // 9 ordered content rules, but must run before them).
                if chars[i] == '\n' {
                    flush_text!();
                    let start = i;
                    let mut j = i;
                    while j < n && chars[j] == '\n' {
                        j += 1;
                    }
                    tokens.push(if j - start >= 2 { Token::BlankLine } else { Token::Newline });
                    i = j;
                    at_line_start = true;
                    bold_open = false;
                    italic_open = false;
                    strike_open = false;
                    continue;
                }

                // Rule 1: fence open.
                if starts_with_str(&chars, i, "```") {
                    flush_text!();
                    tokens.push(Token::FenceOpen);
                    state = State::InsideFence;
                    i += 3;
                    at_line_start = false;
                    continue;
                }

                // Rule 2: angle-bracketed content.
                if chars[i] == '<' {
                    if let Some((tok, consumed)) = try_angle(&chars, i) {
                        flush_text!();
                        tokens.push(tok);
                        i += consumed;
                        at_line_start = false;
                        continue;
                    }
                }

                // Rule 3: inline code span (single backtick delimiters).
                if chars[i] == '`' {
                    if let Some((content, consumed)) = try_inline_code(&chars, i) {
                        flush_text!();
                        tokens.push(Token::InlineCodeSpan(content));
                        i += consumed;
                        at_line_start = false;
                        continue;
                    }
                }

                // Emoji shortcode (`:name:`); not one of the numbered rules
                // but shares priority with inline code since both use plain
                // ASCII delimiters that never collide with the style
                // delimiters below.
                if chars[i] == ':' {
                    if let Some((name, consumed)) = try_emoji(&chars, i) {
                        flush_text!();
                        tokens.push(Token::Emoji(name));
                        i += consumed;
                        at_line_start = false;
                        continue;
                    }
                }

                // Rule 7: line-start quote/list markers. Tried before the
                // style delimiters below: a column-0 `* ` is a bullet marker,
                // never a bold opener, and only ever arises at line start.
                if at_line_start {
                    if let Some((tok, consumed)) = try_line_start_marker(&chars, i) {
                        flush_text!();
                        tokens.push(tok);
                        i += consumed;
                        at_line_start = false;
                        continue;
                    }
                }

                // Rule 4: bold. Opening requires a word boundary before the
                // delimiter; closing requires one after it (real Mrkdwn
                // pairs `*word*` by what follows the close, not what
                // preceded the open).
                if chars[i] == '*' {
                    if bold_open {
                        if !followed_by_alnum(&chars, i) {
                            flush_text!();
                            tokens.push(Token::BoldMarker);
                            bold_open = false;
                            i += 1;
                            at_line_start = false;
                            continue;
                        }
                    } else if !preceded_by_alnum(&chars, i) && has_matching_close(&chars, i, '*') {
                        flush_text!();
                        tokens.push(Token::BoldMarker);
                        bold_open = true;
                        i += 1;
                        at_line_start = false;
                        continue;
                    }
                }

                // Rule 5: italic, same matching discipline as bold.
                if chars[i] == '_' {
                    if italic_open {
                        if !followed_by_alnum(&chars, i) {
                            flush_text!();
                            tokens.push(Token::ItalicMarker);
                            italic_open = false;
                            i += 1;
                            at_line_start = false;
                            continue;
                        }
                    } else if !preceded_by_alnum(&chars, i) && has_matching_close(&chars, i, '_') {
                        flush_text!();
                        tokens.push(Token::ItalicMarker);
                        italic_open = true;
                        i += 1;
                        at_line_start = false;
                        continue;
                    }
                }

                // Rule 6: strikethrough, same matching discipline.
                if chars[i] == '~' {
                    if strike_open {
                        if !followed_by_alnum(&chars, i) {
                            flush_text!();
                            tokens.push(Token::StrikeMarker);
                            strike_open = false;
                            i += 1;
                            at_line_start = false;
                            continue;
                        }
                    } else if !preceded_by_alnum(&chars, i) && has_matching_close(&chars, i, '~') {
                        flush_text!();
                        tokens.push(Token::StrikeMarker);
                        strike_open = true;
                        i += 1;
                        at_line_start = false;
                        continue;
                    }
                }

                // Rule 8: backslash escapes.
                if chars[i] == '\\' && i + 1 < n && is_escapable(chars[i + 1]) {
                    text_buf.push(chars[i + 1]);
                    i += 2;
                    at_line_start = false;
                    continue;
                }

                // Rule 9: accumulate.
                text_buf.push(chars[i]);
                i += 1;
                at_line_start = false;
            }
            State::InsideFence => {
                if starts_with_str(&chars, i, "```") {
                    flush_text!();
                    tokens.push(Token::FenceClose);
                    state = State::Outside;
                    i += 3;
                    continue;
                }
                if chars[i] == '<' {
                    if let Some((url, consumed)) = try_angle_url_only(&chars, i) {
                        text_buf.push_str(&url);
                        i += consumed;
                        continue;
                    }
                }
                text_buf.push(chars[i]);
                i += 1;
            }
        }
    }
    flush_text!();
    tokens
}

fn starts_with_str(chars: &[char], i: usize, needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    if i + needle.len() > chars.len() {
        return false;
    }
    chars[i..i + needle.len()] == needle[..]
}

fn preceded_by_alnum(chars: &[char], i: usize) -> bool {
    i > 0 && chars[i - 1].is_alphanumeric()
}

fn followed_by_alnum(chars: &[char], i: usize) -> bool {
    matches!(chars.get(i + 1), Some(c) if c.is_alphanumeric())
}

fn is_escapable(c: char) -> bool {
    matches!(c, '<' | '>' | '*' | '_' | '~' | '`')
}

/// Looks forward from `i + 1` for an unescaped `delim`, stopping at a blank
/// line (`\n\n`) or a fence delimiter, since a style marker never pairs
/// across those boundaries.
fn has_matching_close(chars: &[char], i: usize, delim: char) -> bool {
    let n = chars.len();
    let mut j = i + 1;
    while j < n {
        if chars[j] == '\n' && j + 1 < n && chars[j + 1] == '\n' {
            return false;
        }
        if starts_with_str(chars, j, "```") {
            return false;
        }
        if chars[j] == delim && !(j > 0 && chars[j - 1] == '\\') {
            return true;
        }
        j += 1;
    }
    false
}

fn try_inline_code(chars: &[char], i: usize) -> Option<(String, usize)> {
    let n = chars.len();
    let mut j = i + 1;
    while j < n {
        if chars[j] == '\n' {
            return None;
        }
        if chars[j] == '`' {
            let content: String = chars[i + 1..j].iter().collect();
            return Some((content, j + 1 - i));
        }
        j += 1;
    }
    None
}

fn try_emoji(chars: &[char], i: usize) -> Option<(String, usize)> {
    let n = chars.len();
    let mut j = i + 1;
    let start = j;
    while j < n && (chars[j].is_ascii_alphanumeric() || matches!(chars[j], '_' | '+' | '-')) {
        j += 1;
    }
    if j == start || j >= n || chars[j] != ':' {
        return None;
    }
    let name: String = chars[start..j].iter().collect();
    Some((name, j + 1 - i))
}

/// Finds the unescaped `>` closing an angle-bracket token opened at `i`.
/// An unterminated bracket never reaches past the end of its line, so an
/// unmatched `<` degrades to a literal character instead of swallowing the
/// rest of the message.
fn find_angle_close(chars: &[char], i: usize) -> Option<usize> {
    let n = chars.len();
    let mut j = i + 1;
    while j < n {
        if chars[j] == '\n' {
            return None;
        }
        if chars[j] == '>' && !(j > 0 && chars[j - 1] == '\\') {
            return Some(j);
        }
        j += 1;
    }
    None
}

fn try_angle(chars: &[char], i: usize) -> Option<(Token, usize)> {
    let close = find_angle_close(chars, i)?;
    let content: String = chars[i + 1..close].iter().collect();
    let consumed = close + 1 - i;
    Some((classify_angle(&content), consumed))
}

fn try_angle_url_only(chars: &[char], i: usize) -> Option<(String, usize)> {
    let close = find_angle_close(chars, i)?;
    let content: String = chars[i + 1..close].iter().collect();
    if content.starts_with("http://") || content.starts_with("https://") || content.starts_with("mailto:") {
        Some((content, close + 1 - i))
    } else {
        None
    }
}

/// The grammar fragment shared by every meta-marker payload: an id/url run
/// up to an optional `|label` suffix. Parsed with `nom` rather than by hand
/// since every marker kind below is a thin variation on this same shape.
fn id_and_label(input: &str) -> IResult<&str, (&str, Option<&str>)> {
    let (input, id) = take_while1(|c: char| c != '|')(input)?;
    let (input, label) = opt(preceded(char('|'), rest))(input)?;
    Ok((input, (id, label.filter(|l: &&str| !l.is_empty()))))
}

fn parse_user_mention(input: &str) -> IResult<&str, Token> {
    let (input, (id, name)) = preceded(char('@'), id_and_label)(input)?;
    Ok((input, Token::UserMention(id.to_string(), name.map(str::to_string))))
}

fn parse_channel_mention(input: &str) -> IResult<&str, Token> {
    let (input, (id, name)) = preceded(char('#'), id_and_label)(input)?;
    Ok((input, Token::ChannelMention(id.to_string(), name.map(str::to_string))))
}

fn parse_usergroup_mention(input: &str) -> IResult<&str, Token> {
    let (input, (id, name)) = preceded(tag("!subteam^"), id_and_label)(input)?;
    Ok((input, Token::UsergroupMention(id.to_string(), name.map(str::to_string))))
}

fn parse_date_token(input: &str) -> IResult<&str, Token> {
    let (input, _) = tag("!date^")(input)?;
    let (input, epoch) = digit1(input)?;
    let (input, _) = char('^')(input)?;
    let (input, format) = take_while1(|c: char| c != '|')(input)?;
    let (input, fallback) = preceded(char('|'), rest)(input)?;
    let epoch: i64 = epoch.parse().map_err(|_| {
        nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
    })?;
    Ok((input, Token::DateToken(epoch, Some(format.to_string()), Some(fallback.to_string()))))
}

fn parse_broadcast(input: &str) -> IResult<&str, Token> {
    let (input, _) = char('!')(input)?;
    let (input, range) = alt((tag("here"), tag("channel"), tag("everyone")))(input)?;
    let (input, _) = opt(preceded(char('|'), rest))(input)?;
    Ok((input, Token::Broadcast(range.to_string())))
}

/// A URL scheme per RFC 3986: a letter followed by letters/digits/`+-.`.
fn url_scheme(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
    ))(input)
}

fn parse_link(input: &str) -> IResult<&str, Token> {
    let (rest_input, url) = alt((
        recognize(preceded(tag("mailto:"), take_while(|c: char| c != '|'))),
        recognize(tuple((url_scheme, tag("://"), take_while(|c: char| c != '|')))),
    ))(input)?;
    let (rest_input, text) = opt(preceded(char('|'), rest))(rest_input)?;
    Ok((rest_input, Token::Link(url.to_string(), text.filter(|t: &&str| !t.is_empty()).map(str::to_string))))
}

/// Classifies the content of an angle-bracket token (`<…>` with the
/// brackets already stripped): user/channel/usergroup mentions, broadcasts,
/// dates, and bare links each have a distinct payload grammar. Each
/// candidate grammar is tried in order; the first complete match (all input
/// consumed) wins, and an unrecognized payload falls back to a literal
/// `<content>` text run.
fn classify_angle(content: &str) -> Token {
    let candidates: [fn(&str) -> IResult<&str, Token>; 6] = [
        parse_user_mention,
        parse_channel_mention,
        parse_usergroup_mention,
        parse_date_token,
        parse_broadcast,
        parse_link,
    ];
    for parser in candidates {
        if let Ok(("", token)) = parser(content) {
            return token;
        }
    }
    Token::Text(format!("<{content}>"))
}

fn try_line_start_marker(chars: &[char], i: usize) -> Option<(Token, usize)> {
    if starts_with_str(chars, i, "&gt;") {
        return Some((Token::QuoteMarker, 4));
    }
    if chars[i] == '>' && matches!(chars.get(i + 1), Some(' ')) {
        return Some((Token::QuoteMarker, 2));
    }
    if matches!(chars[i], '•' | '*') && matches!(chars.get(i + 1), Some(' ')) {
        return Some((Token::ListMarker(false, None), 2));
    }
    if chars[i].is_ascii_digit() {
        let n = chars.len();
        let mut j = i;
        while j < n && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j < n && chars[j] == '.' && matches!(chars.get(j + 1), Some(' ')) {
            let digits: String = chars[i..j].iter().collect();
            if let Ok(number) = digits.parse::<i64>() {
                return Some((Token::ListMarker(true, Some(number)), j + 2 - i));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_bold_pair_tokenizes() {
        let toks = tokenize("*hi*");
        assert_eq!(
            toks,
            vec![
                Token::BoldMarker,
                Token::Text("hi".into()),
                Token::BoldMarker,
            ]
        );
    }

    #[test]
    fn smoke_test_unmatched_star_is_literal() {
        let toks = tokenize("a * b");
        assert_eq!(toks, vec![Token::Text("a * b".into())]);
    }

    #[test]
    fn smoke_test_italic_pair_with_alphanumeric_content_closes() {
        let toks = tokenize("_x_");
        assert_eq!(
            toks,
            vec![Token::ItalicMarker, Token::Text("x".into()), Token::ItalicMarker]
        );
    }

    #[test]
    fn smoke_test_leading_bullet_marker_is_not_read_as_bold_open() {
        let toks = tokenize("* one\n* two");
        assert_eq!(
            toks,
            vec![
                Token::ListMarker(false, None),
                Token::Text("one".into()),
                Token::Newline,
                Token::ListMarker(false, None),
                Token::Text("two".into()),
            ]
        );
    }

    #[test]
    fn smoke_test_combined_bold_italic_outer_bold() {
        let toks = tokenize("*_bold italic_*");
        assert_eq!(
            toks,
            vec![
                Token::BoldMarker,
                Token::ItalicMarker,
                Token::Text("bold italic".into()),
                Token::ItalicMarker,
                Token::BoldMarker,
            ]
        );
    }

    #[test]
    fn smoke_test_fence_switches_state_and_strips_angle_url() {
        let toks = tokenize("```\n<https://example.com>\n```");
        assert_eq!(
            toks,
            vec![
                Token::FenceOpen,
                Token::Text("\nhttps://example.com\n".into()),
                Token::FenceClose,
            ]
        );
    }

    #[test]
    fn smoke_test_user_mention_with_name() {
        let toks = tokenize("hi <@U123|bob>");
        assert_eq!(
            toks,
            vec![
                Token::Text("hi ".into()),
                Token::UserMention("U123".into(), Some("bob".into())),
            ]
        );
    }

    #[test]
    fn smoke_test_broadcast_channel() {
        let toks = tokenize("hello <!channel>");
        assert_eq!(
            toks,
            vec![Token::Text("hello ".into()), Token::Broadcast("channel".into())]
        );
    }

    #[test]
    fn smoke_test_unterminated_angle_is_literal() {
        let toks = tokenize("a < b");
        assert_eq!(toks, vec![Token::Text("a < b".into())]);
    }

    #[test]
    fn smoke_test_blank_line_collapses_multiple_newlines() {
        let toks = tokenize("a\n\n\nb");
        assert_eq!(
            toks,
            vec![Token::Text("a".into()), Token::BlankLine, Token::Text("b".into())]
        );
    }

    #[test]
    fn smoke_test_ordered_list_marker() {
        let toks = tokenize("3. third");
        assert_eq!(
            toks,
            vec![Token::ListMarker(true, Some(3)), Token::Text("third".into())]
        );
    }

    #[test]
    fn smoke_test_backslash_escape() {
        let toks = tokenize(r"\*not bold\*");
        assert_eq!(toks, vec![Token::Text("*not bold*".into())]);
    }

    #[test]
    fn smoke_test_emoji_shortcode() {
        let toks = tokenize("go :rocket: now");
        assert_eq!(
            toks,
            vec![
                Token::Text("go ".into()),
                Token::Emoji("rocket".into()),
                Token::Text(" now".into()),
            ]
        );
    }
}
