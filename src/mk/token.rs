//! Mrkdwn token kinds produced by [`super::tokenizer::tokenize`].

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String),
    BoldMarker,
    ItalicMarker,
    StrikeMarker,
    InlineCodeSpan(String),
    FenceOpen,
    FenceClose,
    Link(String, Option<String>),
    UserMention(String, Option<String>),
    ChannelMention(String, Option<String>),
    UsergroupMention(String, Option<String>),
    Broadcast(String),
    Emoji(String),
    DateToken(i64, Option<String>, Option<String>),
    Newline,
    BlankLine,
    QuoteMarker,
    ListMarker(bool, Option<i64>),
}
