//! Converts rich chat messages between a structured JSON rich-text format
//! (RT), a legacy inline-text dialect (Mrkdwn, MK), and GitHub-Flavored
//! Markdown (GFM).
//!
//! `RT <-> GFM` is round-trip lossless for every representable construct;
//! `MK -> GFM` is one-way. The [`ast`] module is the only contract between
//! the three codecs: each decoder produces a [`Document`], each encoder
//! consumes one, and [`transform`] rewrites it in between.

pub mod ast;
pub mod error;
pub mod gfm;
pub mod logic;
pub mod mk;
pub mod rt;
pub mod transform;

pub use ast::{validate_document, Block, Document, Inline, ListItem, ListItemChild, Rewriter, Visitor};
pub use error::{ConvertError, ConvertResult};
pub use gfm::{parse_gfm, render_gfm, GfmRenderOptions};
pub use logic::{sanitize_input, sanitize_input_with_stats, InputSource, SanitizeStats};
pub use mk::parse_mrkdwn;
pub use rt::{parse_rich_text, render_rich_text};
pub use transform::{apply_callbacks, apply_id_map, print_ast, CallbackRewriter, IdNameMapper};

/// Error-handling mode for the top-level convenience functions (spec's
/// propagation policy). `BestEffort` is the default: a decode failure
/// degrades to a single raw-text paragraph, a render-invariant violation
/// degrades to the offending subtree's printable form; in both cases the
/// error is logged rather than dropped silently. `Strict` propagates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    Strict,
    #[default]
    BestEffort,
}

/// RT JSON -> GFM text.
pub fn rt_to_gfm(value: &serde_json::Value, options: &GfmRenderOptions, mode: Mode) -> ConvertResult<String> {
    let doc = decode_rt(value, mode)?;
    encode_gfm(&doc, options, mode)
}

/// GFM text -> RT JSON.
pub fn gfm_to_rt(source: &str, mode: Mode) -> ConvertResult<serde_json::Value> {
    let sanitized = logic::sanitize_input(source.as_bytes(), logic::InputSource::Unknown);
    let doc = gfm::parse_gfm(&sanitized);
    encode_rt(&doc, mode)
}

/// MK text -> GFM text (one-way).
pub fn mk_to_gfm(source: &str, options: &GfmRenderOptions, mode: Mode) -> ConvertResult<String> {
    let sanitized = logic::sanitize_input(source.as_bytes(), logic::InputSource::Unknown);
    let doc = mk::parse_mrkdwn(&sanitized);
    encode_gfm(&doc, options, mode)
}

fn decode_rt(value: &serde_json::Value, mode: Mode) -> ConvertResult<Document> {
    match rt::parse_rich_text(value) {
        Ok(doc) => Ok(doc),
        Err(err) => match mode {
            Mode::Strict => Err(err),
            Mode::BestEffort => {
                log::warn!("rt decode failed, falling back to a raw-text paragraph: {err}");
                Ok(raw_text_document(&value.to_string()))
            }
        },
    }
}

fn encode_gfm(doc: &Document, options: &GfmRenderOptions, mode: Mode) -> ConvertResult<String> {
    match (mode, ast::validate_document(doc)) {
        (Mode::Strict, Err(err)) => Err(err),
        (Mode::BestEffort, Err(err)) => {
            log::warn!("gfm render invariant violated, emitting the AST's printable form: {err}");
            Ok(transform::print_ast(doc))
        }
        (_, Ok(())) => Ok(gfm::render_gfm(doc, options)),
    }
}

fn encode_rt(doc: &Document, mode: Mode) -> ConvertResult<serde_json::Value> {
    match (mode, ast::validate_document(doc)) {
        (Mode::Strict, Err(err)) => Err(err),
        (Mode::BestEffort, Err(err)) => {
            log::warn!("rt render invariant violated, emitting the AST's printable form: {err}");
            Ok(serde_json::Value::String(transform::print_ast(doc)))
        }
        (_, Ok(())) => Ok(rt::render_rich_text(doc)),
    }
}

fn raw_text_document(raw: &str) -> Document {
    Document::new(vec![Block::Paragraph { inlines: vec![Inline::Text { text: raw.to_string() }] }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn smoke_test_rt_to_gfm_no_team() {
        let input = json!({
            "type": "rich_text",
            "elements": [{
                "type": "rich_text_section",
                "elements": [
                    {"type": "text", "text": "Hi "},
                    {"type": "user", "user_id": "U1"}
                ]
            }]
        });
        let out = rt_to_gfm(&input, &GfmRenderOptions::default(), Mode::Strict).unwrap();
        assert_eq!(out, "Hi [U1](slack://user?id=U1)");
    }

    #[test]
    fn smoke_test_rt_to_gfm_round_trip_through_gfm_to_rt() {
        let input = json!({
            "type": "rich_text",
            "elements": [{
                "type": "rich_text_section",
                "elements": [
                    {"type": "text", "text": "Hi "},
                    {"type": "user", "user_id": "U1"}
                ]
            }]
        });
        let gfm = rt_to_gfm(&input, &GfmRenderOptions::default(), Mode::Strict).unwrap();
        let rt = gfm_to_rt(&gfm, Mode::Strict).unwrap();
        assert_eq!(rt, input);
    }

    #[test]
    fn smoke_test_strict_mode_propagates_decode_error() {
        let bad = json!({"type": "rich_text", "elements": [{"type": "not_a_real_type"}]});
        let err = rt_to_gfm(&bad, &GfmRenderOptions::default(), Mode::Strict).unwrap_err();
        assert!(matches!(err, ConvertError::Parse(_)));
    }

    #[test]
    fn smoke_test_best_effort_mode_degrades_instead_of_erroring() {
        let bad = json!({"type": "rich_text", "elements": [{"type": "not_a_real_type"}]});
        let out = rt_to_gfm(&bad, &GfmRenderOptions::default(), Mode::BestEffort).unwrap();
        assert!(out.contains("not_a_real_type"));
    }

    #[test]
    fn smoke_test_mk_to_gfm_combined_styles() {
        let out = mk_to_gfm("*_bold italic_*", &GfmRenderOptions::default(), Mode::Strict).unwrap();
        assert_eq!(out, "***bold italic***");
    }

    #[test]
    fn smoke_test_mk_to_gfm_broadcast() {
        let out = mk_to_gfm("hello <!channel>", &GfmRenderOptions::default(), Mode::Strict).unwrap();
        assert_eq!(out, "hello [@channel](slack://broadcast?range=channel)");
    }
}
