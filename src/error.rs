//! Error taxonomy for the conversion core.
//!
//! Every failure mode that can be detected inside the pipeline collapses into
//! one `ConvertError` enum with four kinds, matching the four ways a caller's
//! request can go wrong: the input text/JSON doesn't map to the AST, the AST
//! violates a rendering invariant, caller-supplied data is malformed, or a
//! transformer callback raised. Concrete error *types* stay out of the public
//! surface deliberately -- callers match on `kind()`, not on a type hierarchy.

use std::fmt;

#[derive(Debug, Clone)]
pub enum ConvertError {
    Parse(ParseContext),
    Render(String),
    Validation(String),
    Transform(String),
}

/// Context attached to a `ConvertError::Parse`: what looked wrong, and where.
#[derive(Debug, Clone)]
pub struct ParseContext {
    pub message: String,
    pub element: Option<String>,
    pub position: Option<usize>,
    pub parent_type: Option<String>,
}

impl ParseContext {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            position: None,
            parent_type: None,
        }
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn with_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_parent(mut self, parent_type: impl Into<String>) -> Self {
        self.parent_type = Some(parent_type.into());
        self
    }
}

impl ConvertError {
    pub fn parse(message: impl Into<String>) -> Self {
        ConvertError::Parse(ParseContext::new(message))
    }

    pub fn render(message: impl Into<String>) -> Self {
        ConvertError::Render(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ConvertError::Validation(message.into())
    }

    pub fn transform(message: impl Into<String>) -> Self {
        ConvertError::Transform(message.into())
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Parse(ctx) => {
                write!(f, "parse error: {}", ctx.message)?;
                if let Some(el) = &ctx.element {
                    write!(f, " (element: {el})")?;
                }
                if let Some(pos) = ctx.position {
                    write!(f, " (position: {pos})")?;
                }
                if let Some(parent) = &ctx.parent_type {
                    write!(f, " (parent: {parent})")?;
                }
                Ok(())
            }
            ConvertError::Render(e) => write!(f, "render error: {e}"),
            ConvertError::Validation(e) => write!(f, "validation error: {e}"),
            ConvertError::Transform(e) => write!(f, "transform error: {e}"),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<serde_json::Error> for ConvertError {
    fn from(e: serde_json::Error) -> Self {
        ConvertError::Parse(ParseContext::new(format!("invalid JSON: {e}")))
    }
}

pub type ConvertResult<T> = Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke_test_parse_context_display() {
        let err = ConvertError::Parse(
            ParseContext::new("unknown element type")
                .with_element("rich_text_bogus")
                .with_position(12)
                .with_parent("rich_text_section"),
        );
        let text = err.to_string();
        assert!(text.contains("unknown element type"));
        assert!(text.contains("rich_text_bogus"));
        assert!(text.contains("12"));
        assert!(text.contains("rich_text_section"));
    }

    #[test]
    fn smoke_test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ broken").unwrap_err();
        let err: ConvertError = json_err.into();
        assert!(matches!(err, ConvertError::Parse(_)));
    }
}
