//! Structural invariant checks run before rendering (spec-level `RenderError`).

use crate::error::{ConvertError, ConvertResult};

use super::nodes::{Document, Inline};
use super::traversal::{walk_inline, Visitor};

#[derive(Default)]
struct LinkValidator {
    violation: Option<String>,
}

impl Visitor for LinkValidator {
    fn visit_inline(&mut self, inline: &Inline) {
        if self.violation.is_some() {
            return;
        }
        if let Inline::Link { url, .. } = inline {
            if url.is_empty() {
                self.violation = Some("Link.url must not be empty".to_string());
                return;
            }
        }
        walk_inline(self, inline);
    }
}

/// Checks the structural invariants a renderer relies on (currently: every
/// `Link` has a non-empty `url`). Returns the first violation found.
pub fn validate_document(doc: &Document) -> ConvertResult<()> {
    let mut validator = LinkValidator::default();
    validator.visit_document(doc);
    match validator.violation {
        Some(message) => Err(ConvertError::render(message)),
        None => Ok(()),
    }
}
