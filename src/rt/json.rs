//! Thin, typed accessors over `serde_json::Value` for the RT boundary.
//!
//! Every function here either returns the value the caller asked for or a
//! [`ConvertError::Parse`] naming the missing/mistyped field. No function
//! outside [`super::parse`] and [`super::render`] should import this module.

use serde_json::Value;

use crate::error::{ConvertError, ConvertResult, ParseContext};

pub fn element_type(value: &Value, parent_type: &str) -> ConvertResult<String> {
    value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ConvertError::Parse(
                ParseContext::new("element is missing a \"type\" field").with_parent(parent_type),
            )
        })
}

pub fn str_field<'a>(value: &'a Value, field: &str, parent_type: &str) -> ConvertResult<&'a str> {
    value.get(field).and_then(Value::as_str).ok_or_else(|| {
        ConvertError::Parse(
            ParseContext::new(format!("expected string field \"{field}\""))
                .with_element(parent_type)
                .with_parent(parent_type),
        )
    })
}

pub fn opt_str_field(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(Value::as_str).map(str::to_string)
}

pub fn int_field(value: &Value, field: &str, parent_type: &str) -> ConvertResult<i64> {
    value.get(field).and_then(Value::as_i64).ok_or_else(|| {
        ConvertError::Parse(
            ParseContext::new(format!("expected integer field \"{field}\"")).with_element(parent_type),
        )
    })
}

pub fn array_field<'a>(value: &'a Value, field: &str, parent_type: &str) -> ConvertResult<&'a Vec<Value>> {
    value.get(field).and_then(Value::as_array).ok_or_else(|| {
        ConvertError::Parse(
            ParseContext::new(format!("expected array field \"{field}\"")).with_element(parent_type),
        )
    })
}

pub fn bool_field(value: &Value, field: &str) -> bool {
    value.get(field).and_then(Value::as_bool).unwrap_or(false)
}
