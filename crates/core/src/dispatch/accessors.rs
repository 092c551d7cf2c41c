//! Precedence-ordered field locations in the reply envelope.
//!
//! Each logical field of a reply may live in several places depending on
//! backend version. A field is read by trying its paths in order and taking
//! the first one that yields a usable value.

use serde_json::Value;

/// A key path into a JSON object.
pub type FieldPath = &'static [&'static str];

pub const CONTENT_PATHS: &[FieldPath] = &[&["content"], &["response"]];

pub const CLARIFYING_QUESTION_PATHS: &[FieldPath] =
    &[&["clarifyingQuestions"], &["metadata", "clarifyingQuestions"]];

pub const NEEDS_MORE_INFO_PATHS: &[FieldPath] =
    &[&["metadata", "needsMoreInfo"], &["needsMoreInfo"]];

pub const MATCH_PATHS: &[FieldPath] = &[
    &["metadata", "matches"],
    &["metadata", "freelancerMatches"],
    &["matches"],
    &["freelancerMatches"],
];

pub const PROVIDER_PATHS: &[FieldPath] = &[&["metadata", "provider"]];

/// Follow `path` into `value`.
pub fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |current, key| current.get(*key))
}

/// Evaluate `paths` in order, returning the first value `extract` accepts.
pub fn first_of<'a, T>(
    value: &'a Value,
    paths: &[FieldPath],
    extract: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    paths
        .iter()
        .filter_map(|path| lookup(value, path))
        .find_map(extract)
}

/// Any string.
pub fn string(value: &Value) -> Option<&str> {
    value.as_str()
}

/// Any boolean.
pub fn boolean(value: &Value) -> Option<bool> {
    value.as_bool()
}

/// A non-empty array.
pub fn non_empty_array(value: &Value) -> Option<&Vec<Value>> {
    value.as_array().filter(|items| !items.is_empty())
}

/// A non-empty array of strings; non-string items are skipped.
pub fn non_empty_strings(value: &Value) -> Option<Vec<String>> {
    let strings: Vec<String> = value
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!strings.is_empty()).then_some(strings)
}
