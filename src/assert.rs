//! Panic-based assertion helpers for tests.
//!
//! Thin glue over the engine for use inside `#[test]` functions: build a
//! matcher, run it, and panic with the path-qualified diagnostic on
//! mismatch. The `_str` variants accept a raw JSON string target and
//! decode it with `serde_json` first; a decode failure is reported here,
//! never by the engine.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::matcher::Matcher;
use crate::pattern::Pattern;

/// Assert that `pattern` matches `target`; returns the capture table.
///
/// # Panics
///
/// Panics on mismatch, with the engine's diagnostic.
pub fn assert_json_matches(
    pattern: impl Into<Pattern>,
    target: &Value,
) -> BTreeMap<String, Value> {
    let mut matcher = Matcher::new(pattern);
    if !matcher.matches(target) {
        let detail = matcher
            .last_error()
            .map(|e| e.to_string())
            .unwrap_or_default();
        panic!("expected {matcher} to match {target}\n{detail}");
    }
    matcher.captures().clone()
}

/// Assert that `pattern` does not match `target`.
///
/// # Panics
///
/// Panics if the pattern matches after all.
pub fn refute_json_matches(pattern: impl Into<Pattern>, target: &Value) {
    let mut matcher = Matcher::new(pattern);
    if matcher.matches(target) {
        panic!("expected {matcher} not to match {target}");
    }
}

/// Like [`assert_json_matches`], with a raw JSON string target.
///
/// # Panics
///
/// Panics if `target` is not valid JSON, or on mismatch.
pub fn assert_json_matches_str(
    pattern: impl Into<Pattern>,
    target: &str,
) -> BTreeMap<String, Value> {
    assert_json_matches(pattern, &parse_target(target))
}

/// Like [`refute_json_matches`], with a raw JSON string target.
///
/// # Panics
///
/// Panics if `target` is not valid JSON, or on match.
pub fn refute_json_matches_str(pattern: impl Into<Pattern>, target: &str) {
    refute_json_matches(pattern, &parse_target(target));
}

fn parse_target(target: &str) -> Value {
    match serde_json::from_str(target) {
        Ok(value) => value,
        Err(err) => panic!("expected {target:?} to be valid JSON: {err}"),
    }
}
