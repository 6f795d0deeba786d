//! The recursive matching engine.
//!
//! One dispatch function classifies each pattern node (capture, array,
//! object, leaf) and routes it to the matching algorithm for that kind.
//! Container modes left unset on the pattern resolve to the engine's
//! configured defaults at the moment the node is matched.
//!
//! ## Unordered arrays are greedy
//!
//! Unordered array matching consumes target elements first-fit, in pattern
//! order: each pattern element takes the first remaining target element it
//! matches. This is not globally optimal bipartite matching — a pattern
//! satisfiable only by a non-greedy assignment is rejected. For example
//! `[WILDCARD, 1]` against `[1, 2]`: the wildcard consumes `1`, and the
//! literal `1` finds nothing. Kept as documented behavior; shape assertions
//! in tests rarely need optimal assignment, and greedy failures are easy to
//! fix by reordering or tightening the pattern.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::config::MatchConfig;
use crate::error::{MatchError, MatchErrorKind};
use crate::pattern::{Ordering, Pattern, Strictness};
use crate::value::{values_equal, ValueType};

/// Root marker for error paths.
const ROOT: &str = "(ROOT)";

/// A pattern plus a matching policy, with the observable results of the
/// most recent match: the capture table and the last diagnostic.
///
/// Each call to [`Matcher::matches`] is a fresh session — captures and the
/// error slot are reset first, so a matcher can be reused across targets.
/// Not shareable across threads mid-match; give each thread its own.
pub struct Matcher {
    pattern: Pattern,
    config: MatchConfig,
    captures: BTreeMap<String, Value>,
    last_error: Option<MatchError>,
}

impl Matcher {
    pub fn new(pattern: impl Into<Pattern>) -> Matcher {
        Matcher::with_config(pattern, MatchConfig::default())
    }

    pub fn with_config(pattern: impl Into<Pattern>, config: MatchConfig) -> Matcher {
        Matcher {
            pattern: pattern.into(),
            config,
            captures: BTreeMap::new(),
            last_error: None,
        }
    }

    /// Match the target against this matcher's pattern.
    ///
    /// On `false`, [`Matcher::last_error`] holds the most proximate failure.
    /// Captures from the run (even a failed one) are available via
    /// [`Matcher::captures`].
    pub fn matches(&mut self, target: &Value) -> bool {
        let mut session = Session::new(&self.config);
        let matched = session.match_node(Some(ROOT), &self.pattern, target);
        self.captures = session.captures;
        self.last_error = session.last_error;
        matched
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Values bound by capture patterns during the most recent match.
    pub fn captures(&self) -> &BTreeMap<String, Value> {
        &self.captures
    }

    /// The value bound to one capture name, if any.
    pub fn capture(&self, name: &str) -> Option<&Value> {
        self.captures.get(name)
    }

    /// The diagnostic from the most recent failed match.
    pub fn last_error(&self) -> Option<&MatchError> {
        self.last_error.as_ref()
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}

/// Result of a one-shot [`match_value`] call.
#[derive(Debug, Clone)]
pub struct MatchReport {
    pub matched: bool,
    /// Set iff `matched` is false.
    pub error: Option<MatchError>,
    pub captures: BTreeMap<String, Value>,
}

/// Match `pattern` against `target` under the default config.
pub fn match_value(pattern: &Pattern, target: &Value) -> MatchReport {
    match_value_with_config(pattern, target, &MatchConfig::default())
}

/// Match `pattern` against `target` under an explicit config.
pub fn match_value_with_config(
    pattern: &Pattern,
    target: &Value,
    config: &MatchConfig,
) -> MatchReport {
    let mut session = Session::new(config);
    let matched = session.match_node(Some(ROOT), pattern, target);
    MatchReport {
        matched,
        error: session.last_error,
        captures: session.captures,
    }
}

/// Per-invocation state: the capture table and the single last-error slot.
struct Session<'a> {
    config: &'a MatchConfig,
    captures: BTreeMap<String, Value>,
    last_error: Option<MatchError>,
}

impl<'a> Session<'a> {
    fn new(config: &'a MatchConfig) -> Session<'a> {
        Session {
            config,
            captures: BTreeMap::new(),
            last_error: None,
        }
    }

    /// Dispatch on the pattern kind.
    ///
    /// `path` is `None` for exploratory probes: those must not leave
    /// diagnostics behind, so every report site is gated on the path.
    fn match_node(&mut self, path: Option<&str>, pattern: &Pattern, target: &Value) -> bool {
        match pattern {
            Pattern::Wildcard => true,
            Pattern::Capture(name) => self.match_capture(path, name, target),
            Pattern::Array {
                elements,
                ordering,
                strictness,
            } => self.match_array(path, elements, *ordering, *strictness, target),
            Pattern::Object {
                entries,
                ordering,
                strictness,
            } => self.match_object(path, entries, *ordering, *strictness, target),
            Pattern::Regex(re) => {
                let matched = self.regex_matches(re, target);
                if !matched {
                    self.report_leaf(path, pattern, target);
                }
                matched
            }
            Pattern::Type(t) => {
                let matched = self.type_matches(*t, target);
                if !matched {
                    self.report_leaf(path, pattern, target);
                }
                matched
            }
            Pattern::Literal(expected) => {
                let matched = values_equal(expected, target);
                if !matched {
                    self.report_leaf(path, pattern, target);
                }
                matched
            }
        }
    }

    fn regex_matches(&self, re: &fancy_regex::Regex, target: &Value) -> bool {
        if self
            .config
            .skip_regex_match_on
            .contains(&ValueType::of(target))
        {
            // Equality fallback: a regex never equals a JSON value.
            return false;
        }
        match target {
            Value::String(s) => re.is_match(s).unwrap_or(false),
            _ => false,
        }
    }

    fn type_matches(&self, t: ValueType, target: &Value) -> bool {
        if self.config.skip_type_match_on.contains(&t) {
            // Equality fallback: a type token never equals a JSON value.
            return false;
        }
        ValueType::of(target) == t
    }

    /// First occurrence binds the name; later occurrences must match the
    /// bound value. The re-check runs the bound value through the engine as
    /// a pattern, so containers follow the configured default modes.
    fn match_capture(&mut self, path: Option<&str>, name: &str, target: &Value) -> bool {
        let previous = match self.captures.get(name) {
            None => {
                self.captures.insert(name.to_string(), target.clone());
                return true;
            }
            Some(bound) => bound.clone(),
        };

        let rebound = Pattern::from_value(previous.clone());
        if self.match_node(None, &rebound, target) {
            true
        } else {
            self.report(
                path,
                MatchErrorKind::CaptureConflict {
                    name: name.to_string(),
                    previous: previous.to_string(),
                    value: target.to_string(),
                },
            );
            false
        }
    }

    fn match_array(
        &mut self,
        path: Option<&str>,
        elements: &[Pattern],
        ordering: Option<Ordering>,
        strictness: Option<Strictness>,
        target: &Value,
    ) -> bool {
        let Value::Array(items) = target else {
            self.report(path, MatchErrorKind::NotAnArray);
            return false;
        };

        let ordering = ordering.unwrap_or_else(|| self.config.array_ordering());
        let strictness = strictness.unwrap_or_else(|| self.config.array_strictness());

        if elements.len() > items.len() {
            self.report(
                path,
                MatchErrorKind::TooFewElements {
                    expected: elements.len(),
                    actual: items.len(),
                },
            );
            return false;
        }
        if strictness == Strictness::Strict && elements.len() < items.len() {
            self.report(
                path,
                MatchErrorKind::TooManyElements {
                    expected: elements.len(),
                    actual: items.len(),
                },
            );
            return false;
        }

        match ordering {
            Ordering::Ordered => {
                for (i, (pattern, item)) in elements.iter().zip(items).enumerate() {
                    let child = child_index(path, i);
                    if !self.match_node(child.as_deref(), pattern, item) {
                        return false;
                    }
                }
                true
            }
            Ordering::Unordered => {
                // Greedy first-fit (see module docs). Probes run path-less
                // so failed attempts leave no diagnostics.
                let mut remaining: Vec<&Value> = items.iter().collect();
                for pattern in elements {
                    let found = remaining
                        .iter()
                        .position(|item| self.match_node(None, pattern, *item));
                    match found {
                        Some(i) => {
                            remaining.remove(i);
                        }
                        None => {
                            self.report(
                                path,
                                MatchErrorKind::ElementNotFound {
                                    pattern: pattern.to_string(),
                                },
                            );
                            return false;
                        }
                    }
                }
                true
            }
        }
    }

    fn match_object(
        &mut self,
        path: Option<&str>,
        entries: &[(String, Pattern)],
        ordering: Option<Ordering>,
        strictness: Option<Strictness>,
        target: &Value,
    ) -> bool {
        let Value::Object(map) = target else {
            self.report(path, MatchErrorKind::NotAnObject);
            return false;
        };

        let ordering = ordering.unwrap_or_else(|| self.config.object_ordering());
        let strictness = strictness.unwrap_or_else(|| self.config.object_strictness());

        // Missing keys fail regardless of strictness; first in pattern order.
        for (key, _) in entries {
            if !map.contains_key(key) {
                self.report(path, MatchErrorKind::MissingKey { key: key.clone() });
                return false;
            }
        }

        if strictness == Strictness::Strict {
            for key in map.keys() {
                if !entries.iter().any(|(k, _)| k == key) {
                    self.report(path, MatchErrorKind::ExtraKey { key: key.clone() });
                    return false;
                }
            }
        }

        if ordering == Ordering::Ordered {
            let expected: Vec<&String> = entries.iter().map(|(k, _)| k).collect();
            let actual: Vec<&String> = map.keys().collect();
            if expected != actual {
                self.report(
                    path,
                    MatchErrorKind::KeyOrderMismatch {
                        expected: expected.into_iter().cloned().collect(),
                        actual: actual.into_iter().cloned().collect(),
                    },
                );
                return false;
            }
        }

        for (key, pattern) in entries {
            let Some(value) = map.get(key) else {
                return false;
            };
            let child = child_key(path, key);
            if !self.match_node(child.as_deref(), pattern, value) {
                return false;
            }
        }
        true
    }

    fn report_leaf(&mut self, path: Option<&str>, pattern: &Pattern, target: &Value) {
        self.report(
            path,
            MatchErrorKind::LeafMismatch {
                pattern: pattern.to_string(),
                value: target.to_string(),
            },
        );
    }

    /// Record a diagnostic unless this is an exploratory probe. Later
    /// failures overwrite earlier ones: the most recent failure wins.
    fn report(&mut self, path: Option<&str>, kind: MatchErrorKind) {
        if let Some(path) = path {
            self.last_error = Some(MatchError {
                path: path.to_string(),
                kind,
            });
        }
    }
}

fn child_index(path: Option<&str>, index: usize) -> Option<String> {
    path.map(|p| format!("{p}[{index}]"))
}

fn child_key(path: Option<&str>, key: &str) -> Option<String> {
    path.map(|p| format!("{p}.{key}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;
    use serde_json::json;

    fn check(pattern: impl Into<Pattern>, target: Value) -> Matcher {
        let mut matcher = Matcher::new(pattern);
        matcher.matches(&target);
        matcher
    }

    #[test]
    fn wildcard_matches_every_kind() {
        for target in [
            json!(null),
            json!(true),
            json!(1),
            json!(1.5),
            json!("s"),
            json!([1, 2]),
            json!({"a": 1}),
        ] {
            assert!(Matcher::new(Pattern::wildcard()).matches(&target));
        }
    }

    #[test]
    fn literal_scalar_match_and_mismatch() {
        assert!(Matcher::new(Pattern::from("hello")).matches(&json!("hello")));
        let m = check(Pattern::from("hello"), json!("world"));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            r#"At (ROOT): expected "hello" to match "world""#,
        );
    }

    #[test]
    fn literal_numbers_cross_representation() {
        assert!(Matcher::new(Pattern::from(1)).matches(&json!(1.0)));
        assert!(Matcher::new(Pattern::from(1.0)).matches(&json!(1)));
        assert!(!Matcher::new(Pattern::from(1)).matches(&json!(1.1)));
    }

    #[test]
    fn regex_matches_strings_only() {
        let pattern = Pattern::regex_str("^0x[0-9a-f]+$").unwrap();
        assert!(Matcher::new(pattern.clone()).matches(&json!("0xc0ffee")));
        assert!(!Matcher::new(pattern.clone()).matches(&json!("nope")));
        assert!(!Matcher::new(pattern.clone()).matches(&json!(42)));
        assert!(!Matcher::new(pattern).matches(&json!(null)));
    }

    #[test]
    fn regex_supports_lookaround() {
        let pattern = Pattern::regex_str(r"^(?!tmp_)\w+$").unwrap();
        assert!(Matcher::new(pattern.clone()).matches(&json!("users")));
        assert!(!Matcher::new(pattern).matches(&json!("tmp_users")));
    }

    #[test]
    fn regex_failure_names_both_sides() {
        let m = check(Pattern::regex_str("^a+$").unwrap(), json!("bbb"));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            r#"At (ROOT): expected /^a+$/ to match "bbb""#,
        );
    }

    #[test]
    fn type_predicates_match_kinds() {
        assert!(Matcher::new(Pattern::of_type(ValueType::Number)).matches(&json!(1)));
        assert!(Matcher::new(Pattern::of_type(ValueType::Number)).matches(&json!(1.5)));
        assert!(Matcher::new(Pattern::of_type(ValueType::Array)).matches(&json!([1])));
        assert!(!Matcher::new(Pattern::of_type(ValueType::String)).matches(&json!(null)));
        assert!(!Matcher::new(Pattern::of_type(ValueType::Number)).matches(&json!({"a": 1})));
    }

    #[test]
    fn excluded_type_predicate_falls_back_to_equality_and_fails() {
        let mut config = MatchConfig::default();
        config.skip_type_match_on.insert(ValueType::Number);
        let mut m = Matcher::with_config(Pattern::of_type(ValueType::Number), config);
        assert!(!m.matches(&json!(1)));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            "At (ROOT): expected Number to match 1",
        );
    }

    #[test]
    fn excluded_regex_target_kind_falls_back_to_equality_and_fails() {
        let mut config = MatchConfig::default();
        config.skip_regex_match_on.insert(ValueType::String);
        let pattern = Pattern::regex_str("^a+$").unwrap();
        let mut m = Matcher::with_config(pattern, config);
        assert!(!m.matches(&json!("aaa")));
    }

    #[test]
    fn capture_binds_first_value() {
        let mut m = Matcher::new(Pattern::capture("id"));
        assert!(m.matches(&json!(42)));
        assert_eq!(m.capture("id"), Some(&json!(42)));
    }

    #[test]
    fn capture_conflict_reports_both_values() {
        let pattern = Pattern::object([("x", Pattern::capture("k")), ("y", Pattern::capture("k"))]);
        let m = check(pattern, json!({"x": 5, "y": 6}));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            r#"At (ROOT).y: expected capture "k" with value 5 to match 6"#,
        );
    }

    #[test]
    fn capture_recheck_tolerates_numeric_representation() {
        let pattern = Pattern::object([("x", Pattern::capture("k")), ("y", Pattern::capture("k"))]);
        assert!(Matcher::new(pattern).matches(&json!({"x": 1, "y": 1.0})));
    }

    #[test]
    fn matcher_reset_between_runs() {
        let mut m = Matcher::new(Pattern::capture("k"));
        assert!(m.matches(&json!(1)));
        assert_eq!(m.capture("k"), Some(&json!(1)));
        assert!(m.matches(&json!(2)));
        assert_eq!(m.capture("k"), Some(&json!(2)));
        assert!(m.last_error().is_none());
    }

    #[test]
    fn unordered_probe_leaves_no_diagnostic() {
        // The probe for `2` fails against `1` mid-scan; the overall match
        // succeeds and must end with a clean error slot.
        let pattern = Pattern::array([2, 1]).unordered();
        let mut m = Matcher::new(pattern);
        assert!(m.matches(&json!([1, 2])));
        assert!(m.last_error().is_none());
    }

    #[test]
    fn unordered_matching_is_greedy_first_fit() {
        // The wildcard consumes the 1 before the literal pattern sees it.
        let pattern = Pattern::array([Pattern::wildcard(), Pattern::from(1)]).unordered();
        let mut m = Matcher::new(pattern);
        assert!(!m.matches(&json!([1, 2])));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            "(ROOT) does not contain an element matching 1",
        );
    }

    #[test]
    fn ordered_failure_reports_indexed_path() {
        let pattern = Pattern::array([1, 2, 3]).ordered();
        let m = check(pattern, json!([1, 9, 3]));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            "At (ROOT)[1]: expected 2 to match 9",
        );
    }

    #[test]
    fn nested_failure_keeps_deepest_path() {
        let pattern = Pattern::object([(
            "a",
            Pattern::array([Pattern::object([("b", Pattern::from(1))])]).ordered(),
        )]);
        let m = check(pattern, json!({"a": [{"b": 2}]}));
        assert_eq!(
            m.last_error().unwrap().to_string(),
            "At (ROOT).a[0].b: expected 1 to match 2",
        );
    }

    #[test]
    fn match_value_reports_outcome_and_captures() {
        let pattern = Pattern::object([("id", Pattern::capture("id"))]);
        let report = match_value(&pattern, &json!({"id": 7}));
        assert!(report.matched);
        assert!(report.error.is_none());
        assert_eq!(report.captures.get("id"), Some(&json!(7)));

        let report = match_value(&pattern, &json!({"id": 7, "extra": 1}));
        assert!(!report.matched);
        assert_eq!(
            report.error.unwrap().to_string(),
            "(ROOT) contains an extra key extra",
        );
    }

    #[test]
    fn matcher_displays_its_pattern() {
        let m = Matcher::new(Pattern::object([("a", Pattern::wildcard())]));
        assert_eq!(m.to_string(), r#"{"a": WILDCARD}"#);
    }

    #[test]
    fn child_path_helpers() {
        assert_eq!(child_index(Some("(ROOT)"), 2).as_deref(), Some("(ROOT)[2]"));
        assert_eq!(child_key(Some("(ROOT)[2]"), "k").as_deref(), Some("(ROOT)[2].k"));
        assert_eq!(child_index(None, 2), None);
        assert_eq!(child_key(None, "k"), None);
    }

    mod properties {
        use proptest::prelude::*;
        use serde_json::Value;

        use crate::matcher::Matcher;
        use crate::pattern::Pattern;

        fn arb_json() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| Value::from(n)),
                "[a-zA-Z0-9 ]{0,12}".prop_map(|s| Value::from(s)),
            ];
            leaf.prop_recursive(4, 64, 8, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                    prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                        .prop_map(|map| Value::Object(map.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn every_value_matches_its_own_shape(value in arb_json()) {
                let mut matcher = Matcher::new(Pattern::from_value(value.clone()));
                prop_assert!(matcher.matches(&value));
            }

            #[test]
            fn wildcard_matches_every_value(value in arb_json()) {
                prop_assert!(Matcher::new(Pattern::wildcard()).matches(&value));
            }

            #[test]
            fn outcomes_are_deterministic(pattern in arb_json(), target in arb_json()) {
                let mut first = Matcher::new(Pattern::from_value(pattern.clone()));
                let mut second = Matcher::new(Pattern::from_value(pattern));
                let a = first.matches(&target);
                let b = second.matches(&target);
                prop_assert_eq!(a, b);
                prop_assert_eq!(
                    first.last_error().map(ToString::to_string),
                    second.last_error().map(ToString::to_string)
                );
            }
        }
    }
}
