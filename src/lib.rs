//! Structural pattern matching for JSON values.
//!
//! Instead of asserting exact equality against a fixture, describe the
//! *shape* you expect — literals where values are known, wildcards and
//! type predicates where they aren't, regexes for strings, and named
//! captures that must bind consistently — and match it against a
//! `serde_json::Value`. Failures come back as a single path-qualified
//! message pointing at the most proximate mismatch.
//!
//! ```
//! use json_probe::{Matcher, Pattern};
//! use serde_json::json;
//!
//! let pattern = Pattern::object([
//!     ("id", Pattern::capture("id")),
//!     ("name", Pattern::from("Jane")),
//!     ("token", Pattern::regex_str("^[0-9a-f]{8}$").unwrap()),
//!     ("roles", Pattern::array([Pattern::from("admin")]).unordered().forgiving()),
//! ]);
//!
//! let mut matcher = Matcher::new(pattern);
//! let target = json!({
//!     "id": 7,
//!     "name": "Jane",
//!     "token": "deadbeef",
//!     "roles": ["user", "admin"],
//! });
//! assert!(matcher.matches(&target));
//! assert_eq!(matcher.capture("id"), Some(&json!(7)));
//! ```
//!
//! Arrays and objects carry two independent mode axes: ordered/unordered
//! element matching and strict/forgiving handling of extra elements/keys.
//! Unset axes resolve to [`MatchConfig`] defaults (arrays ordered and
//! strict, objects unordered and strict) when the node is matched.

pub mod assert;
pub mod config;
pub mod error;
pub mod matcher;
pub mod pattern;
pub mod value;

pub use config::MatchConfig;
pub use error::{MatchError, MatchErrorKind};
pub use matcher::{match_value, match_value_with_config, MatchReport, Matcher};
pub use pattern::{Ordering, Pattern, Strictness};
pub use value::{values_equal, ValueType};
