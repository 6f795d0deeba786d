//! Matching policy: per-engine mode defaults and exclusion sets.
//!
//! A `MatchConfig` is plain data held by each engine instance — there is no
//! process-wide state. Callers that need different policies construct
//! independent matchers.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::pattern::{Ordering, Strictness};
use crate::value::ValueType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Treat array patterns with no explicit ordering as unordered.
    pub assume_unordered_arrays: bool,
    /// Treat array patterns with no explicit strictness as strict.
    pub assume_strict_arrays: bool,
    /// Treat object patterns with no explicit ordering as unordered.
    pub assume_unordered_objects: bool,
    /// Treat object patterns with no explicit strictness as strict.
    pub assume_strict_objects: bool,
    /// Type predicates for these kinds fall back to plain equality. A type
    /// token never equals a JSON value, so an excluded predicate fails with
    /// a leaf mismatch wherever it is used.
    pub skip_type_match_on: HashSet<ValueType>,
    /// Target kinds excluded from regex matching; a regex pattern meeting
    /// such a target falls back to equality and fails. An earlier,
    /// since-superseded engine shipped `{String}` here, which disables
    /// regex matching outright; the consolidated default is the empty set.
    pub skip_regex_match_on: HashSet<ValueType>,
}

impl Default for MatchConfig {
    fn default() -> MatchConfig {
        MatchConfig {
            assume_unordered_arrays: false,
            assume_strict_arrays: true,
            assume_unordered_objects: true,
            assume_strict_objects: true,
            skip_type_match_on: HashSet::new(),
            skip_regex_match_on: HashSet::new(),
        }
    }
}

impl MatchConfig {
    pub(crate) fn array_ordering(&self) -> Ordering {
        if self.assume_unordered_arrays {
            Ordering::Unordered
        } else {
            Ordering::Ordered
        }
    }

    pub(crate) fn array_strictness(&self) -> Strictness {
        if self.assume_strict_arrays {
            Strictness::Strict
        } else {
            Strictness::Forgiving
        }
    }

    pub(crate) fn object_ordering(&self) -> Ordering {
        if self.assume_unordered_objects {
            Ordering::Unordered
        } else {
            Ordering::Ordered
        }
    }

    pub(crate) fn object_strictness(&self) -> Strictness {
        if self.assume_strict_objects {
            Strictness::Strict
        } else {
            Strictness::Forgiving
        }
    }
}
