//! Pattern trees — expected-shape descriptions richer than literal values.
//!
//! A `Pattern` is the left-hand side of a match: the same tree shape as a
//! JSON value, but with extra node kinds (wildcard, regex, type predicate,
//! named capture) and per-container mode annotations (element ordering,
//! strictness about extra elements/keys).

use std::fmt;

use fancy_regex::Regex;
use serde_json::Value;

use crate::value::ValueType;

/// Whether container elements must match positionally or as a multiset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ordering {
    Ordered,
    Unordered,
}

/// Whether target elements/keys beyond the pattern are rejected or tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strictness {
    Strict,
    Forgiving,
}

/// One node of a pattern tree.
///
/// Container nodes carry optional mode annotations; `None` means "use the
/// engine's configured default", resolved when the node is matched.
#[derive(Debug, Clone)]
pub enum Pattern {
    /// Matches a target equal to this value (numeric cross-type tolerant).
    Literal(Value),
    /// Matches a String target containing a match of the regex.
    ///
    /// `fancy_regex` so that lookaround and backreferences work; test
    /// fixtures written against richer regex engines port over unchanged.
    Regex(Regex),
    /// Matches any target of the given JSON kind.
    Type(ValueType),
    /// Matches anything, including `null`.
    Wildcard,
    /// Binds the target value at this position to a name. A name captured
    /// at several positions must bind consistent values.
    Capture(String),
    Array {
        elements: Vec<Pattern>,
        ordering: Option<Ordering>,
        strictness: Option<Strictness>,
    },
    Object {
        /// Entries in pattern order. Order is significant for ordered
        /// matching and for first-missing-key reporting.
        entries: Vec<(String, Pattern)>,
        ordering: Option<Ordering>,
        strictness: Option<Strictness>,
    },
}

impl Pattern {
    pub fn wildcard() -> Pattern {
        Pattern::Wildcard
    }

    pub fn capture(name: impl Into<String>) -> Pattern {
        Pattern::Capture(name.into())
    }

    pub fn regex(re: Regex) -> Pattern {
        Pattern::Regex(re)
    }

    /// Compile `source` and wrap it in a regex pattern.
    pub fn regex_str(source: &str) -> Result<Pattern, fancy_regex::Error> {
        Ok(Pattern::Regex(Regex::new(source)?))
    }

    pub fn of_type(t: ValueType) -> Pattern {
        Pattern::Type(t)
    }

    pub fn literal(value: impl Into<Value>) -> Pattern {
        Pattern::Literal(value.into())
    }

    pub fn array<P, I>(elements: I) -> Pattern
    where
        P: Into<Pattern>,
        I: IntoIterator<Item = P>,
    {
        Pattern::Array {
            elements: elements.into_iter().map(Into::into).collect(),
            ordering: None,
            strictness: None,
        }
    }

    pub fn object<K, P, I>(entries: I) -> Pattern
    where
        K: Into<String>,
        P: Into<Pattern>,
        I: IntoIterator<Item = (K, P)>,
    {
        Pattern::Object {
            entries: entries
                .into_iter()
                .map(|(k, p)| (k.into(), p.into()))
                .collect(),
            ordering: None,
            strictness: None,
        }
    }

    /// Convert a JSON value into the equivalent pattern tree.
    ///
    /// Containers become Array/Object nodes with unset modes (so the
    /// engine's defaults apply); scalars become literals. This is how a
    /// plain fixture is promoted to a pattern.
    pub fn from_value(value: Value) -> Pattern {
        match value {
            Value::Array(items) => Pattern::Array {
                elements: items.into_iter().map(Pattern::from_value).collect(),
                ordering: None,
                strictness: None,
            },
            Value::Object(map) => Pattern::Object {
                entries: map
                    .into_iter()
                    .map(|(k, v)| (k, Pattern::from_value(v)))
                    .collect(),
                ordering: None,
                strictness: None,
            },
            scalar => Pattern::Literal(scalar),
        }
    }

    /// Mark this container's elements as position-sensitive.
    ///
    /// # Panics
    ///
    /// Panics if the node is already marked unordered, or is not a
    /// container pattern. Re-marking as ordered is a no-op.
    pub fn ordered(mut self) -> Pattern {
        self.set_ordering(Ordering::Ordered);
        self
    }

    /// Mark this container's elements as position-insensitive.
    ///
    /// # Panics
    ///
    /// Panics if the node is already marked ordered, or is not a
    /// container pattern.
    pub fn unordered(mut self) -> Pattern {
        self.set_ordering(Ordering::Unordered);
        self
    }

    /// Reject target elements/keys beyond the pattern.
    ///
    /// # Panics
    ///
    /// Panics if the node is already marked forgiving, or is not a
    /// container pattern.
    pub fn strict(mut self) -> Pattern {
        self.set_strictness(Strictness::Strict);
        self
    }

    /// Tolerate target elements/keys beyond the pattern.
    ///
    /// # Panics
    ///
    /// Panics if the node is already marked strict, or is not a
    /// container pattern.
    pub fn forgiving(mut self) -> Pattern {
        self.set_strictness(Strictness::Forgiving);
        self
    }

    fn set_ordering(&mut self, mode: Ordering) {
        let slot = match self {
            Pattern::Array { ordering, .. } | Pattern::Object { ordering, .. } => ordering,
            other => panic!("cannot set ordering on a {} pattern", other.kind_name()),
        };
        match *slot {
            Some(existing) if existing != mode => {
                panic!("cannot mark an {existing:?} pattern as {mode:?}")
            }
            _ => *slot = Some(mode),
        }
    }

    fn set_strictness(&mut self, mode: Strictness) {
        let slot = match self {
            Pattern::Array { strictness, .. } | Pattern::Object { strictness, .. } => strictness,
            other => panic!("cannot set strictness on a {} pattern", other.kind_name()),
        };
        match *slot {
            Some(existing) if existing != mode => {
                panic!("cannot mark a {existing:?} pattern as {mode:?}")
            }
            _ => *slot = Some(mode),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Pattern::Literal(_) => "literal",
            Pattern::Regex(_) => "regex",
            Pattern::Type(_) => "type",
            Pattern::Wildcard => "wildcard",
            Pattern::Capture(_) => "capture",
            Pattern::Array { .. } => "array",
            Pattern::Object { .. } => "object",
        }
    }
}

impl From<Value> for Pattern {
    fn from(value: Value) -> Pattern {
        Pattern::from_value(value)
    }
}

impl From<Regex> for Pattern {
    fn from(re: Regex) -> Pattern {
        Pattern::Regex(re)
    }
}

impl From<ValueType> for Pattern {
    fn from(t: ValueType) -> Pattern {
        Pattern::Type(t)
    }
}

impl From<bool> for Pattern {
    fn from(v: bool) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

impl From<i32> for Pattern {
    fn from(v: i32) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

impl From<i64> for Pattern {
    fn from(v: i64) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

impl From<u64> for Pattern {
    fn from(v: u64) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

impl From<f64> for Pattern {
    fn from(v: f64) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

impl From<&str> for Pattern {
    fn from(v: &str) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

impl From<String> for Pattern {
    fn from(v: String) -> Pattern {
        Pattern::Literal(Value::from(v))
    }
}

/// Compact single-line rendering, used in diagnostics.
impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pattern::Literal(v) => write!(f, "{v}"),
            Pattern::Regex(re) => write!(f, "/{}/", re.as_str()),
            Pattern::Type(t) => write!(f, "{t}"),
            Pattern::Wildcard => f.write_str("WILDCARD"),
            Pattern::Capture(name) => write!(f, "${name}"),
            Pattern::Array { elements, .. } => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Pattern::Object { entries, .. } => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}
