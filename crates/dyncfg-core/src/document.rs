//! # Canonical Document: Syntax-Erased Configuration Tree
//!
//! `CanonicalDocument` is the only tree shape the validator ever sees. Its
//! inner `serde_json::Value` is private; a document can be obtained only
//! through [`crate::normalize`] or [`CanonicalDocument::from_value`].
//!
//! ## Invariants
//!
//! - Keys are unique within a mapping; insertion order is preserved (the
//!   workspace enables serde_json's `preserve_order`) for diagnostics only.
//! - Numbers are canonical: any value that is integral and fits in `i64` is
//!   stored as an integer, everything else as `f64`. `1`, `1.0` and `1e0`
//!   produce the same node.
//! - The tree is immutable once constructed. There are no `&mut` accessors.

use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

/// A normalized configuration document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CanonicalDocument(Value);

impl CanonicalDocument {
    /// Wrap an already-parsed JSON value, canonicalizing every number in it.
    ///
    /// This is the entry point for callers that hold a `serde_json::Value`
    /// from elsewhere; the result is indistinguishable from normalizing the
    /// equivalent text.
    pub fn from_value(value: Value) -> Self {
        Self(canonicalize(value))
    }

    /// Internal constructor for trees the parser has already canonicalized.
    pub(crate) fn from_canonical(value: Value) -> Self {
        Self(value)
    }

    /// Borrow the root node.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consume the document, returning the root node.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Look up a top-level key. Returns `None` when the root is not a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|m| m.get(key))
    }

    /// Returns true if the document has no top-level content: `null`, an
    /// empty mapping, or an empty sequence.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Value::Null => true,
            Value::Object(m) => m.is_empty(),
            Value::Array(a) => a.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CanonicalDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Canonical numeric form of a finite `f64`.
///
/// Returns `None` for NaN and infinities, which have no JSON representation.
pub(crate) fn canonical_number(f: f64) -> Option<Number> {
    if !f.is_finite() {
        return None;
    }
    // The bounds are exact powers of two, so the comparison is lossless.
    if f.fract() == 0.0 && f >= -9_223_372_036_854_775_808.0 && f < 9_223_372_036_854_775_808.0 {
        return Some(Number::from(f as i64));
    }
    Number::from_f64(f)
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => value,
        Value::Number(n) => {
            if n.is_i64() {
                return Value::Number(n);
            }
            match n.as_f64().and_then(canonical_number) {
                Some(c) => Value::Number(c),
                None => Value::Number(n),
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, canonicalize(v)))
                .collect(),
        ),
    }
}
