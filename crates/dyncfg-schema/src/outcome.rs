//! # Validation Outcomes
//!
//! Schema violations are data, not errors. A validation call always returns
//! a [`ValidationOutcome`]; `valid` is true exactly when the violation list is
//! empty, and the constructor is the only place that decides it.

use std::fmt;

use serde::Serialize;

use dyncfg_core::CanonicalDocument;

use crate::path::DocumentPath;

/// What kind of structural rule a violation broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    /// A key the schema requires is absent.
    MissingRequiredKey,
    /// A key is present in a closed mapping that does not declare it.
    UnknownKey,
    /// A node has the wrong type.
    TypeMismatch,
    /// A value is outside an enumeration or differs from a constant.
    InvalidValue,
    /// A string does not match the required pattern.
    PatternMismatch,
    /// Too few or too many items, properties or characters.
    Cardinality,
    /// A sequence that must hold unique items holds duplicates.
    DuplicateItem,
    /// A mapping key does not satisfy the key-name constraint.
    InvalidKeyName,
    /// A `oneOf`/`anyOf`/`not` combination is unsatisfied.
    Composition,
    /// Any other schema keyword.
    Other,
}

impl ViolationCategory {
    /// Stable snake_case identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredKey => "missing_required_key",
            Self::UnknownKey => "unknown_key",
            Self::TypeMismatch => "type_mismatch",
            Self::InvalidValue => "invalid_value",
            Self::PatternMismatch => "pattern_mismatch",
            Self::Cardinality => "cardinality",
            Self::DuplicateItem => "duplicate_item",
            Self::InvalidKeyName => "invalid_key_name",
            Self::Composition => "composition",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single structural non-conformance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Path to the offending node. For a missing key this is the path the
    /// key would have had.
    pub path: DocumentPath,
    /// Which rule was broken.
    pub category: ViolationCategory,
    /// Human-readable description.
    pub message: String,
    /// JSON Pointer into the schema to the keyword that failed.
    pub schema_location: String,
}

impl Violation {
    /// Create a violation.
    pub fn new(
        path: DocumentPath,
        category: ViolationCategory,
        message: impl Into<String>,
        schema_location: impl Into<String>,
    ) -> Self {
        Self {
            path,
            category,
            message: message.into(),
            schema_location: schema_location.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {} [{}]", self.message, self.category)
        } else {
            write!(f, "{}: {} [{}]", self.path, self.message, self.category)
        }
    }
}

/// Result of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    valid: bool,
    violations: Vec<Violation>,
}

impl ValidationOutcome {
    /// Build an outcome; it is valid iff `violations` is empty.
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }

    /// True if the document satisfied its schema.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Violations in the order they were found.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consume the outcome, returning the violations.
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Violations whose rendered path equals `path`.
    pub fn violations_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Violation> + 'a {
        self.violations
            .iter()
            .filter(move |v| v.path.to_string() == path)
    }

    /// True if some violation has this category at this rendered path.
    pub fn has_violation(&self, category: ViolationCategory, path: &str) -> bool {
        self.violations_at(path).any(|v| v.category == category)
    }
}

impl fmt::Display for ValidationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        write!(f, "{} violation(s):", self.violations.len())?;
        for v in &self.violations {
            write!(f, "\n  {v}")?;
        }
        Ok(())
    }
}

/// One independently authored piece of a composed configuration, such as a
/// single table file from a table directory.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Caller-chosen name for diagnostics, typically a file name.
    pub label: String,
    /// The normalized fragment.
    pub document: CanonicalDocument,
}

impl Fragment {
    /// Create a fragment.
    pub fn new(label: impl Into<String>, document: CanonicalDocument) -> Self {
        Self {
            label: label.into(),
            document,
        }
    }
}

/// Outcome for one fragment of a composed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FragmentOutcome {
    /// The fragment's label.
    pub label: String,
    /// The fragment's own outcome.
    pub outcome: ValidationOutcome,
}

/// Aggregate outcome over independently validated fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompositeOutcome {
    valid: bool,
    fragments: Vec<FragmentOutcome>,
}

impl CompositeOutcome {
    /// Build the aggregate; valid iff every fragment is valid.
    pub fn from_fragments(fragments: Vec<FragmentOutcome>) -> Self {
        Self {
            valid: fragments.iter().all(|f| f.outcome.is_valid()),
            fragments,
        }
    }

    /// True if every fragment is valid. Vacuously true with no fragments.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Per-fragment outcomes in input order.
    pub fn fragments(&self) -> &[FragmentOutcome] {
        &self.fragments
    }

    /// Fragments that failed validation.
    pub fn invalid_fragments(&self) -> impl Iterator<Item = &FragmentOutcome> {
        self.fragments.iter().filter(|f| !f.outcome.is_valid())
    }
}
