//! # Validator Core
//!
//! Checks a [`CanonicalDocument`] against the schema registered for its
//! [`ConfigKind`] and reports every violation, not just the first.
//!
//! Engine errors are translated into [`Violation`]s with a document path and
//! a [`ViolationCategory`]. Two translations differ from the engine's own
//! reporting:
//!
//! - a missing required key is reported at the path the key would have,
//!   not at its parent mapping;
//! - each unexpected key in a closed mapping gets its own violation at that
//!   key's path.

use dyncfg_core::{CanonicalDocument, ConfigKind};
use jsonschema::error::ValidationErrorKind;
use jsonschema::ValidationError;

use crate::outcome::{
    CompositeOutcome, Fragment, FragmentOutcome, ValidationOutcome, Violation, ViolationCategory,
};
use crate::path::DocumentPath;
use crate::registry::SchemaRegistry;

impl SchemaRegistry {
    /// Validate one document against the schema for `kind`.
    ///
    /// Never fails: schema non-conformance is reported in the outcome.
    pub fn validate(&self, kind: ConfigKind, document: &CanonicalDocument) -> ValidationOutcome {
        let definition = self.get(kind);
        let instance = document.as_value();

        let violations: Vec<Violation> = definition
            .validator()
            .iter_errors(instance)
            .flat_map(|e| translate(&e, instance))
            .collect();

        tracing::debug!(
            kind = %kind,
            schema_id = definition.id(),
            violations = violations.len(),
            "validated document"
        );
        ValidationOutcome::from_violations(violations)
    }

    /// Validate each fragment independently against the schema for `kind`.
    ///
    /// Fragments are not checked against each other; two fragments defining
    /// the same table name are both valid if each is valid on its own.
    pub fn validate_fragments(&self, kind: ConfigKind, fragments: &[Fragment]) -> CompositeOutcome {
        let outcomes = fragments
            .iter()
            .map(|fragment| FragmentOutcome {
                label: fragment.label.clone(),
                outcome: self.validate(kind, &fragment.document),
            })
            .collect();
        let composite = CompositeOutcome::from_fragments(outcomes);
        tracing::debug!(
            kind = %kind,
            fragments = fragments.len(),
            valid = composite.is_valid(),
            "validated fragments"
        );
        composite
    }
}

/// Validate a document against the built-in schema for `kind`.
pub fn validate(kind: ConfigKind, document: &CanonicalDocument) -> ValidationOutcome {
    SchemaRegistry::global().validate(kind, document)
}

/// Validate fragments against the built-in schema for `kind`.
pub fn validate_fragments(kind: ConfigKind, fragments: &[Fragment]) -> CompositeOutcome {
    SchemaRegistry::global().validate_fragments(kind, fragments)
}

fn translate(error: &ValidationError<'_>, root: &serde_json::Value) -> Vec<Violation> {
    let path = DocumentPath::from_pointer(&error.instance_path.to_string(), root);
    let schema_location = error.schema_path.to_string();

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let key = match property.as_str() {
                Some(s) => s.to_string(),
                None => property.to_string(),
            };
            let message = format!("missing required key '{key}'");
            vec![Violation::new(
                path.key(key),
                ViolationCategory::MissingRequiredKey,
                message,
                schema_location,
            )]
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|key| {
                Violation::new(
                    path.key(key.as_str()),
                    ViolationCategory::UnknownKey,
                    format!("unknown key '{key}'"),
                    schema_location.clone(),
                )
            })
            .collect(),
        kind => vec![Violation::new(
            path,
            categorize(kind),
            error.to_string(),
            schema_location,
        )],
    }
}

fn categorize(kind: &ValidationErrorKind) -> ViolationCategory {
    match kind {
        ValidationErrorKind::Required { .. } => ViolationCategory::MissingRequiredKey,
        ValidationErrorKind::AdditionalProperties { .. } => ViolationCategory::UnknownKey,
        ValidationErrorKind::Type { .. } => ViolationCategory::TypeMismatch,
        ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => {
            ViolationCategory::InvalidValue
        }
        ValidationErrorKind::Pattern { .. } => ViolationCategory::PatternMismatch,
        ValidationErrorKind::MinItems { .. }
        | ValidationErrorKind::MaxItems { .. }
        | ValidationErrorKind::MinLength { .. }
        | ValidationErrorKind::MaxLength { .. }
        | ValidationErrorKind::MinProperties { .. }
        | ValidationErrorKind::MaxProperties { .. } => ViolationCategory::Cardinality,
        ValidationErrorKind::UniqueItems { .. } => ViolationCategory::DuplicateItem,
        ValidationErrorKind::PropertyNames { .. } => ViolationCategory::InvalidKeyName,
        ValidationErrorKind::OneOfNotValid { .. }
        | ValidationErrorKind::OneOfMultipleValid { .. }
        | ValidationErrorKind::AnyOf { .. }
        | ValidationErrorKind::Not { .. } => ViolationCategory::Composition,
        _ => ViolationCategory::Other,
    }
}
