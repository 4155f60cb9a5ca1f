//! # Verification Entry Points
//!
//! Text in, verdict out. The kind selector is resolved before the text is
//! parsed, so an unknown kind is reported even for malformed text.

use dyncfg_core::{normalize, ConfigKind, DyncfgError};

use crate::outcome::ValidationOutcome;
use crate::registry::SchemaRegistry;

impl SchemaRegistry {
    /// Normalize `text` and validate it against the schema for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`DyncfgError::Syntax`] if the text does not parse.
    pub fn verify(&self, kind: ConfigKind, text: &str) -> Result<ValidationOutcome, DyncfgError> {
        let document = normalize(text).map_err(|e| {
            tracing::warn!(kind = %kind, error = %e, "rejected configuration text");
            e
        })?;
        Ok(self.validate(kind, &document))
    }
}

/// Check configuration text of the named kind against its built-in schema.
///
/// `kind` must be exactly `security`, `variable` or `table`. Returns
/// `Ok(true)` if the document conforms and `Ok(false)` if it parses but
/// violates the schema.
///
/// # Errors
///
/// Returns [`DyncfgError::UnknownKind`] for any other selector and
/// [`DyncfgError::Syntax`] if the text does not parse.
pub fn verify_schema(kind: &str, config_text: &str) -> Result<bool, DyncfgError> {
    verify_schema_outcome(kind, config_text).map(|outcome| outcome.is_valid())
}

/// Like [`verify_schema`], but returns every violation found.
///
/// # Errors
///
/// Same as [`verify_schema`].
pub fn verify_schema_outcome(
    kind: &str,
    config_text: &str,
) -> Result<ValidationOutcome, DyncfgError> {
    let kind: ConfigKind = kind.parse().map_err(|e| {
        tracing::warn!(selector = kind, "rejected unknown configuration kind");
        DyncfgError::from(e)
    })?;
    verify_document(kind, config_text)
}

/// Check configuration text against the built-in schema for `kind`.
///
/// # Errors
///
/// Returns [`DyncfgError::Syntax`] if the text does not parse.
pub fn verify_document(kind: ConfigKind, text: &str) -> Result<ValidationOutcome, DyncfgError> {
    SchemaRegistry::global().verify(kind, text)
}
