//! # Configuration Kind
//!
//! The closed set of configuration categories the validator understands.
//! Every `match` on `ConfigKind` is exhaustive, so a new kind cannot be
//! added without every schema lookup and dispatch site handling it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownKindError;

/// The kind of configuration a document declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    /// Access-security rules: roles and row-level filter checks.
    Security,
    /// Named variables substituted into other configuration.
    Variable,
    /// Tabular data-model definitions: tables, dimensions, measures, joins.
    Table,
}

/// Number of configuration kinds.
pub const CONFIG_KIND_COUNT: usize = 3;

impl ConfigKind {
    /// Returns all kinds in canonical order.
    pub fn all() -> &'static [ConfigKind; CONFIG_KIND_COUNT] {
        &[Self::Security, Self::Variable, Self::Table]
    }

    /// Returns the selector string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Variable => "variable",
            Self::Table => "table",
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKind {
    type Err = UnknownKindError;

    /// Selectors are matched exactly; `"Security"` and `" table"` are unknown.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "security" => Ok(Self::Security),
            "variable" => Ok(Self::Variable),
            "table" => Ok(Self::Table),
            other => Err(UnknownKindError {
                selector: other.to_string(),
            }),
        }
    }
}
