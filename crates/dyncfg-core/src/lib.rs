//! # dyncfg-core: Foundational Types for Dynamic Configuration
//!
//! This crate is the leaf of the dyncfg workspace. It defines the types every
//! validation request flows through, and it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Single `ConfigKind` enum.** Security, Variable, Table. Exhaustive
//!    `match` everywhere; adding a kind forces every consumer to handle it.
//!
//! 2. **`CanonicalDocument` newtype.** The inner tree is private. The only
//!    construction paths are [`normalize`] and
//!    [`CanonicalDocument::from_value`], both of which canonicalize numbers,
//!    so a document never remembers which syntax it was written in.
//!
//! 3. **One parser for both syntaxes.** Strict JSON is a subset of the relaxed
//!    grammar, so duplicate-key rejection, escape handling and numeric
//!    normalization are identical for both inputs.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `dyncfg-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod kind;
pub mod syntax;

// Re-export primary types for ergonomic imports.
pub use document::CanonicalDocument;
pub use error::{DyncfgError, SyntaxError, UnknownKindError};
pub use kind::{ConfigKind, CONFIG_KIND_COUNT};
pub use syntax::normalize;
