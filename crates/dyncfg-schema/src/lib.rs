//! # dyncfg-schema: Schema Validation for Dynamic Configuration
//!
//! Validates configuration documents against a built-in JSON Schema per
//! [`ConfigKind`](dyncfg_core::ConfigKind). Schemas are data: they live in
//! `schemas/*.schema.json`, are embedded at compile time, and are executed by
//! one generic engine (`jsonschema`, Draft 2020-12).
//!
//! ## Entry Points
//!
//! - [`verify_schema`]: kind selector plus raw text in, `bool` out.
//! - [`verify_schema_outcome`]: the same, returning every [`Violation`].
//! - [`validate`] / [`validate_fragments`]: for already-normalized documents.
//!
//! Syntax errors and unknown kind selectors are `Err`. A document that parses
//! but does not conform is `Ok` with an invalid [`ValidationOutcome`].
//!
//! ## Registry
//!
//! [`SchemaRegistry::global`] builds the built-in registry once per process.
//! [`SchemaRegistry::from_sources`] builds a registry from caller-supplied
//! schemas, with the same consistency checks.

#![forbid(unsafe_code)]

pub mod outcome;
pub mod path;
pub mod registry;
pub mod validate;
pub mod verify;

pub use outcome::{
    CompositeOutcome, Fragment, FragmentOutcome, ValidationOutcome, Violation, ViolationCategory,
};
pub use path::{DocumentPath, PathSegment};
pub use registry::{
    RegistryInitializationError, SchemaDefinition, SchemaRegistry, SchemaSource, SchemaSources,
    SCHEMA_URI_PREFIX,
};
pub use validate::{validate, validate_fragments};
pub use verify::{verify_document, verify_schema, verify_schema_outcome};
