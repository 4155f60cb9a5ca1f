//! # Schema Registry
//!
//! Holds one compiled [`SchemaDefinition`] per [`ConfigKind`]. The registry is
//! built once, from JSON Schema (Draft 2020-12) documents embedded in the
//! binary, and is read-only afterwards.
//!
//! ## Schema Resolution
//!
//! All built-in schemas use `$id` URIs of the form
//! `https://schemas.dyncfg.dev/<filename>`. Kind schemas share definitions
//! through `common.schema.json` using relative `$ref`s such as
//! `common.schema.json#/$defs/identifier`, which resolve against that prefix.
//! Resolution happens in memory through [`LocalSchemaRetriever`]; nothing is
//! fetched over the network, and an unknown URI is an error.
//!
//! ## Consistency
//!
//! Before compiling, every schema is checked for:
//!
//! - `$ref`s that do not resolve to a registered schema and pointer
//! - `required` keys of a closed object that its `properties` never declare
//! - a kind root that is open or requires nothing
//!
//! Any failure is a [`RegistryInitializationError`]. For the built-in set
//! this is a startup invariant violation, see [`SchemaRegistry::global`].
//!
//! ## Thread Safety
//!
//! `SchemaRegistry` is `Send + Sync`; compiled validators are shared across
//! threads without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use dyncfg_core::ConfigKind;
use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

/// URI prefix for all built-in schemas.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.dyncfg.dev/";

const SECURITY_SCHEMA: &str = include_str!("../schemas/security.schema.json");
const VARIABLE_SCHEMA: &str = include_str!("../schemas/variable.schema.json");
const TABLE_SCHEMA: &str = include_str!("../schemas/table.schema.json");
const COMMON_SCHEMA: &str = include_str!("../schemas/common.schema.json");

/// Error while building a registry. Fatal at startup for the built-in set.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryInitializationError {
    /// The schema text is not valid JSON.
    #[error("schema '{schema}' is not valid JSON: {reason}")]
    SchemaParse {
        /// Schema file name.
        schema: String,
        /// Parser message.
        reason: String,
    },

    /// A `$ref` points at a schema or definition that does not exist.
    #[error("schema '{schema}' at '{location}' references undefined '{reference}'")]
    UnresolvedReference {
        /// Schema file name.
        schema: String,
        /// JSON Pointer to the `$ref` within the schema.
        location: String,
        /// The `$ref` value.
        reference: String,
    },

    /// A closed object requires a key it does not declare, so no document
    /// could ever satisfy it.
    #[error("schema '{schema}' at '{location}' requires undeclared key '{key}'")]
    UndeclaredRequiredKey {
        /// Schema file name.
        schema: String,
        /// JSON Pointer to the object subschema.
        location: String,
        /// The required key.
        key: String,
    },

    /// A kind schema's root is not a closed object with required keys.
    #[error("schema '{schema}' root must be a closed object with at least one required key")]
    OpenRoot {
        /// Schema file name.
        schema: String,
    },

    /// The schema could not be compiled into a validator.
    #[error("schema '{schema}' failed to compile: {reason}")]
    SchemaCompile {
        /// Schema file name.
        schema: String,
        /// Compiler message.
        reason: String,
    },
}

/// Text of one schema document.
#[derive(Debug, Clone)]
pub struct SchemaSource {
    /// File name, e.g. `table.schema.json`. Used for relative `$ref`s when
    /// the schema has no `$id`, and in error messages.
    pub name: String,
    /// JSON text of the schema.
    pub text: String,
}

impl SchemaSource {
    /// Create a source.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// The schema documents a registry is built from: one per kind, plus shared
/// documents that kind schemas may reference.
#[derive(Debug, Clone)]
pub struct SchemaSources {
    security: SchemaSource,
    variable: SchemaSource,
    table: SchemaSource,
    shared: Vec<SchemaSource>,
}

impl SchemaSources {
    /// The schemas embedded in this crate.
    pub fn builtin() -> Self {
        Self {
            security: SchemaSource::new("security.schema.json", SECURITY_SCHEMA),
            variable: SchemaSource::new("variable.schema.json", VARIABLE_SCHEMA),
            table: SchemaSource::new("table.schema.json", TABLE_SCHEMA),
            shared: vec![SchemaSource::new("common.schema.json", COMMON_SCHEMA)],
        }
    }

    /// Replace the schema for one kind.
    pub fn with_kind(mut self, kind: ConfigKind, source: SchemaSource) -> Self {
        match kind {
            ConfigKind::Security => self.security = source,
            ConfigKind::Variable => self.variable = source,
            ConfigKind::Table => self.table = source,
        }
        self
    }

    /// Add or replace a shared schema, matched by name.
    pub fn with_shared(mut self, source: SchemaSource) -> Self {
        self.shared.retain(|s| s.name != source.name);
        self.shared.push(source);
        self
    }

    /// The source for a kind.
    pub fn kind(&self, kind: ConfigKind) -> &SchemaSource {
        match kind {
            ConfigKind::Security => &self.security,
            ConfigKind::Variable => &self.variable,
            ConfigKind::Table => &self.table,
        }
    }
}

/// Resolves `$ref` URIs to schemas held in memory.
#[derive(Clone)]
struct LocalSchemaRetriever {
    /// Map from URI string to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Fall back to the file name under the canonical prefix.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        self.schemas_by_uri
            .get(&format!("{SCHEMA_URI_PREFIX}{filename}"))
            .cloned()
            .ok_or_else(|| format!("schema not found for URI: {uri_str}").into())
    }
}

/// A compiled structural contract for one configuration kind.
pub struct SchemaDefinition {
    kind: ConfigKind,
    name: String,
    id: String,
    schema: Value,
    validator: Validator,
}

impl fmt::Debug for SchemaDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaDefinition")
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl SchemaDefinition {
    /// The kind this schema validates.
    pub fn kind(&self) -> ConfigKind {
        self.kind
    }

    /// Schema file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The schema's `$id` URI.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The raw schema document.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// True if unknown top-level keys are rejected.
    pub fn is_closed(&self) -> bool {
        self.schema.get("additionalProperties") == Some(&Value::Bool(false))
    }

    /// Top-level keys every document of this kind must contain.
    pub fn required_keys(&self) -> Vec<&str> {
        self.schema
            .get("required")
            .and_then(Value::as_array)
            .map(|keys| keys.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }
}

/// One compiled schema per configuration kind.
#[derive(Debug)]
pub struct SchemaRegistry {
    security: SchemaDefinition,
    variable: SchemaDefinition,
    table: SchemaDefinition,
}

impl SchemaRegistry {
    /// Build the registry from the built-in schemas.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryInitializationError`] if a built-in schema fails to
    /// parse, is inconsistent, or fails to compile.
    pub fn load() -> Result<Self, RegistryInitializationError> {
        Self::from_sources(SchemaSources::builtin())
    }

    /// The process-wide registry of built-in schemas, built on first use.
    ///
    /// # Panics
    ///
    /// Panics if the built-in schemas cannot be loaded. They are embedded at
    /// compile time and covered by this crate's tests, so a failure here is a
    /// build defect the process cannot recover from.
    pub fn global() -> &'static SchemaRegistry {
        static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| match Self::load() {
            Ok(registry) => registry,
            Err(e) => panic!("built-in schema registry failed to initialize: {e}"),
        })
    }

    /// Build a registry from arbitrary schema sources.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryInitializationError`] for the first source that
    /// fails to parse, fails a consistency check, or fails to compile.
    /// Sources are taken in kind order (security, variable, table) and then
    /// shared schemas in the order they were added.
    pub fn from_sources(sources: SchemaSources) -> Result<Self, RegistryInitializationError> {
        let mut documents: HashMap<String, Value> = HashMap::new();
        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        // Kinds in canonical order, then shared schemas; checks follow it.
        let mut order: Vec<&str> = Vec::new();

        let all = ConfigKind::all()
            .iter()
            .map(|k| sources.kind(*k))
            .chain(sources.shared.iter());
        for source in all {
            let value: Value = serde_json::from_str(&source.text).map_err(|e| {
                RegistryInitializationError::SchemaParse {
                    schema: source.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            schemas_by_uri.insert(schema_uri(&source.name, &value), value.clone());
            // Also index by the canonical-prefix URI so relative refs resolve
            // even when a schema's `$id` uses another host.
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{}", source.name), value.clone());
            documents.insert(source.name.clone(), value);
            if !order.contains(&source.name.as_str()) {
                order.push(&source.name);
            }
        }

        for name in order {
            if let Some(value) = documents.get(name) {
                check_references(name, value, value, "", &documents)?;
                check_required_declared(name, value, "")?;
            }
        }

        let retriever = LocalSchemaRetriever { schemas_by_uri };
        let compile = |kind: ConfigKind| -> Result<SchemaDefinition, RegistryInitializationError> {
            let source = sources.kind(kind);
            let schema = documents
                .get(&source.name)
                .cloned()
                .unwrap_or(Value::Null);
            check_closed_root(&source.name, &schema)?;

            let validator = jsonschema::options()
                .with_draft(jsonschema::Draft::Draft202012)
                .with_retriever(retriever.clone())
                .build(&schema)
                .map_err(|e| RegistryInitializationError::SchemaCompile {
                    schema: source.name.clone(),
                    reason: e.to_string(),
                })?;

            let id = schema_uri(&source.name, &schema);
            tracing::debug!(kind = %kind, schema_id = %id, "compiled schema");
            Ok(SchemaDefinition {
                kind,
                name: source.name.clone(),
                id,
                schema,
                validator,
            })
        };

        Ok(Self {
            security: compile(ConfigKind::Security)?,
            variable: compile(ConfigKind::Variable)?,
            table: compile(ConfigKind::Table)?,
        })
    }

    /// The schema for a kind. Every kind has exactly one.
    pub fn get(&self, kind: ConfigKind) -> &SchemaDefinition {
        match kind {
            ConfigKind::Security => &self.security,
            ConfigKind::Variable => &self.variable,
            ConfigKind::Table => &self.table,
        }
    }

    /// All definitions in canonical kind order.
    pub fn definitions(&self) -> impl Iterator<Item = &SchemaDefinition> {
        ConfigKind::all().iter().map(|k| self.get(*k))
    }
}

fn schema_uri(name: &str, value: &Value) -> String {
    value
        .get("$id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{SCHEMA_URI_PREFIX}{name}"))
}

fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Every `$ref` under `node` must name a known document and a pointer that
/// exists in it.
fn check_references(
    name: &str,
    root: &Value,
    node: &Value,
    location: &str,
    documents: &HashMap<String, Value>,
) -> Result<(), RegistryInitializationError> {
    match node {
        Value::Object(map) => {
            if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                let unresolved = || RegistryInitializationError::UnresolvedReference {
                    schema: name.to_string(),
                    location: location.to_string(),
                    reference: reference.to_string(),
                };
                let (base, fragment) = reference.split_once('#').unwrap_or((reference, ""));
                let target = if base.is_empty() {
                    root
                } else {
                    let filename = base.rsplit('/').next().unwrap_or(base);
                    documents.get(filename).ok_or_else(unresolved)?
                };
                if !fragment.is_empty() && target.pointer(fragment).is_none() {
                    return Err(unresolved());
                }
            }
            for (key, child) in map {
                let child_location = format!("{location}/{}", escape_pointer_token(key));
                check_references(name, root, child, &child_location, documents)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                check_references(name, root, child, &format!("{location}/{i}"), documents)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// In every closed object subschema, each required key must be declared.
fn check_required_declared(
    name: &str,
    node: &Value,
    location: &str,
) -> Result<(), RegistryInitializationError> {
    match node {
        Value::Object(map) => {
            let closed = map.get("additionalProperties") == Some(&Value::Bool(false));
            if let (true, Some(required)) = (closed, map.get("required").and_then(Value::as_array)) {
                let declared = map.get("properties").and_then(Value::as_object);
                for key in required.iter().filter_map(Value::as_str) {
                    if !declared.is_some_and(|p| p.contains_key(key)) {
                        return Err(RegistryInitializationError::UndeclaredRequiredKey {
                            schema: name.to_string(),
                            location: location.to_string(),
                            key: key.to_string(),
                        });
                    }
                }
            }
            for (key, child) in map {
                let child_location = format!("{location}/{}", escape_pointer_token(key));
                check_required_declared(name, child, &child_location)?;
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                check_required_declared(name, child, &format!("{location}/{i}"))?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn check_closed_root(name: &str, schema: &Value) -> Result<(), RegistryInitializationError> {
    let closed = schema.get("additionalProperties") == Some(&Value::Bool(false));
    let requires_something = schema
        .get("required")
        .and_then(Value::as_array)
        .is_some_and(|r| !r.is_empty());
    if closed && requires_something {
        Ok(())
    } else {
        Err(RegistryInitializationError::OpenRoot {
            schema: name.to_string(),
        })
    }
}
