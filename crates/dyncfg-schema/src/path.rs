//! # Document Paths
//!
//! A [`DocumentPath`] locates one node in a canonical document. It renders as
//! dotted/indexed text for people (`tables[0].dimensions[1].type`) and as a
//! JSON Pointer for tools (`/tables/0/dimensions/1/type`).

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// One step into a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A key within a mapping.
    Key(String),
    /// A position within a sequence.
    Index(usize),
}

/// Path from the document root to a node. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocumentPath {
    segments: Vec<PathSegment>,
}

impl DocumentPath {
    /// The root path.
    pub fn root() -> Self {
        Self::default()
    }

    /// Resolve a JSON Pointer against the document it points into.
    ///
    /// Numeric tokens become [`PathSegment::Index`] only where the node they
    /// step into is a sequence, so a mapping key `"0"` stays a key.
    pub fn from_pointer(pointer: &str, root: &Value) -> Self {
        let mut segments = Vec::new();
        let mut node = Some(root);
        for raw in pointer.split('/').skip(1) {
            let token = raw.replace("~1", "/").replace("~0", "~");
            let index = match node {
                Some(Value::Array(_)) => token.parse::<usize>().ok(),
                _ => None,
            };
            node = match (node, index) {
                (Some(Value::Array(items)), Some(i)) => items.get(i),
                (Some(Value::Object(map)), _) => map.get(&token),
                _ => None,
            };
            segments.push(match index {
                Some(i) => PathSegment::Index(i),
                None => PathSegment::Key(token),
            });
        }
        Self { segments }
    }

    /// Extend this path by a mapping key.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Key(key.into()));
        Self { segments }
    }

    /// Extend this path by a sequence index.
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// The segments from root to node.
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// True for the root path.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// RFC 6901 JSON Pointer form. The root is the empty string.
    pub fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                PathSegment::Key(k) => out.push_str(&k.replace('~', "~0").replace('/', "~1")),
                PathSegment::Index(i) => out.push_str(&i.to_string()),
            }
        }
        out
    }
}

fn is_plain_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if is_plain_key(k) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(k)?;
                }
                PathSegment::Key(k) => write!(f, "[{}]", Value::String(k.clone()))?,
                PathSegment::Index(n) => write!(f, "[{n}]")?,
            }
        }
        Ok(())
    }
}

impl Serialize for DocumentPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
