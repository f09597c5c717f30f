//! The atomic fact of the model: "this node plays this role in this edge".

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Edge-level metadata carried alongside each incidence.
pub type Metadata = serde_json::Map<String, Value>;

/// Node or edge identifier.
///
/// Ingested ids may be integers or strings; relabeling always produces
/// `Ident::Int`. Integers order before strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ident {
    Int(i64),
    Name(String),
}

impl Ident {
    /// Parse a JSON scalar into an identifier (integers and strings only).
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().map(Ident::Int),
            Value::String(s) => Some(Ident::Name(s.clone())),
            _ => None,
        }
    }

    /// Parse a table cell: integers when they look like integers, names otherwise.
    pub fn parse_cell(cell: &str) -> Self {
        let cell = cell.trim();
        match cell.parse::<i64>() {
            Ok(i) => Ident::Int(i),
            Err(_) => Ident::Name(cell.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Ident::Int(i) => Value::from(*i),
            Ident::Name(s) => Value::from(s.as_str()),
        }
    }
}

impl From<i64> for Ident {
    fn from(value: i64) -> Self {
        Ident::Int(value)
    }
}

impl From<i32> for Ident {
    fn from(value: i32) -> Self {
        Ident::Int(i64::from(value))
    }
}

impl From<usize> for Ident {
    fn from(value: usize) -> Self {
        Ident::Int(value as i64)
    }
}

impl From<&str> for Ident {
    fn from(value: &str) -> Self {
        Ident::Name(value.to_string())
    }
}

impl From<String> for Ident {
    fn from(value: String) -> Self {
        Ident::Name(value)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ident::Int(i) => write!(f, "{i}"),
            Ident::Name(s) => f.write_str(s),
        }
    }
}

/// Dense index into a hypergraph's ordered role list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(transparent)]
pub struct RoleId(u32);

impl RoleId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One `(node, role, edge, metadata)` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Incidence {
    pub node: Ident,
    pub role: RoleId,
    pub edge: Ident,
    pub meta: Option<Metadata>,
}

impl Incidence {
    pub fn new(node: impl Into<Ident>, role: RoleId, edge: impl Into<Ident>) -> Self {
        Self {
            node: node.into(),
            role,
            edge: edge.into(),
            meta: None,
        }
    }

    pub fn with_meta(mut self, meta: Option<Metadata>) -> Self {
        self.meta = meta;
        self
    }
}

/// True when the same node id occurs more than once among `edge`'s incidences,
/// whatever roles it holds.
pub fn is_degenerate(edge: &[Incidence]) -> bool {
    let mut seen: AHashSet<&Ident> = AHashSet::with_capacity(edge.len());
    edge.iter().any(|inc| !seen.insert(&inc.node))
}
