//! Loading a hypergraph from a saved dataset directory.
//!
//! ```text
//! <dir>/incidence.csv   header, then `node_id,edge_id,role` (integer role codes)
//! <dir>/edges.csv       header, then `edge_id,<metadata columns...>` (optional file)
//! <dir>/roles.csv       no header, `code,label`
//! ```
//!
//! Fields are comma separated; a field may be wrapped in double quotes, with
//! `""` standing for a literal quote.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::HypergraphConfig;
use crate::error::{HypergraphError, Result};
use crate::incidence::{Ident, Incidence, Metadata, RoleId};
use crate::store::AnnotatedHypergraph;

pub const INCIDENCE_FILE: &str = "incidence.csv";
pub const EDGES_FILE: &str = "edges.csv";
pub const ROLES_FILE: &str = "roles.csv";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Use the labels from `roles.csv` instead of the integer codes.
    pub relabel_roles: bool,
    /// Attach each edge's `edges.csv` row to its incidences.
    pub add_metadata: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidenceRow {
    pub node: Ident,
    pub edge: Ident,
    pub role: i64,
}

/// The three tables of a dataset directory, parsed but not yet combined.
#[derive(Debug, Clone, Default)]
pub struct TabularDataset {
    pub incidence: Vec<IncidenceRow>,
    pub edges: BTreeMap<Ident, Metadata>,
    /// `(code, label)` in file order; the order defines the role order.
    pub roles: Vec<(i64, String)>,
    pub source: Option<String>,
}

impl TabularDataset {
    pub fn read_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();

        let incidence_path = dir.join(INCIDENCE_FILE);
        let mut incidence = Vec::new();
        for (line, fields) in read_rows(&incidence_path, true)? {
            let [node, edge, role] = fields.as_slice() else {
                return Err(csv_error(&incidence_path, line, "expected node_id,edge_id,role"));
            };
            let role = role
                .trim()
                .parse::<i64>()
                .map_err(|_| csv_error(&incidence_path, line, "role must be an integer code"))?;
            incidence.push(IncidenceRow {
                node: Ident::parse_cell(node),
                edge: Ident::parse_cell(edge),
                role,
            });
        }

        let roles_path = dir.join(ROLES_FILE);
        let mut roles = Vec::new();
        for (line, fields) in read_rows(&roles_path, false)? {
            let [code, label] = fields.as_slice() else {
                return Err(csv_error(&roles_path, line, "expected code,label"));
            };
            let code = code
                .trim()
                .parse::<i64>()
                .map_err(|_| csv_error(&roles_path, line, "role code must be an integer"))?;
            roles.push((code, label.trim().to_string()));
        }

        let edges_path = dir.join(EDGES_FILE);
        let edges = if edges_path.exists() {
            read_edge_metadata(&edges_path)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            incidence,
            edges,
            roles,
            source: Some(dir.display().to_string()),
        })
    }

    pub fn into_hypergraph(self, options: LoadOptions) -> Result<AnnotatedHypergraph> {
        let position: BTreeMap<i64, RoleId> = self
            .roles
            .iter()
            .enumerate()
            .map(|(i, (code, _))| (*code, RoleId::new(i as u32)))
            .collect();

        let labels: Vec<String> = if options.relabel_roles {
            self.roles.iter().map(|(_, label)| label.clone()).collect()
        } else {
            self.roles.iter().map(|(code, _)| code.to_string()).collect()
        };

        let mut incidences = Vec::with_capacity(self.incidence.len());
        for row in self.incidence {
            let role = *position
                .get(&row.role)
                .ok_or_else(|| HypergraphError::UnknownRole(row.role.to_string()))?;
            let meta = if options.add_metadata {
                self.edges.get(&row.edge).cloned()
            } else {
                None
            };
            incidences.push(Incidence {
                node: row.node,
                role,
                edge: row.edge,
                meta,
            });
        }

        let mut config = HypergraphConfig::default().with_role_map(self.roles.into_iter().collect());
        config.source = self.source;

        AnnotatedHypergraph::new(incidences, labels, config)
    }
}

impl AnnotatedHypergraph {
    /// Load a dataset directory (see the module docs for its layout).
    pub fn from_incidence(dir: impl AsRef<Path>, options: LoadOptions) -> Result<Self> {
        let dataset = TabularDataset::read_dir(dir)?;
        tracing::debug!(
            incidences = dataset.incidence.len(),
            roles = dataset.roles.len(),
            "read tabular dataset"
        );
        dataset.into_hypergraph(options)
    }
}

fn csv_error(path: &Path, line: usize, message: impl Into<String>) -> HypergraphError {
    HypergraphError::Csv {
        path: PathBuf::from(path),
        line,
        message: message.into(),
    }
}

/// Non-empty rows of `path` with their 1-based line numbers.
fn read_rows(path: &Path, has_header: bool) -> Result<Vec<(usize, Vec<String>)>> {
    let text = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for (i, raw) in text.lines().enumerate() {
        if has_header && i == 0 {
            continue;
        }
        if raw.trim().is_empty() {
            continue;
        }
        let fields = split_fields(raw).map_err(|message| csv_error(path, i + 1, message))?;
        rows.push((i + 1, fields));
    }
    Ok(rows)
}

fn read_edge_metadata(path: &Path) -> Result<BTreeMap<Ident, Metadata>> {
    let text = fs::read_to_string(path)?;
    let mut lines = text.lines().enumerate();

    let Some((_, header)) = lines.next() else {
        return Ok(BTreeMap::new());
    };
    let header = split_fields(header).map_err(|message| csv_error(path, 1, message))?;

    let mut out = BTreeMap::new();
    for (i, raw) in lines {
        if raw.trim().is_empty() {
            continue;
        }
        let fields = split_fields(raw).map_err(|message| csv_error(path, i + 1, message))?;
        if fields.len() != header.len() {
            return Err(csv_error(
                path,
                i + 1,
                format!("expected {} fields, found {}", header.len(), fields.len()),
            ));
        }
        let mut fields = fields.into_iter();
        let Some(edge) = fields.next() else {
            continue;
        };
        let meta: Metadata = header
            .iter()
            .skip(1)
            .cloned()
            .zip(fields.map(|cell| cell_value(&cell)))
            .collect();
        out.insert(Ident::parse_cell(&edge), meta);
    }
    Ok(out)
}

fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = cell.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = cell.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    Value::from(cell)
}

fn split_fields(line: &str) -> std::result::Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            (true, '"') => quoted = false,
            (true, c) => field.push(c),
            (false, '"') if field.trim().is_empty() => {
                field.clear();
                quoted = true;
            }
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (false, c) => field.push(c),
        }
    }
    if quoted {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}
