//! JSON record form of an annotated hypergraph.
//!
//! One record per edge:
//!
//! ```text
//! {"eid": 0, "source": ["a"], "target": ["b", "c"], "topic": "lunch"}
//! ```
//!
//! Keys naming a role hold that role's node ids, `eid` holds the edge id, and
//! every other key is edge metadata. Either every record carries `eid` or
//! none does; in the latter case edges are numbered by position.

use serde_json::{Map, Value};

use crate::config::HypergraphConfig;
use crate::error::{HypergraphError, Result};
use crate::incidence::{Ident, Incidence, Metadata, RoleId};
use crate::store::{AnnotatedHypergraph, SortKey};

/// Record key carrying the edge id.
pub const EDGE_ID_KEY: &str = "eid";

impl AnnotatedHypergraph {
    /// Build a hypergraph from JSON records.
    ///
    /// Records without an `eid` are numbered by their position in `records`.
    pub fn from_records<I, S>(records: &[Value], roles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let roles: Vec<String> = roles.into_iter().map(Into::into).collect();
        let incidences = incidences_from_records(records, &roles)?;
        Self::new(incidences, roles, HypergraphConfig::default())
    }

    /// Parse `text` as a JSON array of records, then build as [`Self::from_records`].
    pub fn from_records_json<I, S>(text: &str, roles: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records: Vec<Value> = serde_json::from_str(text)?;
        Self::from_records(&records, roles)
    }

    /// Serialize back to one record per edge, in edge order.
    ///
    /// Every role key is present (possibly as an empty list).
    pub fn to_records(&mut self) -> Vec<Value> {
        self.sort(SortKey::EdgeRole);

        let mut out = Vec::with_capacity(self.m());
        for edge in self.incidences.chunk_by(|a, b| a.edge == b.edge) {
            let mut record = Map::new();
            if let Some(meta) = edge.iter().find_map(|inc| inc.meta.as_ref()) {
                for (k, v) in meta {
                    record.insert(k.clone(), v.clone());
                }
            }

            let mut by_role: Vec<Vec<Value>> = vec![Vec::new(); self.roles.len()];
            for inc in edge {
                by_role[inc.role.index()].push(inc.node.to_json());
            }
            for (label, nodes) in self.roles.iter().zip(by_role) {
                record.insert(label.clone(), Value::Array(nodes));
            }
            record.insert(EDGE_ID_KEY.to_string(), edge[0].edge.to_json());

            out.push(Value::Object(record));
        }
        out
    }
}

fn incidences_from_records(records: &[Value], roles: &[String]) -> Result<Vec<Incidence>> {
    let mut incidences = Vec::new();
    let has_edge_id = |record: &Value| record.get(EDGE_ID_KEY).is_some_and(|v| !v.is_null());
    let explicit_ids = records.iter().any(has_edge_id);

    for (index, record) in records.iter().enumerate() {
        let obj = record
            .as_object()
            .ok_or_else(|| HypergraphError::record(index, "expected a JSON object"))?;

        let edge = match obj.get(EDGE_ID_KEY) {
            None | Some(Value::Null) if explicit_ids => {
                return Err(HypergraphError::record(
                    index,
                    format!("missing `{EDGE_ID_KEY}` while other records carry one"),
                ));
            }
            None | Some(Value::Null) => Ident::from(index),
            Some(v) => Ident::from_json(v).ok_or_else(|| {
                HypergraphError::record(index, format!("`{EDGE_ID_KEY}` must be an integer or string"))
            })?,
        };

        let meta: Metadata = obj
            .iter()
            .filter(|(k, _)| k.as_str() != EDGE_ID_KEY && !roles.iter().any(|r| r == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let meta = if meta.is_empty() { None } else { Some(meta) };

        for (role_ix, label) in roles.iter().enumerate() {
            let Some(nodes) = obj.get(label) else {
                continue;
            };
            let nodes = nodes.as_array().ok_or_else(|| {
                HypergraphError::record(index, format!("role `{label}` must map to a list of node ids"))
            })?;
            for node in nodes {
                let node = Ident::from_json(node).ok_or_else(|| {
                    HypergraphError::record(
                        index,
                        format!("node id under `{label}` must be an integer or string"),
                    )
                })?;
                incidences.push(Incidence {
                    node,
                    role: RoleId::new(role_ix as u32),
                    edge: edge.clone(),
                    meta: meta.clone(),
                });
            }
        }
    }

    Ok(incidences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn edge_ids_default_to_position() {
        let records = vec![
            json!({"source": ["a"], "target": ["b", "c"]}),
            json!({"source": ["b"], "target": ["a"]}),
        ];
        let hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        assert_eq!(hg.n(), 3);
        assert_eq!(hg.m(), 2);
        assert_eq!(hg.edge_list(), &[Ident::from(0), Ident::from(1)]);
    }

    #[test]
    fn positional_ids_do_not_collide_with_explicit_ones() {
        let records = vec![
            json!({"eid": 1, "source": ["a"], "target": ["b"]}),
            json!({"source": ["c"], "target": ["d"]}),
        ];
        assert!(matches!(
            AnnotatedHypergraph::from_records(&records, ["source", "target"]),
            Err(HypergraphError::InvalidRecord { index: 1, .. })
        ));

        let null_ids = vec![
            json!({"eid": null, "source": ["a"]}),
            json!({"source": ["c"]}),
        ];
        let hg = AnnotatedHypergraph::from_records(&null_ids, ["source"]).unwrap();
        assert_eq!(hg.m(), 2);
    }

    #[test]
    fn records_parse_from_json_text() {
        let hg = AnnotatedHypergraph::from_records_json(
            r#"[{"source": ["a"], "target": ["b"]}, {"source": ["b"], "target": ["c"]}]"#,
            ["source", "target"],
        )
        .unwrap();
        assert_eq!((hg.n(), hg.m()), (3, 2));

        assert!(matches!(
            AnnotatedHypergraph::from_records_json("[{", ["source"]),
            Err(HypergraphError::Json(_))
        ));
    }

    #[test]
    fn extra_keys_become_metadata() {
        let records = vec![json!({"eid": "e1", "source": [1], "target": [2], "topic": "x"})];
        let mut hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        let meta = hg.incidences()[0].meta.as_ref().unwrap();
        assert_eq!(meta.get("topic"), Some(&json!("x")));
        assert!(meta.get("eid").is_none());

        let back = hg.to_records();
        assert_eq!(
            back,
            vec![json!({"eid": "e1", "source": [1], "target": [2], "topic": "x"})]
        );
    }

    #[test]
    fn missing_roles_export_as_empty_lists() {
        let records = vec![json!({"source": ["a", "b"]})];
        let mut hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        assert_eq!(
            hg.to_records(),
            vec![json!({"eid": 0, "source": ["a", "b"], "target": []})]
        );
    }

    #[test]
    fn malformed_records_are_rejected() {
        let not_object = vec![json!(["a"])];
        assert!(matches!(
            AnnotatedHypergraph::from_records(&not_object, ["source"]),
            Err(HypergraphError::InvalidRecord { index: 0, .. })
        ));

        let bad_role = vec![json!({"source": ["a"]}), json!({"source": "b"})];
        assert!(matches!(
            AnnotatedHypergraph::from_records(&bad_role, ["source"]),
            Err(HypergraphError::InvalidRecord { index: 1, .. })
        ));

        let bad_node = vec![json!({"source": [1.5]})];
        assert!(matches!(
            AnnotatedHypergraph::from_records(&bad_node, ["source"]),
            Err(HypergraphError::InvalidRecord { index: 0, .. })
        ));
    }
}
