use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Optional context recorded on a hypergraph at construction.
///
/// These are the only extra fields a store carries; loaders fill in what they
/// know and leave the rest empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HypergraphConfig {
    /// Integer role code -> role label, as read from a tabular `roles.csv`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_map: Option<BTreeMap<i64, String>>,

    /// Where the incidences came from (a file path, a dataset name, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl HypergraphConfig {
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_role_map(mut self, role_map: BTreeMap<i64, String>) -> Self {
        self.role_map = Some(role_map);
        self
    }
}
