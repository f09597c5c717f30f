//! Where the hypergraph comes from, and how results leave.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use ahyper_core::{AnnotatedHypergraph, LoadOptions};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use ndarray::Array2;
use serde_json::Value;

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// JSON array of edge records (`{"eid": .., "<role>": [..], ...}`).
    #[arg(long, global = true, conflicts_with = "dataset")]
    pub records: Option<PathBuf>,

    /// Role labels for `--records`, in role order.
    #[arg(long, global = true, value_delimiter = ',', requires = "records")]
    pub roles: Vec<String>,

    /// Dataset directory with `incidence.csv`, `roles.csv` and optional `edges.csv`.
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Use the labels from `roles.csv` instead of integer role codes.
    #[arg(long, global = true, requires = "dataset")]
    pub relabel_roles: bool,

    /// Attach `edges.csv` rows as incidence metadata.
    #[arg(long, global = true, requires = "dataset")]
    pub with_metadata: bool,
}

impl InputArgs {
    pub fn load(&self) -> Result<AnnotatedHypergraph> {
        match (&self.records, &self.dataset) {
            (Some(path), None) => {
                if self.roles.is_empty() {
                    return Err(anyhow!("--records needs --roles (e.g. --roles source,target)"));
                }
                let text = fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let hg = AnnotatedHypergraph::from_records_json(&text, &self.roles)
                    .with_context(|| format!("invalid records in {}", path.display()))?;
                tracing::info!(path = %path.display(), n = hg.n(), m = hg.m(), "loaded records");
                Ok(hg)
            }
            (None, Some(dir)) => {
                let options = LoadOptions {
                    relabel_roles: self.relabel_roles,
                    add_metadata: self.with_metadata,
                };
                let hg = AnnotatedHypergraph::from_incidence(dir, options)
                    .with_context(|| format!("failed to load dataset {}", dir.display()))?;
                tracing::info!(dir = %dir.display(), n = hg.n(), m = hg.m(), "loaded dataset");
                Ok(hg)
            }
            (None, None) => Err(anyhow!("no input: pass --records <file> or --dataset <dir>")),
            (Some(_), Some(_)) => Err(anyhow!("--records and --dataset are mutually exclusive")),
        }
    }
}

/// Read a role-interaction matrix stored as a JSON array of rows.
pub fn read_role_matrix(path: &Path) -> Result<Array2<f64>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of numeric rows", path.display()))?;
    rows_to_matrix(rows)
}

fn rows_to_matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let cols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().position(|row| row.len() != cols) {
        return Err(anyhow!(
            "role matrix row {bad} has {} entries, expected {cols}",
            rows[bad].len()
        ));
    }
    let n_rows = rows.len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Ok(Array2::from_shape_vec((n_rows, cols), flat)?)
}

pub fn matrix_to_json(matrix: &Array2<f64>) -> Value {
    Value::from(
        matrix
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect::<Vec<_>>(),
    )
}

/// Parse `role=rank,role=rank,...`.
pub fn parse_precedence(list: &str) -> Result<BTreeMap<String, i64>> {
    let mut out = BTreeMap::new();
    for item in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (role, rank) = item
            .split_once('=')
            .ok_or_else(|| anyhow!("precedence entry `{item}` is not role=rank"))?;
        let rank: i64 = rank
            .trim()
            .parse()
            .with_context(|| format!("precedence for `{}` is not an integer", role.trim()))?;
        if out.insert(role.trim().to_string(), rank).is_some() {
            return Err(anyhow!("role `{}` listed twice in precedence", role.trim()));
        }
    }
    if out.is_empty() {
        return Err(anyhow!("empty precedence list"));
    }
    Ok(out)
}

/// Pretty JSON to `out`, or stdout when no path is given.
pub fn write_json(out: Option<&Path>, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => fs::write(path, text + "\n")
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
