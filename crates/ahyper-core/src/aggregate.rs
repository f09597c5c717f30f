//! Node degrees and edge dimensions, optionally broken out by role.
//!
//! Every aggregate walks the incidence list in role order, so each call first
//! sorts by role. The sort is skipped when the list is already in that order.

use std::collections::BTreeMap;

use ahash::AHashMap;
use ndarray::Array2;

use crate::incidence::{Ident, Incidence};
use crate::store::{AnnotatedHypergraph, SortKey};

/// Role label -> count. Every role of the hypergraph is present.
pub type RoleCounts = BTreeMap<String, usize>;

fn node_of(inc: &Incidence) -> &Ident {
    &inc.node
}

fn edge_of(inc: &Incidence) -> &Ident {
    &inc.edge
}

impl AnnotatedHypergraph {
    /// Incidences per node (a node holding two roles in one edge counts twice).
    pub fn node_degrees(&mut self) -> BTreeMap<Ident, usize> {
        self.tally(node_of)
    }

    pub fn node_degrees_by_role(&mut self) -> BTreeMap<Ident, RoleCounts> {
        let table = self.role_table(node_of);
        self.by_role_map(&table, self.node_list())
    }

    /// `n x roles` degree matrix, rows in `node_list` order.
    pub fn node_degree_matrix(&mut self) -> Array2<f64> {
        let table = self.role_table(node_of);
        dense(&table, self.node_list())
    }

    /// Incidences per edge.
    pub fn edge_dimensions(&mut self) -> BTreeMap<Ident, usize> {
        self.tally(edge_of)
    }

    pub fn edge_dimensions_by_role(&mut self) -> BTreeMap<Ident, RoleCounts> {
        let table = self.role_table(edge_of);
        self.by_role_map(&table, self.edge_list())
    }

    /// `m x roles` dimension matrix, rows in `edge_list` order.
    pub fn edge_dimension_matrix(&mut self) -> Array2<f64> {
        let table = self.role_table(edge_of);
        dense(&table, self.edge_list())
    }

    fn tally(&mut self, key: fn(&Incidence) -> &Ident) -> BTreeMap<Ident, usize> {
        self.sort(SortKey::Role);
        let mut out = BTreeMap::new();
        for inc in &self.incidences {
            *out.entry(key(inc).clone()).or_insert(0) += 1;
        }
        out
    }

    /// Per-role counts of `key`, indexed by role.
    fn role_table(&mut self, key: fn(&Incidence) -> &Ident) -> Vec<AHashMap<Ident, usize>> {
        self.sort(SortKey::Role);
        let mut table: Vec<AHashMap<Ident, usize>> = vec![AHashMap::new(); self.roles.len()];
        for group in self.incidences.chunk_by(|a, b| a.role == b.role) {
            let counts = &mut table[group[0].role.index()];
            for inc in group {
                *counts.entry(key(inc).clone()).or_insert(0) += 1;
            }
        }
        table
    }

    fn by_role_map(
        &self,
        table: &[AHashMap<Ident, usize>],
        ids: &[Ident],
    ) -> BTreeMap<Ident, RoleCounts> {
        ids.iter()
            .map(|id| {
                let counts = self
                    .roles
                    .iter()
                    .zip(table)
                    .map(|(label, t)| (label.clone(), t.get(id).copied().unwrap_or(0)))
                    .collect();
                (id.clone(), counts)
            })
            .collect()
    }
}

fn dense(table: &[AHashMap<Ident, usize>], ids: &[Ident]) -> Array2<f64> {
    let mut out = Array2::zeros((ids.len(), table.len()));
    for (i, id) in ids.iter().enumerate() {
        for (p, counts) in table.iter().enumerate() {
            out[[i, p]] = counts.get(id).copied().unwrap_or(0) as f64;
        }
    }
    out
}
