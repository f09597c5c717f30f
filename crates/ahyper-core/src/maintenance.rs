//! Cleanup passes: relabeling, singleton removal, degeneracy removal.
//!
//! Both removals relabel afterwards, so node and edge ids are always dense
//! `0..n` / `0..m` once they return.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;

use crate::error::{HypergraphError, Result};
use crate::incidence::Ident;
use crate::store::{AnnotatedHypergraph, SortKey};

/// Map each distinct id to its rank among the sorted distinct ids.
fn dense_ranks<'a>(ids: impl Iterator<Item = &'a Ident>) -> AHashMap<Ident, Ident> {
    let distinct: BTreeSet<&Ident> = ids.collect();
    distinct
        .into_iter()
        .enumerate()
        .map(|(rank, id)| (id.clone(), Ident::from(rank)))
        .collect()
}

impl AnnotatedHypergraph {
    /// Renumber edge and node ids to `0..m` and `0..n`, preserving their order.
    pub fn relabel(&mut self) {
        let edges = dense_ranks(self.incidences.iter().map(|inc| &inc.edge));
        let nodes = dense_ranks(self.incidences.iter().map(|inc| &inc.node));
        for inc in &mut self.incidences {
            if let Some(edge) = edges.get(&inc.edge) {
                inc.edge = edge.clone();
            }
            if let Some(node) = nodes.get(&inc.node) {
                inc.node = node.clone();
            }
        }
        self.set_states();
        self.sort(SortKey::Edge);
    }

    /// Drop every incidence belonging to an edge of dimension one, then
    /// relabel. Returns the number of incidences removed.
    pub fn remove_singletons(&mut self) -> usize {
        let dims = self.edge_dimensions();
        let before = self.incidences.len();
        self.incidences
            .retain(|inc| dims.get(&inc.edge).copied().unwrap_or(0) != 1);
        let removed = before - self.incidences.len();

        self.relabel();
        tracing::info!(removed, "removed singleton incidences");
        removed
    }

    /// Within each edge keep one incidence per node: the one whose role has
    /// the lowest precedence value. Relabels afterwards and returns the number
    /// of incidences removed.
    ///
    /// Every role used by some incidence must appear in `precedence`.
    pub fn remove_degeneracies(&mut self, precedence: &BTreeMap<String, i64>) -> Result<usize> {
        let rank: Vec<Option<i64>> = self
            .roles
            .iter()
            .map(|label| precedence.get(label).copied())
            .collect();
        if let Some(inc) = self.incidences.iter().find(|inc| rank[inc.role.index()].is_none()) {
            let label = self.roles[inc.role.index()].clone();
            return Err(HypergraphError::UnknownRole(label));
        }

        self.sort_custom(|a, b| {
            a.edge
                .cmp(&b.edge)
                .then_with(|| a.node.cmp(&b.node))
                .then_with(|| rank[a.role.index()].cmp(&rank[b.role.index()]))
        });

        let before = self.incidences.len();
        self.incidences
            .dedup_by(|later, kept| later.edge == kept.edge && later.node == kept.node);
        let removed = before - self.incidences.len();

        self.relabel();
        tracing::info!(removed, "removed degenerate incidences");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn relabel_is_dense_and_order_preserving() {
        let records = vec![
            json!({"eid": 10, "source": ["x"], "target": ["z"]}),
            json!({"eid": 4, "source": ["y"], "target": ["x"]}),
        ];
        let mut hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        hg.relabel();
        assert_eq!(hg.edge_list(), &[Ident::from(0), Ident::from(1)]);
        assert_eq!(hg.node_list(), &[Ident::from(0), Ident::from(1), Ident::from(2)]);
        // edge 4 -> 0 holds y(source), x(target); x -> 0, y -> 1
        assert_eq!(
            hg.to_records()[0],
            json!({"eid": 0, "source": [1], "target": [0]})
        );
    }

    #[test]
    fn singleton_edges_are_removed() {
        let records = vec![
            json!({"source": ["a"], "target": ["b"]}),
            json!({"source": ["c"]}),
            json!({"source": ["b"], "target": ["a", "d"]}),
        ];
        let mut hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        assert_eq!(hg.m(), 3);
        assert_eq!(hg.remove_singletons(), 1);
        assert_eq!(hg.m(), 2);
        assert_eq!(hg.edge_list(), &[Ident::from(0), Ident::from(1)]);
        assert_eq!(hg.n(), 3);
    }

    #[test]
    fn degeneracies_keep_highest_precedence_role() {
        let records = vec![
            json!({"source": ["a"], "target": ["a", "b"]}),
            json!({"source": ["b"], "target": ["c"]}),
        ];
        let mut hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        assert_eq!(hg.count_degeneracies(), 1);

        let precedence = BTreeMap::from([("source".to_string(), 0), ("target".to_string(), 1)]);
        assert_eq!(hg.remove_degeneracies(&precedence).unwrap(), 1);
        assert_eq!(hg.count_degeneracies(), 0);
        assert_eq!(
            hg.to_records()[0],
            json!({"eid": 0, "source": [0], "target": [1]})
        );
    }

    #[test]
    fn precedence_must_cover_used_roles() {
        let records = vec![json!({"source": ["a"], "target": ["a"]})];
        let mut hg = AnnotatedHypergraph::from_records(&records, ["source", "target"]).unwrap();
        let precedence = BTreeMap::from([("source".to_string(), 0)]);
        assert!(matches!(
            hg.remove_degeneracies(&precedence),
            Err(HypergraphError::UnknownRole(r)) if r == "target"
        ));
        assert_eq!(hg.incidences().len(), 2);
    }
}
