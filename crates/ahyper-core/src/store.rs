//! The hypergraph store: an ordered incidence list plus derived indices.
//!
//! Derived state (`node_list`, `edge_list`, `n`, `m`) is only valid after
//! [`AnnotatedHypergraph::set_states`]. Every mutator in this crate calls it
//! before returning, and it also forgets the tracked sort key.

use std::cmp::Ordering;

use ahash::{AHashMap, AHashSet};
use ndarray::Array2;

use crate::config::HypergraphConfig;
use crate::error::{HypergraphError, Result};
use crate::incidence::{is_degenerate, Ident, Incidence, RoleId};

/// The order the incidence list currently satisfies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Edge,
    Role,
    EdgeRole,
    Node,
    /// Some caller-specific order; any named sort will run again.
    Custom,
}

impl SortKey {
    fn compare(self, a: &Incidence, b: &Incidence) -> Ordering {
        match self {
            SortKey::Edge => a.edge.cmp(&b.edge),
            SortKey::Role => a.role.cmp(&b.role),
            SortKey::EdgeRole => a.edge.cmp(&b.edge).then(a.role.cmp(&b.role)),
            SortKey::Node => a.node.cmp(&b.node),
            SortKey::Custom => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnnotatedHypergraph {
    pub(crate) incidences: Vec<Incidence>,
    pub(crate) roles: Vec<String>,
    pub(crate) config: HypergraphConfig,
    pub(crate) role_interaction: Option<Array2<f64>>,
    node_list: Vec<Ident>,
    edge_list: Vec<Ident>,
    sort_key: Option<SortKey>,
}

impl AnnotatedHypergraph {
    /// Build a store from raw incidences and the ordered role labels.
    pub fn new(
        incidences: Vec<Incidence>,
        roles: Vec<String>,
        config: HypergraphConfig,
    ) -> Result<Self> {
        let mut seen: AHashSet<&str> = AHashSet::with_capacity(roles.len());
        for label in &roles {
            if !seen.insert(label.as_str()) {
                return Err(HypergraphError::DuplicateRole(label.clone()));
            }
        }
        if let Some(bad) = incidences.iter().find(|inc| inc.role.index() >= roles.len()) {
            return Err(HypergraphError::RoleOutOfRange {
                index: bad.role.index(),
                len: roles.len(),
            });
        }

        let mut hg = Self {
            incidences,
            roles,
            config,
            role_interaction: None,
            node_list: Vec::new(),
            edge_list: Vec::new(),
            sort_key: None,
        };
        hg.set_states();
        hg.sort(SortKey::Edge);
        Ok(hg)
    }

    /// Recompute every derived index from the incidence list.
    pub fn set_states(&mut self) {
        let mut nodes: Vec<Ident> = self.incidences.iter().map(|inc| inc.node.clone()).collect();
        nodes.sort();
        nodes.dedup();

        let mut edges: Vec<Ident> = self.incidences.iter().map(|inc| inc.edge.clone()).collect();
        edges.sort();
        edges.dedup();

        self.node_list = nodes;
        self.edge_list = edges;
        self.sort_key = None;
    }

    /// Sort the incidence list by `key` unless it is already in that order.
    pub fn sort(&mut self, key: SortKey) {
        if key == SortKey::Custom || self.sort_key == Some(key) {
            return;
        }
        self.incidences.sort_by(|a, b| key.compare(a, b));
        self.sort_key = Some(key);
    }

    /// Sort with an ad-hoc comparator; the tracked key becomes `Custom`.
    pub(crate) fn sort_custom<F>(&mut self, compare: F)
    where
        F: FnMut(&Incidence, &Incidence) -> Ordering,
    {
        self.incidences.sort_by(compare);
        self.sort_key = Some(SortKey::Custom);
    }

    /// A fresh store over `incidences` sharing this one's roles, config and
    /// role-interaction matrix.
    pub(crate) fn derive(&self, incidences: Vec<Incidence>) -> Self {
        let mut hg = Self {
            incidences,
            roles: self.roles.clone(),
            config: self.config.clone(),
            role_interaction: self.role_interaction.clone(),
            node_list: Vec::new(),
            edge_list: Vec::new(),
            sort_key: None,
        };
        hg.set_states();
        hg.sort(SortKey::Edge);
        hg
    }

    /// Swap in a new incidence list and recompute derived state.
    pub(crate) fn replace_incidences(&mut self, incidences: Vec<Incidence>) {
        self.incidences = incidences;
        self.set_states();
    }

    pub fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    pub fn incidences(&self) -> &[Incidence] {
        &self.incidences
    }

    /// A copy of the incidence list ordered by edge id, largest first.
    pub fn incidences_by_edge_desc(&self) -> Vec<Incidence> {
        let mut out = self.incidences.clone();
        out.sort_by(|a, b| b.edge.cmp(&a.edge));
        out
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn role_label(&self, role: RoleId) -> Option<&str> {
        self.roles.get(role.index()).map(String::as_str)
    }

    pub fn role_id(&self, label: &str) -> Option<RoleId> {
        self.roles
            .iter()
            .position(|r| r == label)
            .map(|i| RoleId::new(i as u32))
    }

    pub fn config(&self) -> &HypergraphConfig {
        &self.config
    }

    pub fn node_list(&self) -> &[Ident] {
        &self.node_list
    }

    pub fn edge_list(&self) -> &[Ident] {
        &self.edge_list
    }

    /// Number of distinct nodes.
    pub fn n(&self) -> usize {
        self.node_list.len()
    }

    /// Number of distinct edges.
    pub fn m(&self) -> usize {
        self.edge_list.len()
    }

    /// Number of edges in which some node appears more than once.
    pub fn count_degeneracies(&mut self) -> usize {
        self.sort(SortKey::Edge);
        self.incidences
            .chunk_by(|a, b| a.edge == b.edge)
            .filter(|edge| is_degenerate(edge))
            .count()
    }

    pub(crate) fn node_index(&self) -> AHashMap<&Ident, usize> {
        self.node_list.iter().enumerate().map(|(i, id)| (id, i)).collect()
    }

    pub(crate) fn edge_index(&self) -> AHashMap<&Ident, usize> {
        self.edge_list.iter().enumerate().map(|(i, id)| (id, i)).collect()
    }
}
