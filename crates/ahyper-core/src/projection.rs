//! Weighted dyadic projection and the configuration-model null expectation.
//!
//! Every ordered pair `(a, b)` of distinct incidences sharing an edge adds
//! `R[role(a), role(b)]` to the directed weight `a.node -> b.node`, where `R`
//! is the role-interaction matrix (all ones unless assigned).
//!
//! The null expectation for nodes `x, y` is
//! `sum_{p,q} D[x,p] * D[y,q] * Gamma[p,q] * R[p,q]` with
//! `Gamma = K^T K / outer(d, d)`, `K` the edge-by-role dimension matrix, `D`
//! the node-by-role degree matrix and `d` its column sums. Computed as
//! `D (Gamma ∘ R) D^T`.

use std::collections::BTreeMap;

use ahash::AHashMap;
use ndarray::{Array2, Axis};
use petgraph::graph::{DiGraph, NodeIndex, UnGraph};

use crate::error::{HypergraphError, Result};
use crate::incidence::{Ident, RoleId};
use crate::store::{AnnotatedHypergraph, SortKey};

/// `source -> target -> weight`.
pub type WeightedProjection = BTreeMap<Ident, BTreeMap<Ident, f64>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionFormat {
    Nested,
    Matrix,
    DiGraph,
}

/// Output-format flags as a caller (or a command line) supplies them.
/// No flag means the nested map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectionFormats {
    pub nested: bool,
    pub matrix: bool,
    pub digraph: bool,
}

impl ProjectionFormats {
    pub fn resolve(self) -> Result<ProjectionFormat> {
        let requested: Vec<(&str, ProjectionFormat)> = [
            (self.nested, "nested", ProjectionFormat::Nested),
            (self.matrix, "matrix", ProjectionFormat::Matrix),
            (self.digraph, "digraph", ProjectionFormat::DiGraph),
        ]
        .into_iter()
        .filter(|(set, _, _)| *set)
        .map(|(_, name, format)| (name, format))
        .collect();

        match requested.as_slice() {
            [] => Ok(ProjectionFormat::Nested),
            [(_, format)] => Ok(*format),
            _ => Err(HypergraphError::ConflictingFormats {
                requested: requested
                    .iter()
                    .map(|(name, _)| *name)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ProjectionExport {
    Nested(WeightedProjection),
    Matrix(Array2<f64>),
    DiGraph(DiGraph<Ident, f64>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BipartiteFormat {
    Petgraph,
    GraphTool,
}

/// Vertex of the node/edge incidence graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BipartiteVertex {
    Node(Ident),
    Edge(Ident),
}

impl AnnotatedHypergraph {
    /// Install a role-interaction matrix; `None` installs all ones.
    pub fn assign_role_interaction_matrix(&mut self, r: Option<Array2<f64>>) -> Result<()> {
        let k = self.roles.len();
        let r = match r {
            Some(r) => {
                let (rows, cols) = r.dim();
                if rows != k || cols != k {
                    return Err(HypergraphError::RoleMatrixShape {
                        expected: k,
                        rows,
                        cols,
                    });
                }
                r
            }
            None => Array2::ones((k, k)),
        };
        self.role_interaction = Some(r);
        Ok(())
    }

    pub fn role_interaction_matrix(&self) -> Option<&Array2<f64>> {
        self.role_interaction.as_ref()
    }

    /// The assigned role-interaction matrix, installing the all-ones default
    /// first when none is set.
    fn role_weights(&mut self) -> Array2<f64> {
        let k = self.roles.len();
        self.role_interaction
            .get_or_insert_with(|| Array2::ones((k, k)))
            .clone()
    }

    pub fn to_weighted_projection(&mut self) -> WeightedProjection {
        let r = self.role_weights();
        self.sort(SortKey::Edge);

        let mut out = WeightedProjection::new();
        for edge in self.incidences.chunk_by(|a, b| a.edge == b.edge) {
            for (x, a) in edge.iter().enumerate() {
                for (y, b) in edge.iter().enumerate() {
                    if x == y {
                        continue;
                    }
                    *out.entry(a.node.clone())
                        .or_default()
                        .entry(b.node.clone())
                        .or_insert(0.0) += r[[a.role.index(), b.role.index()]];
                }
            }
        }
        out
    }

    /// Dense `n x n` projection, rows and columns in `node_list` order.
    pub fn projection_matrix(&mut self) -> Array2<f64> {
        let projection = self.to_weighted_projection();
        let index = self.node_index();
        let mut out = Array2::zeros((self.n(), self.n()));
        for (source, targets) in &projection {
            let Some(&i) = index.get(source) else {
                continue;
            };
            for (target, weight) in targets {
                if let Some(&j) = index.get(target) {
                    out[[i, j]] = *weight;
                }
            }
        }
        out
    }

    /// The projection as a petgraph digraph; vertex `i` is `node_list()[i]`.
    pub fn to_digraph(&mut self) -> DiGraph<Ident, f64> {
        let projection = self.to_weighted_projection();
        let mut graph = DiGraph::with_capacity(self.n(), 0);
        let mut vertices: AHashMap<&Ident, NodeIndex> = AHashMap::with_capacity(self.n());
        for id in self.node_list() {
            vertices.insert(id, graph.add_node(id.clone()));
        }
        for (source, targets) in &projection {
            for (target, weight) in targets {
                if let (Some(&s), Some(&t)) = (vertices.get(source), vertices.get(target)) {
                    graph.add_edge(s, t, *weight);
                }
            }
        }
        graph
    }

    /// Export the projection in exactly one format.
    pub fn export_projection(&mut self, formats: ProjectionFormats) -> Result<ProjectionExport> {
        Ok(match formats.resolve()? {
            ProjectionFormat::Nested => ProjectionExport::Nested(self.to_weighted_projection()),
            ProjectionFormat::Matrix => ProjectionExport::Matrix(self.projection_matrix()),
            ProjectionFormat::DiGraph => ProjectionExport::DiGraph(self.to_digraph()),
        })
    }

    /// Node/edge incidence graph; each edge carries the incidence's role.
    pub fn to_bipartite_graph(
        &self,
        format: BipartiteFormat,
    ) -> Result<UnGraph<BipartiteVertex, RoleId>> {
        if format != BipartiteFormat::Petgraph {
            return Err(HypergraphError::NotImplemented(format!(
                "bipartite export as {format:?}; only petgraph is supported"
            )));
        }

        let mut graph = UnGraph::default();
        let mut vertices: AHashMap<BipartiteVertex, NodeIndex> = AHashMap::new();
        for inc in self.incidences_by_edge_desc() {
            let node = *vertices
                .entry(BipartiteVertex::Node(inc.node.clone()))
                .or_insert_with_key(|v| graph.add_node(v.clone()));
            let edge = *vertices
                .entry(BipartiteVertex::Edge(inc.edge.clone()))
                .or_insert_with_key(|v| graph.add_node(v.clone()));
            graph.add_edge(node, edge, inc.role);
        }
        Ok(graph)
    }

    /// Expected projection under the role-aware configuration model.
    pub fn null_expectation_matrix(&mut self) -> Array2<f64> {
        let r = self.role_weights();
        let k = self.edge_dimension_matrix();
        let d = self.node_degree_matrix();
        let roles = self.roles.len();

        let d_sum = d.sum_axis(Axis(0));
        let ktk = k.t().dot(&k);

        // A role nobody holds contributes nothing rather than 0/0.
        let mut weights: Array2<f64> = Array2::zeros((roles, roles));
        for p in 0..roles {
            for q in 0..roles {
                let denom = d_sum[p] * d_sum[q];
                if denom > 0.0 {
                    weights[[p, q]] = ktk[[p, q]] / denom * r[[p, q]];
                }
            }
        }

        d.dot(&weights).dot(&d.t())
    }

    /// Observed projection minus its null expectation.
    pub fn modularity_matrix(&mut self, symmetrize: bool) -> Array2<f64> {
        let b = self.projection_matrix() - self.null_expectation_matrix();
        if symmetrize {
            (&b + &b.t()) / 2.0
        } else {
            b
        }
    }
}
