//! Null-model sampling by Markov-chain node swaps and by stub matching.
//!
//! Two chains are available:
//!
//! - **degeneracy-avoiding** (default): pick two edges and one incidence in
//!   each, swap the incidences' node ids, and reject the proposal if either
//!   edge would then contain a node twice (or, when roles are preserved, if
//!   the two incidences hold different roles). Runs until `n_steps` proposals
//!   are *accepted*. With roles preserved, the multiset of nodes holding each
//!   role never changes; only which edge each `(node, role)` pair sits in.
//! - **stub-labeled**: within each role's incidences, swap node ids between
//!   two incidences in different edges. No rejection, so degenerate edges
//!   can appear. The step budget is split across roles in proportion to
//!   `N ln N` of each role's incidence count.
//!
//! # Liveness
//!
//! If no pair of edges admits a valid swap (tiny or saturated hypergraphs),
//! the degeneracy-avoiding chain never accepts anything. Without
//! `max_attempts` it then spins forever; with a cap it stops and reports
//! [`McmcStatus::Exhausted`].

use ahash::AHashMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::incidence::{is_degenerate, Ident, Incidence, Metadata, RoleId};
use crate::store::{AnnotatedHypergraph, SortKey};

/// What to do when both edge draws land on the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfPairPolicy {
    /// Keep the draw. Picking the same slot twice is an accepted no-op (when
    /// the edge is non-degenerate); two different slots always duplicate a
    /// node and are rejected.
    #[default]
    Lazy,
    /// Redraw the second edge so it always differs from the first.
    Exclude,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McmcOptions {
    /// Number of swaps to accept.
    pub n_steps: u64,
    /// Use the rejection chain that keeps edges non-degenerate.
    pub avoid_degeneracy: bool,
    /// Only swap incidences holding the same role (degeneracy-avoiding chain).
    pub preserve_roles: bool,
    /// Stop after this many proposals even if `n_steps` was not reached.
    pub max_attempts: Option<u64>,
    pub self_pairs: SelfPairPolicy,
}

impl Default for McmcOptions {
    fn default() -> Self {
        Self {
            n_steps: 1,
            avoid_degeneracy: true,
            preserve_roles: true,
            max_attempts: None,
            self_pairs: SelfPairPolicy::default(),
        }
    }
}

impl McmcOptions {
    pub fn steps(n_steps: u64) -> Self {
        Self {
            n_steps,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McmcStatus {
    /// Every requested step was taken.
    Completed,
    /// The attempt budget ran out (or no valid proposal can exist) first.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct McmcReport {
    pub accepted: u64,
    pub rejected: u64,
    pub status: McmcStatus,
}

impl McmcReport {
    pub fn is_complete(&self) -> bool {
        self.status == McmcStatus::Completed
    }
}

impl AnnotatedHypergraph {
    /// Randomize the incidence list in place.
    ///
    /// The number of nodes, edges, and incidences per role are unchanged.
    /// Derived state is recomputed before returning.
    pub fn mcmc<R: Rng + ?Sized>(&mut self, rng: &mut R, options: &McmcOptions) -> McmcReport {
        let report = if options.avoid_degeneracy {
            self.degeneracy_avoiding_mcmc(rng, options)
        } else {
            self.stub_labeled_mcmc(rng, options)
        };
        tracing::debug!(
            accepted = report.accepted,
            rejected = report.rejected,
            status = ?report.status,
            "mcmc finished"
        );
        report
    }

    fn degeneracy_avoiding_mcmc<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        options: &McmcOptions,
    ) -> McmcReport {
        self.sort(SortKey::EdgeRole);
        let mut edges: Vec<Vec<Incidence>> = self
            .incidences
            .chunk_by(|a, b| a.edge == b.edge)
            .map(<[Incidence]>::to_vec)
            .collect();
        let m = edges.len();

        let mut accepted = 0u64;
        let mut rejected = 0u64;
        let mut attempts = 0u64;

        let status = loop {
            if accepted >= options.n_steps {
                break McmcStatus::Completed;
            }
            if m == 0 || (m < 2 && options.self_pairs == SelfPairPolicy::Exclude) {
                break McmcStatus::Exhausted;
            }
            if options.max_attempts.is_some_and(|cap| attempts >= cap) {
                break McmcStatus::Exhausted;
            }
            attempts += 1;

            let i = rng.gen_range(0..m);
            let j = match options.self_pairs {
                SelfPairPolicy::Lazy => rng.gen_range(0..m),
                SelfPairPolicy::Exclude => {
                    let j = rng.gen_range(0..m - 1);
                    if j >= i {
                        j + 1
                    } else {
                        j
                    }
                }
            };
            let k = rng.gen_range(0..edges[i].len());
            let l = rng.gen_range(0..edges[j].len());

            if options.preserve_roles && edges[i][k].role != edges[j][l].role {
                rejected += 1;
                continue;
            }

            if i == j {
                if k == l && !is_degenerate(&edges[i]) {
                    accepted += 1;
                } else {
                    rejected += 1;
                }
                continue;
            }

            let mut first = edges[i].clone();
            let mut second = edges[j].clone();
            first[k].node = edges[j][l].node.clone();
            second[l].node = edges[i][k].node.clone();

            if is_degenerate(&first) || is_degenerate(&second) {
                rejected += 1;
                continue;
            }

            edges[i] = first;
            edges[j] = second;
            accepted += 1;
        };

        self.replace_incidences(edges.into_iter().flatten().collect());

        McmcReport {
            accepted,
            rejected,
            status,
        }
    }

    fn stub_labeled_mcmc<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        options: &McmcOptions,
    ) -> McmcReport {
        self.sort(SortKey::Role);
        let mut partitions: Vec<Vec<Incidence>> = self
            .incidences
            .chunk_by(|a, b| a.role == b.role)
            .map(<[Incidence]>::to_vec)
            .collect();

        let weights: Vec<f64> = partitions
            .iter()
            .map(|p| {
                let n = p.len() as f64;
                n * n.ln()
            })
            .collect();
        let total: f64 = weights.iter().sum();

        let mut accepted = 0u64;
        let mut rejected = 0u64;
        let mut attempts = 0u64;
        let mut status = McmcStatus::Completed;

        'partitions: for (part, weight) in partitions.iter_mut().zip(&weights) {
            let steps = if total > 0.0 {
                (weight / total * options.n_steps as f64) as u64
            } else {
                0
            };
            if steps == 0 {
                continue;
            }
            if part.iter().all(|inc| inc.edge == part[0].edge) {
                tracing::warn!(
                    role = part[0].role.index(),
                    steps,
                    "role occurs in a single edge; no swap possible"
                );
                status = McmcStatus::Exhausted;
                continue;
            }

            let n = part.len();
            let mut taken = 0u64;
            while taken < steps {
                if options.max_attempts.is_some_and(|cap| attempts >= cap) {
                    status = McmcStatus::Exhausted;
                    break 'partitions;
                }
                attempts += 1;

                let i = rng.gen_range(0..n);
                let j = rng.gen_range(0..n);
                if part[i].edge == part[j].edge {
                    rejected += 1;
                    continue;
                }
                let node = part[i].node.clone();
                part[i].node = std::mem::replace(&mut part[j].node, node);
                taken += 1;
                accepted += 1;
            }
        }

        self.replace_incidences(partitions.into_iter().flatten().collect());

        McmcReport {
            accepted,
            rejected,
            status,
        }
    }

    /// A stub-matched sample: every `(node, role)` stub is shuffled within its
    /// role and dealt back into edge slots so each edge keeps its per-role
    /// dimension. Degeneracies are not avoided. `self` is left untouched
    /// apart from its sort order.
    pub fn stub_matching<R: Rng + ?Sized>(&mut self, rng: &mut R) -> AnnotatedHypergraph {
        let dims = self.edge_dimension_matrix();

        let mut pools: Vec<Vec<Ident>> = vec![Vec::new(); self.roles.len()];
        let mut edge_meta: AHashMap<&Ident, Option<&Metadata>> = AHashMap::new();
        for inc in &self.incidences {
            pools[inc.role.index()].push(inc.node.clone());
            edge_meta
                .entry(&inc.edge)
                .and_modify(|meta| {
                    if meta.is_none() {
                        *meta = inc.meta.as_ref();
                    }
                })
                .or_insert(inc.meta.as_ref());
        }
        for pool in &mut pools {
            pool.shuffle(rng);
        }

        let mut incidences = Vec::with_capacity(self.incidences.len());
        for (e, edge) in self.edge_list().iter().enumerate() {
            let meta = edge_meta.get(edge).copied().flatten().cloned();
            for (p, pool) in pools.iter_mut().enumerate() {
                let count = dims[[e, p]] as usize;
                for _ in 0..count {
                    let Some(node) = pool.pop() else {
                        break;
                    };
                    incidences.push(Incidence {
                        node,
                        role: RoleId::new(p as u32),
                        edge: edge.clone(),
                        meta: meta.clone(),
                    });
                }
            }
        }

        self.derive(incidences)
    }
}
