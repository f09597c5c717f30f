//! Annotated hypergraphs: hypergraphs whose incidences carry roles.
//!
//! A hypergraph is held as a flat list of `(node, role, edge, metadata)`
//! incidences ([`Incidence`]) inside an [`AnnotatedHypergraph`]. On top of
//! that list the crate provides:
//!
//! 1. **Aggregation**: node degrees and edge dimensions, optionally per role,
//!    as maps or dense `ndarray` matrices.
//! 2. **Randomization**: degree-preserving Markov-chain node swaps (with or
//!    without degeneracy rejection) and stub matching, for null-model samples.
//! 3. **Projection**: the weighted, directed dyadic graph induced by a
//!    role-interaction matrix, its configuration-model null expectation, and
//!    the resulting modularity matrix.
//! 4. **Maintenance**: relabeling and removal of singleton edges or repeated
//!    nodes.
//!
//! ## Sort order
//!
//! Operations that walk the incidence list by role or by edge sort it first;
//! the store remembers the current [`SortKey`] and skips redundant sorts. Any
//! structural change goes through [`AnnotatedHypergraph::set_states`], which
//! recomputes the node/edge lists and forgets the sort key.
//!
//! ## Concurrency
//!
//! Everything is synchronous and single-threaded. Mutating calls take
//! `&mut self`, so a read cannot interleave with a randomization run.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod incidence;
pub mod maintenance;
pub mod projection;
pub mod randomize;
pub mod records;
pub mod store;
pub mod tabular;

pub use aggregate::RoleCounts;
pub use config::HypergraphConfig;
pub use error::{HypergraphError, Result};
pub use incidence::{is_degenerate, Ident, Incidence, Metadata, RoleId};
pub use projection::{
    BipartiteFormat, BipartiteVertex, ProjectionExport, ProjectionFormat, ProjectionFormats,
    WeightedProjection,
};
pub use randomize::{McmcOptions, McmcReport, McmcStatus, SelfPairPolicy};
pub use records::EDGE_ID_KEY;
pub use store::{AnnotatedHypergraph, SortKey};
pub use tabular::{IncidenceRow, LoadOptions, TabularDataset};
