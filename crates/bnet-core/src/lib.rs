pub mod error;
pub mod graph;
pub mod topo;
pub mod table;
pub mod variable;
pub mod network;
pub mod sample;
pub mod query;
pub mod rng;

// Core types
pub type F = f64;
pub use error::{GraphError, GraphResult, NetworkError, NetworkResult, QueryError, TableError, TableResult};
pub use rng::SampleRng;

// Structure
pub use graph::Graph;
pub use topo::{TopoSort, Visited, is_topological};

// Model
pub use table::{ProbabilityTable, TOLERANCE};
pub use variable::{VarId, Variable, VariableSpec};
pub use network::BayesianNetwork;

// Samples and queries
pub use sample::{Assignment, ResolvedAssignment, Sample};
pub use query::{EvidenceSignature, Query, ResolvedQuery, NO_EVIDENCE};
