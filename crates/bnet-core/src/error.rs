//! Error types for network construction, table lookup and query resolution.
//!
//! Every error here is structural: it points at a defect in the model or the
//! caller and is never retried. Statistical degeneracies (zero matches, zero
//! weight) are not errors and never show up in these enums.

use thiserror::Error;

/// Errors raised by [`Graph`](crate::graph::Graph) and the traversal code.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The vertex is not a member of the graph.
    #[error("vertex not found in graph: {0}")]
    VertexNotFound(String),

    /// An order-sensitive traversal was asked to run over an undirected graph.
    #[error("topological order requires a directed graph")]
    Undirected,
}

/// Errors raised while building or querying a [`ProbabilityTable`](crate::table::ProbabilityTable).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Flat probability list does not fill the declared shape.
    #[error("table for {table} has {len} values but shape {shape:?} needs {expected}")]
    ShapeMismatch {
        table: String,
        len: usize,
        shape: Vec<usize>,
        expected: usize,
    },

    /// Shape axes disagree with the declared parents or features.
    #[error("table for {table}: {reason}")]
    AxisMismatch { table: String, reason: String },

    /// A parent context does not sum to one.
    #[error("distribution of {table} at context {row} sums to {sum}, expected 1")]
    NotNormalized { table: String, row: usize, sum: f64 },

    /// A cell holds a negative or non-finite mass.
    #[error("table for {table} holds invalid mass {value} at flat index {index}")]
    NegativeMass {
        table: String,
        index: usize,
        value: f64,
    },

    /// A feature list was registered for a name that is not a parent of the table.
    #[error("{parent} is not a parent of {table}")]
    UnknownParent { table: String, parent: String },

    /// A declared parent has no registered feature index.
    #[error("parent {parent} of {table} has no registered feature index")]
    UnregisteredParent { table: String, parent: String },

    /// The assignment did not name a value for a declared parent.
    #[error("assignment is missing a value for parent {parent} of {table}")]
    MissingParentValue { table: String, parent: String },

    /// The value is not one of the variable's features.
    #[error("{value} is not a feature of {variable}")]
    UnknownFeature { variable: String, value: String },

    /// The registered feature list does not match the parent's axis length.
    #[error("parent {parent} of {table} has {registered} features but axis length {axis}")]
    ParentCardinality {
        table: String,
        parent: String,
        registered: usize,
        axis: usize,
    },
}

/// Errors raised by [`BayesianNetwork`](crate::network::BayesianNetwork).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("variable {0} already exists in the network")]
    DuplicateVariable(String),

    #[error("unknown variable: {0}")]
    UnknownVariable(String),

    /// A variable references a parent that was never added.
    #[error("variable {child} references missing parent {parent}")]
    UnknownParent { child: String, parent: String },

    /// The feature list registered on a child disagrees with the parent variable.
    #[error("features registered for parent {parent} on {child} do not match the parent variable")]
    ParentFeatureMismatch { child: String, parent: String },

    /// The topological order is cached; adding variables needs an explicit reset.
    #[error("network order is already computed; call reset_order before adding {0}")]
    Frozen(String),

    /// Some variable is unreachable from the roots or sits on a cycle.
    #[error("network is not acyclic: {0} cannot be ordered after its parents")]
    Cycle(String),

    #[error("{value} is not a value of variable {variable}")]
    UnknownValue { variable: String, value: String },
}

/// Errors raised while validating or resolving a [`Query`](crate::query::Query).
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// A variable is named both as target and as evidence.
    #[error("variable {0} appears in both target and evidence")]
    Overlap(String),

    #[error("query target is empty")]
    EmptyTarget,
}

pub type GraphResult<T> = Result<T, GraphError>;
pub type TableResult<T> = Result<T, TableError>;
pub type NetworkResult<T> = Result<T, NetworkError>;
