pub mod student;
pub mod coin;
pub mod sprinkler;
pub mod random;

pub use student::student_network;
pub use coin::coin_network;
pub use sprinkler::sprinkler_network;
pub use random::{random_network, RandomNetworkSpec};

use bnet_core::VariableSpec;

/// Shorthand used by the canned models.
pub(crate) fn var(
    name: &str,
    features: &[&str],
    parents: &[&str],
    probabilities: Vec<f64>,
    shape: &[usize],
) -> VariableSpec {
    VariableSpec {
        name: name.to_string(),
        features: features.iter().map(|s| s.to_string()).collect(),
        parents: parents.iter().map(|s| s.to_string()).collect(),
        probabilities,
        shape: Some(shape.to_vec()),
    }
}
