use crate::var;
use bnet_core::{BayesianNetwork, NetworkError};

/// Single fair coin with features `A` and `B`.
pub fn coin_network() -> Result<BayesianNetwork, NetworkError> {
    BayesianNetwork::from_specs(&[var("Coin", &["A", "B"], &[], vec![0.5, 0.5], &[1, 2])])
}
