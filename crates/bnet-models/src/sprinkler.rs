use crate::var;
use bnet_core::{BayesianNetwork, NetworkError, VariableSpec};

/// Cloudy -> {Sprinkler, Rain} -> WetGrass, all binary `T`/`F`.
pub fn sprinkler_specs() -> Vec<VariableSpec> {
    vec![
        var("Cloudy", &["T", "F"], &[], vec![0.5, 0.5], &[1, 2]),
        var("Sprinkler", &["T", "F"], &["Cloudy"], vec![0.1, 0.9, 0.5, 0.5], &[2, 2]),
        var("Rain", &["T", "F"], &["Cloudy"], vec![0.8, 0.2, 0.2, 0.8], &[2, 2]),
        var(
            "WetGrass",
            &["T", "F"],
            &["Sprinkler", "Rain"],
            vec![0.99, 0.01, 0.9, 0.1, 0.9, 0.1, 0.0, 1.0],
            &[2, 2, 2],
        ),
    ]
}

pub fn sprinkler_network() -> Result<BayesianNetwork, NetworkError> {
    BayesianNetwork::from_specs(&sprinkler_specs())
}

pub mod exact {
    /// P(WetGrass = T)
    pub const WET: f64 = 0.6471;
    /// P(Rain = T | WetGrass = T)
    pub const RAIN_GIVEN_WET: f64 = 0.7079;
}
