use bnet_core::{BayesianNetwork, NetworkError, VariableSpec};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Exp1};

/// Shape of a generated network.
#[derive(Clone, Debug)]
pub struct RandomNetworkSpec {
    pub variables: usize,
    pub max_parents: usize,
    pub max_features: usize,
    pub seed: u64,
}

impl Default for RandomNetworkSpec {
    fn default() -> Self {
        Self {
            variables: 12,
            max_parents: 3,
            max_features: 3,
            seed: 42,
        }
    }
}

impl RandomNetworkSpec {
    pub fn new(variables: usize, max_parents: usize, max_features: usize, seed: u64) -> Self {
        Self { variables, max_parents, max_features, seed }
    }
}

/// Loader records for a random DAG. Variable `Xi` only takes parents among
/// `X0..Xi`, and every context row is Dirichlet(1) distributed.
pub fn random_specs(spec: &RandomNetworkSpec) -> Vec<VariableSpec> {
    let mut rng = ChaCha20Rng::seed_from_u64(spec.seed);
    let max_features = spec.max_features.max(2);
    let mut cardinalities = Vec::with_capacity(spec.variables);
    let mut specs = Vec::with_capacity(spec.variables);

    for i in 0..spec.variables {
        let k = rng.gen_range(2..=max_features);
        let n_parents = rng.gen_range(0..=spec.max_parents.min(i));
        let mut parents = sample(&mut rng, i.max(1), n_parents).into_vec();
        parents.sort_unstable();

        let mut shape: Vec<usize> = parents.iter().map(|&p| cardinalities[p]).collect();
        shape.push(k);
        let rows: usize = shape[..shape.len() - 1].iter().product();

        let mut probabilities = Vec::with_capacity(rows * k);
        for _ in 0..rows {
            let draws: Vec<f64> = (0..k).map(|_| Exp1.sample(&mut rng)).collect();
            let total: f64 = draws.iter().sum();
            probabilities.extend(draws.into_iter().map(|x| x / total));
        }
        if parents.is_empty() {
            shape.insert(0, 1);
        }

        specs.push(VariableSpec {
            name: format!("X{i}"),
            features: (0..k).map(|s| format!("s{s}")).collect(),
            parents: parents.iter().map(|p| format!("X{p}")).collect(),
            probabilities,
            shape: Some(shape),
        });
        cardinalities.push(k);
    }
    specs
}

pub fn random_network(spec: &RandomNetworkSpec) -> Result<BayesianNetwork, NetworkError> {
    BayesianNetwork::from_specs(&random_specs(spec))
}
