//! Ancestral (forward) sampling.
//!
//! Every worker draws its share of the step budget and keeps one
//! [`QueryStats`] per query. Evidence is applied as a filter, so a query whose
//! evidence never shows up in the samples estimates to 0.

use crate::config::Algorithm;
use crate::engine::{resolve_all, split_budget, SamplingStrategy, WorkerPool};
use crate::error::InferenceError;
use crate::stats::{forward_stats, QueryStats};
use bnet_core::{BayesianNetwork, NetworkResult, Query, ResolvedQuery, Sample, SampleRng, F};

/// Single-threaded forward sampler over a borrowed network.
#[derive(Clone, Copy, Debug)]
pub struct ForwardSampler<'n> {
    network: &'n BayesianNetwork,
}

impl<'n> ForwardSampler<'n> {
    pub fn new(network: &'n BayesianNetwork) -> Self {
        Self { network }
    }

    pub fn sample(&self, rng: &mut SampleRng) -> NetworkResult<Sample> {
        self.network.forward_sample(rng)
    }

    /// Draw `n` samples from a fresh stream seeded with `seed`.
    pub fn run(&self, n: usize, seed: u64) -> NetworkResult<Vec<Sample>> {
        let mut rng = SampleRng::new(seed);
        (0..n).map(|_| self.sample(&mut rng)).collect()
    }

    /// Estimate one query from `n` samples.
    pub fn estimate(&self, query: &Query, n: usize, seed: u64) -> Result<F, InferenceError> {
        let resolved = query.resolve(self.network)?;
        let samples = self.run(n, seed)?;
        Ok(forward_stats(&samples, &resolved).probability())
    }

    /// Accumulate counts for every query over `n` samples without keeping
    /// the samples around.
    pub(crate) fn count(
        &self,
        queries: &[ResolvedQuery],
        n: usize,
        rng: &mut SampleRng,
    ) -> NetworkResult<Vec<QueryStats>> {
        let mut stats = vec![QueryStats::default(); queries.len()];
        for _ in 0..n {
            let sample = self.sample(rng)?;
            for (acc, query) in stats.iter_mut().zip(queries) {
                acc.record(&sample, query);
            }
        }
        Ok(stats)
    }
}

/// Splits the step budget across the pool and sums per-query counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardStrategy;

impl SamplingStrategy for ForwardStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Forward
    }

    fn batch_query(
        &self,
        network: &BayesianNetwork,
        queries: &[Query],
        steps: usize,
        pool: &WorkerPool,
    ) -> Result<Vec<F>, InferenceError> {
        let resolved = resolve_all(network, queries)?;
        network.topological_order()?;

        let budget = split_budget(steps, pool.workers());
        let sampler = ForwardSampler::new(network);
        let partials = pool.run(budget.len(), |worker, mut rng| {
            sampler.count(&resolved, budget[worker], &mut rng)
        })?;

        let mut totals = vec![QueryStats::default(); resolved.len()];
        for partial in &partials {
            for (acc, stats) in totals.iter_mut().zip(partial) {
                acc.merge(stats);
            }
        }
        tracing::debug!(workers = partials.len(), steps, "forward counts reduced");
        Ok(totals.iter().map(QueryStats::probability).collect())
    }
}
