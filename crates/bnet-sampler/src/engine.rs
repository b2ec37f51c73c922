//! Batch query engine.
//!
//! Sample generation fans out over a fixed-size worker pool, every worker
//! seeded from its task index, and blocks until all tasks finish. Workers only
//! borrow the network read-only and return their own result records; the
//! reduction runs in the calling thread after the barrier.

use crate::config::{Algorithm, EngineConfig};
use crate::error::InferenceError;
use crate::forward::ForwardStrategy;
use crate::likelihood::LikelihoodStrategy;
use bnet_core::{BayesianNetwork, NetworkError, Query, ResolvedQuery, SampleRng, F};
use rayon::prelude::*;

/// A batch strategy. Both samplers answer the same contract: one probability
/// per query, in input order.
pub trait SamplingStrategy: Send + Sync {
    fn algorithm(&self) -> Algorithm;

    fn batch_query(
        &self,
        network: &BayesianNetwork,
        queries: &[Query],
        steps: usize,
        pool: &WorkerPool,
    ) -> Result<Vec<F>, InferenceError>;
}

/// Strategy factory keyed by algorithm.
pub fn strategy_for(algorithm: Algorithm) -> Box<dyn SamplingStrategy> {
    match algorithm {
        Algorithm::Forward => Box::new(ForwardStrategy),
        Algorithm::Likelihood => Box::new(LikelihoodStrategy),
    }
}

/// Fixed-size pool of sampling workers.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
    seed: u64,
}

impl WorkerPool {
    pub fn new(config: &EngineConfig) -> Result<Self, InferenceError> {
        config.validate()?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|i| format!("bnet-worker-{i}"))
            .build()
            .map_err(|e| InferenceError::Pool(e.to_string()))?;
        Ok(Self {
            pool,
            workers: config.workers,
            seed: config.seed,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run `tasks` jobs on the pool and wait for all of them. Job `i` gets the
    /// random stream for index `i`. Results come back in task order; the first
    /// failing task fails the whole call.
    pub fn run<T, J>(&self, tasks: usize, job: J) -> Result<Vec<T>, InferenceError>
    where
        T: Send,
        J: Fn(usize, SampleRng) -> Result<T, NetworkError> + Sync,
    {
        let seed = self.seed;
        self.pool.install(|| {
            (0..tasks)
                .into_par_iter()
                .map(|task| -> Result<T, InferenceError> {
                    let rng = SampleRng::for_worker(seed, task as u64);
                    let out = job(task, rng).map_err(|source| InferenceError::Worker {
                        worker: task,
                        source,
                    })?;
                    tracing::debug!(task, "sampling task finished");
                    Ok(out)
                })
                .collect()
        })
    }
}

/// Split `steps` over `workers` as evenly as possible.
pub fn split_budget(steps: usize, workers: usize) -> Vec<usize> {
    let workers = workers.max(1);
    let base = steps / workers;
    let extra = steps % workers;
    (0..workers).map(|w| base + usize::from(w < extra)).collect()
}

/// Validate and resolve every query before any sampling starts.
pub(crate) fn resolve_all(
    network: &BayesianNetwork,
    queries: &[Query],
) -> Result<Vec<ResolvedQuery>, InferenceError> {
    queries
        .iter()
        .map(|q| q.resolve(network).map_err(InferenceError::from))
        .collect()
}

/// A network bound to a sampling strategy and a worker pool.
pub struct InferenceEngine {
    network: BayesianNetwork,
    strategy: Box<dyn SamplingStrategy>,
    pool: WorkerPool,
    config: EngineConfig,
}

impl InferenceEngine {
    /// Bind `network` to `algorithm`. The topological order is computed here,
    /// so structural defects surface before the first query.
    pub fn new(
        network: BayesianNetwork,
        algorithm: Algorithm,
        config: EngineConfig,
    ) -> Result<Self, InferenceError> {
        network.topological_order()?;
        let pool = WorkerPool::new(&config)?;
        tracing::info!(
            algorithm = %algorithm,
            workers = config.workers,
            variables = network.len(),
            "inference engine ready"
        );
        Ok(Self {
            network,
            strategy: strategy_for(algorithm),
            pool,
            config,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.strategy.algorithm()
    }

    pub fn network(&self) -> &BayesianNetwork {
        &self.network
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Estimate every query with a budget of `steps` samples.
    pub fn batch_query(&self, queries: &[Query], steps: usize) -> Result<Vec<F>, InferenceError> {
        tracing::info!(
            algorithm = %self.algorithm(),
            queries = queries.len(),
            steps,
            "batch query started"
        );
        if queries.is_empty() {
            return Ok(Vec::new());
        }
        let out = self
            .strategy
            .batch_query(&self.network, queries, steps, &self.pool)?;
        tracing::info!(queries = out.len(), "batch query finished");
        Ok(out)
    }

    pub fn query(&self, query: &Query, steps: usize) -> Result<F, InferenceError> {
        let out = self.batch_query(std::slice::from_ref(query), steps)?;
        Ok(out.first().copied().unwrap_or(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_budget() {
        assert_eq!(split_budget(10, 3), vec![4, 3, 3]);
        assert_eq!(split_budget(2, 4), vec![1, 1, 0, 0]);
        assert_eq!(split_budget(9, 0), vec![9]);
        assert_eq!(split_budget(1_000, 7).iter().sum::<usize>(), 1_000);
    }

    #[test]
    fn test_pool_keeps_task_order() {
        let pool = WorkerPool::new(&EngineConfig::new().with_workers(3)).unwrap();
        let out = pool.run(10, |task, _| Ok(task * 2)).unwrap();
        assert_eq!(out, (0..10).map(|t| t * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_pool_propagates_failure() {
        let pool = WorkerPool::new(&EngineConfig::new().with_workers(2)).unwrap();
        let err = pool
            .run(4, |task, _| {
                if task == 2 {
                    Err(NetworkError::UnknownVariable("X".into()))
                } else {
                    Ok(task)
                }
            })
            .unwrap_err();
        assert!(matches!(err, InferenceError::Worker { worker: 2, .. }));
    }

    #[test]
    fn test_pool_rejects_zero_workers() {
        assert!(matches!(
            WorkerPool::new(&EngineConfig::new().with_workers(0)),
            Err(InferenceError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_tasks_get_distinct_streams() {
        let pool = WorkerPool::new(&EngineConfig::new().with_workers(2)).unwrap();
        let firsts = pool.run(4, |_, mut rng| Ok(rng.uniform())).unwrap();
        for i in 0..firsts.len() {
            for j in i + 1..firsts.len() {
                assert_ne!(firsts[i], firsts[j]);
            }
        }
    }
}
