//! Likelihood weighting.
//!
//! Queries are grouped by resolved evidence. Each group gets one task that
//! draws `steps` weighted samples with its evidence clamped and estimates
//! every target in the group from that one sample set.

use crate::config::Algorithm;
use crate::engine::{resolve_all, SamplingStrategy, WorkerPool};
use crate::error::InferenceError;
use crate::stats::{likelihood_stats, WeightedStats};
use bnet_core::{
    BayesianNetwork, EvidenceSignature, NetworkResult, Query, ResolvedAssignment, Sample,
    SampleRng, F,
};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug)]
pub struct LikelihoodSampler<'n> {
    network: &'n BayesianNetwork,
}

impl<'n> LikelihoodSampler<'n> {
    pub fn new(network: &'n BayesianNetwork) -> Self {
        Self { network }
    }

    pub fn sample(
        &self,
        evidence: &ResolvedAssignment,
        rng: &mut SampleRng,
    ) -> NetworkResult<Sample> {
        self.network.likelihood_sample(evidence, rng)
    }

    pub fn run(
        &self,
        evidence: &ResolvedAssignment,
        n: usize,
        seed: u64,
    ) -> NetworkResult<Vec<Sample>> {
        let mut rng = SampleRng::new(seed);
        (0..n).map(|_| self.sample(evidence, &mut rng)).collect()
    }

    /// Estimate one query from `n` weighted samples.
    pub fn estimate(&self, query: &Query, n: usize, seed: u64) -> Result<F, InferenceError> {
        let resolved = query.resolve(self.network)?;
        let samples = self.run(&resolved.evidence, n, seed)?;
        Ok(likelihood_stats(&samples, &resolved.target).probability())
    }

    pub(crate) fn weigh(
        &self,
        evidence: &ResolvedAssignment,
        targets: &[&ResolvedAssignment],
        n: usize,
        rng: &mut SampleRng,
    ) -> NetworkResult<Vec<WeightedStats>> {
        let mut stats = vec![WeightedStats::default(); targets.len()];
        for _ in 0..n {
            let sample = self.sample(evidence, rng)?;
            for (acc, target) in stats.iter_mut().zip(targets) {
                acc.record(&sample, target);
            }
        }
        Ok(stats)
    }
}

/// Queries sharing one resolved evidence set.
#[derive(Debug)]
struct EvidenceGroup {
    /// For logs only; signatures of distinct evidence sets may coincide.
    signature: EvidenceSignature,
    evidence: ResolvedAssignment,
    /// Positions in the input batch.
    members: Vec<usize>,
}

/// Groups keyed by resolved evidence, in order of first appearance, so task
/// indices (and seeds) follow the input order.
fn group_by_evidence(queries: &[Query], evidence: Vec<ResolvedAssignment>) -> Vec<EvidenceGroup> {
    let mut groups: Vec<EvidenceGroup> = Vec::new();
    let mut index: HashMap<ResolvedAssignment, usize> = HashMap::new();
    for (pos, (query, resolved)) in queries.iter().zip(evidence).enumerate() {
        match index.get(&resolved) {
            Some(&g) => groups[g].members.push(pos),
            None => {
                index.insert(resolved.clone(), groups.len());
                groups.push(EvidenceGroup {
                    signature: query.signature(),
                    evidence: resolved,
                    members: vec![pos],
                });
            }
        }
    }
    groups
}

/// One weighted sample set per distinct evidence, spread over the pool.
#[derive(Clone, Copy, Debug, Default)]
pub struct LikelihoodStrategy;

impl SamplingStrategy for LikelihoodStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Likelihood
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

        let (targets, evidence): (Vec<_>, Vec<_>) =
            resolved.into_iter().map(|q| (q.target, q.evidence)).unzip();
        let groups = group_by_evidence(queries, evidence);
        tracing::debug!(groups = groups.len(), queries = queries.len(), "evidence groups");

        let sampler = LikelihoodSampler::new(network);
        let partials = pool.run(groups.len(), |g, mut rng| {
            let group = &groups[g];
            let group_targets: Vec<_> = group.members.iter().map(|&i| &targets[i]).collect();
            let stats = sampler.weigh(&group.evidence, &group_targets, steps, &mut rng)?;
            tracing::trace!(signature = %group.signature, "group weighted");
            Ok(stats)
        })?;

        let mut out = vec![0.0; queries.len()];
        for (group, stats) in groups.iter().zip(&partials) {
            for (&pos, s) in group.members.iter().zip(stats) {
                out[pos] = s.probability();
            }
        }
        Ok(out)
    }
}
