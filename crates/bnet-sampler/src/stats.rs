//! Per-query statistics over a batch of samples.
//!
//! A zero denominator is not an error: the estimate is defined as 0 so that
//! batch results always have one finite value per query.

use bnet_core::{ResolvedAssignment, ResolvedQuery, Sample, F};

/// Counts for one query over unweighted samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Samples that agree with both evidence and target.
    pub matched: u64,
    /// Samples that agree with the evidence.
    pub total: u64,
}

impl QueryStats {
    pub fn record(&mut self, sample: &Sample, query: &ResolvedQuery) {
        if !sample.matches(&query.evidence) {
            return;
        }
        self.total += 1;
        if sample.matches(&query.target) {
            self.matched += 1;
        }
    }

    pub fn merge(&mut self, other: &QueryStats) {
        self.matched += other.matched;
        self.total += other.total;
    }

    pub fn probability(&self) -> F {
        if self.total == 0 {
            0.0
        } else {
            self.matched as F / self.total as F
        }
    }
}

/// Weight sums for one query over likelihood-weighted samples.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WeightedStats {
    pub matched: F,
    pub total: F,
}

impl WeightedStats {
    pub fn record(&mut self, sample: &Sample, target: &ResolvedAssignment) {
        let w = sample.weight();
        self.total += w;
        if sample.matches(target) {
            self.matched += w;
        }
    }

    pub fn merge(&mut self, other: &WeightedStats) {
        self.matched += other.matched;
        self.total += other.total;
    }

    pub fn probability(&self) -> F {
        if self.total > 0.0 {
            self.matched / self.total
        } else {
            0.0
        }
    }
}

/// `(matched, total)` of `query` over forward samples.
pub fn forward_stats(samples: &[Sample], query: &ResolvedQuery) -> QueryStats {
    let mut stats = QueryStats::default();
    for sample in samples {
        stats.record(sample, query);
    }
    stats
}

/// Weighted estimate of `target` over samples drawn under one evidence set.
pub fn likelihood_stats(samples: &[Sample], target: &ResolvedAssignment) -> WeightedStats {
    let mut stats = WeightedStats::default();
    for sample in samples {
        stats.record(sample, target);
    }
    stats
}
