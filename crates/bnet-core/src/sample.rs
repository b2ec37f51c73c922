use crate::variable::VarId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name-keyed partial assignment of feature values. Ordered by name so that
/// iteration (and anything built from it) is canonical.
pub type Assignment = BTreeMap<String, String>;

/// One complete joint assignment drawn from a network.
///
/// Values are feature positions indexed by [`VarId`]. Forward samples carry
/// weight one; likelihood-weighted samples carry the product of evidence
/// probabilities.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    values: Vec<usize>,
    weight: f64,
}

impl Sample {
    pub(crate) fn new(values: Vec<usize>, weight: f64) -> Self {
        Self { values, weight }
    }

    /// # Panics
    ///
    /// If `var` is out of range for the sample. See [`get`](Self::get).
    pub fn value(&self, var: VarId) -> usize {
        self.values[var.0]
    }

    pub fn get(&self, var: VarId) -> Option<usize> {
        self.values.get(var.0).copied()
    }

    pub fn values(&self) -> &[usize] {
        &self.values
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn matches(&self, assignment: &ResolvedAssignment) -> bool {
        assignment
            .pairs()
            .iter()
            .all(|&(var, value)| self.get(var) == Some(value))
    }
}

/// An [`Assignment`] resolved against a network: variable ids and feature
/// positions instead of names. Pairs are kept sorted by id, so equal
/// assignments compare and hash equal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResolvedAssignment {
    pairs: Vec<(VarId, usize)>,
}

impl ResolvedAssignment {
    pub(crate) fn new(mut pairs: Vec<(VarId, usize)>) -> Self {
        pairs.sort_unstable();
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(VarId, usize)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, var: VarId) -> Option<usize> {
        self.pairs
            .binary_search_by_key(&var, |&(v, _)| v)
            .ok()
            .map(|i| self.pairs[i].1)
    }

    pub fn contains(&self, var: VarId) -> bool {
        self.get(var).is_some()
    }
}
