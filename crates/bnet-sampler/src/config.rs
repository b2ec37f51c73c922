use crate::error::InferenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cores left free for the caller when sizing the worker pool.
pub const RESERVED_CORES: usize = 1;

/// Worker pool and seeding for an [`InferenceEngine`](crate::InferenceEngine).
///
/// When `workers` is not given it is derived from `reserved_cores`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEngineConfig")]
pub struct EngineConfig {
    pub workers: usize,
    pub seed: u64,
    pub reserved_cores: usize,
}

#[derive(Deserialize)]
struct RawEngineConfig {
    #[serde(default)]
    workers: Option<usize>,
    #[serde(default = "default_seed")]
    seed: u64,
    #[serde(default = "default_reserved_cores")]
    reserved_cores: usize,
}

fn default_seed() -> u64 {
    42
}

fn default_reserved_cores() -> usize {
    RESERVED_CORES
}

impl From<RawEngineConfig> for EngineConfig {
    fn from(raw: RawEngineConfig) -> Self {
        Self {
            workers: raw
                .workers
                .unwrap_or_else(|| default_workers(raw.reserved_cores)),
            seed: raw.seed,
            reserved_cores: raw.reserved_cores,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(RESERVED_CORES),
            seed: default_seed(),
            reserved_cores: RESERVED_CORES,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Leave `reserved` cores free and size the pool from what remains.
    pub fn with_reserved_cores(mut self, reserved: usize) -> Self {
        self.reserved_cores = reserved;
        self.workers = default_workers(reserved);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn validate(&self) -> Result<(), InferenceError> {
        if self.workers == 0 {
            return Err(InferenceError::InvalidConfig(
                "worker count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Available cores minus `reserved`, never below one.
pub fn default_workers(reserved: usize) -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .saturating_sub(reserved)
        .max(1)
}

/// Sampling algorithm behind a batch query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Forward,
    Likelihood,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Forward => "forward",
            Algorithm::Likelihood => "likelihood",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" => Ok(Algorithm::Forward),
            "likelihood" => Ok(Algorithm::Likelihood),
            "gibbs" => Err(InferenceError::UnknownAlgorithm(
                "gibbs sampling is not implemented".into(),
            )),
            other => Err(InferenceError::UnknownAlgorithm(other.to_string())),
        }
    }
}
