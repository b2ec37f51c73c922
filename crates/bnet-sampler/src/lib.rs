//! Monte Carlo inference over [`bnet_core::BayesianNetwork`].
//!
//! Two samplers answer batches of conditional probability queries:
//! forward sampling with evidence filtering, and likelihood weighting with
//! evidence clamped. [`InferenceEngine`] binds a network to one of them and
//! spreads the sample budget over a worker pool.

pub mod config;
pub mod engine;
pub mod error;
pub mod forward;
pub mod likelihood;
pub mod stats;

pub use config::{default_workers, Algorithm, EngineConfig, RESERVED_CORES};
pub use engine::{split_budget, strategy_for, InferenceEngine, SamplingStrategy, WorkerPool};
pub use error::InferenceError;
pub use forward::{ForwardSampler, ForwardStrategy};
pub use likelihood::{LikelihoodSampler, LikelihoodStrategy};
pub use stats::{forward_stats, likelihood_stats, QueryStats, WeightedStats};
