use anyhow::Result;
use bnet_core::Query;
use bnet_models::{random_network, RandomNetworkSpec};
use bnet_sampler::{Algorithm, EngineConfig, InferenceEngine};
use clap::Parser;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare both samplers on a generated network")]
struct Args {
    #[arg(long, default_value_t = 40)]
    variables: usize,

    #[arg(long, default_value_t = 3)]
    max_parents: usize,

    #[arg(long, default_value_t = 4)]
    max_features: usize,

    #[arg(long, default_value_t = 100_000)]
    steps: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    let spec = RandomNetworkSpec::new(args.variables, args.max_parents, args.max_features, args.seed);

    // Every variable has at least two features, so s0/s1 always exist.
    let queries: Vec<Query> = (1..args.variables)
        .map(|i| {
            let target = format!("X{i}");
            let evidence = format!("X{}", i / 2);
            if i % 3 == 0 {
                Query::from_pairs(&[(target.as_str(), "s0")], &[])
            } else {
                Query::from_pairs(&[(target.as_str(), "s0")], &[(evidence.as_str(), "s1")])
            }
        })
        .collect();

    let config = EngineConfig::new().with_seed(args.seed);
    let mut estimates = Vec::new();
    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let engine = InferenceEngine::new(random_network(&spec)?, algorithm, config.clone())?;
        let start = Instant::now();
        let results = engine.batch_query(&queries, args.steps)?;
        println!(
            "{algorithm:>10}: {} queries over {} variables in {:.2?}",
            queries.len(),
            args.variables,
            start.elapsed()
        );
        estimates.push(results);
    }

    let max_gap = estimates[0]
        .iter()
        .zip(&estimates[1])
        .map(|(a, b)| (a - b).abs())
        .fold(0.0_f64, f64::max);
    println!("Largest forward/likelihood gap: {max_gap:.4}");
    Ok(())
}
