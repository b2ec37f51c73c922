use anyhow::Result;
use bnet_core::Query;
use bnet_models::student::{exact, student_network};
use bnet_sampler::{Algorithm, EngineConfig, InferenceEngine};
use clap::Parser;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(author, version, about = "Estimate the student network queries with both samplers")]
struct Args {
    #[arg(long, default_value_t = 200_000)]
    steps: usize,

    #[arg(long)]
    workers: Option<usize>,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let queries = vec![
        Query::from_pairs(&[("G", "A")], &[]),
        Query::from_pairs(&[("G", "B")], &[]),
        Query::from_pairs(&[("G", "C")], &[]),
        Query::from_pairs(&[("L", "Strong")], &[("I", "Low"), ("D", "Hard")]),
        Query::from_pairs(&[("L", "Weak")], &[("I", "Low"), ("D", "Hard")]),
        Query::from_pairs(&[("D", "Easy")], &[("L", "Strong")]),
        Query::from_pairs(&[("D", "Easy")], &[("L", "Weak")]),
    ];
    let expected = [
        exact::GRADE[0],
        exact::GRADE[1],
        exact::GRADE[2],
        exact::LETTER_STRONG_GIVEN_LOW_HARD,
        1.0 - exact::LETTER_STRONG_GIVEN_LOW_HARD,
        exact::EASY_GIVEN_STRONG,
        exact::EASY_GIVEN_WEAK,
    ];

    let mut config = EngineConfig::new().with_seed(args.seed);
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }

    println!("Student network, {} samples, {} workers", args.steps, config.workers);
    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let engine = InferenceEngine::new(student_network()?, algorithm, config.clone())?;
        let start = Instant::now();
        let results = engine.batch_query(&queries, args.steps)?;
        let elapsed = start.elapsed();

        println!();
        println!("========= {algorithm} ({:.2?}) =========", elapsed);
        for ((query, p), exact) in queries.iter().zip(&results).zip(expected) {
            let evidence = query
                .evidence()
                .map(|e| format!("{e:?}"))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{:?} | {:<28} {:.4}  (exact {:.4}, err {:+.4})",
                query.target,
                evidence,
                p,
                exact,
                p - exact
            );
        }
    }
    Ok(())
}
