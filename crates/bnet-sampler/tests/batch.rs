//! Batch contract: ordering, degenerate evidence, error surfacing and seeding.

use bnet_core::{BayesianNetwork, NetworkError, Query, QueryError, VariableSpec};
use bnet_models::{sprinkler_network, student_network};
use bnet_sampler::{Algorithm, EngineConfig, InferenceEngine, InferenceError};

fn engine(algorithm: Algorithm, workers: usize, seed: u64) -> InferenceEngine {
    let config = EngineConfig::new().with_workers(workers).with_seed(seed);
    InferenceEngine::new(student_network().unwrap(), algorithm, config).unwrap()
}

#[test]
fn test_results_follow_input_order() {
    // Two evidence groups interleaved: q1|e1, q2|e2, q3|e1.
    let queries = vec![
        Query::from_pairs(&[("G", "A")], &[("D", "Easy")]),
        Query::from_pairs(&[("S", "High")], &[("I", "High")]),
        Query::from_pairs(&[("G", "C")], &[("D", "Easy")]),
    ];
    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let out = engine(algorithm, 3, 42).batch_query(&queries, 50_000).unwrap();
        assert_eq!(out.len(), 3);
        // P(G=A | D=Easy) = 0.7*0.3 + 0.3*0.9 = 0.48
        assert!((out[0] - 0.48).abs() < 2e-2, "{algorithm}: {out:?}");
        // P(S=High | I=High) = 0.8
        assert!((out[1] - 0.8).abs() < 2e-2, "{algorithm}: {out:?}");
        // P(G=C | D=Easy) = 0.7*0.3 + 0.3*0.02 = 0.216
        assert!((out[2] - 0.216).abs() < 2e-2, "{algorithm}: {out:?}");
    }
}

#[test]
fn test_impossible_evidence_estimates_zero() {
    // Dry sprinkler and no rain never leave the grass wet.
    let queries = vec![
        Query::from_pairs(&[("Cloudy", "T")], &[("Sprinkler", "F"), ("Rain", "F"), ("WetGrass", "T")]),
        Query::from_pairs(&[("Cloudy", "T")], &[]),
    ];
    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let config = EngineConfig::new().with_workers(2);
        let engine = InferenceEngine::new(sprinkler_network().unwrap(), algorithm, config).unwrap();
        let out = engine.batch_query(&queries, 5_000).unwrap();
        assert_eq!(out[0], 0.0);
        assert!(out[1] > 0.0);
        assert!(out.iter().all(|p| p.is_finite()));
    }
}

#[test]
fn test_empty_batch() {
    let out = engine(Algorithm::Forward, 2, 1).batch_query(&[], 1_000).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_zero_steps_yields_zeros() {
    let queries = vec![Query::from_pairs(&[("G", "A")], &[])];
    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let out = engine(algorithm, 2, 1).batch_query(&queries, 0).unwrap();
        assert_eq!(out, vec![0.0]);
    }
}

#[test]
fn test_bad_query_fails_whole_batch() {
    let queries = vec![
        Query::from_pairs(&[("G", "A")], &[]),
        Query::from_pairs(&[("G", "E")], &[]),
    ];
    let err = engine(Algorithm::Likelihood, 2, 1)
        .batch_query(&queries, 1_000)
        .unwrap_err();
    assert!(matches!(
        err,
        InferenceError::Query(QueryError::Network(NetworkError::UnknownValue { .. }))
    ));

    let overlap = vec![Query::from_pairs(&[("D", "Easy")], &[("D", "Hard")])];
    let err = engine(Algorithm::Forward, 2, 1)
        .batch_query(&overlap, 1_000)
        .unwrap_err();
    assert!(matches!(err, InferenceError::Query(QueryError::Overlap(_))));
}

#[test]
fn test_same_seed_same_answers() {
    let queries = vec![
        Query::from_pairs(&[("L", "Strong")], &[]),
        Query::from_pairs(&[("I", "High")], &[("S", "High")]),
    ];
    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let a = engine(algorithm, 3, 11).batch_query(&queries, 20_000).unwrap();
        let b = engine(algorithm, 3, 11).batch_query(&queries, 20_000).unwrap();
        assert_eq!(a, b);
        let c = engine(algorithm, 3, 12).batch_query(&queries, 20_000).unwrap();
        assert_ne!(a, c);
    }
}

#[test]
fn test_engine_reports_configuration() {
    let e = engine(Algorithm::Likelihood, 2, 5);
    assert_eq!(e.algorithm(), Algorithm::Likelihood);
    assert_eq!(e.config().workers, 2);
    assert_eq!(e.network().len(), 5);
}

fn spec(
    name: &str,
    features: &[&str],
    parents: &[&str],
    probabilities: Vec<f64>,
    shape: &[usize],
) -> VariableSpec {
    VariableSpec {
        name: name.to_string(),
        features: features.iter().map(|s| s.to_string()).collect(),
        parents: parents.iter().map(|s| s.to_string()).collect(),
        probabilities,
        shape: Some(shape.to_vec()),
    }
}

/// `A` and `A:x` are distinct variables whose evidence renders to the same
/// signature text. `C` copies `A`.
fn colliding_network() -> BayesianNetwork {
    BayesianNetwork::from_specs(&[
        spec("A", &["y", "x:y"], &[], vec![0.5, 0.5], &[1, 2]),
        spec("A:x", &["y", "z"], &[], vec![0.5, 0.5], &[1, 2]),
        spec("C", &["c0", "c1"], &["A"], vec![1.0, 0.0, 0.0, 1.0], &[2, 2]),
    ])
    .unwrap()
}

#[test]
fn test_colliding_signatures_keep_their_own_evidence() {
    let queries = vec![
        Query::from_pairs(&[("C", "c0")], &[("A", "x:y")]),
        Query::from_pairs(&[("C", "c0")], &[("A:x", "y")]),
    ];
    assert_eq!(queries[0].signature(), queries[1].signature());

    for algorithm in [Algorithm::Forward, Algorithm::Likelihood] {
        let config = EngineConfig::new().with_workers(2).with_seed(3);
        let engine = InferenceEngine::new(colliding_network(), algorithm, config).unwrap();
        let out = engine.batch_query(&queries, 20_000).unwrap();
        assert_eq!(out[0], 0.0, "{algorithm}: {out:?}");
        assert!((out[1] - 0.5).abs() < 2e-2, "{algorithm}: {out:?}");
    }
}
