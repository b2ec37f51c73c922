use crate::var;
use bnet_core::{BayesianNetwork, NetworkError, VariableSpec};

/// Student network: Difficulty and Intelligence drive Grade, Intelligence
/// drives SAT, Grade drives the recommendation Letter.
///
/// Grade's table has axes `(I, D, G)`.
pub fn student_specs() -> Vec<VariableSpec> {
    vec![
        var("D", &["Easy", "Hard"], &[], vec![0.6, 0.4], &[1, 2]),
        var("I", &["Low", "High"], &[], vec![0.7, 0.3], &[1, 2]),
        var(
            "G",
            &["A", "B", "C"],
            &["I", "D"],
            vec![0.3, 0.4, 0.3, 0.05, 0.25, 0.7, 0.9, 0.08, 0.02, 0.5, 0.3, 0.2],
            &[2, 2, 3],
        ),
        var("S", &["Low", "High"], &["I"], vec![0.95, 0.05, 0.2, 0.8], &[2, 2]),
        var(
            "L",
            &["Weak", "Strong"],
            &["G"],
            vec![0.1, 0.9, 0.4, 0.6, 0.99, 0.01],
            &[3, 2],
        ),
    ]
}

pub fn student_network() -> Result<BayesianNetwork, NetworkError> {
    BayesianNetwork::from_specs(&student_specs())
}

/// Exact marginals of the student network, for checking estimators.
pub mod exact {
    /// P(G = A), P(G = B), P(G = C)
    pub const GRADE: [f64; 3] = [0.362, 0.2884, 0.3496];
    /// P(L = Strong)
    pub const LETTER_STRONG: f64 = 0.502336;
    /// P(L = Strong | I = Low, D = Hard)
    pub const LETTER_STRONG_GIVEN_LOW_HARD: f64 = 0.202;
    /// P(D = Easy | L = Strong)
    pub const EASY_GIVEN_STRONG: f64 = 0.736431;
    /// P(D = Easy | L = Weak)
    pub const EASY_GIVEN_WEAK: f64 = 0.462288;
}
