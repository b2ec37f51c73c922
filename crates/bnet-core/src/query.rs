use crate::error::QueryError;
use crate::network::BayesianNetwork;
use crate::sample::{Assignment, ResolvedAssignment};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signature used for queries without evidence.
pub const NO_EVIDENCE: &str = "<none>";

/// `P(target | evidence)` over named variables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub target: Assignment,
    #[serde(default)]
    pub evidence: Option<Assignment>,
}

/// Canonical key of a query's evidence. Queries with equal signatures can
/// share one evidence-conditioned sample set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EvidenceSignature(String);

impl EvidenceSignature {
    pub fn of(evidence: Option<&Assignment>) -> Self {
        match evidence {
            Some(e) if !e.is_empty() => Self(
                e.iter()
                    .map(|(k, v)| format!("{k}:{v}"))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            _ => Self(NO_EVIDENCE.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == NO_EVIDENCE
    }
}

impl fmt::Display for EvidenceSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Query {
    pub fn new(target: Assignment, evidence: Option<Assignment>) -> Self {
        Self { target, evidence }
    }

    /// Unconditioned query.
    pub fn marginal(target: Assignment) -> Self {
        Self::new(target, None)
    }

    /// Build from `(name, value)` pairs; an empty evidence slice means none.
    pub fn from_pairs(target: &[(&str, &str)], evidence: &[(&str, &str)]) -> Self {
        let collect = |pairs: &[(&str, &str)]| -> Assignment {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        let evidence = (!evidence.is_empty()).then(|| collect(evidence));
        Self::new(collect(target), evidence)
    }

    /// Evidence with an empty map folded into `None`.
    pub fn evidence(&self) -> Option<&Assignment> {
        self.evidence.as_ref().filter(|e| !e.is_empty())
    }

    pub fn signature(&self) -> EvidenceSignature {
        EvidenceSignature::of(self.evidence())
    }

    /// Target must be non-empty and share no name with the evidence.
    pub fn validate(&self) -> Result<(), QueryError> {
        if self.target.is_empty() {
            return Err(QueryError::EmptyTarget);
        }
        if let Some(evidence) = self.evidence() {
            if let Some(name) = self.target.keys().find(|k| evidence.contains_key(*k)) {
                return Err(QueryError::Overlap(name.clone()));
            }
        }
        Ok(())
    }

    pub fn resolve(&self, network: &BayesianNetwork) -> Result<ResolvedQuery, QueryError> {
        self.validate()?;
        let target = network.resolve(&self.target)?;
        let evidence = match self.evidence() {
            Some(e) => network.resolve(e)?,
            None => ResolvedAssignment::default(),
        };
        Ok(ResolvedQuery { target, evidence })
    }
}

/// A validated query in network ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub target: ResolvedAssignment,
    pub evidence: ResolvedAssignment,
}
