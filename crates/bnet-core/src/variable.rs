use crate::error::TableResult;
use crate::rng::SampleRng;
use crate::sample::Assignment;
use crate::table::ProbabilityTable;
use serde::{Deserialize, Serialize};

/// Index of a variable in its network's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VarId(pub usize);

/// Loader-facing description of one variable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub name: String,
    pub features: Vec<String>,
    #[serde(default)]
    pub parents: Vec<String>,
    pub probabilities: Vec<f64>,
    #[serde(default)]
    pub shape: Option<Vec<usize>>,
}

/// A named categorical random variable backed by one probability table.
#[derive(Clone, Debug)]
pub struct Variable {
    table: ProbabilityTable,
}

impl Variable {
    pub fn new(table: ProbabilityTable) -> Self {
        Self { table }
    }

    pub fn from_spec(spec: &VariableSpec) -> TableResult<Self> {
        let table = ProbabilityTable::new(
            spec.name.clone(),
            spec.features.clone(),
            spec.parents.clone(),
            spec.probabilities.clone(),
            spec.shape.clone(),
        )?;
        Ok(Self::new(table))
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn features(&self) -> &[String] {
        self.table.features()
    }

    pub fn parents(&self) -> &[String] {
        self.table.parents()
    }

    pub fn is_conditional(&self) -> bool {
        self.table.is_conditional()
    }

    pub fn table(&self) -> &ProbabilityTable {
        &self.table
    }

    pub fn register_parent_features(&mut self, parent: &str, values: &[String]) -> TableResult<()> {
        self.table.register_parent_features(parent, values)
    }

    pub fn distribution(&self, assignment: &Assignment) -> TableResult<Vec<(String, f64)>> {
        self.table.distribution(assignment)
    }

    pub fn draw(&self, assignment: &Assignment, rng: &mut SampleRng) -> TableResult<&str> {
        self.table.draw(assignment, rng.uniform())
    }

    pub fn point_probability(&self, assignment: &Assignment, feature: &str) -> TableResult<f64> {
        self.table.point_probability(assignment, feature)
    }
}

impl From<ProbabilityTable> for Variable {
    fn from(table: ProbabilityTable) -> Self {
        Self::new(table)
    }
}
