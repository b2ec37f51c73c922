//! The Bayesian network: an arena of variables plus a DAG over their ids.
//!
//! Edges are derived from each variable's declared parents, in whatever order
//! the variables are added. The sampling plan (DFS topological order and the
//! resolved parent ids of every variable) is computed on first use and cached.
//! Once the plan exists the structure is frozen: [`BayesianNetwork::add_variable`]
//! fails with [`NetworkError::Frozen`] until [`BayesianNetwork::reset_order`]
//! is called.

use crate::error::{NetworkError, NetworkResult, TableError};
use crate::graph::Graph;
use crate::rng::SampleRng;
use crate::sample::{Assignment, ResolvedAssignment, Sample};
use crate::topo::TopoSort;
use crate::variable::{VarId, Variable, VariableSpec};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Cached evaluation order and parent wiring.
#[derive(Clone, Debug)]
struct Plan {
    order: Vec<VarId>,
    parents: Vec<Vec<VarId>>,
}

#[derive(Clone, Debug, Default)]
pub struct BayesianNetwork {
    graph: Graph<VarId>,
    variables: Vec<Variable>,
    index: HashMap<String, VarId>,
    plan: OnceLock<Plan>,
}

impl BayesianNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a network from loader records.
    ///
    /// Every referenced parent must be present in `specs`. Parent feature
    /// indices are registered from the parents' own feature lists.
    pub fn from_specs(specs: &[VariableSpec]) -> NetworkResult<Self> {
        let features: HashMap<&str, &[String]> = specs
            .iter()
            .map(|s| (s.name.as_str(), s.features.as_slice()))
            .collect();

        let mut network = Self::new();
        for spec in specs {
            let mut variable = Variable::from_spec(spec)?;
            for parent in &spec.parents {
                let values =
                    features
                        .get(parent.as_str())
                        .ok_or_else(|| NetworkError::UnknownParent {
                            child: spec.name.clone(),
                            parent: parent.clone(),
                        })?;
                variable.register_parent_features(parent, values)?;
            }
            network.add_variable(variable)?;
        }
        tracing::debug!(variables = network.len(), "network built from specs");
        Ok(network)
    }

    /// Add a variable and wire it to any parents or children already present.
    pub fn add_variable(&mut self, variable: Variable) -> NetworkResult<VarId> {
        if self.plan.get().is_some() {
            return Err(NetworkError::Frozen(variable.name().to_string()));
        }
        if self.index.contains_key(variable.name()) {
            return Err(NetworkError::DuplicateVariable(variable.name().to_string()));
        }

        let id = VarId(self.variables.len());
        self.graph.add_vertex(id);
        for parent in variable.parents() {
            if let Some(&p) = self.index.get(parent) {
                self.graph.add_edge(p, id);
            }
        }
        for (pos, other) in self.variables.iter().enumerate() {
            if other.parents().iter().any(|p| p == variable.name()) {
                self.graph.add_edge(id, VarId(pos));
            }
        }
        self.index.insert(variable.name().to_string(), id);
        self.variables.push(variable);
        Ok(id)
    }

    /// Register `values` as the feature order of `parent` on `child`.
    pub fn register_parent_features(
        &mut self,
        child: &str,
        parent: &str,
        values: &[String],
    ) -> NetworkResult<()> {
        if self.plan.get().is_some() {
            return Err(NetworkError::Frozen(child.to_string()));
        }
        let id = self.variable_id(child)?;
        self.variables[id.0].register_parent_features(parent, values)?;
        Ok(())
    }

    /// Register every parent's feature list on its children from the
    /// variables already in the network.
    pub fn register_all_parent_features(&mut self) -> NetworkResult<()> {
        if self.plan.get().is_some() {
            return Err(NetworkError::Frozen(String::from("parent features")));
        }
        for pos in 0..self.variables.len() {
            let parents = self.variables[pos].parents().to_vec();
            for parent in parents {
                let pid = self.index.get(&parent).copied().ok_or_else(|| {
                    NetworkError::UnknownParent {
                        child: self.variables[pos].name().to_string(),
                        parent: parent.clone(),
                    }
                })?;
                let values = self.variables[pid.0].features().to_vec();
                self.variables[pos].register_parent_features(&parent, &values)?;
            }
        }
        Ok(())
    }

    /// Drop the cached order so the structure can change again.
    pub fn reset_order(&mut self) {
        self.plan.take();
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn graph(&self) -> &Graph<VarId> {
        &self.graph
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// # Panics
    ///
    /// If `id` was not issued by this network. See [`get`](Self::get).
    pub fn variable(&self, id: VarId) -> &Variable {
        &self.variables[id.0]
    }

    pub fn get(&self, id: VarId) -> Option<&Variable> {
        self.variables.get(id.0)
    }

    pub fn variable_id(&self, name: &str) -> NetworkResult<VarId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))
    }

    pub fn variable_by_name(&self, name: &str) -> NetworkResult<&Variable> {
        Ok(self.variable(self.variable_id(name)?))
    }

    /// DFS topological order, computed and validated once.
    pub fn topological_order(&self) -> NetworkResult<&[VarId]> {
        Ok(&self.plan()?.order)
    }

    /// Resolved parents of `id` in table axis order.
    pub fn parent_ids(&self, id: VarId) -> NetworkResult<&[VarId]> {
        self.plan()?
            .parents
            .get(id.0)
            .map(Vec::as_slice)
            .ok_or_else(|| NetworkError::UnknownVariable(format!("#{}", id.0)))
    }

    fn plan(&self) -> NetworkResult<&Plan> {
        if let Some(plan) = self.plan.get() {
            return Ok(plan);
        }
        let plan = self.compute_plan()?;
        tracing::debug!(variables = plan.order.len(), "topological order cached");
        Ok(self.plan.get_or_init(|| plan))
    }

    fn compute_plan(&self) -> NetworkResult<Plan> {
        let mut parents = Vec::with_capacity(self.variables.len());
        for variable in &self.variables {
            let mut ids = Vec::with_capacity(variable.parents().len());
            for parent in variable.parents() {
                let pid = self.index.get(parent).copied().ok_or_else(|| {
                    NetworkError::UnknownParent {
                        child: variable.name().to_string(),
                        parent: parent.clone(),
                    }
                })?;
                let registered = variable.table().registered_features(parent).ok_or_else(|| {
                    TableError::UnregisteredParent {
                        table: variable.name().to_string(),
                        parent: parent.clone(),
                    }
                })?;
                if registered != self.variables[pid.0].features() {
                    return Err(NetworkError::ParentFeatureMismatch {
                        child: variable.name().to_string(),
                        parent: parent.clone(),
                    });
                }
                ids.push(pid);
            }
            parents.push(ids);
        }

        let order = TopoSort::new(&self.graph).dfs()?;
        let mut placed = vec![false; self.variables.len()];
        for &id in &order {
            if parents[id.0].iter().any(|p| !placed[p.0]) {
                return Err(NetworkError::Cycle(self.variables[id.0].name().to_string()));
            }
            placed[id.0] = true;
        }
        if let Some(pos) = placed.iter().position(|p| !p) {
            return Err(NetworkError::Cycle(self.variables[pos].name().to_string()));
        }
        Ok(Plan { order, parents })
    }

    fn context_row(&self, plan: &Plan, id: VarId, values: &[usize]) -> usize {
        self.variables[id.0]
            .table()
            .row_for(plan.parents[id.0].iter().map(|p| values[p.0]))
    }

    /// One ancestral sample: every variable drawn after its parents.
    pub fn forward_sample(&self, rng: &mut SampleRng) -> NetworkResult<Sample> {
        let plan = self.plan()?;
        let mut values = vec![0; self.variables.len()];
        for &id in &plan.order {
            let row = self.context_row(plan, id, &values);
            values[id.0] = self.variables[id.0].table().draw_row(row, rng.uniform());
        }
        Ok(Sample::new(values, 1.0))
    }

    /// One likelihood-weighted sample. Evidence variables are fixed instead of
    /// drawn and each contributes its mass under the sampled parents to the
    /// weight.
    pub fn likelihood_sample(
        &self,
        evidence: &ResolvedAssignment,
        rng: &mut SampleRng,
    ) -> NetworkResult<Sample> {
        let plan = self.plan()?;
        let mut values = vec![0; self.variables.len()];
        let mut weight = 1.0;
        for &id in &plan.order {
            let row = self.context_row(plan, id, &values);
            let table = self.variables[id.0].table();
            values[id.0] = match evidence.get(id) {
                Some(fixed) => {
                    weight *= table.mass(row, fixed);
                    fixed
                }
                None => table.draw_row(row, rng.uniform()),
            };
        }
        Ok(Sample::new(values, weight))
    }

    /// Resolve names and values against the network.
    pub fn resolve(&self, assignment: &Assignment) -> NetworkResult<ResolvedAssignment> {
        let mut pairs = Vec::with_capacity(assignment.len());
        for (name, value) in assignment {
            let id = self.variable_id(name)?;
            let pos = self.variables[id.0]
                .table()
                .feature_position(value)
                .map_err(|_| NetworkError::UnknownValue {
                    variable: name.clone(),
                    value: value.clone(),
                })?;
            pairs.push((id, pos));
        }
        Ok(ResolvedAssignment::new(pairs))
    }

    /// Name-keyed view of a sample.
    pub fn sample_to_assignment(&self, sample: &Sample) -> Assignment {
        self.variables
            .iter()
            .zip(sample.values())
            .map(|(v, &pos)| (v.name().to_string(), v.features()[pos].clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ProbabilityTable;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn spec(name: &str, features: &[&str], parents: &[&str], p: Vec<f64>, shape: &[usize]) -> VariableSpec {
        VariableSpec {
            name: name.into(),
            features: names(features),
            parents: names(parents),
            probabilities: p,
            shape: Some(shape.to_vec()),
        }
    }

    /// Children listed before their parents on purpose.
    fn student_specs() -> Vec<VariableSpec> {
        vec![
            spec("L", &["Weak", "Strong"], &["G"], vec![0.1, 0.9, 0.4, 0.6, 0.99, 0.01], &[3, 2]),
            spec(
                "G",
                &["A", "B", "C"],
                &["I", "D"],
                vec![0.3, 0.4, 0.3, 0.05, 0.25, 0.7, 0.9, 0.08, 0.02, 0.5, 0.3, 0.2],
                &[2, 2, 3],
            ),
            spec("S", &["Low", "High"], &["I"], vec![0.95, 0.05, 0.2, 0.8], &[2, 2]),
            spec("D", &["Easy", "Hard"], &[], vec![0.6, 0.4], &[1, 2]),
            spec("I", &["Low", "High"], &[], vec![0.7, 0.3], &[1, 2]),
        ]
    }

    #[test]
    fn test_from_specs_wires_edges() {
        let net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        assert_eq!(net.len(), 5);
        let g = net.variable_id("G").unwrap();
        let l = net.variable_id("L").unwrap();
        assert!(net.graph().has_edge(&g, &l).unwrap());
        assert_eq!(net.graph().in_degree(&g).unwrap(), 2);
        let parents: Vec<&str> = net
            .parent_ids(g)
            .unwrap()
            .iter()
            .map(|&p| net.variable(p).name())
            .collect();
        assert_eq!(parents, vec!["I", "D"]);
    }

    #[test]
    fn test_foreign_id_is_not_found() {
        let net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        let g = net.variable_id("G").unwrap();
        assert_eq!(net.get(g).map(|v| v.name()), Some("G"));
        assert!(net.get(VarId(99)).is_none());
        assert!(matches!(
            net.parent_ids(VarId(99)),
            Err(NetworkError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_order_is_topological() {
        let net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        let order = net.topological_order().unwrap();
        assert!(crate::topo::is_topological(net.graph(), order));
    }

    #[test]
    fn test_missing_parent_fails_fast() {
        let mut specs = student_specs();
        specs.retain(|s| s.name != "I");
        assert!(matches!(
            BayesianNetwork::from_specs(&specs),
            Err(NetworkError::UnknownParent { .. })
        ));
    }

    #[test]
    fn test_frozen_after_order() {
        let mut net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        net.topological_order().unwrap();
        let extra = Variable::new(
            ProbabilityTable::unconditional("X", names(&["a", "b"]), vec![0.5, 0.5]).unwrap(),
        );
        assert!(matches!(
            net.add_variable(extra.clone()),
            Err(NetworkError::Frozen(_))
        ));
        net.reset_order();
        net.add_variable(extra).unwrap();
        assert_eq!(net.topological_order().unwrap().len(), 6);
    }

    #[test]
    fn test_duplicate_variable() {
        let mut net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        let dup = Variable::new(
            ProbabilityTable::unconditional("D", names(&["a", "b"]), vec![0.5, 0.5]).unwrap(),
        );
        assert!(matches!(
            net.add_variable(dup),
            Err(NetworkError::DuplicateVariable(_))
        ));
    }

    #[test]
    fn test_unregistered_parent_blocks_order() {
        let mut net = BayesianNetwork::new();
        net.add_variable(Variable::new(
            ProbabilityTable::unconditional("I", names(&["Low", "High"]), vec![0.7, 0.3]).unwrap(),
        ))
        .unwrap();
        net.add_variable(Variable::new(
            ProbabilityTable::conditional(
                "S",
                names(&["Low", "High"]),
                names(&["I"]),
                vec![0.95, 0.05, 0.2, 0.8],
                vec![2, 2],
            )
            .unwrap(),
        ))
        .unwrap();
        assert!(matches!(
            net.topological_order(),
            Err(NetworkError::Table(TableError::UnregisteredParent { .. }))
        ));
        net.register_parent_features("S", "I", &names(&["High", "Low"]))
            .unwrap();
        assert!(matches!(
            net.topological_order(),
            Err(NetworkError::ParentFeatureMismatch { .. })
        ));
        net.register_all_parent_features().unwrap();
        assert_eq!(net.topological_order().unwrap().len(), 2);
    }

    #[test]
    fn test_cycle_detected() {
        let specs = vec![
            spec("A", &["0", "1"], &["B"], vec![0.5, 0.5, 0.5, 0.5], &[2, 2]),
            spec("B", &["0", "1"], &["A"], vec![0.5, 0.5, 0.5, 0.5], &[2, 2]),
        ];
        let net = BayesianNetwork::from_specs(&specs).unwrap();
        assert!(matches!(net.topological_order(), Err(NetworkError::Cycle(_))));
    }

    #[test]
    fn test_forward_sample_is_complete() {
        let net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        let mut rng = SampleRng::new(11);
        for _ in 0..100 {
            let s = net.forward_sample(&mut rng).unwrap();
            assert_eq!(s.len(), 5);
            assert_eq!(s.weight(), 1.0);
            let a = net.sample_to_assignment(&s);
            assert_eq!(a.len(), 5);
            for v in net.variables() {
                assert!(v.features().contains(&a[v.name()]));
            }
        }
    }

    #[test]
    fn test_likelihood_sample_fixes_evidence() {
        let net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        let ev: Assignment = [("G".to_string(), "C".to_string())].into_iter().collect();
        let ev = net.resolve(&ev).unwrap();
        let g = net.variable_id("G").unwrap();
        let mut rng = SampleRng::new(5);
        for _ in 0..100 {
            let s = net.likelihood_sample(&ev, &mut rng).unwrap();
            assert_eq!(s.value(g), 2);
            let a = net.sample_to_assignment(&s);
            let expected = net
                .variable(g)
                .point_probability(&a, "C")
                .unwrap();
            assert!((s.weight() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_resolve_errors() {
        let net = BayesianNetwork::from_specs(&student_specs()).unwrap();
        let bad: Assignment = [("Q".to_string(), "x".to_string())].into_iter().collect();
        assert!(matches!(net.resolve(&bad), Err(NetworkError::UnknownVariable(_))));
        let bad: Assignment = [("D".to_string(), "Medium".to_string())].into_iter().collect();
        assert!(matches!(net.resolve(&bad), Err(NetworkError::UnknownValue { .. })));
    }
}
