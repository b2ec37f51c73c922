//! Conditional probability tables.
//!
//! A table with parents `P1..Pk` and features `f1..fn` is declared with shape
//! `(|P1|, .., |Pk|, n)` and a row-major flat list of masses. It is stored as a
//! matrix with one row per parent context and one column per feature. Root
//! variables use shape `(1, n)` and a single row.
//!
//! The cumulative table used for inverse-CDF draws is derived once at
//! construction. Point probabilities always read the mass matrix.

use crate::error::{TableError, TableResult};
use crate::sample::Assignment;
use nalgebra::DMatrix;
use std::collections::HashMap;

/// Allowed deviation of a context row from a total mass of one.
pub const TOLERANCE: f64 = 1e-4;

/// Feature index for one parent axis.
#[derive(Clone, Debug)]
struct ParentAxis {
    values: Vec<String>,
    index: HashMap<String, usize>,
}

#[derive(Clone, Debug)]
pub struct ProbabilityTable {
    name: String,
    features: Vec<String>,
    feature_index: HashMap<String, usize>,
    parents: Vec<String>,
    shape: Vec<usize>,
    strides: Vec<usize>,
    mass: DMatrix<f64>,
    cumulative: DMatrix<f64>,
    parent_axes: HashMap<String, ParentAxis>,
}

impl ProbabilityTable {
    /// Root table of shape `(1, |features|)`.
    pub fn unconditional(
        name: impl Into<String>,
        features: Vec<String>,
        probabilities: Vec<f64>,
    ) -> TableResult<Self> {
        let shape = vec![1, features.len()];
        Self::build(name.into(), features, Vec::new(), probabilities, shape)
    }

    /// Table conditioned on `parents`, one leading axis per parent.
    ///
    /// Every parent must have its feature list registered with
    /// [`register_parent_features`](Self::register_parent_features) before
    /// the table can be queried.
    pub fn conditional(
        name: impl Into<String>,
        features: Vec<String>,
        parents: Vec<String>,
        probabilities: Vec<f64>,
        shape: Vec<usize>,
    ) -> TableResult<Self> {
        let name = name.into();
        if parents.is_empty() {
            return Err(TableError::AxisMismatch {
                table: name,
                reason: "conditional table declared without parents".into(),
            });
        }
        Self::build(name, features, parents, probabilities, shape)
    }

    /// Pick the unconditional or conditional constructor from the parent list.
    /// A root shape may be given as `(n)` or `(1, n)`.
    pub fn new(
        name: impl Into<String>,
        features: Vec<String>,
        parents: Vec<String>,
        probabilities: Vec<f64>,
        shape: Option<Vec<usize>>,
    ) -> TableResult<Self> {
        let name = name.into();
        if parents.is_empty() {
            if let Some(shape) = shape {
                let root = matches!(shape.as_slice(), [n] | [1, n] if *n == features.len());
                if !root {
                    return Err(TableError::AxisMismatch {
                        table: name,
                        reason: format!("root table shape {shape:?} must be (1, {})", features.len()),
                    });
                }
            }
            return Self::unconditional(name, features, probabilities);
        }
        let shape = match shape {
            Some(shape) => shape,
            None => {
                return Err(TableError::AxisMismatch {
                    table: name,
                    reason: "conditional table needs an explicit shape".into(),
                })
            }
        };
        Self::conditional(name, features, parents, probabilities, shape)
    }

    fn build(
        name: String,
        features: Vec<String>,
        parents: Vec<String>,
        probabilities: Vec<f64>,
        shape: Vec<usize>,
    ) -> TableResult<Self> {
        let axis_err = |reason: String| TableError::AxisMismatch {
            table: name.clone(),
            reason,
        };

        if features.is_empty() {
            return Err(axis_err("no features declared".into()));
        }
        let mut feature_index = HashMap::with_capacity(features.len());
        for (i, f) in features.iter().enumerate() {
            if feature_index.insert(f.clone(), i).is_some() {
                return Err(axis_err(format!("duplicate feature {f}")));
            }
        }
        for (i, p) in parents.iter().enumerate() {
            if parents[..i].contains(p) {
                return Err(axis_err(format!("duplicate parent {p}")));
            }
        }

        let expected_axes = if parents.is_empty() { 2 } else { parents.len() + 1 };
        if shape.len() != expected_axes {
            return Err(axis_err(format!(
                "shape {shape:?} has {} axes, expected {expected_axes}",
                shape.len()
            )));
        }
        if shape.last() != Some(&features.len()) {
            return Err(axis_err(format!(
                "last axis of {shape:?} must equal the {} features",
                features.len()
            )));
        }
        if shape.iter().any(|&d| d == 0) {
            return Err(axis_err(format!("shape {shape:?} has an empty axis")));
        }

        let expected: usize = shape.iter().product();
        if probabilities.len() != expected {
            return Err(TableError::ShapeMismatch {
                table: name,
                len: probabilities.len(),
                shape,
                expected,
            });
        }
        if let Some((index, &value)) = probabilities
            .iter()
            .enumerate()
            .find(|(_, p)| !p.is_finite() || **p < 0.0)
        {
            return Err(TableError::NegativeMass {
                table: name,
                index,
                value,
            });
        }

        let cols = features.len();
        let rows = expected / cols;
        let mass = DMatrix::from_row_slice(rows, cols, &probabilities);
        let mut cumulative = DMatrix::zeros(rows, cols);
        for r in 0..rows {
            let sum: f64 = mass.row(r).sum();
            if (sum - 1.0).abs() > TOLERANCE {
                return Err(TableError::NotNormalized {
                    table: name,
                    row: r,
                    sum,
                });
            }
            let mut running = 0.0;
            for c in 0..cols {
                running += mass[(r, c)];
                cumulative[(r, c)] = running / sum;
            }
            cumulative[(r, cols - 1)] = 1.0;
        }

        let parent_dims = &shape[..shape.len() - 1];
        let mut strides = vec![1; parents.len()];
        for axis in (0..parents.len().saturating_sub(1)).rev() {
            strides[axis] = strides[axis + 1] * parent_dims[axis + 1];
        }

        Ok(Self {
            name,
            features,
            feature_index,
            parents,
            shape,
            strides,
            mass,
            cumulative,
            parent_axes: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn is_conditional(&self) -> bool {
        !self.parents.is_empty()
    }

    /// Number of parent contexts (rows).
    pub fn contexts(&self) -> usize {
        self.mass.nrows()
    }

    pub fn feature_position(&self, feature: &str) -> TableResult<usize> {
        self.feature_index
            .get(feature)
            .copied()
            .ok_or_else(|| TableError::UnknownFeature {
                variable: self.name.clone(),
                value: feature.to_string(),
            })
    }

    /// Register the ordered feature values of `parent`. Calling again for the
    /// same parent replaces the previous registration.
    pub fn register_parent_features(&mut self, parent: &str, values: &[String]) -> TableResult<()> {
        let Some(axis) = self.parents.iter().position(|p| p == parent) else {
            return Err(TableError::UnknownParent {
                table: self.name.clone(),
                parent: parent.to_string(),
            });
        };
        if values.len() != self.shape[axis] {
            return Err(TableError::ParentCardinality {
                table: self.name.clone(),
                parent: parent.to_string(),
                registered: values.len(),
                axis: self.shape[axis],
            });
        }
        let index = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i))
            .collect();
        self.parent_axes.insert(
            parent.to_string(),
            ParentAxis {
                values: values.to_vec(),
                index,
            },
        );
        Ok(())
    }

    pub fn registered_features(&self, parent: &str) -> Option<&[String]> {
        self.parent_axes.get(parent).map(|a| a.values.as_slice())
    }

    /// First declared parent without a registered feature index, if any.
    pub fn first_unregistered(&self) -> Option<&str> {
        self.parents
            .iter()
            .find(|p| !self.parent_axes.contains_key(*p))
            .map(String::as_str)
    }

    /// Row of the parent context named by `assignment`. Names that are not
    /// parents of this table are ignored.
    pub fn context_row(&self, assignment: &Assignment) -> TableResult<usize> {
        let mut row = 0;
        for (axis, parent) in self.parents.iter().enumerate() {
            let registered =
                self.parent_axes
                    .get(parent)
                    .ok_or_else(|| TableError::UnregisteredParent {
                        table: self.name.clone(),
                        parent: parent.clone(),
                    })?;
            let value = assignment
                .get(parent)
                .ok_or_else(|| TableError::MissingParentValue {
                    table: self.name.clone(),
                    parent: parent.clone(),
                })?;
            let idx = registered
                .index
                .get(value)
                .ok_or_else(|| TableError::UnknownFeature {
                    variable: parent.clone(),
                    value: value.clone(),
                })?;
            row += idx * self.strides[axis];
        }
        Ok(row)
    }

    /// Row for parent feature positions given in axis order.
    pub fn row_for(&self, parent_values: impl IntoIterator<Item = usize>) -> usize {
        parent_values
            .into_iter()
            .zip(&self.strides)
            .map(|(v, s)| v * s)
            .sum()
    }

    /// Full `feature -> probability` mapping for a parent context.
    pub fn distribution(&self, assignment: &Assignment) -> TableResult<Vec<(String, f64)>> {
        let row = self.context_row(assignment)?;
        Ok(self
            .features
            .iter()
            .enumerate()
            .map(|(c, f)| (f.clone(), self.mass[(row, c)]))
            .collect())
    }

    /// Inverse-CDF draw for a parent context given a uniform value in `[0, 1)`.
    pub fn draw(&self, assignment: &Assignment, uniform: f64) -> TableResult<&str> {
        let row = self.context_row(assignment)?;
        Ok(&self.features[self.draw_row(row, uniform)])
    }

    /// Feature position drawn from `row`: the first feature whose cumulative
    /// mass is strictly above `uniform`. This picks the same feature as a
    /// running sum reaching `uniform` except when `uniform` sits exactly on a
    /// boundary, where it moves to the next feature, so a zero-mass feature
    /// is never drawn. A value that falls past the last cumulative entry
    /// through rounding is clamped to the last feature.
    pub fn draw_row(&self, row: usize, uniform: f64) -> usize {
        let cols = self.features.len();
        (0..cols)
            .find(|&c| uniform < self.cumulative[(row, c)])
            .unwrap_or(cols - 1)
    }

    /// Stored mass of `feature` under the parent context.
    pub fn point_probability(&self, assignment: &Assignment, feature: &str) -> TableResult<f64> {
        let row = self.context_row(assignment)?;
        let col = self.feature_position(feature)?;
        Ok(self.mass[(row, col)])
    }

    pub fn mass(&self, row: usize, feature: usize) -> f64 {
        self.mass[(row, feature)]
    }
}
