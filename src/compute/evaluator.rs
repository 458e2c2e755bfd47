//! Direct numerical evaluation of expression trees on a `Mesh`.
//!
//! Fields are represented at cell centres; `Gradient` produces values on the
//! `n + 1` cell faces, using the system's boundary conditions for the two
//! outer faces, and `Divergence` maps face values back to cell centres.

use super::ledger::Value;
use super::mesh::Mesh;
use crate::error::{ModelError, Result};
use crate::model::{BoundaryCondition, BoundaryConditionMap, BoundaryKind};
use crate::parameters::ParameterValues;
use crate::symbol::{BinaryOp, NodeKind, Symbol, UnaryOp, VariableId};
use std::collections::HashMap;

/// Values bound to the leaves that are not fixed by the model itself.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputs {
    pub states: HashMap<VariableId, Value>,
    pub external: HashMap<String, Value>,
}

pub struct Evaluator<'a> {
    mesh: &'a Mesh,
    parameters: &'a ParameterValues,
    boundary_conditions: Option<&'a BoundaryConditionMap>,
}

impl<'a> Evaluator<'a> {
    pub fn new(mesh: &'a Mesh, parameters: &'a ParameterValues) -> Self {
        Self { mesh, parameters, boundary_conditions: None }
    }

    pub fn with_boundary_conditions(mut self, boundary_conditions: &'a BoundaryConditionMap) -> Self {
        self.boundary_conditions = Some(boundary_conditions);
        self
    }

    pub fn mesh(&self) -> &Mesh {
        self.mesh
    }

    pub fn evaluate(&self, symbol: &Symbol, inputs: &EvaluationInputs) -> Result<Value> {
        match symbol.kind() {
            NodeKind::Scalar(v) => Ok(Value::Scalar(*v)),
            NodeKind::Parameter { name } => self
                .parameters
                .value(name)
                .map(Value::Scalar)
                .ok_or_else(|| ModelError::UnresolvedParameter { name: name.clone() }),
            NodeKind::StateVariable { id, name } => {
                let value = inputs
                    .states
                    .get(id)
                    .ok_or_else(|| ModelError::Evaluation(format!("no value for state variable '{}'", name)))?;
                self.check_len(symbol, value)
            }
            NodeKind::ExternalVariable { name } => {
                let value = inputs
                    .external
                    .get(name)
                    .ok_or_else(|| ModelError::MissingExternalVariable { name: name.clone() })?;
                self.check_len(symbol, value)
            }
            NodeKind::SpatialVariable { .. } => Ok(Value::series(self.mesh.nodes(symbol.domain()))),
            NodeKind::Unary(op, child) => {
                let value = self.evaluate(child, inputs)?;
                match op {
                    UnaryOp::Negate => Ok(value.map(|x| -x)),
                    UnaryOp::Exp => Ok(value.map(f64::exp)),
                    UnaryOp::Log => Ok(value.map(f64::ln)),
                    UnaryOp::Sinh => Ok(value.map(f64::sinh)),
                    UnaryOp::Gradient => self.gradient(child, value, inputs),
                    UnaryOp::Divergence => self.divergence(child, value),
                }
            }
            NodeKind::Binary(op, left, right) => {
                let l = self.evaluate(left, inputs)?;
                let r = self.evaluate(right, inputs)?;
                match op {
                    BinaryOp::Add => l.zip_with(&r, |a, b| Ok(a + b)),
                    BinaryOp::Subtract => l.zip_with(&r, |a, b| Ok(a - b)),
                    BinaryOp::Multiply => l.zip_with(&r, |a, b| Ok(a * b)),
                    BinaryOp::Divide => l.zip_with(&r, |a, b| {
                        if b == 0.0 {
                            Err(ModelError::Evaluation(format!("division by zero in '{}'", symbol)))
                        } else {
                            Ok(a / b)
                        }
                    }),
                }
            }
            NodeKind::Outer(left, right) => {
                let l = self.evaluate(left, inputs)?;
                let scale = l.as_scalar().ok_or_else(|| {
                    ModelError::Evaluation(format!("left operand of '{}' is not a scalar", symbol))
                })?;
                let r = self.evaluate(right, inputs)?;
                let n = self.mesh.npts(right.domain());
                Ok(Value::series(r.into_vec(n)?.into_iter().map(|x| scale * x).collect()))
            }
            NodeKind::Broadcast(child) => {
                let value = self.evaluate(child, inputs)?;
                let v = value.as_scalar().ok_or_else(|| {
                    ModelError::Evaluation(format!("cannot broadcast a series in '{}'", symbol))
                })?;
                Ok(Value::series(vec![v; self.mesh.npts(symbol.domain())]))
            }
            NodeKind::Concatenation(children) => {
                let mut out = Vec::with_capacity(self.mesh.npts(symbol.domain()));
                for child in children {
                    let n = self.mesh.npts(child.domain());
                    out.extend(self.evaluate(child, inputs)?.into_vec(n)?);
                }
                Ok(Value::series(out))
            }
            NodeKind::Average(child) => {
                let value = self.evaluate(child, inputs)?;
                if let Value::Scalar(_) = value {
                    return Ok(value);
                }
                let widths = self.mesh.widths(child.domain());
                let values = value.into_vec(widths.len())?;
                let total: f64 = widths.iter().sum();
                let weighted: f64 = values.iter().zip(&widths).map(|(v, w)| v * w).sum();
                Ok(Value::Scalar(weighted / total))
            }
        }
    }

    fn check_len(&self, symbol: &Symbol, value: &Value) -> Result<Value> {
        if let Value::Series(v) = value {
            let expected = self.mesh.npts(symbol.domain());
            if v.len() != expected {
                return Err(ModelError::Evaluation(format!(
                    "'{}' expects {} values, found {}",
                    symbol,
                    expected,
                    v.len()
                )));
            }
        }
        Ok(value.clone())
    }

    fn boundary_value(&self, condition: &BoundaryCondition, inputs: &EvaluationInputs) -> Result<f64> {
        Ok(self.evaluate(&condition.value, inputs)?.into_vec(1)?[0])
    }

    /// Face gradients of a cell-centred field.
    fn gradient(&self, child: &Symbol, value: Value, inputs: &EvaluationInputs) -> Result<Value> {
        let conditions = self
            .boundary_conditions
            .and_then(|bcs| bcs.get(child))
            .ok_or_else(|| ModelError::Evaluation(format!("no boundary conditions for '{}'", child)))?;
        let domain = child.domain();
        let (a, b) = self
            .mesh
            .bounds(domain)
            .ok_or_else(|| ModelError::Evaluation(format!("cannot take the gradient of domain-less '{}'", child)))?;
        let x = self.mesh.nodes(domain);
        let u = value.into_vec(x.len())?;
        let n = u.len();

        let mut faces = Vec::with_capacity(n + 1);
        let left = self.boundary_value(&conditions.left, inputs)?;
        faces.push(match conditions.left.kind {
            BoundaryKind::Neumann => left,
            BoundaryKind::Dirichlet => (u[0] - left) / (x[0] - a),
        });
        for i in 1..n {
            faces.push((u[i] - u[i - 1]) / (x[i] - x[i - 1]));
        }
        let right = self.boundary_value(&conditions.right, inputs)?;
        faces.push(match conditions.right.kind {
            BoundaryKind::Neumann => right,
            BoundaryKind::Dirichlet => (right - u[n - 1]) / (b - x[n - 1]),
        });
        Ok(Value::series(faces))
    }

    fn divergence(&self, child: &Symbol, value: Value) -> Result<Value> {
        let widths = self.mesh.widths(child.domain());
        match value {
            // A uniform flux has no divergence.
            Value::Scalar(_) => Ok(Value::series(vec![0.0; widths.len()])),
            Value::Series(faces) => {
                if faces.len() != widths.len() + 1 {
                    return Err(ModelError::Evaluation(format!(
                        "divergence of '{}' expects {} face values, found {}",
                        child,
                        widths.len() + 1,
                        faces.len()
                    )));
                }
                Ok(Value::series(
                    faces.windows(2).zip(&widths).map(|(f, w)| (f[1] - f[0]) / w).collect(),
                ))
            }
        }
    }
}
