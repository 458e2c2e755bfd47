//! Turns an assembled model into flat vectors a time integrator can drive.

use super::evaluator::{EvaluationInputs, Evaluator};
use super::ledger::{Ledger, Value};
use super::mesh::{Mesh, MeshPoints};
use crate::error::{ModelError, Result};
use crate::model::{AssembledModel, EquationMap, EquationSystem};
use crate::parameters::ParameterValues;
use crate::symbol::{NodeKind, Symbol};
use crate::variables::VariableMap;
use std::collections::HashMap;

/// Consumer of an assembled model.
pub trait Discretisation {
    type Output;

    fn process_model(&self, model: &AssembledModel) -> Result<Self::Output>;
}

/// Where one state variable lives in the state vector.
#[derive(Debug, Clone, PartialEq)]
pub struct StateSlot {
    pub variable: Symbol,
    pub offset: usize,
    pub len: usize,
    pub differential: bool,
}

impl StateSlot {
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.len
    }
}

/// Finite-volume discretisation on a uniform mesh with fixed parameter values.
#[derive(Debug, Clone)]
pub struct MeshDiscretisation {
    mesh: Mesh,
    parameters: ParameterValues,
}

impl MeshDiscretisation {
    pub fn new(parameters: ParameterValues, points: &MeshPoints) -> Result<Self> {
        let mesh = Mesh::new(&parameters, points)?;
        Ok(Self { mesh, parameters })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }
}

/// State variables covered by an equation key.
fn covered(key: &Symbol) -> Vec<&Symbol> {
    match key.kind() {
        NodeKind::Concatenation(children) => children.iter().collect(),
        _ => vec![key],
    }
}

impl Discretisation for MeshDiscretisation {
    type Output = DiscretisedModel;

    fn process_model(&self, model: &AssembledModel) -> Result<DiscretisedModel> {
        let system = self.parameters.process_system(&model.system)?;

        // Differential states first, then algebraic, each in equation order.
        let mut slots = Vec::new();
        let mut offset = 0;
        for (equations, differential) in [(system.rhs(), true), (system.algebraic(), false)] {
            for key in equations.keys() {
                for variable in covered(key) {
                    let len = self.mesh.npts(variable.domain());
                    slots.push(StateSlot { variable: variable.clone(), offset, len, differential });
                    offset += len;
                }
            }
        }

        let evaluator =
            Evaluator::new(&self.mesh, &self.parameters).with_boundary_conditions(system.boundary_conditions());
        let mut y0 = vec![0.0; offset];
        for (key, value) in system.initial_conditions() {
            let variables = covered(key);
            let total = variables.iter().map(|v| self.mesh.npts(v.domain())).sum();
            let values = evaluator.evaluate(value, &EvaluationInputs::default())?.into_vec(total)?;
            let mut cursor = 0;
            for variable in variables {
                let slot = slots.iter().find(|s| &s.variable == variable).ok_or_else(|| {
                    ModelError::Evaluation(format!("'{}' has an initial condition but no equation", variable))
                })?;
                y0[slot.range()].copy_from_slice(&values[cursor..cursor + slot.len]);
                cursor += slot.len;
            }
        }

        log::info!(
            "[{}] discretised: {} states ({} differential)",
            model.name,
            offset,
            slots.iter().filter(|s| s.differential).map(|s| s.len).sum::<usize>()
        );

        Ok(DiscretisedModel {
            name: model.name.clone(),
            mesh: self.mesh.clone(),
            parameters: self.parameters.clone(),
            system,
            variables: model.variables.as_map().clone(),
            slots,
            y0,
        })
    }
}

/// A model laid out over a state vector `y`. External variables are supplied
/// per call, by name.
#[derive(Debug, Clone)]
pub struct DiscretisedModel {
    name: String,
    mesh: Mesh,
    parameters: ParameterValues,
    system: EquationSystem,
    variables: VariableMap,
    slots: Vec<StateSlot>,
    y0: Vec<f64>,
}

impl DiscretisedModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// The system after parameter processing.
    pub fn system(&self) -> &EquationSystem {
        &self.system
    }

    pub fn len(&self) -> usize {
        self.y0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y0.is_empty()
    }

    pub fn slots(&self) -> &[StateSlot] {
        &self.slots
    }

    pub fn slot(&self, name: &str) -> Option<&StateSlot> {
        self.slots.iter().find(|s| s.variable.name() == Some(name))
    }

    pub fn initial_state(&self) -> &[f64] {
        &self.y0
    }

    /// 1 for differential entries, 0 for algebraic ones.
    pub fn mass_matrix_diagonal(&self) -> Vec<f64> {
        self.slots
            .iter()
            .flat_map(|s| std::iter::repeat(if s.differential { 1.0 } else { 0.0 }).take(s.len))
            .collect()
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.mesh, &self.parameters).with_boundary_conditions(self.system.boundary_conditions())
    }

    /// Binds `y` and the external values to evaluation inputs.
    pub fn inputs(&self, y: &[f64], external: &HashMap<String, Value>) -> Result<EvaluationInputs> {
        if y.len() != self.len() {
            return Err(ModelError::Evaluation(format!(
                "state vector has {} entries, expected {}",
                y.len(),
                self.len()
            )));
        }
        let mut inputs = EvaluationInputs { external: external.clone(), ..Default::default() };
        for slot in &self.slots {
            let Some(id) = slot.variable.variable_id() else { continue };
            let value = if slot.variable.domain().is_empty() {
                Value::Scalar(y[slot.offset])
            } else {
                Value::series(y[slot.range()].to_vec())
            };
            inputs.states.insert(id, value);
        }
        Ok(inputs)
    }

    fn evaluate_equations(&self, equations: &EquationMap, inputs: &EvaluationInputs) -> Result<Vec<f64>> {
        let evaluator = self.evaluator();
        let mut out = Vec::new();
        for (key, value) in equations {
            let n = covered(key).iter().map(|v| self.mesh.npts(v.domain())).sum();
            out.extend(evaluator.evaluate(value, inputs)?.into_vec(n)?);
        }
        Ok(out)
    }

    /// Time derivatives of the differential part of `y`.
    pub fn rhs(&self, y: &[f64], external: &HashMap<String, Value>) -> Result<Vec<f64>> {
        let inputs = self.inputs(y, external)?;
        self.evaluate_equations(self.system.rhs(), &inputs)
    }

    pub fn algebraic_residuals(&self, y: &[f64], external: &HashMap<String, Value>) -> Result<Vec<f64>> {
        let inputs = self.inputs(y, external)?;
        self.evaluate_equations(self.system.algebraic(), &inputs)
    }

    pub fn evaluate_variable(&self, name: &str, y: &[f64], external: &HashMap<String, Value>) -> Result<Value> {
        let symbol = self
            .variables
            .get(name)
            .ok_or_else(|| ModelError::KeyNotFound { name: name.to_string() })?;
        let inputs = self.inputs(y, external)?;
        self.evaluator().evaluate(symbol, &inputs)
    }

    /// Every model variable at state `y`.
    pub fn evaluate_variables(&self, y: &[f64], external: &HashMap<String, Value>) -> Result<Ledger> {
        let inputs = self.inputs(y, external)?;
        Ok(Ledger::evaluate(&self.variables, &self.evaluator(), &inputs))
    }
}
