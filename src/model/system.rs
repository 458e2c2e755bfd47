//! The assembled equation system handed to a discretiser.

use crate::error::{ModelError, Result};
use crate::symbol::{Domain, NodeKind, Symbol};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Equations keyed by a state variable or a concatenation of state variables.
pub type EquationMap = IndexMap<Symbol, Symbol>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    Dirichlet,
    Neumann,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryCondition {
    pub value: Symbol,
    pub kind: BoundaryKind,
}

impl BoundaryCondition {
    pub fn dirichlet(value: impl Into<Symbol>) -> Self {
        Self { value: value.into(), kind: BoundaryKind::Dirichlet }
    }

    pub fn neumann(value: impl Into<Symbol>) -> Self {
        Self { value: value.into(), kind: BoundaryKind::Neumann }
    }
}

/// Conditions at the two ends of a field's domain.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryConditions {
    pub left: BoundaryCondition,
    pub right: BoundaryCondition,
}

pub type BoundaryConditionMap = IndexMap<Symbol, BoundaryConditions>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EquationKind {
    Rhs,
    Algebraic,
    InitialCondition,
}

impl EquationKind {
    fn label(&self) -> &'static str {
        match self {
            EquationKind::Rhs | EquationKind::Algebraic => "rhs or algebraic equation",
            EquationKind::InitialCondition => "initial condition",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EquationSystem {
    state_variables: Vec<Symbol>,
    rhs: EquationMap,
    algebraic: EquationMap,
    initial_conditions: EquationMap,
    boundary_conditions: BoundaryConditionMap,
}

impl EquationSystem {
    pub fn new(state_variables: Vec<Symbol>) -> Self {
        Self { state_variables, ..Self::default() }
    }

    pub fn state_variables(&self) -> &[Symbol] {
        &self.state_variables
    }

    pub fn rhs(&self) -> &EquationMap {
        &self.rhs
    }

    pub fn algebraic(&self) -> &EquationMap {
        &self.algebraic
    }

    pub fn initial_conditions(&self) -> &EquationMap {
        &self.initial_conditions
    }

    pub fn boundary_conditions(&self) -> &BoundaryConditionMap {
        &self.boundary_conditions
    }

    // --- Construction ---

    pub fn insert_rhs(&mut self, key: Symbol, value: Symbol) -> Result<()> {
        self.insert_equation(EquationKind::Rhs, key, value)
    }

    pub fn insert_algebraic(&mut self, key: Symbol, value: Symbol) -> Result<()> {
        self.insert_equation(EquationKind::Algebraic, key, value)
    }

    pub fn insert_initial_condition(&mut self, key: Symbol, value: Symbol) -> Result<()> {
        self.insert_equation(EquationKind::InitialCondition, key, value)
    }

    /// Boundary values must be domain-less; they are evaluated at a single point.
    pub fn insert_boundary_conditions(&mut self, key: Symbol, conditions: BoundaryConditions) -> Result<()> {
        if key.domain().is_empty() {
            return Err(ModelError::InvalidEquationKey {
                key: key.to_string(),
                reason: "boundary conditions need a spatial field".to_string(),
            });
        }
        for condition in [&conditions.left, &conditions.right] {
            if !condition.value.domain().is_empty() {
                return Err(ModelError::DomainMismatch {
                    op: format!("boundary condition for '{}'", key),
                    left: Domain::empty(),
                    right: condition.value.domain().clone(),
                });
            }
        }
        if self.boundary_conditions.contains_key(&key) {
            return Err(ModelError::DuplicateEquation {
                name: key.to_string(),
                kind: "boundary condition".to_string(),
            });
        }
        self.boundary_conditions.insert(key, conditions);
        Ok(())
    }

    fn insert_equation(&mut self, kind: EquationKind, key: Symbol, value: Symbol) -> Result<()> {
        let covered = self.covered_state_variables(&key)?;

        if !value.domain().is_empty() && value.domain() != key.domain() {
            return Err(ModelError::DomainMismatch {
                op: format!("{} for '{}'", kind.label(), key),
                left: key.domain().clone(),
                right: value.domain().clone(),
            });
        }
        let referenced = value.referenced_domain();
        if !referenced.is_subset(key.domain()) {
            return Err(ModelError::DomainMismatch {
                op: format!("{} for '{}' references fields outside its domain", kind.label(), key),
                left: key.domain().clone(),
                right: referenced,
            });
        }

        let existing: Vec<&EquationMap> = match kind {
            EquationKind::Rhs | EquationKind::Algebraic => vec![&self.rhs, &self.algebraic],
            EquationKind::InitialCondition => vec![&self.initial_conditions],
        };
        for variable in &covered {
            let taken = existing
                .iter()
                .flat_map(|map| map.keys())
                .any(|k| k == variable || k.children().iter().any(|c| *c == variable));
            if taken {
                return Err(ModelError::DuplicateEquation {
                    name: variable.to_string(),
                    kind: kind.label().to_string(),
                });
            }
        }

        let target = match kind {
            EquationKind::Rhs => &mut self.rhs,
            EquationKind::Algebraic => &mut self.algebraic,
            EquationKind::InitialCondition => &mut self.initial_conditions,
        };
        target.insert(key, value);
        Ok(())
    }

    /// The owned state variables an equation key stands for.
    fn covered_state_variables(&self, key: &Symbol) -> Result<Vec<Symbol>> {
        let candidates: Vec<Symbol> = match key.kind() {
            NodeKind::StateVariable { .. } => vec![key.clone()],
            NodeKind::Concatenation(children) if children.iter().all(Symbol::is_state_variable) => {
                children.iter().cloned().collect()
            }
            _ => {
                return Err(ModelError::InvalidEquationKey {
                    key: key.to_string(),
                    reason: "expected a state variable or a concatenation of state variables".to_string(),
                })
            }
        };
        for candidate in &candidates {
            if !self.state_variables.contains(candidate) {
                return Err(ModelError::InvalidEquationKey {
                    key: key.to_string(),
                    reason: format!("'{}' was not introduced by any submodel", candidate),
                });
            }
        }
        Ok(candidates)
    }

    // --- Validation ---

    /// Every state variable has exactly one rhs-or-algebraic equation and one
    /// initial condition. Duplicates are rejected on insertion.
    pub fn check_complete(&self) -> Result<()> {
        for variable in &self.state_variables {
            let covers = |map: &EquationMap| {
                map.keys()
                    .any(|k| k == variable || k.children().iter().any(|c| *c == variable))
            };
            if !covers(&self.rhs) && !covers(&self.algebraic) {
                return Err(ModelError::IncompleteSystem {
                    name: variable.to_string(),
                    missing: "rhs or algebraic equation".to_string(),
                });
            }
            if !covers(&self.initial_conditions) {
                return Err(ModelError::IncompleteSystem {
                    name: variable.to_string(),
                    missing: "initial condition".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Applies `f` to every equation value and boundary value. Keys are kept.
    pub fn try_map_values(&self, mut f: impl FnMut(&Symbol) -> Result<Symbol>) -> Result<EquationSystem> {
        let mut map = |equations: &EquationMap| -> Result<EquationMap> {
            equations
                .iter()
                .map(|(k, v)| Ok((k.clone(), f(v)?)))
                .collect()
        };
        let rhs = map(&self.rhs)?;
        let algebraic = map(&self.algebraic)?;
        let initial_conditions = map(&self.initial_conditions)?;

        let mut boundary_conditions = BoundaryConditionMap::new();
        for (key, bcs) in &self.boundary_conditions {
            let left = BoundaryCondition { value: f(&bcs.left.value)?, kind: bcs.left.kind };
            let right = BoundaryCondition { value: f(&bcs.right.value)?, kind: bcs.right.kind };
            boundary_conditions.insert(key.clone(), BoundaryConditions { left, right });
        }

        Ok(EquationSystem {
            state_variables: self.state_variables.clone(),
            rhs,
            algebraic,
            initial_conditions,
            boundary_conditions,
        })
    }

    pub fn summary(&self) -> SystemSummary {
        let render = |map: &EquationMap| map.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        SystemSummary {
            state_variables: self
                .state_variables
                .iter()
                .map(|s| StateSummary { name: s.to_string(), domain: s.domain().to_string() })
                .collect(),
            rhs: render(&self.rhs),
            algebraic: render(&self.algebraic),
            initial_conditions: render(&self.initial_conditions),
            boundary_conditions: self
                .boundary_conditions
                .iter()
                .map(|(k, bcs)| {
                    (
                        k.to_string(),
                        BoundarySummary {
                            left: (bcs.left.value.to_string(), bcs.left.kind),
                            right: (bcs.right.value.to_string(), bcs.right.kind),
                        },
                    )
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySummary {
    pub left: (String, BoundaryKind),
    pub right: (String, BoundaryKind),
}

/// A printable, serializable view of an `EquationSystem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSummary {
    pub state_variables: Vec<StateSummary>,
    pub rhs: IndexMap<String, String>,
    pub algebraic: IndexMap<String, String>,
    pub initial_conditions: IndexMap<String, String>,
    pub boundary_conditions: IndexMap<String, BoundarySummary>,
}

impl SystemSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
