//! Physics submodels and the staged protocol they share.
//!
//! A submodel contributes to a model in four ordered phases. Every phase is
//! optional; the default implementations contribute nothing.
//!
//! 1. `get_fundamental_variables`: new state variables, no registry reads.
//! 2. `get_coupled_variables`: derived fields computed from registry entries
//!    written earlier, written back in place.
//! 3. `set_rhs` / `set_algebraic` / `set_boundary_conditions`.
//! 4. `set_initial_conditions`.
pub mod current_collector;
pub mod electrode;
pub mod electrolyte;
pub mod interface;
pub mod porosity;
pub mod thermal;

use crate::error::Result;
use crate::model::{BoundaryConditionMap, EquationMap};
use crate::variables::{VariableMap, VariableRegistry};

pub trait Submodel: Send + Sync {
    /// Identifies the submodel in logs, errors and the dependency report.
    fn name(&self) -> &str;

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        Ok(VariableMap::new())
    }

    fn get_coupled_variables(&self, _variables: &mut VariableRegistry) -> Result<()> {
        Ok(())
    }

    fn set_rhs(&self, _variables: &VariableRegistry) -> Result<EquationMap> {
        Ok(EquationMap::new())
    }

    fn set_algebraic(&self, _variables: &VariableRegistry) -> Result<EquationMap> {
        Ok(EquationMap::new())
    }

    fn set_boundary_conditions(&self, _variables: &VariableRegistry) -> Result<BoundaryConditionMap> {
        Ok(BoundaryConditionMap::new())
    }

    fn set_initial_conditions(&self, _variables: &VariableRegistry) -> Result<EquationMap> {
        Ok(EquationMap::new())
    }
}
