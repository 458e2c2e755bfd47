//! Porosity submodels and the decomposition of whole-cell porosity fields.

use super::Submodel;
use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::symbol::{Subdomain, Symbol};
use crate::variables::names;
use crate::variables::VariableMap;
use std::sync::Arc;

/// Whole-cell porosity plus its per-region pieces and their averages.
pub fn standard_porosity_variables(eps: &Symbol) -> Result<VariableMap> {
    let pieces = eps.orphans()?;
    let mut variables = VariableMap::new();
    variables.insert(names::POROSITY.to_string(), eps.clone());
    for (subdomain, piece) in Subdomain::CELL.iter().zip(&pieces) {
        variables.insert(names::region(*subdomain, "porosity"), piece.clone());
    }
    for (subdomain, piece) in Subdomain::CELL.iter().zip(&pieces) {
        variables.insert(names::average(&names::region(*subdomain, "porosity")), piece.average());
    }
    Ok(variables)
}

/// Whole-cell porosity change, its per-region pieces and all their averages.
pub fn standard_porosity_change_variables(deps_dt: &Symbol) -> Result<VariableMap> {
    let pieces = deps_dt.orphans()?;
    let mut variables = VariableMap::new();
    variables.insert(names::POROSITY_CHANGE.to_string(), deps_dt.clone());
    for (subdomain, piece) in Subdomain::CELL.iter().zip(&pieces) {
        variables.insert(names::region(*subdomain, "porosity change"), piece.clone());
    }
    variables.insert(names::average(names::POROSITY_CHANGE), deps_dt.average());
    for (subdomain, piece) in Subdomain::CELL.iter().zip(&pieces) {
        variables.insert(
            names::average(&names::region(*subdomain, "porosity change")),
            piece.average(),
        );
    }
    Ok(variables)
}

/// Porosity fixed at its parameter values.
#[derive(Debug, Clone)]
pub struct ConstantPorosity {
    param: Arc<BatteryParameters>,
}

impl ConstantPorosity {
    pub fn new(param: Arc<BatteryParameters>) -> Self {
        Self { param }
    }
}

impl Submodel for ConstantPorosity {
    fn name(&self) -> &str {
        "Constant porosity"
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        let p = &self.param;
        let eps = Symbol::concatenation([
            p.n.eps.broadcast(Subdomain::NegativeElectrode)?,
            p.eps_s.broadcast(Subdomain::Separator)?,
            p.p.eps.broadcast(Subdomain::PositiveElectrode)?,
        ])?;
        let deps_dt = Symbol::concatenation(
            Subdomain::CELL
                .iter()
                .map(|s| Symbol::scalar(0.0).broadcast(*s))
                .collect::<Result<Vec<_>>>()?,
        )?;

        let mut variables = standard_porosity_variables(&eps)?;
        variables.extend(standard_porosity_change_variables(&deps_dt)?);
        Ok(variables)
    }
}
