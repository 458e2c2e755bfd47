use super::Submodel;
use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::symbol::{Subdomain, Symbol};
use crate::variables::names;
use crate::variables::VariableMap;
use std::sync::Arc;

/// Temperature held at its initial value throughout the cell.
#[derive(Debug, Clone)]
pub struct Isothermal {
    param: Arc<BatteryParameters>,
}

impl Isothermal {
    pub fn new(param: Arc<BatteryParameters>) -> Self {
        Self { param }
    }
}

impl Submodel for Isothermal {
    fn name(&self) -> &str {
        "Isothermal"
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        let t = &self.param.t_init;
        let pieces = Subdomain::CELL
            .iter()
            .map(|s| t.broadcast(*s))
            .collect::<Result<Vec<_>>>()?;

        let mut variables = VariableMap::new();
        variables.insert(names::CELL_TEMPERATURE.to_string(), Symbol::concatenation(pieces)?);
        variables.insert(names::average(names::CELL_TEMPERATURE), t.clone());
        Ok(variables)
    }
}
