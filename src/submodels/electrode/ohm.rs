//! Leading-order Ohm's law in the electrodes.
//!
//! At leading order the solid-phase potential is uniform in each electrode.
//! The negative electrode is the reference (potential zero); the positive
//! electrode potential follows from the electrolyte potential and the surface
//! potential difference, and doubles as the terminal voltage.

use crate::context::ModelContext;
use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::submodels::Submodel;
use crate::symbol::Symbol;
use crate::variables::names::{self, CellDomain};
use crate::variables::{VariableMap, VariableRegistry};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct LeadingOrderOhm {
    param: Arc<BatteryParameters>,
    ctx: Arc<ModelContext>,
    domain: CellDomain,
    name: String,
}

impl LeadingOrderOhm {
    pub fn new(param: Arc<BatteryParameters>, ctx: Arc<ModelContext>, domain: CellDomain) -> Self {
        let name = format!("{} leading-order Ohm", domain.capitalized());
        Self { param, ctx, domain, name }
    }

    /// Solid-phase current: `i (1 - x_n / l_n)` or `i (1 - (1 - x_p) / l_p)`.
    fn current_density(&self, i: &Symbol) -> Result<Symbol> {
        let one = Symbol::scalar(1.0);
        let l = &self.param.electrode(self.domain).l;
        let profile = match self.domain {
            CellDomain::Negative => one.sub(&self.ctx.spatial().x_n.div(l)?)?,
            CellDomain::Positive => one.sub(&one.sub(&self.ctx.spatial().x_p)?.div(l)?)?,
        };
        Symbol::outer(i, &profile)
    }

    fn potential_variables(&self, phi_s_av: Symbol) -> Result<VariableMap> {
        let d = self.domain;
        let mut variables = VariableMap::new();
        variables.insert(names::electrode(d, "potential"), phi_s_av.broadcast(d.electrode())?);
        variables.insert(names::average_electrode(d, "potential"), phi_s_av);
        variables.insert(names::average_electrode(d, "ohmic losses"), Symbol::scalar(0.0));
        Ok(variables)
    }
}

impl Submodel for LeadingOrderOhm {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
        let d = self.domain;
        let i = variables.get(names::CURRENT_COLLECTOR_CURRENT_DENSITY)?;

        let mut derived = match d {
            CellDomain::Negative => self.potential_variables(Symbol::scalar(0.0))?,
            CellDomain::Positive => {
                let phi_e_av = variables.get(&names::average(names::ELECTROLYTE_POTENTIAL))?;
                let delta_phi_av =
                    variables.get(&names::average_electrode(d, "surface potential difference"))?;
                let phi_s_av = phi_e_av.add(&delta_phi_av)?;
                let mut derived = self.potential_variables(phi_s_av.clone())?;
                derived.insert(names::TERMINAL_VOLTAGE.to_string(), phi_s_av);
                derived
            }
        };
        derived.insert(names::electrode(d, "current density"), self.current_density(&i)?);
        variables.update(derived);
        Ok(())
    }
}
