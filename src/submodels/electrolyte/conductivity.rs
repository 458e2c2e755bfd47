//! Charge conservation in the electrolyte with the Stefan-Maxwell
//! constitutive law, reduced to leading order.
//!
//! The electrolyte potential is uniform and fixed by the negative electrode
//! boundary quantities; the electrolyte current rises linearly through the
//! negative electrode, is constant in the separator and falls linearly
//! through the positive electrode. No state variables are owned.

use crate::context::ModelContext;
use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::submodels::Submodel;
use crate::symbol::{Subdomain, Symbol};
use crate::variables::names::{self, CellDomain};
use crate::variables::{VariableMap, VariableRegistry};
use std::sync::Arc;

/// Whole-cell potential, its per-region pieces, and the averaged potential.
pub fn standard_potential_variables(phi_e: &Symbol, phi_e_av: &Symbol) -> Result<VariableMap> {
    let pieces = phi_e.orphans()?;
    let mut variables = VariableMap::new();
    variables.insert(names::ELECTROLYTE_POTENTIAL.to_string(), phi_e.clone());
    for (subdomain, piece) in Subdomain::CELL.iter().zip(pieces) {
        variables.insert(names::electrolyte(*subdomain, "potential"), piece);
    }
    variables.insert(names::average(names::ELECTROLYTE_POTENTIAL), phi_e_av.clone());
    Ok(variables)
}

pub fn standard_current_variables(i_e: &Symbol) -> VariableMap {
    let mut variables = VariableMap::new();
    variables.insert(names::ELECTROLYTE_CURRENT_DENSITY.to_string(), i_e.clone());
    variables
}

/// Electrolyte overpotential split into concentration and ohmic parts.
pub fn split_overpotential_variables(eta_c_av: &Symbol, delta_phi_e_av: &Symbol) -> Result<VariableMap> {
    let eta_e_av = eta_c_av.add(delta_phi_e_av)?;
    let mut variables = VariableMap::new();
    variables.insert(names::average(names::CONCENTRATION_OVERPOTENTIAL), eta_c_av.clone());
    variables.insert(names::average(names::ELECTROLYTE_OHMIC_LOSSES), delta_phi_e_av.clone());
    variables.insert(names::average(names::ELECTROLYTE_OVERPOTENTIAL), eta_e_av);
    Ok(variables)
}

#[derive(Debug, Clone)]
pub struct LeadingStefanMaxwellConductivity {
    param: Arc<BatteryParameters>,
    ctx: Arc<ModelContext>,
}

impl LeadingStefanMaxwellConductivity {
    pub fn new(param: Arc<BatteryParameters>, ctx: Arc<ModelContext>) -> Self {
        Self { param, ctx }
    }
}

impl Submodel for LeadingStefanMaxwellConductivity {
    fn name(&self) -> &str {
        "Leading-order Stefan-Maxwell conductivity"
    }

    fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
        let n = CellDomain::Negative;
        let ocp_n_av = variables.get(&names::average_electrode(n, "open circuit potential"))?;
        let eta_r_n_av = variables.get(&names::average(&names::domain_quantity(n, "reaction overpotential")))?;
        let delta_phi_n_av = variables.get(&names::average_electrode(n, "ohmic losses"))?;
        let i_boundary_cc = variables.get(names::CURRENT_COLLECTOR_CURRENT_DENSITY)?;

        let l_n = &self.param.n.l;
        let l_p = &self.param.p.l;
        let x_n = &self.ctx.spatial().x_n;
        let x_p = &self.ctx.spatial().x_p;

        let phi_e_av = delta_phi_n_av.sub(&eta_r_n_av)?.sub(&ocp_n_av)?;
        let phi_e = Symbol::concatenation(
            Subdomain::CELL
                .iter()
                .map(|s| phi_e_av.broadcast(*s))
                .collect::<Result<Vec<_>>>()?,
        )?;

        let i_e = Symbol::concatenation([
            Symbol::outer(&i_boundary_cc, &x_n.div(l_n)?)?,
            i_boundary_cc.broadcast(Subdomain::Separator)?,
            Symbol::outer(&i_boundary_cc, &Symbol::scalar(1.0).sub(x_p)?.div(l_p)?)?,
        ])?;

        let mut derived = standard_potential_variables(&phi_e, &phi_e_av)?;
        derived.extend(standard_current_variables(&i_e));

        // Leading order: no concentration overpotential and no ohmic losses.
        derived.extend(split_overpotential_variables(
            &Symbol::scalar(0.0),
            &Symbol::scalar(0.0),
        )?);
        variables.update(derived);
        Ok(())
    }
}
