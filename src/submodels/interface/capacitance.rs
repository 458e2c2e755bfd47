use crate::context::ModelContext;
use crate::error::Result;
use crate::model::EquationMap;
use crate::parameters::BatteryParameters;
use crate::submodels::Submodel;
use crate::symbol::{Domain, Symbol};
use crate::variables::names::{self, CellDomain};
use crate::variables::{VariableMap, VariableRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the surface potential difference is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CapacitanceFormulation {
    /// `C_dl * d(delta_phi)/dt = i_target - j`.
    #[default]
    #[serde(rename = "differential")]
    Differential,
    /// `j - i_target = 0`; the double layer is in quasi-equilibrium.
    #[serde(rename = "algebraic")]
    Algebraic,
}

/// Leading-order double-layer capacitance in one electrode.
///
/// Owns the electrode-averaged surface potential difference as a state
/// variable and balances the averaged interfacial current against the
/// current the electrode has to carry.
#[derive(Debug, Clone)]
pub struct DoubleLayerCapacitance {
    param: Arc<BatteryParameters>,
    ctx: Arc<ModelContext>,
    domain: CellDomain,
    formulation: CapacitanceFormulation,
    name: String,
}

impl DoubleLayerCapacitance {
    pub fn new(
        param: Arc<BatteryParameters>,
        ctx: Arc<ModelContext>,
        domain: CellDomain,
        formulation: CapacitanceFormulation,
    ) -> Self {
        let name = format!("{} double-layer capacitance", domain.capitalized());
        Self { param, ctx, domain, formulation, name }
    }

    fn state_name(&self) -> String {
        names::average_electrode(self.domain, "surface potential difference")
    }

    fn delta_phi(&self) -> Symbol {
        self.ctx.state_variable(&self.state_name(), Domain::empty())
    }

    /// Volumetric current the electrode must carry: `i / l_n` in the negative
    /// electrode and `-i / l_p` in the positive electrode.
    fn target_current(&self, variables: &VariableRegistry) -> Result<Symbol> {
        let i = variables.get(names::CURRENT_COLLECTOR_CURRENT_DENSITY)?;
        let l = &self.param.electrode(self.domain).l;
        match self.domain {
            CellDomain::Negative => i.div(l),
            CellDomain::Positive => i.neg().div(l),
        }
    }

    /// `i_target - j_av`.
    fn current_imbalance(&self, variables: &VariableRegistry) -> Result<Symbol> {
        let j_av = variables.get(&names::average_electrode(self.domain, "interfacial current density"))?;
        self.target_current(variables)?.sub(&j_av)
    }
}

impl Submodel for DoubleLayerCapacitance {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        let delta_phi_av = self.delta_phi();
        let mut variables = VariableMap::new();
        variables.insert(
            names::electrode(self.domain, "surface potential difference"),
            delta_phi_av.broadcast(self.domain.electrode())?,
        );
        variables.insert(self.state_name(), delta_phi_av);
        Ok(variables)
    }

    fn set_rhs(&self, variables: &VariableRegistry) -> Result<EquationMap> {
        let mut rhs = EquationMap::new();
        if self.formulation == CapacitanceFormulation::Differential {
            let c_dl = &self.param.electrode(self.domain).c_dl;
            rhs.insert(self.delta_phi(), self.current_imbalance(variables)?.div(c_dl)?);
        }
        Ok(rhs)
    }

    fn set_algebraic(&self, variables: &VariableRegistry) -> Result<EquationMap> {
        let mut algebraic = EquationMap::new();
        if self.formulation == CapacitanceFormulation::Algebraic {
            algebraic.insert(self.delta_phi(), self.current_imbalance(variables)?.neg());
        }
        Ok(algebraic)
    }

    fn set_initial_conditions(&self, _variables: &VariableRegistry) -> Result<EquationMap> {
        // Start at equilibrium: zero reaction overpotential.
        let mut initial = EquationMap::new();
        initial.insert(self.delta_phi(), self.param.electrode(self.domain).ocp.clone());
        Ok(initial)
    }
}
