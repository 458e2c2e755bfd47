use crate::context::ModelContext;
use crate::error::Result;
use crate::model::{BoundaryCondition, BoundaryConditionMap, BoundaryConditions, EquationMap};
use crate::parameters::BatteryParameters;
use crate::submodels::Submodel;
use crate::symbol::{Subdomain, Symbol};
use crate::variables::names;
use crate::variables::{VariableMap, VariableRegistry};
use std::sync::Arc;

/// Fickian diffusion of the electrolyte salt through the whole cell:
/// `C_e eps dc/dt = -div(N)`, `N = -grad(c)`, no flux through the current
/// collectors.
#[derive(Debug, Clone)]
pub struct FickianDiffusion {
    param: Arc<BatteryParameters>,
    ctx: Arc<ModelContext>,
}

impl FickianDiffusion {
    pub fn new(param: Arc<BatteryParameters>, ctx: Arc<ModelContext>) -> Self {
        Self { param, ctx }
    }

    fn concentration(&self) -> Result<Symbol> {
        Symbol::concatenation(
            Subdomain::CELL
                .iter()
                .map(|s| self.ctx.state_variable(&names::electrolyte(*s, "concentration"), *s)),
        )
    }
}

impl Submodel for FickianDiffusion {
    fn name(&self) -> &str {
        "Fickian electrolyte diffusion"
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        let c_e = self.concentration()?;
        let mut variables = VariableMap::new();
        variables.insert(names::ELECTROLYTE_CONCENTRATION.to_string(), c_e.clone());
        for (subdomain, piece) in Subdomain::CELL.iter().zip(c_e.orphans()?) {
            variables.insert(names::electrolyte(*subdomain, "concentration"), piece);
        }
        variables.insert(names::average(names::ELECTROLYTE_CONCENTRATION), c_e.average());
        Ok(variables)
    }

    fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
        let c_e = variables.get(names::ELECTROLYTE_CONCENTRATION)?;
        variables.insert(names::ELECTROLYTE_FLUX, c_e.gradient()?.neg());
        Ok(())
    }

    fn set_rhs(&self, variables: &VariableRegistry) -> Result<EquationMap> {
        let c_e = variables.get(names::ELECTROLYTE_CONCENTRATION)?;
        let flux = variables.get(names::ELECTROLYTE_FLUX)?;
        let eps = variables.get(names::POROSITY)?;

        let mut rhs = EquationMap::new();
        rhs.insert(c_e, flux.divergence()?.neg().div(&self.param.c_e.mul(&eps)?)?);
        Ok(rhs)
    }

    fn set_boundary_conditions(&self, variables: &VariableRegistry) -> Result<BoundaryConditionMap> {
        let c_e = variables.get(names::ELECTROLYTE_CONCENTRATION)?;
        let mut bcs = BoundaryConditionMap::new();
        bcs.insert(
            c_e,
            BoundaryConditions {
                left: BoundaryCondition::neumann(0.0),
                right: BoundaryCondition::neumann(0.0),
            },
        );
        Ok(bcs)
    }

    fn set_initial_conditions(&self, variables: &VariableRegistry) -> Result<EquationMap> {
        let c_e = variables.get(names::ELECTROLYTE_CONCENTRATION)?;
        let mut initial = EquationMap::new();
        initial.insert(c_e, self.param.c_e_init.clone());
        Ok(initial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Domain, NodeKind};

    #[test]
    fn test_concentration_is_concatenated_state() {
        let ctx = Arc::new(ModelContext::new());
        let model = FickianDiffusion::new(Arc::new(BatteryParameters::new()), ctx.clone());
        let variables = model.get_fundamental_variables().unwrap();
        let c_e = &variables["Electrolyte concentration"];
        assert_eq!(c_e.domain(), &Domain::whole_cell());
        assert_eq!(c_e.state_variables().len(), 3);
        assert!(variables["Separator electrolyte concentration"].is_state_variable());
        assert_eq!(ctx.state_variables().len(), 3);
    }

    #[test]
    fn test_equations_are_keyed_by_whole_field() {
        let param = Arc::new(BatteryParameters::new());
        let model = FickianDiffusion::new(param.clone(), Arc::new(ModelContext::new()));
        let mut registry = VariableRegistry::new();
        registry.update(model.get_fundamental_variables().unwrap());
        registry.insert(
            "Porosity",
            Symbol::scalar(0.5).broadcast(Domain::whole_cell()).unwrap(),
        );
        model.get_coupled_variables(&mut registry).unwrap();

        let c_e = registry.get("Electrolyte concentration").unwrap();
        let rhs = model.set_rhs(&registry).unwrap();
        let value = &rhs[&c_e];
        assert_eq!(value.domain(), c_e.domain());
        assert!(matches!(value.kind(), NodeKind::Binary(..)));

        let bcs = model.set_boundary_conditions(&registry).unwrap();
        assert_eq!(bcs[&c_e].left, BoundaryCondition::neumann(0.0));

        let initial = model.set_initial_conditions(&registry).unwrap();
        assert_eq!(initial[&c_e], param.c_e_init);
    }
}
