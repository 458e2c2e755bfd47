use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::submodels::Submodel;
use crate::symbol::Symbol;
use crate::variables::names::{self, CellDomain};
use crate::variables::{VariableMap, VariableRegistry};
use std::sync::Arc;

/// Symmetric Butler-Volmer kinetics on electrode-averaged quantities:
/// `j = 2 j0 sinh(eta / (2 (1 + T)))` with `eta = delta_phi - U`.
#[derive(Debug, Clone)]
pub struct LeadingOrderButlerVolmer {
    param: Arc<BatteryParameters>,
    domain: CellDomain,
    name: String,
}

impl LeadingOrderButlerVolmer {
    pub fn new(param: Arc<BatteryParameters>, domain: CellDomain) -> Self {
        let name = format!("{} leading-order Butler-Volmer", domain.capitalized());
        Self { param, domain, name }
    }

    /// Writes `average` under the "Average ..." form of `key` and its
    /// broadcast over the electrode under `key`.
    fn insert_pair(&self, variables: &mut VariableMap, key: String, average: Symbol) -> Result<()> {
        let average_key = names::average(&key);
        variables.insert(key, average.broadcast(self.domain.electrode())?);
        variables.insert(average_key, average);
        Ok(())
    }
}

impl Submodel for LeadingOrderButlerVolmer {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
        let d = self.domain;
        let delta_phi = variables.get(&names::average_electrode(d, "surface potential difference"))?;
        let t = variables.get(&names::average(names::CELL_TEMPERATURE))?;

        let electrode = self.param.electrode(d);
        let ocp = electrode.ocp.clone();
        let j0 = electrode.j0.clone();
        let eta_r = delta_phi.sub(&ocp)?;

        let thermal_factor = Symbol::scalar(2.0).mul(&Symbol::scalar(1.0).add(&t)?)?;
        let j = Symbol::scalar(2.0).mul(&j0)?.mul(&eta_r.div(&thermal_factor)?.sinh())?;

        let mut derived = VariableMap::new();
        self.insert_pair(&mut derived, names::electrode(d, "open circuit potential"), ocp)?;
        self.insert_pair(&mut derived, names::domain_quantity(d, "reaction overpotential"), eta_r)?;
        self.insert_pair(&mut derived, names::electrode(d, "exchange current density"), j0)?;
        self.insert_pair(&mut derived, names::electrode(d, "interfacial current density"), j)?;
        variables.update(derived);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterValues;
    use crate::submodels::testing::registry_with;

    #[test]
    fn test_equilibrium_has_zero_current() {
        let param = Arc::new(BatteryParameters::new());
        let model = LeadingOrderButlerVolmer::new(param.clone(), CellDomain::Positive);
        let mut registry = registry_with([
            ("Average positive electrode surface potential difference", param.p.ocp.clone()),
            ("Average cell temperature", Symbol::scalar(0.0)),
        ]);
        model.get_coupled_variables(&mut registry).unwrap();

        let j = registry.get("Average positive electrode interfacial current density").unwrap();
        let values: ParameterValues = [
            ("Positive electrode open circuit potential", 4.1),
            ("Positive electrode reference exchange-current density", 0.5),
        ]
        .into_iter()
        .collect();
        let value = values.process_symbol(&j).unwrap().simplify().as_scalar().unwrap();
        assert!(value.abs() < 1e-15);

        assert!(registry.contains("Positive electrode interfacial current density"));
        assert!(registry.contains("Average positive reaction overpotential"));
        assert_eq!(
            registry.get("Average positive electrode open circuit potential").unwrap(),
            param.p.ocp
        );
    }
}
