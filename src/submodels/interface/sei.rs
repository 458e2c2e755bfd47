//! Solid-electrolyte interphase growth.
//!
//! The film is split into an inner and an outer layer, each with its own
//! thickness state. The kinetics variant decides the rate-limiting mechanism;
//! the produced current is shared between the layers by the fixed fraction
//! `INNER_FRACTION`.

use crate::context::ModelContext;
use crate::error::Result;
use crate::model::EquationMap;
use crate::parameters::BatteryParameters;
use crate::submodels::Submodel;
use crate::symbol::{Subdomain, Symbol};
use crate::variables::names::{self, CellDomain, SeiLayer};
use crate::variables::{VariableMap, VariableRegistry};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Share of the SEI current that builds the inner layer.
const INNER_FRACTION: f64 = 0.5;

/// Symmetry factor of the reaction-limited rate law.
const TRANSFER_COEFFICIENT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeiKinetics {
    #[serde(rename = "reaction limited")]
    ReactionLimited,
    #[serde(rename = "solvent-diffusion limited")]
    SolventDiffusionLimited,
    #[serde(rename = "electron-migration limited")]
    ElectronMigrationLimited,
    #[serde(rename = "interstitial-diffusion limited")]
    InterstitialDiffusionLimited,
}

impl SeiKinetics {
    pub fn label(&self) -> &'static str {
        match self {
            SeiKinetics::ReactionLimited => "reaction limited",
            SeiKinetics::SolventDiffusionLimited => "solvent-diffusion limited",
            SeiKinetics::ElectronMigrationLimited => "electron-migration limited",
            SeiKinetics::InterstitialDiffusionLimited => "interstitial-diffusion limited",
        }
    }
}

// --- Shared variable builders ---

/// Inner, outer and total thickness plus their averages.
fn thickness_variables(domain: CellDomain, l_inner: &Symbol, l_outer: &Symbol) -> Result<VariableMap> {
    let l_total = l_inner.add(l_outer)?;
    let mut variables = VariableMap::new();
    for (layer, l) in [
        (SeiLayer::Inner, l_inner.clone()),
        (SeiLayer::Outer, l_outer.clone()),
        (SeiLayer::Total, l_total),
    ] {
        let key = names::sei_thickness(layer, domain);
        variables.insert(names::average(&key), l.average());
        variables.insert(key, l);
    }
    Ok(variables)
}

/// Layer currents, the electrode total and their averages.
fn reaction_variables(domain: CellDomain, j_inner: &Symbol, j_outer: &Symbol) -> Result<VariableMap> {
    let j = j_inner.add(j_outer)?;
    let mut variables = VariableMap::new();
    for (layer, current) in [
        (Some(SeiLayer::Inner), j_inner.clone()),
        (Some(SeiLayer::Outer), j_outer.clone()),
        (None, j),
    ] {
        let key = names::sei_current(layer, domain);
        variables.insert(names::average(&key), current.average());
        variables.insert(key, current);
    }
    Ok(variables)
}

/// Builds the whole-cell SEI current once both electrodes have reported.
/// The first writer wins; an existing whole-cell entry is never replaced.
fn update_whole_cell_current(variables: &mut VariableRegistry) -> Result<()> {
    let negative = names::sei_current(None, CellDomain::Negative);
    let positive = names::sei_current(None, CellDomain::Positive);
    if !(variables.contains(&negative)
        && variables.contains(&positive)
        && !variables.contains(names::SEI_INTERFACIAL_CURRENT_DENSITY))
    {
        return Ok(());
    }
    let j_n = variables.get(&negative)?;
    let j_p = variables.get(&positive)?;
    let j = Symbol::concatenation([j_n, Symbol::scalar(0.0).broadcast(Subdomain::Separator)?, j_p])?;

    let mut whole_cell = VariableMap::new();
    whole_cell.insert(names::average(names::SEI_INTERFACIAL_CURRENT_DENSITY), j.average());
    whole_cell.insert(names::SEI_INTERFACIAL_CURRENT_DENSITY.to_string(), j);
    variables.update(whole_cell);
    Ok(())
}

/// Two-layer SEI growth in one electrode.
#[derive(Debug, Clone)]
pub struct SeiGrowth {
    param: Arc<BatteryParameters>,
    ctx: Arc<ModelContext>,
    domain: CellDomain,
    kinetics: SeiKinetics,
    name: String,
}

impl SeiGrowth {
    pub fn new(
        param: Arc<BatteryParameters>,
        ctx: Arc<ModelContext>,
        domain: CellDomain,
        kinetics: SeiKinetics,
    ) -> Self {
        let name = format!("{} SEI ({})", domain.capitalized(), kinetics.label());
        Self { param, ctx, domain, kinetics, name }
    }

    fn thickness(&self, layer: SeiLayer) -> Symbol {
        self.ctx
            .state_variable(&names::sei_thickness(layer, self.domain), self.domain.electrode())
    }

    /// Total SEI current density in the electrode for the chosen mechanism.
    fn sei_current(&self, variables: &VariableRegistry) -> Result<Symbol> {
        let d = self.domain;
        let sei = &self.param.sei;
        let phi_s = variables.get(&names::electrode(d, "potential"))?;
        match self.kinetics {
            SeiKinetics::ReactionLimited => {
                // -(1 / C_r) exp(-a (phi_s - phi_e))
                let phi_e = variables.get(&names::electrolyte(d.subdomain(), "potential"))?;
                let rate = Symbol::scalar(1.0).div(&sei.c_sei_reaction)?.neg();
                rate.mul(&phi_s.sub(&phi_e)?.scale(-TRANSFER_COEFFICIENT).exp())
            }
            SeiKinetics::SolventDiffusionLimited => {
                let l_outer = variables.get(&names::sei_thickness(SeiLayer::Outer, d))?;
                Symbol::scalar(-1.0).div(&sei.c_sei_solvent.mul(&l_outer)?)
            }
            SeiKinetics::ElectronMigrationLimited => {
                let l_inner = variables.get(&names::sei_thickness(SeiLayer::Inner, d))?;
                phi_s.sub(&sei.u_inner_electron)?.div(&sei.c_sei_electron.mul(&l_inner)?)
            }
            SeiKinetics::InterstitialDiffusionLimited => {
                let l_inner = variables.get(&names::sei_thickness(SeiLayer::Inner, d))?;
                let phi_e = variables.get(&names::electrolyte(d.subdomain(), "potential"))?;
                phi_s
                    .sub(&phi_e)?
                    .neg()
                    .exp()
                    .neg()
                    .div(&sei.c_sei_inter.mul(&l_inner)?)
            }
        }
    }
}

impl Submodel for SeiGrowth {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        thickness_variables(
            self.domain,
            &self.thickness(SeiLayer::Inner),
            &self.thickness(SeiLayer::Outer),
        )
    }

    fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
        let j_sei = self.sei_current(variables)?;
        let j_inner = Symbol::scalar(INNER_FRACTION).mul(&j_sei)?;
        let j_outer = Symbol::scalar(1.0 - INNER_FRACTION).mul(&j_sei)?;
        variables.update(reaction_variables(self.domain, &j_inner, &j_outer)?);
        update_whole_cell_current(variables)
    }

    fn set_rhs(&self, variables: &VariableRegistry) -> Result<EquationMap> {
        let d = self.domain;
        let l_inner = variables.get(&names::sei_thickness(SeiLayer::Inner, d))?;
        let l_outer = variables.get(&names::sei_thickness(SeiLayer::Outer, d))?;
        let j_inner = variables.get(&names::sei_current(Some(SeiLayer::Inner), d))?;
        let j_outer = variables.get(&names::sei_current(Some(SeiLayer::Outer), d))?;

        let mut rhs = EquationMap::new();
        rhs.insert(l_inner, j_inner.neg());
        rhs.insert(l_outer, self.param.sei.v_bar.neg().mul(&j_outer)?);
        Ok(rhs)
    }

    fn set_initial_conditions(&self, variables: &VariableRegistry) -> Result<EquationMap> {
        let d = self.domain;
        let mut initial = EquationMap::new();
        initial.insert(
            variables.get(&names::sei_thickness(SeiLayer::Inner, d))?,
            self.param.sei.l_inner_0.clone(),
        );
        initial.insert(
            variables.get(&names::sei_thickness(SeiLayer::Outer, d))?,
            self.param.sei.l_outer_0.clone(),
        );
        Ok(initial)
    }
}

/// No SEI film: zero thickness and zero current in one electrode.
#[derive(Debug, Clone)]
pub struct NoSei {
    domain: CellDomain,
    name: String,
}

impl NoSei {
    pub fn new(domain: CellDomain) -> Self {
        let name = format!("{} no SEI", domain.capitalized());
        Self { domain, name }
    }

    fn zero(&self) -> Result<Symbol> {
        Symbol::scalar(0.0).broadcast(self.domain.electrode())
    }
}

impl Submodel for NoSei {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        thickness_variables(self.domain, &self.zero()?, &self.zero()?)
    }

    fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
        variables.update(reaction_variables(self.domain, &self.zero()?, &self.zero()?)?);
        update_whole_cell_current(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{EvaluationInputs, Evaluator, Mesh, MeshPoints, Value};
    use crate::parameters::ParameterValues;
    use crate::submodels::testing::registry_with;
    use rstest::rstest;

    struct Fixture {
        param: Arc<BatteryParameters>,
        ctx: Arc<ModelContext>,
    }

    impl Fixture {
        fn new() -> Self {
            Self { param: Arc::new(BatteryParameters::new()), ctx: Arc::new(ModelContext::new()) }
        }

        fn model(&self, domain: CellDomain, kinetics: SeiKinetics) -> SeiGrowth {
            SeiGrowth::new(self.param.clone(), self.ctx.clone(), domain, kinetics)
        }

        /// Registry after phase 1 with the given electrode and electrolyte potentials.
        fn registry(&self, model: &SeiGrowth, phi_s: f64, phi_e: f64) -> VariableRegistry {
            let electrode = model.domain.electrode();
            let mut registry = registry_with([
                (
                    names::electrode(model.domain, "potential").as_str(),
                    Symbol::scalar(phi_s).broadcast(electrode.clone()).unwrap(),
                ),
                (
                    names::electrolyte(model.domain.subdomain(), "potential").as_str(),
                    Symbol::scalar(phi_e).broadcast(electrode).unwrap(),
                ),
            ]);
            registry.update(model.get_fundamental_variables().unwrap());
            registry
        }
    }

    #[test]
    fn test_thickness_keys() {
        let f = Fixture::new();
        let model = f.model(CellDomain::Negative, SeiKinetics::ReactionLimited);
        let variables = model.get_fundamental_variables().unwrap();
        for key in [
            "Inner negative electrode sei thickness",
            "Outer negative electrode sei thickness",
            "Total negative electrode sei thickness",
            "Average inner negative electrode sei thickness",
            "Average outer negative electrode sei thickness",
            "Average total negative electrode sei thickness",
        ] {
            assert!(variables.contains_key(key), "missing {}", key);
        }
        assert!(variables["Inner negative electrode sei thickness"].is_state_variable());
    }

    #[test]
    fn test_interstitial_diffusion_limited_structure() {
        let f = Fixture::new();
        let model = f.model(CellDomain::Negative, SeiKinetics::InterstitialDiffusionLimited);
        let mut registry = f.registry(&model, 0.5, 0.0);
        model.get_coupled_variables(&mut registry).unwrap();

        let phi_s = registry.get("Negative electrode potential").unwrap();
        let phi_e = registry.get("Negative electrolyte potential").unwrap();
        let l_inner = registry.get("Inner negative electrode sei thickness").unwrap();
        let l_outer = registry.get("Outer negative electrode sei thickness").unwrap();
        let c = &f.param.sei.c_sei_inter;

        let j_sei = phi_s
            .sub(&phi_e)
            .unwrap()
            .neg()
            .exp()
            .neg()
            .div(&c.mul(&l_inner).unwrap())
            .unwrap();
        let j_inner = registry.get("Inner negative electrode sei interfacial current density").unwrap();
        let j_outer = registry.get("Outer negative electrode sei interfacial current density").unwrap();
        assert_eq!(j_inner, Symbol::scalar(0.5).mul(&j_sei).unwrap());
        assert_eq!(j_outer, Symbol::scalar(0.5).mul(&j_sei).unwrap());

        let rhs = model.set_rhs(&registry).unwrap();
        assert_eq!(rhs[&l_inner], j_inner.neg());
        assert_eq!(rhs[&l_outer], f.param.sei.v_bar.neg().mul(&j_outer).unwrap());

        let initial = model.set_initial_conditions(&registry).unwrap();
        assert_eq!(initial[&l_inner], f.param.sei.l_inner_0);
        assert_eq!(initial[&l_outer], f.param.sei.l_outer_0);
    }

    #[test]
    fn test_interstitial_diffusion_limited_value() {
        let f = Fixture::new();
        let model = f.model(CellDomain::Negative, SeiKinetics::InterstitialDiffusionLimited);
        let mut registry = f.registry(&model, 0.5, 0.0);
        model.get_coupled_variables(&mut registry).unwrap();

        let mut params = ParameterValues::new();
        params.insert("SEI interstitial diffusion timescale ratio", 2.0);
        params.insert("Negative electrode thickness", 0.3);
        params.insert("Separator thickness", 0.4);
        params.insert("Positive electrode thickness", 0.3);
        let mesh = Mesh::new(&params, &MeshPoints { negative: 3, separator: 2, positive: 3 }).unwrap();

        let l_inner = registry.get("Inner negative electrode sei thickness").unwrap();
        let mut inputs = EvaluationInputs::default();
        inputs.states.insert(l_inner.variable_id().unwrap(), Value::Series(Arc::new(vec![1.0, 2.0, 4.0])));

        let evaluator = Evaluator::new(&mesh, &params);
        let j = registry.get("Negative electrode sei interfacial current density").unwrap();
        let values = evaluator.evaluate(&j, &inputs).unwrap().into_vec(3).unwrap();
        for (value, l) in values.iter().zip([1.0, 2.0, 4.0]) {
            let expected = -(-0.5f64).exp() / (2.0 * l);
            assert!((value - expected).abs() < 1e-12, "{} != {}", value, expected);
        }
    }

    #[rstest]
    #[case(SeiKinetics::ReactionLimited)]
    #[case(SeiKinetics::SolventDiffusionLimited)]
    #[case(SeiKinetics::ElectronMigrationLimited)]
    #[case(SeiKinetics::InterstitialDiffusionLimited)]
    fn test_every_mechanism_yields_electrode_current(#[case] kinetics: SeiKinetics) {
        let f = Fixture::new();
        let model = f.model(CellDomain::Positive, kinetics);
        let mut registry = f.registry(&model, 4.0, 0.1);
        model.get_coupled_variables(&mut registry).unwrap();
        let j = registry.get("Positive electrode sei interfacial current density").unwrap();
        assert_eq!(j.domain(), &CellDomain::Positive.electrode());
        assert!(registry.contains("Average positive electrode sei interfacial current density"));
        // Only one electrode has reported.
        assert!(!registry.contains("Sei interfacial current density"));
    }

    #[test]
    fn test_whole_cell_current_once_both_electrodes_report() {
        let f = Fixture::new();
        let negative = f.model(CellDomain::Negative, SeiKinetics::ReactionLimited);
        let positive = NoSei::new(CellDomain::Positive);
        let mut registry = f.registry(&negative, 0.2, 0.0);
        registry.update(positive.get_fundamental_variables().unwrap());

        negative.get_coupled_variables(&mut registry).unwrap();
        positive.get_coupled_variables(&mut registry).unwrap();

        let whole = registry.get("Sei interfacial current density").unwrap();
        assert_eq!(whole.domain(), &crate::symbol::Domain::whole_cell());
        let pieces = whole.orphans().unwrap();
        assert_eq!(pieces[0], registry.get("Negative electrode sei interfacial current density").unwrap());
    }

    #[test]
    fn test_existing_whole_cell_current_is_kept() {
        let marker = Symbol::parameter("precomputed").broadcast(crate::symbol::Domain::whole_cell()).unwrap();
        let mut registry = registry_with([("Sei interfacial current density", marker.clone())]);
        for domain in CellDomain::BOTH {
            NoSei::new(domain).get_coupled_variables(&mut registry).unwrap();
        }
        assert_eq!(registry.get("Sei interfacial current density").unwrap(), marker);
    }

    #[test]
    fn test_kinetics_labels_roundtrip_through_serde() {
        let k: SeiKinetics = serde_json::from_str("\"interstitial-diffusion limited\"").unwrap();
        assert_eq!(k, SeiKinetics::InterstitialDiffusionLimited);
        assert_eq!(serde_json::to_string(&k).unwrap(), format!("\"{}\"", k.label()));
    }
}
