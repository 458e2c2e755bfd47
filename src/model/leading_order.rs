//! The leading-order quasi-static cell model built from `ModelOptions`.

use super::assembler::{AssembledModel, ModelAssembler};
use super::options::{ExternalSubmodel, ModelOptions};
use crate::context::ModelContext;
use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::submodels::current_collector::UniformCurrentCollector;
use crate::submodels::electrode::LeadingOrderOhm;
use crate::submodels::electrolyte::{FickianDiffusion, LeadingStefanMaxwellConductivity};
use crate::submodels::interface::{DoubleLayerCapacitance, LeadingOrderButlerVolmer, NoSei, SeiGrowth};
use crate::submodels::porosity::ConstantPorosity;
use crate::submodels::thermal::Isothermal;
use crate::symbol::Domain;
use crate::variables::names::{self, CellDomain};
use std::sync::Arc;

pub struct LeadingOrderModel {
    options: ModelOptions,
    param: Arc<BatteryParameters>,
    ctx: Arc<ModelContext>,
    assembler: ModelAssembler,
}

impl LeadingOrderModel {
    pub fn new(options: ModelOptions) -> Self {
        Self::with_parameters(options, Arc::new(BatteryParameters::new()))
    }

    pub fn with_parameters(options: ModelOptions, param: Arc<BatteryParameters>) -> Self {
        let ctx = Arc::new(ModelContext::new());
        let assembler = build_assembler(&options, &param, &ctx);
        Self { options, param, ctx, assembler }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn param(&self) -> &BatteryParameters {
        &self.param
    }

    pub fn context(&self) -> &ModelContext {
        &self.ctx
    }

    pub fn submodel_names(&self) -> Vec<&str> {
        self.assembler.submodel_names()
    }

    pub fn assemble(&self) -> Result<AssembledModel> {
        self.assembler.assemble()
    }
}

/// Registration order matters: each submodel reads only what the ones before
/// it have written.
fn build_assembler(options: &ModelOptions, param: &Arc<BatteryParameters>, ctx: &Arc<ModelContext>) -> ModelAssembler {
    let mut assembler = ModelAssembler::new("Leading-order model");
    assembler.strict_ordering(options.strict_ordering);

    assembler.add_submodel(UniformCurrentCollector::new(param.clone()));
    assembler.add_submodel(ConstantPorosity::new(param.clone()));

    if options.is_external(ExternalSubmodel::Thermal) {
        assembler.external_variable(names::CELL_TEMPERATURE, Domain::whole_cell());
    } else {
        assembler.add_submodel(Isothermal::new(param.clone()));
    }

    for domain in CellDomain::BOTH {
        assembler.add_submodel(DoubleLayerCapacitance::new(
            param.clone(),
            ctx.clone(),
            domain,
            options.capacitance,
        ));
    }
    for domain in CellDomain::BOTH {
        assembler.add_submodel(LeadingOrderButlerVolmer::new(param.clone(), domain));
    }

    assembler.add_submodel(LeadingOrderOhm::new(param.clone(), ctx.clone(), CellDomain::Negative));
    assembler.add_submodel(LeadingStefanMaxwellConductivity::new(param.clone(), ctx.clone()));
    assembler.add_submodel(LeadingOrderOhm::new(param.clone(), ctx.clone(), CellDomain::Positive));
    assembler.add_submodel(FickianDiffusion::new(param.clone(), ctx.clone()));

    for domain in CellDomain::BOTH {
        match options.sei.kinetics() {
            Some(kinetics) => {
                assembler.add_submodel(SeiGrowth::new(param.clone(), ctx.clone(), domain, kinetics));
            }
            None => {
                assembler.add_submodel(NoSei::new(domain));
            }
        }
    }
    assembler
}
