//! The shared parameter object submodels are constructed with.
//!
//! Every field is a `Parameter` leaf; numeric values are bound later by
//! `ParameterValues`, so the same assembled model can be evaluated with
//! different parameter sets.

use super::names;
use crate::symbol::Symbol;
use crate::variables::names::CellDomain;

/// Parameters that exist once per electrode.
#[derive(Debug, Clone)]
pub struct ElectrodeParameters {
    /// Dimensionless thickness.
    pub l: Symbol,
    pub eps: Symbol,
    /// Reference exchange-current density.
    pub j0: Symbol,
    /// Open circuit potential.
    pub ocp: Symbol,
    /// Double-layer capacity.
    pub c_dl: Symbol,
}

#[derive(Debug, Clone)]
pub struct SeiParameters {
    pub v_bar: Symbol,
    pub l_inner_0: Symbol,
    pub l_outer_0: Symbol,
    pub c_sei_reaction: Symbol,
    pub c_sei_solvent: Symbol,
    pub c_sei_electron: Symbol,
    pub c_sei_inter: Symbol,
    pub u_inner_electron: Symbol,
}

#[derive(Debug, Clone)]
pub struct BatteryParameters {
    pub n: ElectrodeParameters,
    pub p: ElectrodeParameters,
    pub l_s: Symbol,
    pub eps_s: Symbol,
    pub sei: SeiParameters,
    /// Applied current density at the current collectors.
    pub current: Symbol,
    pub c_e: Symbol,
    pub c_e_init: Symbol,
    pub t_init: Symbol,
}

impl BatteryParameters {
    pub fn new() -> Self {
        let p = |name: &str| Symbol::parameter(name);
        Self {
            n: ElectrodeParameters {
                l: p(names::NEGATIVE_ELECTRODE_THICKNESS),
                eps: p(names::NEGATIVE_ELECTRODE_POROSITY),
                j0: p(names::NEGATIVE_EXCHANGE_CURRENT_DENSITY),
                ocp: p(names::NEGATIVE_OPEN_CIRCUIT_POTENTIAL),
                c_dl: p(names::NEGATIVE_DOUBLE_LAYER_CAPACITY),
            },
            p: ElectrodeParameters {
                l: p(names::POSITIVE_ELECTRODE_THICKNESS),
                eps: p(names::POSITIVE_ELECTRODE_POROSITY),
                j0: p(names::POSITIVE_EXCHANGE_CURRENT_DENSITY),
                ocp: p(names::POSITIVE_OPEN_CIRCUIT_POTENTIAL),
                c_dl: p(names::POSITIVE_DOUBLE_LAYER_CAPACITY),
            },
            l_s: p(names::SEPARATOR_THICKNESS),
            eps_s: p(names::SEPARATOR_POROSITY),
            sei: SeiParameters {
                v_bar: p(names::SEI_PARTIAL_MOLAR_VOLUME_RATIO),
                l_inner_0: p(names::INITIAL_INNER_SEI_THICKNESS),
                l_outer_0: p(names::INITIAL_OUTER_SEI_THICKNESS),
                c_sei_reaction: p(names::SEI_REACTION_TIMESCALE),
                c_sei_solvent: p(names::SEI_SOLVENT_DIFFUSION_TIMESCALE),
                c_sei_electron: p(names::SEI_ELECTRON_MIGRATION_TIMESCALE),
                c_sei_inter: p(names::SEI_INTERSTITIAL_DIFFUSION_TIMESCALE),
                u_inner_electron: p(names::INNER_SEI_OPEN_CIRCUIT_POTENTIAL),
            },
            current: p(names::CURRENT_FUNCTION),
            c_e: p(names::ELECTROLYTE_DIFFUSION_TIMESCALE),
            c_e_init: p(names::INITIAL_ELECTROLYTE_CONCENTRATION),
            t_init: p(names::INITIAL_TEMPERATURE),
        }
    }

    pub fn electrode(&self, domain: CellDomain) -> &ElectrodeParameters {
        match domain {
            CellDomain::Negative => &self.n,
            CellDomain::Positive => &self.p,
        }
    }
}

impl Default for BatteryParameters {
    fn default() -> Self {
        Self::new()
    }
}
