//! Model options, read from JSON with the option names of the battery-model
//! configuration convention.

use crate::error::{ModelError, Result};
use crate::submodels::interface::{CapacitanceFormulation, SeiKinetics};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SeiOption {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "reaction limited")]
    ReactionLimited,
    #[serde(rename = "solvent-diffusion limited")]
    SolventDiffusionLimited,
    #[serde(rename = "electron-migration limited")]
    ElectronMigrationLimited,
    #[serde(rename = "interstitial-diffusion limited")]
    InterstitialDiffusionLimited,
}

impl SeiOption {
    /// The growth mechanism, or `None` when no film is modelled.
    pub fn kinetics(&self) -> Option<SeiKinetics> {
        match self {
            SeiOption::None => None,
            SeiOption::ReactionLimited => Some(SeiKinetics::ReactionLimited),
            SeiOption::SolventDiffusionLimited => Some(SeiKinetics::SolventDiffusionLimited),
            SeiOption::ElectronMigrationLimited => Some(SeiKinetics::ElectronMigrationLimited),
            SeiOption::InterstitialDiffusionLimited => Some(SeiKinetics::InterstitialDiffusionLimited),
        }
    }
}

/// Submodels that may be replaced by externally supplied variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExternalSubmodel {
    #[serde(rename = "thermal")]
    Thermal,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelOptions {
    #[serde(rename = "sei")]
    pub sei: SeiOption,
    #[serde(rename = "capacitance")]
    pub capacitance: CapacitanceFormulation,
    #[serde(rename = "external submodels")]
    pub external_submodels: Vec<ExternalSubmodel>,
    /// Fail when a submodel read a variable that a later submodel overwrote.
    #[serde(rename = "strict ordering")]
    pub strict_ordering: bool,
}

impl ModelOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ModelError::Configuration(format!("invalid model options: {}", e)))
    }

    pub fn is_external(&self, submodel: ExternalSubmodel) -> bool {
        self.external_submodels.contains(&submodel)
    }
}
