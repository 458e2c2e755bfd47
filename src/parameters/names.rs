//! Canonical parameter names. All values are dimensionless.

pub const NEGATIVE_ELECTRODE_THICKNESS: &str = "Negative electrode thickness";
pub const SEPARATOR_THICKNESS: &str = "Separator thickness";
pub const POSITIVE_ELECTRODE_THICKNESS: &str = "Positive electrode thickness";

pub const NEGATIVE_ELECTRODE_POROSITY: &str = "Negative electrode porosity";
pub const SEPARATOR_POROSITY: &str = "Separator porosity";
pub const POSITIVE_ELECTRODE_POROSITY: &str = "Positive electrode porosity";

pub const NEGATIVE_EXCHANGE_CURRENT_DENSITY: &str = "Negative electrode reference exchange-current density";
pub const POSITIVE_EXCHANGE_CURRENT_DENSITY: &str = "Positive electrode reference exchange-current density";
pub const NEGATIVE_OPEN_CIRCUIT_POTENTIAL: &str = "Negative electrode open circuit potential";
pub const POSITIVE_OPEN_CIRCUIT_POTENTIAL: &str = "Positive electrode open circuit potential";
pub const NEGATIVE_DOUBLE_LAYER_CAPACITY: &str = "Negative electrode double-layer capacity";
pub const POSITIVE_DOUBLE_LAYER_CAPACITY: &str = "Positive electrode double-layer capacity";

pub const CURRENT_FUNCTION: &str = "Current function";

pub const ELECTROLYTE_DIFFUSION_TIMESCALE: &str = "Electrolyte diffusion timescale ratio";
pub const INITIAL_ELECTROLYTE_CONCENTRATION: &str = "Initial electrolyte concentration";

pub const INITIAL_TEMPERATURE: &str = "Initial temperature";

pub const SEI_PARTIAL_MOLAR_VOLUME_RATIO: &str = "Ratio of inner and outer SEI partial molar volumes";
pub const INITIAL_INNER_SEI_THICKNESS: &str = "Initial inner SEI thickness";
pub const INITIAL_OUTER_SEI_THICKNESS: &str = "Initial outer SEI thickness";
pub const SEI_REACTION_TIMESCALE: &str = "SEI reaction timescale ratio";
pub const SEI_SOLVENT_DIFFUSION_TIMESCALE: &str = "SEI solvent diffusion timescale ratio";
pub const SEI_ELECTRON_MIGRATION_TIMESCALE: &str = "SEI electron migration timescale ratio";
pub const SEI_INTERSTITIAL_DIFFUSION_TIMESCALE: &str = "SEI interstitial diffusion timescale ratio";
pub const INNER_SEI_OPEN_CIRCUIT_POTENTIAL: &str = "Inner SEI open circuit potential";
