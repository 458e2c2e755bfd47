//! The registry key convention shared by all submodels.
//!
//! Keys are human-readable and bit-exact: a submodel reading
//! "Average negative electrode open circuit potential" only finds it if the
//! writer spelled it the same way, so every key is built through this module.

use crate::symbol::{Domain, Subdomain};
use serde::{Deserialize, Serialize};

/// The electrode a domain-specific submodel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellDomain {
    Negative,
    Positive,
}

impl CellDomain {
    pub const BOTH: [CellDomain; 2] = [CellDomain::Negative, CellDomain::Positive];

    pub fn capitalized(&self) -> &'static str {
        match self {
            CellDomain::Negative => "Negative",
            CellDomain::Positive => "Positive",
        }
    }

    pub fn lower(&self) -> &'static str {
        match self {
            CellDomain::Negative => "negative",
            CellDomain::Positive => "positive",
        }
    }

    pub fn subdomain(&self) -> Subdomain {
        match self {
            CellDomain::Negative => Subdomain::NegativeElectrode,
            CellDomain::Positive => Subdomain::PositiveElectrode,
        }
    }

    pub fn electrode(&self) -> Domain {
        Domain::from(self.subdomain())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeiLayer {
    Inner,
    Outer,
    Total,
}

impl SeiLayer {
    fn label(&self) -> &'static str {
        match self {
            SeiLayer::Inner => "Inner",
            SeiLayer::Outer => "Outer",
            SeiLayer::Total => "Total",
        }
    }
}

pub const CURRENT_COLLECTOR_CURRENT_DENSITY: &str = "Current collector current density";
pub const ELECTROLYTE_POTENTIAL: &str = "Electrolyte potential";
pub const ELECTROLYTE_CURRENT_DENSITY: &str = "Electrolyte current density";
pub const ELECTROLYTE_CONCENTRATION: &str = "Electrolyte concentration";
pub const ELECTROLYTE_FLUX: &str = "Electrolyte flux";
pub const ELECTROLYTE_OVERPOTENTIAL: &str = "Electrolyte overpotential";
pub const CONCENTRATION_OVERPOTENTIAL: &str = "Concentration overpotential";
pub const ELECTROLYTE_OHMIC_LOSSES: &str = "Electrolyte ohmic losses";
pub const POROSITY: &str = "Porosity";
pub const POROSITY_CHANGE: &str = "Porosity change";
pub const CELL_TEMPERATURE: &str = "Cell temperature";
pub const TERMINAL_VOLTAGE: &str = "Terminal voltage";
pub const SEI_INTERFACIAL_CURRENT_DENSITY: &str = "Sei interfacial current density";

/// "Average " followed by `name` with a lower-cased first letter.
pub fn average(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => format!("Average {}{}", first.to_lowercase(), chars.as_str()),
        None => "Average".to_string(),
    }
}

/// "<Domain> electrode <quantity>".
pub fn electrode(domain: CellDomain, quantity: &str) -> String {
    format!("{} electrode {}", domain.capitalized(), quantity)
}

/// "Average <domain> electrode <quantity>".
pub fn average_electrode(domain: CellDomain, quantity: &str) -> String {
    average(&electrode(domain, quantity))
}

/// "<Domain> <quantity>", e.g. "Negative reaction overpotential".
pub fn domain_quantity(domain: CellDomain, quantity: &str) -> String {
    format!("{} {}", domain.capitalized(), quantity)
}

/// Region-level key, e.g. "Separator porosity" or "Negative electrode porosity".
pub fn region(subdomain: Subdomain, quantity: &str) -> String {
    format!("{} {}", subdomain.label(), quantity)
}

/// Electrolyte key, e.g. "Separator electrolyte potential".
pub fn electrolyte(subdomain: Subdomain, quantity: &str) -> String {
    format!("{} electrolyte {}", subdomain.electrolyte_label(), quantity)
}

/// "Inner negative electrode sei thickness".
pub fn sei_thickness(layer: SeiLayer, domain: CellDomain) -> String {
    format!("{} {} electrode sei thickness", layer.label(), domain.lower())
}

/// Layer current "Inner negative electrode sei interfacial current density",
/// or the electrode total "Negative electrode sei interfacial current density".
pub fn sei_current(layer: Option<SeiLayer>, domain: CellDomain) -> String {
    match layer {
        Some(layer) => format!(
            "{} {} electrode sei interfacial current density",
            layer.label(),
            domain.lower()
        ),
        None => electrode(domain, "sei interfacial current density"),
    }
}
