//! Electrode/electrolyte interface submodels: double-layer capacitance,
//! reaction kinetics and SEI film growth.
pub mod capacitance;
pub mod kinetics;
pub mod sei;

pub use capacitance::{CapacitanceFormulation, DoubleLayerCapacitance};
pub use kinetics::LeadingOrderButlerVolmer;
pub use sei::{NoSei, SeiGrowth, SeiKinetics};
