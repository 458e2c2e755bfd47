//! Charge conservation in the solid phase of the electrodes.
pub mod ohm;

pub use ohm::LeadingOrderOhm;
