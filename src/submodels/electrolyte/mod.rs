//! Electrolyte submodels: charge conservation and species transport.
pub mod conductivity;
pub mod diffusion;

pub use conductivity::LeadingStefanMaxwellConductivity;
pub use diffusion::FickianDiffusion;
