//! Symbolic core for assembling lithium-ion cell models.
//!
//! Submodels contribute domain-tagged expression trees to a shared variable
//! registry in four phases; the assembler merges them into one equation
//! system that a discretiser can consume.

pub mod compute;
pub mod context;
pub mod display;
pub mod error;
pub mod model;
pub mod parameters;
pub mod submodels;
pub mod symbol;
pub mod variables;

pub use context::ModelContext;
pub use error::{ModelError, Result};
pub use model::{AssembledModel, EquationSystem, LeadingOrderModel, ModelAssembler, ModelOptions};
pub use parameters::{BatteryParameters, ParameterValues};
pub use submodels::Submodel;
pub use symbol::{Domain, Subdomain, Symbol};
pub use variables::VariableRegistry;
