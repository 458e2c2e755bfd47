//! Model assembly: the equation system, the assembler that fills it from
//! submodels, and the leading-order cell model.
pub mod assembler;
pub mod dependencies;
pub mod leading_order;
pub mod options;
pub mod system;

pub use assembler::{AssembledModel, ModelAssembler};
pub use dependencies::{DependencyReport, StaleRead};
pub use leading_order::LeadingOrderModel;
pub use options::{ExternalSubmodel, ModelOptions, SeiOption};
pub use system::{
    BoundaryCondition, BoundaryConditionMap, BoundaryConditions, BoundaryKind, EquationMap, EquationSystem,
    SystemSummary,
};
