//! The shared variable registry and its key-naming convention.
pub mod names;
pub mod registry;

pub use registry::{Access, AccessKind, Phase, VariableMap, VariableRegistry};
