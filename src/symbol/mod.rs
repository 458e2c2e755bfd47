//! The symbolic expression core: domain-tagged, immutable expression trees.
pub mod domain;
pub mod node;
mod arithmetic;
mod composite;
mod simplify;

// Re-export key types for convenient access
pub use domain::{Domain, Subdomain};
pub use node::{BinaryOp, NodeKind, Symbol, UnaryOp, VariableId};
