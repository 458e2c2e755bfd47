//! Numerical consumer of assembled models: mesh, evaluator, per-variable
//! ledger and the state-vector discretisation.
pub mod discretisation;
pub mod evaluator;
pub mod ledger;
pub mod mesh;

pub use discretisation::{Discretisation, DiscretisedModel, MeshDiscretisation, StateSlot};
pub use evaluator::{EvaluationInputs, Evaluator};
pub use ledger::{Ledger, Value};
pub use mesh::{Mesh, MeshPoints};
