//! Parameter values injected into the model from outside.
//!
//! The assembly core never owns numeric parameter data: submodels build
//! expressions from `Parameter` leaves, and a `ParameterValues` set binds
//! those leaves to numbers when the system is processed or evaluated.
pub mod battery;
pub mod names;

pub use battery::{BatteryParameters, ElectrodeParameters, SeiParameters};

use crate::error::{ModelError, Result};
use crate::model::EquationSystem;
use crate::symbol::{NodeKind, Symbol};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterValues {
    values: IndexMap<String, f64>,
}

impl ParameterValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a flat JSON object of `name: value` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        self.values.insert(name.into(), value)
    }

    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Looks up a parameter as a scalar symbol.
    pub fn get_parameter(&self, name: &str) -> Result<Symbol> {
        self.value(name)
            .map(Symbol::scalar)
            .ok_or_else(|| ModelError::UnresolvedParameter { name: name.to_string() })
    }

    /// Replaces every `Parameter` leaf with its scalar value.
    pub fn process_symbol(&self, symbol: &Symbol) -> Result<Symbol> {
        symbol.replace(&mut |s| match s.kind() {
            NodeKind::Parameter { name } => self.get_parameter(name).map(Some),
            _ => Ok(None),
        })
    }

    /// Processes every equation value and boundary value of a system.
    /// Equation keys are state variables and are left untouched.
    pub fn process_system(&self, system: &EquationSystem) -> Result<EquationSystem> {
        system.try_map_values(|value| self.process_symbol(value))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for ParameterValues {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Subdomain;

    #[test]
    fn test_from_json_preserves_order() {
        let params = ParameterValues::from_json(r#"{"b": 2.0, "a": 1.0}"#).unwrap();
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(params.value("a"), Some(1.0));
    }

    #[test]
    fn test_from_json_rejects_non_numeric_values() {
        let err = ParameterValues::from_json(r#"{"a": "one"}"#).unwrap_err();
        assert!(matches!(err, ModelError::Configuration(_)));
    }

    #[test]
    fn test_process_symbol_substitutes_parameters() {
        let params: ParameterValues = [("k", 2.0)].into_iter().collect();
        let x = Symbol::spatial_variable("x", Subdomain::Separator);
        let e = x.div(&Symbol::parameter("k")).unwrap();
        let processed = params.process_symbol(&e).unwrap();
        assert_eq!(processed, x.div(&Symbol::scalar(2.0)).unwrap());
        assert_eq!(processed.domain(), e.domain());
    }

    #[test]
    fn test_missing_parameter_is_reported() {
        let params = ParameterValues::new();
        let err = params.process_symbol(&Symbol::parameter("k").exp()).unwrap_err();
        assert_eq!(err, ModelError::UnresolvedParameter { name: "k".into() });
    }
}
