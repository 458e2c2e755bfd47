use super::evaluator::{EvaluationInputs, Evaluator};
use crate::error::{ModelError, Result};
use crate::symbol::Symbol;
use crate::variables::VariableMap;
use indexmap::IndexMap;
use rayon::prelude::*;
use std::sync::Arc;

/// A numeric field: one number for domain-less quantities, or one value per
/// mesh cell (or face, for gradients).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(f64),
    Series(Arc<Vec<f64>>),
}

impl Value {
    pub fn series(values: Vec<f64>) -> Self {
        Value::Series(Arc::new(values))
    }

    pub fn len(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Series(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(s) => Some(*s),
            Value::Series(_) => None,
        }
    }

    #[inline(always)]
    pub fn get_at(&self, i: usize) -> f64 {
        match self {
            Value::Scalar(s) => *s,
            Value::Series(v) => v[i],
        }
    }

    /// Expands to exactly `n` values; a scalar is repeated.
    pub fn into_vec(self, n: usize) -> Result<Vec<f64>> {
        match self {
            Value::Scalar(s) => Ok(vec![s; n]),
            Value::Series(v) if v.len() == n => Ok(Arc::try_unwrap(v).unwrap_or_else(|shared| (*shared).clone())),
            Value::Series(v) => Err(ModelError::Evaluation(format!(
                "expected {} values, found {}",
                n,
                v.len()
            ))),
        }
    }

    pub(crate) fn map(&self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(s) => Value::Scalar(f(*s)),
            Value::Series(v) => Value::series(v.iter().copied().map(f).collect()),
        }
    }

    /// Element-wise combination; a scalar broadcasts against a series.
    pub(crate) fn zip_with(&self, other: &Value, f: impl Fn(f64, f64) -> Result<f64>) -> Result<Value> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b)?)),
            (Value::Scalar(_), Value::Series(v)) | (Value::Series(v), Value::Scalar(_)) => {
                let out = (0..v.len())
                    .map(|i| f(self.get_at(i), other.get_at(i)))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::series(out))
            }
            (Value::Series(a), Value::Series(b)) => {
                if a.len() != b.len() {
                    return Err(ModelError::Evaluation(format!(
                        "cannot combine series of length {} and {}",
                        a.len(),
                        b.len()
                    )));
                }
                let out = a.iter().zip(b.iter()).map(|(x, y)| f(*x, *y)).collect::<Result<Vec<_>>>()?;
                Ok(Value::series(out))
            }
        }
    }
}

/// Numeric values of every registry variable at one state.
///
/// Each entry keeps its own result, so one failing variable does not hide the
/// others.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    values: IndexMap<String, Result<Value>>,
}

impl Ledger {
    /// Evaluates all variables in parallel, preserving registry order.
    pub fn evaluate(variables: &VariableMap, evaluator: &Evaluator, inputs: &EvaluationInputs) -> Self {
        let entries: Vec<(&String, &Symbol)> = variables.iter().collect();
        let results: Vec<(String, Result<Value>)> = entries
            .par_iter()
            .map(|(name, symbol)| (name.to_string(), evaluator.evaluate(symbol, inputs)))
            .collect();
        let failures = results.iter().filter(|(_, r)| r.is_err()).count();
        if failures > 0 {
            log::debug!("ledger: {} of {} variables failed to evaluate", failures, results.len());
        }
        Self { values: results.into_iter().collect() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Result<Value>> {
        self.values.get(name)
    }

    pub fn value(&self, name: &str) -> Result<&Value> {
        match self.values.get(name) {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(e.clone()),
            None => Err(ModelError::KeyNotFound { name: name.to_string() }),
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &ModelError)> {
        self.values.iter().filter_map(|(k, v)| v.as_ref().err().map(|e| (k.as_str(), e)))
    }
}
