use crate::error::{ModelError, Result};
use crate::symbol::Symbol;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// Name -> field mapping produced by a single submodel phase.
pub type VariableMap = IndexMap<String, Symbol>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Fundamental,
    Coupled,
    Equations,
    InitialConditions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessKind {
    Read,
    Write,
}

/// One registry access made while a submodel phase was active.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Access {
    pub submodel: String,
    pub variable: String,
    pub kind: AccessKind,
    pub phase: Phase,
    /// For reads: the submodel that last wrote the variable, if any.
    pub writer: Option<String>,
}

/// The shared variable mapping accumulated during one assembly.
///
/// Entries keep their first insertion position; overwriting a key replaces
/// its value in place. Reads and writes made between `begin` and `end` are
/// recorded so the assembler can reconstruct who depended on whom.
///
/// Pinned names hold externally supplied fields; submodel writes to them are
/// dropped so every later read sees the external value.
#[derive(Debug, Default)]
pub struct VariableRegistry {
    variables: VariableMap,
    writers: HashMap<String, String>,
    pinned: HashSet<String>,
    active: Option<(String, Phase)>,
    log: RefCell<Vec<Access>>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    // --- Phase bookkeeping ---

    pub(crate) fn begin(&mut self, submodel: &str, phase: Phase) {
        self.active = Some((submodel.to_string(), phase));
    }

    pub(crate) fn end(&mut self) {
        self.active = None;
    }

    fn record(&self, variable: &str, kind: AccessKind) {
        if let Some((submodel, phase)) = &self.active {
            let writer = match kind {
                AccessKind::Read => self.writers.get(variable).cloned(),
                AccessKind::Write => None,
            };
            self.log.borrow_mut().push(Access {
                submodel: submodel.clone(),
                variable: variable.to_string(),
                kind,
                phase: *phase,
                writer,
            });
        }
    }

    // --- Reads ---

    /// Looks up a variable. A missing key is an ordering or configuration bug.
    pub fn get(&self, name: &str) -> Result<Symbol> {
        match self.variables.get(name) {
            Some(symbol) => {
                self.record(name, AccessKind::Read);
                Ok(symbol.clone())
            }
            None => Err(ModelError::KeyNotFound { name: name.to_string() }),
        }
    }

    /// Presence check. Not recorded as a dependency.
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    /// The submodel that last wrote `name`.
    pub fn writer_of(&self, name: &str) -> Option<&str> {
        self.writers.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Symbol)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn as_map(&self) -> &VariableMap {
        &self.variables
    }

    pub fn access_log(&self) -> Vec<Access> {
        self.log.borrow().clone()
    }

    // --- Writes ---

    pub fn is_pinned(&self, name: &str) -> bool {
        self.pinned.contains(name)
    }

    /// Inserts or overwrites one entry, returning the previous value.
    ///
    /// A write to a pinned name from inside a phase is ignored and returns `None`.
    pub fn insert(&mut self, name: impl Into<String>, symbol: Symbol) -> Option<Symbol> {
        let name = name.into();
        if self.pinned.contains(&name) {
            if let Some((submodel, _)) = &self.active {
                log::warn!("'{}' tried to overwrite external variable '{}'; keeping external value", submodel, name);
                return None;
            }
        }
        self.record(&name, AccessKind::Write);
        match &self.active {
            Some((submodel, _)) => {
                self.writers.insert(name.clone(), submodel.clone());
            }
            None => {
                self.writers.remove(&name);
            }
        }
        self.variables.insert(name, symbol)
    }

    /// Merges a mapping; later writes to an existing key overwrite it.
    pub fn update(&mut self, variables: VariableMap) {
        for (name, symbol) in variables {
            self.insert(name, symbol);
        }
    }

    /// Writes an entry that no submodel owns, such as an externally supplied field.
    pub(crate) fn insert_untracked(&mut self, name: impl Into<String>, symbol: Symbol) {
        let name = name.into();
        self.writers.remove(&name);
        self.variables.insert(name, symbol);
    }

    /// Binds `name` to a field that later submodel writes cannot replace.
    pub(crate) fn pin(&mut self, name: impl Into<String>, symbol: Symbol) {
        let name = name.into();
        self.pinned.insert(name.clone());
        self.insert_untracked(name, symbol);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Subdomain;

    fn sample() -> VariableMap {
        let x = Symbol::spatial_variable("x_n", Subdomain::NegativeElectrode);
        let mut map = VariableMap::new();
        map.insert("a".to_string(), Symbol::parameter("k").broadcast(Subdomain::Separator).unwrap());
        map.insert("b".to_string(), x.exp());
        map.insert("c".to_string(), Symbol::scalar(1.0));
        map
    }

    #[test]
    fn test_missing_key_names_the_variable() {
        let registry = VariableRegistry::new();
        let err = registry.get("Average negative electrode open circuit potential").unwrap_err();
        assert_eq!(
            err,
            ModelError::KeyNotFound {
                name: "Average negative electrode open circuit potential".into()
            }
        );
    }

    #[test]
    fn test_update_with_identical_mapping_is_idempotent() {
        let mut registry = VariableRegistry::new();
        registry.update(sample());
        let before: Vec<(String, Symbol)> = registry.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        registry.update(sample());
        let after: Vec<(String, Symbol)> = registry.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_overwrite_changes_only_that_key() {
        let mut registry = VariableRegistry::new();
        registry.update(sample());
        let mut patch = VariableMap::new();
        patch.insert("b".to_string(), Symbol::scalar(2.0));
        registry.update(patch);

        let expected = sample();
        assert_eq!(registry.get("a").unwrap(), expected["a"]);
        assert_eq!(registry.get("c").unwrap(), expected["c"]);
        assert_eq!(registry.get("b").unwrap(), Symbol::scalar(2.0));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_access_log_tracks_active_phase() {
        let mut registry = VariableRegistry::new();
        registry.begin("writer", Phase::Coupled);
        registry.insert("v", Symbol::scalar(1.0));
        registry.end();

        registry.begin("reader", Phase::Coupled);
        registry.get("v").unwrap();
        assert!(registry.contains("v"));
        registry.end();

        // Outside a phase nothing is logged.
        registry.get("v").unwrap();

        let log = registry.access_log();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].kind, AccessKind::Write);
        assert_eq!(log[1].submodel, "reader");
        assert_eq!(log[1].writer.as_deref(), Some("writer"));
        assert_eq!(registry.writer_of("v"), Some("writer"));
    }

    #[test]
    fn test_untracked_insert_clears_ownership() {
        let mut registry = VariableRegistry::new();
        registry.begin("thermal", Phase::Fundamental);
        registry.insert("T", Symbol::scalar(0.0));
        registry.end();
        registry.insert_untracked("T", Symbol::external_variable("T", Subdomain::Separator));
        assert_eq!(registry.writer_of("T"), None);
    }

    #[test]
    fn test_pinned_name_ignores_submodel_writes() {
        let external = Symbol::external_variable("T", Subdomain::Separator);
        let mut registry = VariableRegistry::new();
        registry.pin("T", external.clone());

        registry.begin("thermal", Phase::Coupled);
        assert_eq!(registry.insert("T", Symbol::scalar(300.0)), None);
        registry.end();

        assert!(registry.is_pinned("T"));
        assert_eq!(registry.get("T").unwrap(), external);
        assert_eq!(registry.writer_of("T"), None);
        assert!(registry.access_log().is_empty());
    }
}
