//! Canonical spatial and state-variable handles for one model assembly.
//!
//! Submodels that refer to "the" inner SEI thickness or "the" electrolyte
//! concentration must all hold the same node, so handles are issued here by
//! name. A context lives exactly as long as one assembly run.

use crate::symbol::node::spatial_variable_for;
use crate::symbol::{Domain, Subdomain, Symbol, VariableId};
use indexmap::IndexMap;
use std::sync::{Mutex, PoisonError};

/// Through-cell coordinates, one per subdomain.
#[derive(Debug, Clone)]
pub struct SpatialVariables {
    pub x_n: Symbol,
    pub x_s: Symbol,
    pub x_p: Symbol,
}

impl SpatialVariables {
    fn new() -> Self {
        Self {
            x_n: spatial_variable_for(Subdomain::NegativeElectrode),
            x_s: spatial_variable_for(Subdomain::Separator),
            x_p: spatial_variable_for(Subdomain::PositiveElectrode),
        }
    }

    pub fn for_subdomain(&self, subdomain: Subdomain) -> &Symbol {
        match subdomain {
            Subdomain::NegativeElectrode => &self.x_n,
            Subdomain::Separator => &self.x_s,
            Subdomain::PositiveElectrode => &self.x_p,
        }
    }
}

#[derive(Debug)]
pub struct ModelContext {
    spatial: SpatialVariables,
    state_variables: Mutex<IndexMap<String, Symbol>>,
}

impl ModelContext {
    pub fn new() -> Self {
        Self {
            spatial: SpatialVariables::new(),
            state_variables: Mutex::new(IndexMap::new()),
        }
    }

    pub fn spatial(&self) -> &SpatialVariables {
        &self.spatial
    }

    /// Returns the state variable called `name`, creating it on first request.
    pub fn state_variable(&self, name: &str, domain: impl Into<Domain>) -> Symbol {
        let domain = domain.into();
        let mut handles = self.state_variables.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = handles.get(name) {
            if existing.domain() != &domain {
                log::warn!(
                    "State variable '{}' requested on {} but already defined on {}",
                    name,
                    domain,
                    existing.domain()
                );
            }
            return existing.clone();
        }
        let id = VariableId(handles.len() as u32);
        let handle = Symbol::state_variable(id, name, domain);
        handles.insert(name.to_string(), handle.clone());
        handle
    }

    /// Every handle issued so far, in creation order.
    pub fn state_variables(&self) -> Vec<Symbol> {
        let handles = self.state_variables.lock().unwrap_or_else(PoisonError::into_inner);
        handles.values().cloned().collect()
    }
}

impl Default for ModelContext {
    fn default() -> Self {
        Self::new()
    }
}
