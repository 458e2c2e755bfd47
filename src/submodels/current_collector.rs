use super::Submodel;
use crate::error::Result;
use crate::parameters::BatteryParameters;
use crate::variables::names;
use crate::variables::VariableMap;
use std::sync::Arc;

/// Current collectors that carry the applied current uniformly.
#[derive(Debug, Clone)]
pub struct UniformCurrentCollector {
    param: Arc<BatteryParameters>,
}

impl UniformCurrentCollector {
    pub fn new(param: Arc<BatteryParameters>) -> Self {
        Self { param }
    }
}

impl Submodel for UniformCurrentCollector {
    fn name(&self) -> &str {
        "Uniform current collector"
    }

    fn get_fundamental_variables(&self) -> Result<VariableMap> {
        let mut variables = VariableMap::new();
        variables.insert(
            names::CURRENT_COLLECTOR_CURRENT_DENSITY.to_string(),
            self.param.current.clone(),
        );
        Ok(variables)
    }
}
