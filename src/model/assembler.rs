//! Runs the staged submodel protocol and merges the results into one system.

use super::dependencies::DependencyReport;
use super::system::EquationSystem;
use crate::error::{ModelError, Result};
use crate::submodels::Submodel;
use crate::symbol::{Domain, Symbol};
use crate::variables::{names, Phase, VariableRegistry};
use indexmap::IndexMap;

/// Output of a successful assembly: the equation system for the discretiser,
/// the full registry for post-hoc inspection, and the dependency report.
#[derive(Debug)]
pub struct AssembledModel {
    pub name: String,
    pub system: EquationSystem,
    pub variables: VariableRegistry,
    pub dependencies: DependencyReport,
}

/// Ordered list of submodels plus assembly options.
///
/// Registration order is the phase-2 execution order and is therefore part of
/// the model definition: a submodel must be registered after every submodel
/// whose coupled variables it reads.
pub struct ModelAssembler {
    name: String,
    submodels: Vec<Box<dyn Submodel>>,
    external: Vec<(String, Domain)>,
    strict_ordering: bool,
}

impl ModelAssembler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            submodels: Vec::new(),
            external: Vec::new(),
            strict_ordering: false,
        }
    }

    pub fn add_submodel(&mut self, submodel: impl Submodel + 'static) -> &mut Self {
        self.submodels.push(Box::new(submodel));
        self
    }

    /// Binds `name` to a value supplied at evaluation time instead of the
    /// submodel-computed field.
    pub fn external_variable(&mut self, name: impl Into<String>, domain: impl Into<Domain>) -> &mut Self {
        self.external.push((name.into(), domain.into()));
        self
    }

    pub fn strict_ordering(&mut self, enabled: bool) -> &mut Self {
        self.strict_ordering = enabled;
        self
    }

    pub fn submodel_names(&self) -> Vec<&str> {
        self.submodels.iter().map(|s| s.name()).collect()
    }

    pub fn assemble(&self) -> Result<AssembledModel> {
        let mut registry = VariableRegistry::new();

        // Phase 1: fundamental variables. No reads, so order only matters for
        // which submodel is reported first on a duplicate.
        let mut owners: IndexMap<Symbol, String> = IndexMap::new();
        for submodel in &self.submodels {
            log::debug!("[{}] fundamental variables: {}", self.name, submodel.name());
            registry.begin(submodel.name(), Phase::Fundamental);
            let variables = submodel.get_fundamental_variables()?;
            for value in variables.values() {
                for state in value.state_variables() {
                    match owners.get(&state) {
                        Some(owner) if owner != submodel.name() => {
                            return Err(ModelError::DuplicateStateVariable {
                                name: state.to_string(),
                                first: owner.clone(),
                                second: submodel.name().to_string(),
                            });
                        }
                        Some(_) => {}
                        None => {
                            owners.insert(state, submodel.name().to_string());
                        }
                    }
                }
            }
            registry.update(variables);
            registry.end();
        }

        // External fields replace whatever phase 1 produced and stay fixed
        // through phase 2.
        for (name, symbol) in self.external_symbols() {
            registry.pin(names::average(&name), symbol.average());
            registry.pin(name, symbol);
        }

        // Phase 2: coupled variables, strictly in registration order.
        for submodel in &self.submodels {
            log::debug!("[{}] coupled variables: {}", self.name, submodel.name());
            registry.begin(submodel.name(), Phase::Coupled);
            submodel.get_coupled_variables(&mut registry)?;
            registry.end();
        }

        if self.strict_ordering {
            DependencyReport::from_access_log(self.submodel_names(), &registry.access_log())
                .check_stale_reads()?;
        }

        // Phase 3: equations and boundary conditions.
        let mut system = EquationSystem::new(owners.keys().cloned().collect());
        for submodel in &self.submodels {
            log::debug!("[{}] equations: {}", self.name, submodel.name());
            registry.begin(submodel.name(), Phase::Equations);
            for (key, value) in submodel.set_rhs(&registry)? {
                system.insert_rhs(key, value)?;
            }
            for (key, value) in submodel.set_algebraic(&registry)? {
                system.insert_algebraic(key, value)?;
            }
            for (key, conditions) in submodel.set_boundary_conditions(&registry)? {
                system.insert_boundary_conditions(key, conditions)?;
            }
            registry.end();
        }

        // Phase 4: initial conditions.
        for submodel in &self.submodels {
            registry.begin(submodel.name(), Phase::InitialConditions);
            for (key, value) in submodel.set_initial_conditions(&registry)? {
                system.insert_initial_condition(key, value)?;
            }
            registry.end();
        }

        system.check_complete()?;

        let dependencies = DependencyReport::from_access_log(self.submodel_names(), &registry.access_log());
        log::info!(
            "[{}] assembled: {} submodels, {} state variables, {} rhs, {} algebraic, {} variables",
            self.name,
            self.submodels.len(),
            system.state_variables().len(),
            system.rhs().len(),
            system.algebraic().len(),
            registry.len()
        );

        Ok(AssembledModel {
            name: self.name.clone(),
            system,
            variables: registry,
            dependencies,
        })
    }

    fn external_symbols(&self) -> Vec<(String, Symbol)> {
        self.external
            .iter()
            .map(|(name, domain)| (name.clone(), Symbol::external_variable(name.as_str(), domain.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ModelContext;
    use crate::model::EquationMap;
    use crate::symbol::Subdomain;
    use crate::variables::{AccessKind, VariableMap};
    use std::sync::Arc;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// Owns `a` (separator field) and `b` (scalar), both with dynamics.
    struct Pair {
        ctx: Arc<ModelContext>,
    }

    impl Pair {
        fn a(&self) -> Symbol {
            self.ctx.state_variable("a", Subdomain::Separator)
        }
        fn b(&self) -> Symbol {
            self.ctx.state_variable("b", Domain::empty())
        }
    }

    impl Submodel for Pair {
        fn name(&self) -> &str {
            "pair"
        }

        fn get_fundamental_variables(&self) -> Result<VariableMap> {
            let mut variables = VariableMap::new();
            variables.insert("a".to_string(), self.a());
            variables.insert("b".to_string(), self.b());
            Ok(variables)
        }

        fn set_rhs(&self, _variables: &VariableRegistry) -> Result<EquationMap> {
            let mut rhs = EquationMap::new();
            rhs.insert(self.a(), self.b().neg());
            rhs.insert(self.b(), Symbol::scalar(1.0));
            Ok(rhs)
        }

        fn set_initial_conditions(&self, _variables: &VariableRegistry) -> Result<EquationMap> {
            let mut initial = EquationMap::new();
            initial.insert(self.a(), Symbol::scalar(0.0));
            initial.insert(self.b(), Symbol::scalar(2.0));
            Ok(initial)
        }
    }

    /// Reads a name in phase 2 and writes a derived one.
    struct Reader {
        reads: &'static str,
        writes: &'static str,
        name: &'static str,
    }

    impl Submodel for Reader {
        fn name(&self) -> &str {
            self.name
        }

        fn get_coupled_variables(&self, variables: &mut VariableRegistry) -> Result<()> {
            let value = variables.get(self.reads)?;
            variables.insert(self.writes, value.exp());
            Ok(())
        }
    }

    #[test]
    fn test_single_submodel_yields_exact_keys() {
        init_logging();
        let ctx = Arc::new(ModelContext::new());
        let pair = Pair { ctx: ctx.clone() };
        let (a, b) = (pair.a(), pair.b());
        let mut assembler = ModelAssembler::new("pair model");
        assembler.add_submodel(pair);

        let model = assembler.assemble().unwrap();
        let rhs_keys: Vec<&Symbol> = model.system.rhs().keys().collect();
        let ic_keys: Vec<&Symbol> = model.system.initial_conditions().keys().collect();
        assert_eq!(rhs_keys, vec![&a, &b]);
        assert_eq!(ic_keys, vec![&a, &b]);
        assert!(model.system.algebraic().is_empty());
        assert_eq!(model.system.state_variables(), &[a, b]);
    }

    #[test]
    fn test_read_of_unwritten_name_fails_with_key_not_found() {
        let mut assembler = ModelAssembler::new("broken");
        assembler.add_submodel(Pair { ctx: Arc::new(ModelContext::new()) });
        assembler.add_submodel(Reader { reads: "never written", writes: "x", name: "reader" });
        let err = assembler.assemble().unwrap_err();
        assert_eq!(err, ModelError::KeyNotFound { name: "never written".into() });
    }

    #[test]
    fn test_registration_order_is_execution_order() {
        let first = Reader { reads: "b", writes: "c", name: "first" };
        let second = Reader { reads: "c", writes: "d", name: "second" };

        let mut good = ModelAssembler::new("good");
        good.add_submodel(Pair { ctx: Arc::new(ModelContext::new()) });
        good.add_submodel(first);
        good.add_submodel(second);
        let model = good.assemble().unwrap();
        assert_eq!(model.dependencies.dependencies_of("second"), vec!["first"]);
        assert_eq!(model.dependencies.dependencies_of("first"), vec!["pair"]);

        let mut bad = ModelAssembler::new("bad");
        bad.add_submodel(Pair { ctx: Arc::new(ModelContext::new()) });
        bad.add_submodel(Reader { reads: "c", writes: "d", name: "second" });
        bad.add_submodel(Reader { reads: "b", writes: "c", name: "first" });
        assert_eq!(bad.assemble().unwrap_err(), ModelError::KeyNotFound { name: "c".into() });
    }

    #[test]
    fn test_duplicate_state_variable_is_rejected() {
        struct Named(&'static str, Arc<ModelContext>);
        impl Submodel for Named {
            fn name(&self) -> &str {
                self.0
            }
            fn get_fundamental_variables(&self) -> Result<VariableMap> {
                let mut variables = VariableMap::new();
                variables.insert(format!("{} view", self.0), self.1.state_variable("shared", Domain::empty()));
                Ok(variables)
            }
        }

        let ctx = Arc::new(ModelContext::new());
        let mut assembler = ModelAssembler::new("duplicate");
        assembler.add_submodel(Named("one", ctx.clone()));
        assembler.add_submodel(Named("two", ctx));
        let err = assembler.assemble().unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateStateVariable { name: "shared".into(), first: "one".into(), second: "two".into() }
        );
    }

    #[test]
    fn test_state_without_equation_is_incomplete() {
        struct Lonely(Arc<ModelContext>);
        impl Submodel for Lonely {
            fn name(&self) -> &str {
                "lonely"
            }
            fn get_fundamental_variables(&self) -> Result<VariableMap> {
                let mut variables = VariableMap::new();
                variables.insert("z".to_string(), self.0.state_variable("z", Domain::empty()));
                Ok(variables)
            }
        }
        let mut assembler = ModelAssembler::new("incomplete");
        assembler.add_submodel(Lonely(Arc::new(ModelContext::new())));
        let err = assembler.assemble().unwrap_err();
        assert!(matches!(err, ModelError::IncompleteSystem { ref name, .. } if name == "z"));
    }

    #[test]
    fn test_strict_ordering_flags_stale_read() {
        let mut assembler = ModelAssembler::new("stale");
        assembler.add_submodel(Pair { ctx: Arc::new(ModelContext::new()) });
        assembler.add_submodel(Reader { reads: "b", writes: "c", name: "early" });
        assembler.add_submodel(Reader { reads: "a", writes: "b", name: "late" });

        // Trusted by default.
        assert!(assembler.assemble().is_ok());

        assembler.strict_ordering(true);
        let err = assembler.assemble().unwrap_err();
        assert_eq!(
            err,
            ModelError::OrderingViolation { reader: "early".into(), writer: "late".into(), variable: "b".into() }
        );
    }

    #[test]
    fn test_external_variable_survives_coupled_overwrite() {
        init_logging();
        let mut assembler = ModelAssembler::new("external");
        assembler.add_submodel(Pair { ctx: Arc::new(ModelContext::new()) });
        assembler.add_submodel(Reader { reads: "b", writes: "T", name: "clobber" });
        assembler.add_submodel(Reader { reads: "T", writes: "U", name: "derived" });
        assembler.external_variable("T", Domain::whole_cell());

        let model = assembler.assemble().unwrap();
        let t = Symbol::external_variable("T", Domain::whole_cell());
        assert_eq!(model.variables.get("T").unwrap(), t);
        assert!(model.variables.contains("Average t"));
        assert_eq!(model.variables.writer_of("T"), None);

        // Submodels after the overwriting one still read the external field.
        let u = model.variables.get("U").unwrap();
        assert_eq!(u, t.exp());
        assert_eq!(u.external_variables().into_iter().collect::<Vec<_>>(), vec!["T".to_string()]);
        assert_eq!(model.dependencies.dependencies_of("derived"), Vec::<&str>::new());
    }

    #[test]
    fn test_initial_condition_reads_are_logged_in_their_own_phase() {
        struct Seeded(Arc<ModelContext>);
        impl Submodel for Seeded {
            fn name(&self) -> &str {
                "seeded"
            }
            fn get_fundamental_variables(&self) -> Result<VariableMap> {
                let mut variables = VariableMap::new();
                variables.insert("z".to_string(), self.0.state_variable("z", Domain::empty()));
                variables.insert("z0".to_string(), Symbol::scalar(1.5));
                Ok(variables)
            }
            fn set_rhs(&self, variables: &VariableRegistry) -> Result<EquationMap> {
                let mut rhs = EquationMap::new();
                rhs.insert(variables.get("z")?, Symbol::scalar(0.0));
                Ok(rhs)
            }
            fn set_initial_conditions(&self, variables: &VariableRegistry) -> Result<EquationMap> {
                let mut initial = EquationMap::new();
                initial.insert(self.0.state_variable("z", Domain::empty()), variables.get("z0")?);
                Ok(initial)
            }
        }

        let mut assembler = ModelAssembler::new("seeded");
        assembler.add_submodel(Seeded(Arc::new(ModelContext::new())));
        let model = assembler.assemble().unwrap();
        let reads: Vec<(String, Phase)> = model
            .variables
            .access_log()
            .into_iter()
            .filter(|a| a.kind == AccessKind::Read)
            .map(|a| (a.variable, a.phase))
            .collect();
        assert_eq!(
            reads,
            vec![("z".to_string(), Phase::Equations), ("z0".to_string(), Phase::InitialConditions)]
        );
    }
}
