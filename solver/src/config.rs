/// Options applied to an engine when a [`crate::Session`] is opened.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Number of variables to pre-size the engine for. `None` leaves sizing to the engine.
    pub variables: Option<usize>,
    /// Engine verbosity. From 2 upwards the ingested formula is dumped to the log.
    pub verbosity: u32,
    /// Maximal number of propagations per run, 0 means unbounded.
    pub propagation_limit: u64,
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variables(mut self, variables: usize) -> Self {
        self.variables = Some(variables);
        self
    }

    pub fn with_verbosity(mut self, verbosity: u32) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_propagation_limit(mut self, limit: u64) -> Self {
        self.propagation_limit = limit;
        self
    }

    /// Whether the ingested formula should be written to the diagnostic log.
    pub fn dumps_formula(&self) -> bool {
        self.verbosity >= 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_unset_and_unbounded() {
        let config = SolverConfig::default();
        assert_eq!(config.variables, None);
        assert_eq!(config.verbosity, 0);
        assert_eq!(config.propagation_limit, 0);
        assert!(!config.dumps_formula());
    }

    #[test]
    fn builder_sets_fields() {
        let config = SolverConfig::new()
            .with_variables(12)
            .with_verbosity(2)
            .with_propagation_limit(1000);
        assert_eq!(config.variables, Some(12));
        assert!(config.dumps_formula());
        assert_eq!(config.propagation_limit, 1000);
    }
}
