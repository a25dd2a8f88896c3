use std::convert::TryFrom;

use log::{debug, warn};

use crate::engine::{Engine, SATISFIABLE, UNKNOWN, UNSATISFIABLE};
use crate::error::AllocError;

/// Status reported when the solver has already been torn down.
const RESET_STATUS: i32 = -1;

/// [`Engine`] backed by the CaDiCaL solver.
///
/// CaDiCaL has no propagation limit, the budget is applied as its
/// `decisions` limit instead.
pub struct CadicalEngine {
    solver: Option<cadical::Solver>,
    clause: Vec<i32>,
    /// Variables including the reserved ones.
    variables: usize,
    /// Largest variable actually handed to CaDiCaL.
    max_var: usize,
    propagation_limit: u64,
}

impl CadicalEngine {
    pub fn new() -> Self {
        CadicalEngine {
            solver: Some(cadical::Solver::new()),
            clause: Vec::new(),
            variables: 0,
            max_var: 0,
            propagation_limit: 0,
        }
    }
}

impl Default for CadicalEngine {
    fn default() -> Self {
        CadicalEngine::new()
    }
}

impl std::fmt::Debug for CadicalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CadicalEngine")
            .field("open", &self.solver.is_some())
            .field("variables", &self.variables)
            .field("propagation_limit", &self.propagation_limit)
            .finish()
    }
}

impl Engine for CadicalEngine {
    fn add(&mut self, literal: i32) {
        if literal != 0 {
            let variable = literal.unsigned_abs() as usize;
            self.variables = self.variables.max(variable);
            self.max_var = self.max_var.max(variable);
            self.clause.push(literal);
        } else if let Some(solver) = self.solver.as_mut() {
            solver.add_clause(self.clause.drain(..));
        }
    }

    fn reserve(&mut self, variables: usize) -> Result<(), AllocError> {
        // CaDiCaL grows its tables on demand
        self.variables = self.variables.max(variables);
        Ok(())
    }

    fn set_verbosity(&mut self, level: u32) {
        debug!("cadical: verbosity {} is not forwarded to the solver", level);
    }

    fn set_propagation_limit(&mut self, limit: u64) {
        self.propagation_limit = limit;
    }

    fn solve(&mut self) -> i32 {
        let solver = match self.solver.as_mut() {
            Some(solver) => solver,
            None => return RESET_STATUS,
        };
        if self.propagation_limit != 0 {
            let limit = i32::try_from(self.propagation_limit).unwrap_or(i32::MAX);
            if let Err(error) = solver.set_limit("decisions", limit) {
                warn!("cadical: could not set decision limit: {:?}", error);
            }
        }
        match solver.solve() {
            Some(true) => SATISFIABLE,
            Some(false) => UNSATISFIABLE,
            None => UNKNOWN,
        }
    }

    fn value(&self, variable: usize) -> i8 {
        let literal = match i32::try_from(variable) {
            // reserved variables CaDiCaL never saw are unassigned
            Ok(literal) if literal > 0 && variable <= self.max_var => literal,
            _ => return 0,
        };
        match self.solver.as_ref().and_then(|solver| solver.value(literal)) {
            Some(true) => 1,
            Some(false) => -1,
            None => 0,
        }
    }

    fn variables(&self) -> usize {
        self.variables
    }

    fn reset(&mut self) {
        self.solver = None;
        self.clause = Vec::new();
        self.max_var = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_and_reports_values() {
        let mut engine = CadicalEngine::new();
        for &literal in &[1, 2, 0, -1, 0] {
            engine.add(literal);
        }
        assert_eq!(engine.solve(), SATISFIABLE);
        assert_eq!(engine.value(1), -1);
        assert_eq!(engine.value(2), 1);
        engine.add(-2);
        engine.add(0);
        assert_eq!(engine.solve(), UNSATISFIABLE);
    }

    #[test]
    fn reserved_variables_stay_unassigned() {
        let mut engine = CadicalEngine::new();
        engine.reserve(4).unwrap();
        engine.add(1);
        engine.add(0);
        assert_eq!(engine.solve(), SATISFIABLE);
        assert_eq!(engine.variables(), 4);
        assert_eq!(engine.value(1), 1);
        assert_eq!(engine.value(3), 0);
        assert_eq!(engine.value(4), 0);
    }

    #[test]
    fn reset_engine_reports_an_error_status() {
        let mut engine = CadicalEngine::new();
        engine.reset();
        assert_eq!(engine.solve(), RESET_STATUS);
    }
}
