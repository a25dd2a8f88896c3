use std::fmt;

use itertools::Itertools;
use log::debug;

use crate::engine::{Engine, SATISFIABLE, UNKNOWN, UNSATISFIABLE};
use crate::error::AllocError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VarValue {
    Pos,
    Neg,
    Free,
}

impl Default for VarValue {
    fn default() -> Self {
        VarValue::Free
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AssignmentType {
    Forced,
    Branching,
}

/// Used to store assignments made in the past, for undoing them with backtracking
#[derive(Clone, Copy, Debug)]
struct PrevAssignment {
    literal: i32,
    assignment_type: AssignmentType,
}

#[derive(Clone, Debug, Default)]
struct Variable {
    value: VarValue,
    pos_occ: Vec<usize>,
    neg_occ: Vec<usize>,
}

enum ClauseState {
    Satisfied,
    Unit(i32),
    Conflict,
    Open,
}

enum Propagation {
    Done,
    Conflict,
    BudgetExhausted,
}

/// Counters of the last [`DpllEngine::solve`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub decisions: u64,
    pub propagations: u64,
    pub conflicts: u64,
}

/// Incremental DPLL engine with chronological backtracking.
///
/// Clauses may be added between runs, every run starts the search from an
/// empty assignment. The propagation limit counts processed trail literals.
#[derive(Clone, Debug, Default)]
pub struct DpllEngine {
    variables: Vec<Variable>,
    clauses: Vec<Vec<i32>>,
    pending: Vec<i32>,
    has_empty_clause: bool,
    trail: Vec<PrevAssignment>,
    propagation_limit: u64,
    verbosity: u32,
    stats: SearchStats,
}

fn var_index(literal: i32) -> usize {
    literal.unsigned_abs() as usize - 1
}

impl DpllEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    fn ensure_variable(&mut self, variable: usize) {
        if self.variables.len() < variable {
            self.variables.resize_with(variable, Variable::default);
        }
    }

    fn finish_clause(&mut self) {
        let literals: Vec<i32> = self.pending.drain(..).unique().collect();
        let index = self.clauses.len();
        if literals.is_empty() {
            self.has_empty_clause = true;
        }
        for &literal in &literals {
            let variable = &mut self.variables[var_index(literal)];
            if literal > 0 {
                variable.pos_occ.push(index);
            } else {
                variable.neg_occ.push(index);
            }
        }
        self.clauses.push(literals);
    }

    fn literal_value(&self, literal: i32) -> Option<bool> {
        match self.variables[var_index(literal)].value {
            VarValue::Free => None,
            VarValue::Pos => Some(literal > 0),
            VarValue::Neg => Some(literal < 0),
        }
    }

    /// Clauses in which `literal` occurs.
    fn occurrences(&self, literal: i32) -> &[usize] {
        let variable = &self.variables[var_index(literal)];
        if literal > 0 {
            &variable.pos_occ
        } else {
            &variable.neg_occ
        }
    }

    fn clause_state(&self, index: usize) -> ClauseState {
        let mut free = 0;
        let mut last_free = 0;
        for &literal in &self.clauses[index] {
            match self.literal_value(literal) {
                Some(true) => return ClauseState::Satisfied,
                Some(false) => {}
                None => {
                    free += 1;
                    last_free = literal;
                }
            }
        }
        match free {
            0 => ClauseState::Conflict,
            1 => ClauseState::Unit(last_free),
            _ => ClauseState::Open,
        }
    }

    fn assign(&mut self, literal: i32, assignment_type: AssignmentType) {
        self.variables[var_index(literal)].value = if literal > 0 {
            VarValue::Pos
        } else {
            VarValue::Neg
        };
        self.trail.push(PrevAssignment {
            literal,
            assignment_type,
        });
    }

    fn clear_assignment(&mut self) {
        for variable in &mut self.variables {
            variable.value = VarValue::Free;
        }
        self.trail.clear();
    }

    /// Processes the trail from `head` on until it is fully propagated.
    fn propagate(&mut self, head: &mut usize) -> Propagation {
        while *head < self.trail.len() {
            if self.propagation_limit != 0 && self.stats.propagations >= self.propagation_limit {
                return Propagation::BudgetExhausted;
            }
            let literal = self.trail[*head].literal;
            *head += 1;
            self.stats.propagations += 1;

            let watched = self.occurrences(-literal).len();
            for k in 0..watched {
                let clause = self.occurrences(-literal)[k];
                match self.clause_state(clause) {
                    ClauseState::Unit(unit) => self.assign(unit, AssignmentType::Forced),
                    ClauseState::Conflict => return Propagation::Conflict,
                    ClauseState::Satisfied | ClauseState::Open => {}
                }
            }
        }
        Propagation::Done
    }

    /// Undoes assignments up to the most recent branching one and flips it.
    /// Returns the trail position propagation has to resume from.
    fn backtrack(&mut self) -> Option<usize> {
        while let Some(assignment) = self.trail.pop() {
            self.variables[var_index(assignment.literal)].value = VarValue::Free;
            if assignment.assignment_type == AssignmentType::Branching {
                let position = self.trail.len();
                self.assign(-assignment.literal, AssignmentType::Forced);
                return Some(position);
            }
        }
        None
    }

    fn pick_branching_variable(&self) -> Option<usize> {
        self.variables
            .iter()
            .position(|variable| variable.value == VarValue::Free)
            .map(|index| index + 1)
    }

    fn search(&mut self) -> i32 {
        self.clear_assignment();
        if self.has_empty_clause {
            return UNSATISFIABLE;
        }

        for index in 0..self.clauses.len() {
            match self.clause_state(index) {
                ClauseState::Unit(literal) => self.assign(literal, AssignmentType::Forced),
                ClauseState::Conflict => return UNSATISFIABLE,
                ClauseState::Satisfied | ClauseState::Open => {}
            }
        }

        let mut head = 0;
        loop {
            match self.propagate(&mut head) {
                Propagation::Done => match self.pick_branching_variable() {
                    None => return SATISFIABLE,
                    Some(variable) => {
                        self.stats.decisions += 1;
                        self.assign(-(variable as i32), AssignmentType::Branching);
                    }
                },
                Propagation::Conflict => {
                    self.stats.conflicts += 1;
                    match self.backtrack() {
                        Some(position) => head = position,
                        None => return UNSATISFIABLE,
                    }
                }
                Propagation::BudgetExhausted => return UNKNOWN,
            }
        }
    }
}

impl Engine for DpllEngine {
    fn add(&mut self, literal: i32) {
        if literal == 0 {
            self.finish_clause();
        } else {
            self.ensure_variable(literal.unsigned_abs() as usize);
            self.pending.push(literal);
        }
    }

    fn reserve(&mut self, variables: usize) -> Result<(), AllocError> {
        let additional = variables.saturating_sub(self.variables.len());
        self.variables
            .try_reserve_exact(additional)
            .map_err(|_| AllocError {
                requested: variables,
            })?;
        self.ensure_variable(variables);
        Ok(())
    }

    fn set_verbosity(&mut self, level: u32) {
        self.verbosity = level;
    }

    fn set_propagation_limit(&mut self, limit: u64) {
        self.propagation_limit = limit;
    }

    fn solve(&mut self) -> i32 {
        self.stats = SearchStats::default();
        let status = self.search();
        if self.verbosity > 0 {
            debug!(
                "dpll: status {} after {} decisions, {} propagations, {} conflicts",
                status, self.stats.decisions, self.stats.propagations, self.stats.conflicts
            );
        }
        status
    }

    fn value(&self, variable: usize) -> i8 {
        if variable == 0 {
            return 0;
        }
        match self.variables.get(variable - 1).map(|v| v.value) {
            Some(VarValue::Pos) => 1,
            Some(VarValue::Neg) => -1,
            Some(VarValue::Free) | None => 0,
        }
    }

    fn variables(&self) -> usize {
        self.variables.len()
    }

    fn print_formula(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        writeln!(out, "p cnf {} {}", self.variables.len(), self.clauses.len())?;
        for clause in &self.clauses {
            for literal in clause {
                write!(out, "{} ", literal)?;
            }
            writeln!(out, "0")?;
        }
        Ok(())
    }

    fn reset(&mut self) {
        *self = DpllEngine::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine_with(clauses: &[&[i32]]) -> DpllEngine {
        let mut engine = DpllEngine::new();
        for clause in clauses {
            for &literal in clause.iter() {
                engine.add(literal);
            }
            engine.add(0);
        }
        engine
    }

    fn satisfied(engine: &DpllEngine, clauses: &[&[i32]]) -> bool {
        clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&literal| i32::from(engine.value(literal.unsigned_abs() as usize)) * literal > 0)
        })
    }

    #[test]
    fn empty_formula_is_satisfiable() {
        let mut engine = DpllEngine::new();
        assert_eq!(engine.solve(), SATISFIABLE);
        assert_eq!(engine.variables(), 0);
    }

    #[test]
    fn empty_clause_is_unsatisfiable() {
        let mut engine = engine_with(&[&[1, 2], &[]]);
        assert_eq!(engine.solve(), UNSATISFIABLE);
    }

    #[test]
    fn contradicting_units() {
        let mut engine = engine_with(&[&[1], &[-1]]);
        assert_eq!(engine.solve(), UNSATISFIABLE);
    }

    #[test]
    fn finds_model_requiring_backtracking() {
        let clauses: &[&[i32]] = &[&[1, 2], &[1, -2], &[-1, 3], &[-3, 2, 4], &[-4, 2]];
        let mut engine = engine_with(clauses);
        assert_eq!(engine.solve(), SATISFIABLE);
        assert!(satisfied(&engine, clauses));
        assert!(engine.stats().conflicts > 0);
    }

    #[test]
    fn incremental_clauses_change_the_answer() {
        let mut engine = engine_with(&[&[1, 2]]);
        assert_eq!(engine.solve(), SATISFIABLE);
        engine.add(-1);
        engine.add(0);
        engine.add(-2);
        engine.add(0);
        assert_eq!(engine.solve(), UNSATISFIABLE);
    }

    #[test]
    fn variable_count_follows_largest_literal_and_reservation() {
        let mut engine = engine_with(&[&[3, -7]]);
        assert_eq!(engine.variables(), 7);
        engine.reserve(4).unwrap();
        assert_eq!(engine.variables(), 7);
        engine.reserve(10).unwrap();
        assert_eq!(engine.variables(), 10);
    }

    #[test]
    fn propagation_limit_gives_up() {
        // pigeonhole: 4 pigeons, 3 holes
        let mut clauses: Vec<Vec<i32>> = Vec::new();
        let var = |pigeon: i32, hole: i32| pigeon * 3 + hole + 1;
        for pigeon in 0..4 {
            clauses.push((0..3).map(|hole| var(pigeon, hole)).collect());
        }
        for hole in 0..3 {
            for a in 0..4 {
                for b in (a + 1)..4 {
                    clauses.push(vec![-var(a, hole), -var(b, hole)]);
                }
            }
        }
        let borrowed: Vec<&[i32]> = clauses.iter().map(Vec::as_slice).collect();
        let mut engine = engine_with(&borrowed);
        engine.set_propagation_limit(5);
        assert_eq!(engine.solve(), UNKNOWN);
        engine.set_propagation_limit(0);
        assert_eq!(engine.solve(), UNSATISFIABLE);
    }

    #[test]
    fn duplicate_literals_are_merged() {
        let mut engine = engine_with(&[&[2, 2, 2], &[-2, 1]]);
        assert_eq!(engine.solve(), SATISFIABLE);
        assert_eq!(engine.value(2), 1);
        assert_eq!(engine.value(1), 1);
    }

    #[test]
    fn prints_dimacs() {
        let engine = engine_with(&[&[1, -2], &[2]]);
        let mut out = String::new();
        engine.print_formula(&mut out).unwrap();
        assert_eq!(out, "p cnf 2 2\n1 -2 0\n2 0\n");
    }

    #[test]
    fn reset_releases_everything() {
        let mut engine = engine_with(&[&[1, 2]]);
        engine.reset();
        assert_eq!(engine.variables(), 0);
        assert_eq!(engine.num_clauses(), 0);
    }
}
