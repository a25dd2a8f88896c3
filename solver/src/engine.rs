use std::fmt;

use auto_impl::auto_impl;

use crate::error::AllocError;

/// Status code of a satisfiable run.
pub const SATISFIABLE: i32 = 10;
/// Status code of an unsatisfiable run.
pub const UNSATISFIABLE: i32 = 20;
/// Status code of a run that gave up, usually because its propagation budget ran out.
pub const UNKNOWN: i32 = 0;

/// The search procedure a [`crate::Session`] drives.
///
/// The interface follows IPASIR: clauses are streamed literal by literal and
/// terminated by `0`, [`Engine::solve`] answers with one of the status codes
/// above and [`Engine::value`] reads the assignment after a satisfiable run.
#[auto_impl(&mut, Box)]
pub trait Engine {
    /// Adds a literal to the clause under construction, `0` closes the clause.
    fn add(&mut self, literal: i32);

    /// Makes room for at least `variables` variables. The variable count never shrinks.
    fn reserve(&mut self, variables: usize) -> Result<(), AllocError>;

    fn set_verbosity(&mut self, level: u32);

    /// Bounds the number of propagations of the next [`Engine::solve`], 0 removes the bound.
    fn set_propagation_limit(&mut self, limit: u64);

    /// Runs the search. May take arbitrarily long unless a propagation limit is set.
    fn solve(&mut self) -> i32;

    /// `1` if `variable` is true in the current assignment, `-1` if false, `0` if unassigned.
    fn value(&self, variable: usize) -> i8;

    /// Largest variable index seen so far.
    fn variables(&self) -> usize;

    /// Writes the clauses added so far in DIMACS form. Engines that cannot
    /// reproduce their clauses write nothing.
    fn print_formula(&self, _out: &mut dyn fmt::Write) -> fmt::Result {
        Ok(())
    }

    /// Releases everything the engine owns. Nothing may be called afterwards.
    fn reset(&mut self);
}
