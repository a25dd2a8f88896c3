//! SAT solving sessions and lazy enumeration of all models of a CNF formula.
//!
//! ```ignore
//! use allsat::{enumerate, solve, SolverConfig};
//!
//! let formula = vec![vec![1, 2], vec![-1, -2]];
//! let solution = solve(&formula, SolverConfig::default())?;
//! for model in enumerate(&formula, SolverConfig::default())? {
//!     println!("{}", model?);
//! }
//! ```

/// Errors of ingestion, sessions and enumeration
pub mod error;
/// Options applied when opening a session
pub mod config;
/// The interface of the search engines
pub mod engine;
/// The CNF representation of a formula
pub mod cnf;
/// Validation and streaming of formulas into engines
pub mod ingest;
/// Engine lifecycle and verdicts
pub mod session;
/// Models and one-shot solutions
mod sat_solution;
/// Exclusion of found models
pub mod blocking;
/// The resumable model generator
pub mod enumerator;
/// Module that contains the embedded DPLL engine
mod dpll;
/// Module containing the engine backed by CaDiCaL.
#[cfg(feature = "cadical")]
mod cadical_engine;
#[cfg(test)]
mod testing;

pub use cnf::{CNFClause, CNFVar, CNF};
pub use config::SolverConfig;
pub use dpll::{DpllEngine, SearchStats};
pub use engine::Engine;
pub use enumerator::{Enumerator, EnumeratorState};
pub use error::{AllocError, DimacsError, Error, IngestError, Result};
pub use ingest::Formula;
pub use sat_solution::{model_to_dimacs, Model, Solution};
pub use session::{Session, Verdict};
#[cfg(feature = "cadical")]
pub use cadical_engine::CadicalEngine;

fn solution_of<E: Engine>(session: &Session<E>, verdict: Verdict) -> Result<Solution> {
    match verdict {
        Verdict::Satisfiable => Ok(Solution::Satisfiable(session.model()?)),
        Verdict::Unsatisfiable => Ok(Solution::Unsatisfiable),
        Verdict::Unknown => Ok(Solution::Unknown),
        Verdict::EngineError(code) => Err(Error::Engine(code)),
    }
}

/// Solves `formula` once on the embedded engine.
pub fn solve<F: Formula + ?Sized>(formula: &F, config: SolverConfig) -> Result<Solution> {
    solve_with(DpllEngine::new, formula, config)
}

/// Solves `formula` once on the engine built by `make_engine`.
pub fn solve_with<E, F, M>(make_engine: M, formula: &F, config: SolverConfig) -> Result<Solution>
where
    E: Engine,
    F: Formula + ?Sized,
    M: FnOnce() -> E,
{
    let mut session = Session::open_with(make_engine, formula, config)?;
    let verdict = session.run()?;
    let solution = solution_of(&session, verdict);
    session.close();
    solution
}

/// Like [`solve_with`], but the search runs on a worker thread.
pub async fn solve_detached<E, F, M>(
    make_engine: M,
    formula: &F,
    config: SolverConfig,
) -> Result<Solution>
where
    E: Engine + Send + 'static,
    F: Formula + ?Sized,
    M: FnOnce() -> E,
{
    let session = Session::open_with(make_engine, formula, config)?;
    let (mut session, verdict) = session.run_detached().await?;
    let solution = solution_of(&session, verdict);
    session.close();
    solution
}

/// Enumerates all models of `formula` on the embedded engine.
pub fn enumerate<F: Formula + ?Sized>(formula: &F, config: SolverConfig) -> Result<Enumerator> {
    enumerate_with(DpllEngine::new, formula, config)
}

/// Enumerates all models of `formula` on the engine built by `make_engine`.
pub fn enumerate_with<E, F, M>(
    make_engine: M,
    formula: &F,
    config: SolverConfig,
) -> Result<Enumerator<E>>
where
    E: Engine,
    F: Formula + ?Sized,
    M: FnOnce() -> E,
{
    Ok(Enumerator::new(Session::open_with(make_engine, formula, config)?))
}
