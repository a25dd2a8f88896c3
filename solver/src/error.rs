use thiserror::Error;

/// Errors raised while streaming a formula into an engine.
///
/// Clause and literal positions are zero-based.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("formula must be a sequence of clauses")]
    FormulaNotASequence,
    #[error("clause {clause} must be a sequence of literals")]
    NotASequence { clause: usize },
    #[error("literal {position} of clause {clause} must be an integer, got {found}")]
    NotAnInteger {
        clause: usize,
        position: usize,
        found: &'static str,
    },
    #[error("literal {position} of clause {clause} is zero, expected a non-zero integer")]
    ZeroLiteral { clause: usize, position: usize },
    #[error("literal {value} at position {position} of clause {clause} does not fit into a 32-bit literal")]
    LiteralOutOfRange {
        clause: usize,
        position: usize,
        value: String,
    },
}

/// A fallible reservation could not be satisfied.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("out of memory while reserving space for {requested} variables")]
pub struct AllocError {
    pub requested: usize,
}

/// Errors surfaced by sessions, enumerators and the top-level entry points.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error(transparent)]
    OutOfMemory(#[from] AllocError),
    /// The engine answered with a status code outside of SAT / UNSAT / UNKNOWN.
    #[error("engine returned unexpected status code {0}")]
    Engine(i32),
    #[error("no satisfying assignment is available, the last run was not satisfiable")]
    NoModel,
    #[error("the session has already been closed")]
    Closed,
    #[error("search worker failed: {0}")]
    Worker(String),
}

/// Errors of [`crate::CNF::from_dimacs`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DimacsError {
    #[error("only CNF instances are supported")]
    NotCnf,
    #[error("could not parse DIMACS input: {0}")]
    Syntax(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
