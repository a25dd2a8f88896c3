use std::path::PathBuf;

use allsat::SolverConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputFormat {
    Dimacs,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    Dpll,
    #[cfg(feature = "cadical")]
    Cadical,
}

pub struct Config {
    pub input:       Option<PathBuf>,
    pub format:      InputFormat,
    pub output:      Option<PathBuf>,
    pub all:         bool,
    pub max_models:  Option<usize>,
    pub return_code: bool,
    pub engine:      EngineKind,
    /// `variables` stays unset here when no `--vars` was given, the DIMACS
    /// header fills it in later.
    pub solver:      SolverConfig,
}
