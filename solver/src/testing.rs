//! Engine doubles for unit tests.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::dpll::DpllEngine;
use crate::engine::Engine;
use crate::error::AllocError;

/// Shared counter of engine resets.
#[derive(Clone, Debug, Default)]
pub(crate) struct Resets(Rc<Cell<usize>>);

impl Resets {
    pub(crate) fn count(&self) -> usize {
        self.0.get()
    }
}

/// A [`DpllEngine`] that records resets and can misreport its status.
#[derive(Debug)]
pub(crate) struct CountingEngine {
    inner: DpllEngine,
    resets: Resets,
    status: Option<i32>,
    variables: Option<usize>,
    pub(crate) added: Vec<i32>,
}

impl CountingEngine {
    pub(crate) fn new(resets: &Resets) -> Self {
        CountingEngine {
            inner: DpllEngine::new(),
            resets: resets.clone(),
            status: None,
            variables: None,
            added: Vec::new(),
        }
    }

    /// Every solve answers `status` instead of searching.
    pub(crate) fn with_status(resets: &Resets, status: i32) -> Self {
        CountingEngine {
            status: Some(status),
            ..CountingEngine::new(resets)
        }
    }

    /// Claims `variables` variables, so every buffer sized by it is too large.
    pub(crate) fn with_variables(resets: &Resets, variables: usize) -> Self {
        CountingEngine {
            variables: Some(variables),
            ..CountingEngine::new(resets)
        }
    }
}

impl Engine for CountingEngine {
    fn add(&mut self, literal: i32) {
        self.added.push(literal);
        self.inner.add(literal)
    }

    fn reserve(&mut self, variables: usize) -> Result<(), AllocError> {
        self.inner.reserve(variables)
    }

    fn set_verbosity(&mut self, level: u32) {
        self.inner.set_verbosity(level)
    }

    fn set_propagation_limit(&mut self, limit: u64) {
        self.inner.set_propagation_limit(limit)
    }

    fn solve(&mut self) -> i32 {
        match self.status {
            Some(status) => status,
            None => self.inner.solve(),
        }
    }

    fn value(&self, variable: usize) -> i8 {
        self.inner.value(variable)
    }

    fn variables(&self) -> usize {
        self.variables.unwrap_or_else(|| self.inner.variables())
    }

    fn print_formula(&self, out: &mut dyn fmt::Write) -> fmt::Result {
        self.inner.print_formula(out)
    }

    fn reset(&mut self) {
        self.resets.0.set(self.resets.0.get() + 1);
        self.inner.reset()
    }
}
