use log::{debug, info};

use crate::blocking::block_current_model;
use crate::dpll::DpllEngine;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::sat_solution::Model;
use crate::session::{Session, Verdict};

/// Where an [`Enumerator`] stands between two requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnumeratorState {
    /// Formula ingested, nothing searched yet.
    Created,
    /// A search is in progress.
    Running,
    /// The last request produced a model.
    Yielded,
    /// No further models exist, or the budget ran out.
    Exhausted,
    /// A fatal error occurred, every further request reports it again.
    Failed(Error),
    /// Closed by the caller before it was exhausted.
    Closed,
}

impl EnumeratorState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EnumeratorState::Exhausted | EnumeratorState::Failed(_) | EnumeratorState::Closed
        )
    }
}

/// Lazily produces every model of a formula exactly once.
///
/// After each model a blocking clause excluding it is added to the session,
/// so the next search has to find a different one. The session and the
/// scratch buffer are released as soon as the enumeration terminates, on
/// [`Enumerator::close`], or when the enumerator is dropped.
#[derive(Debug)]
pub struct Enumerator<E: Engine = DpllEngine> {
    session: Session<E>,
    scratch: Vec<i8>,
    state: EnumeratorState,
    yielded: usize,
    exhausted_by: Option<Verdict>,
}

impl<E: Engine> Enumerator<E> {
    pub fn new(session: Session<E>) -> Self {
        Enumerator {
            session,
            scratch: Vec::new(),
            state: EnumeratorState::Created,
            yielded: 0,
            exhausted_by: None,
        }
    }

    pub fn state(&self) -> &EnumeratorState {
        &self.state
    }

    /// Number of models produced so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// The verdict of the run that ended the enumeration.
    ///
    /// `Unsatisfiable` means every model has been produced. `Unknown` means the
    /// propagation budget ran out first and more models may exist.
    pub fn exhausted_by(&self) -> Option<Verdict> {
        self.exhausted_by
    }

    /// Searches for the next model.
    ///
    /// Returns `Ok(None)` once the models are exhausted (or the propagation
    /// budget ran out), and keeps doing so on every later call.
    pub fn next_model(&mut self) -> Result<Option<Model>> {
        match &self.state {
            EnumeratorState::Exhausted | EnumeratorState::Closed => return Ok(None),
            EnumeratorState::Failed(error) => return Err(error.clone()),
            EnumeratorState::Created | EnumeratorState::Running | EnumeratorState::Yielded => {}
        }

        self.state = EnumeratorState::Running;
        match self.step() {
            Ok(Some(model)) => {
                self.yielded += 1;
                debug!("model {}: {}", self.yielded, model);
                self.state = EnumeratorState::Yielded;
                Ok(Some(model))
            }
            Ok(None) => {
                info!(
                    "enumeration exhausted after {} models ({:?})",
                    self.yielded, self.exhausted_by
                );
                self.release(EnumeratorState::Exhausted);
                Ok(None)
            }
            Err(error) => {
                self.release(EnumeratorState::Failed(error.clone()));
                Err(error)
            }
        }
    }

    fn step(&mut self) -> Result<Option<Model>> {
        match self.session.run()? {
            Verdict::Satisfiable => {
                let model = self.session.model()?;
                block_current_model(&mut self.session, &mut self.scratch)?;
                Ok(Some(model))
            }
            verdict @ Verdict::Unsatisfiable | verdict @ Verdict::Unknown => {
                self.exhausted_by = Some(verdict);
                Ok(None)
            }
            Verdict::EngineError(code) => Err(Error::Engine(code)),
        }
    }

    fn release(&mut self, state: EnumeratorState) {
        self.session.close();
        self.scratch = Vec::new();
        self.state = state;
    }

    /// Stops the enumeration early and releases the session.
    pub fn close(&mut self) {
        if !self.state.is_terminal() {
            self.release(EnumeratorState::Closed);
        }
    }
}

impl<E: Engine> Iterator for Enumerator<E> {
    type Item = Result<Model>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_model().transpose()
    }
}
