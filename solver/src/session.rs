use std::thread;

use async_std::channel;
use log::{debug, info, warn};

use crate::config::SolverConfig;
use crate::dpll::DpllEngine;
use crate::engine::{Engine, SATISFIABLE, UNKNOWN, UNSATISFIABLE};
use crate::error::{Error, Result};
use crate::ingest::{ingest, Formula};
use crate::sat_solution::{materialize, Model};

/// Outcome of a single engine run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    /// The propagation budget ran out before the engine could decide.
    Unknown,
    /// The engine answered with a code outside of the three defined outcomes.
    EngineError(i32),
}

impl Verdict {
    pub fn from_code(code: i32) -> Verdict {
        match code {
            SATISFIABLE => Verdict::Satisfiable,
            UNSATISFIABLE => Verdict::Unsatisfiable,
            UNKNOWN => Verdict::Unknown,
            other => Verdict::EngineError(other),
        }
    }
}

/// One engine, from creation over clause ingestion and search to teardown.
///
/// The engine is reset exactly once: by [`Session::close`], or when the
/// session is dropped.
#[derive(Debug)]
pub struct Session<E: Engine = DpllEngine> {
    engine: Option<E>,
    config: SolverConfig,
    last_verdict: Option<Verdict>,
}

impl Session<DpllEngine> {
    /// Opens a session on the embedded [`DpllEngine`].
    pub fn open<F: Formula + ?Sized>(formula: &F, config: SolverConfig) -> Result<Self> {
        Session::open_with(DpllEngine::new, formula, config)
    }
}

impl<E: Engine> Session<E> {
    /// Checks the shape of `formula`, creates the engine, configures it and
    /// ingests the formula. Any failure tears the engine down before returning.
    pub fn open_with<F, M>(make_engine: M, formula: &F, config: SolverConfig) -> Result<Self>
    where
        F: Formula + ?Sized,
        M: FnOnce() -> E,
    {
        formula.check_shape()?;

        let mut session = Session {
            engine: Some(make_engine()),
            config,
            last_verdict: None,
        };
        if let Err(error) = session.configure_and_ingest(formula) {
            debug!("opening session failed: {}", error);
            session.close();
            return Err(error);
        }
        Ok(session)
    }

    fn configure_and_ingest<F: Formula + ?Sized>(&mut self, formula: &F) -> Result<()> {
        let config = self.config;
        let engine = self.engine_mut()?;
        engine.set_verbosity(config.verbosity);
        if let Some(variables) = config.variables {
            engine.reserve(variables)?;
        }
        engine.set_propagation_limit(config.propagation_limit);

        ingest(&mut *engine, formula)?;

        if config.dumps_formula() {
            let mut dump = String::new();
            if engine.print_formula(&mut dump).is_ok() {
                info!("ingested formula:\n{}", dump);
            }
        }
        Ok(())
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.engine.is_some()
    }

    pub fn last_verdict(&self) -> Option<Verdict> {
        self.last_verdict
    }

    /// Current number of variables of the engine, 0 once closed.
    pub fn variables(&self) -> usize {
        self.engine.as_ref().map_or(0, Engine::variables)
    }

    pub(crate) fn engine_mut(&mut self) -> Result<&mut E> {
        self.engine.as_mut().ok_or(Error::Closed)
    }

    /// Runs the search with the configured propagation budget.
    ///
    /// This is the one call of the crate that may block for a long time. Use
    /// [`Session::run_detached`] to keep it off the calling thread.
    pub fn run(&mut self) -> Result<Verdict> {
        let limit = self.config.propagation_limit;
        self.run_with_budget(limit)
    }

    /// Runs the search with `limit` propagations, 0 meaning unbounded.
    pub fn run_with_budget(&mut self, limit: u64) -> Result<Verdict> {
        let engine = self.engine_mut()?;
        engine.set_propagation_limit(limit);
        let verdict = Verdict::from_code(engine.solve());
        if let Verdict::EngineError(code) = verdict {
            warn!("engine returned unexpected status code {}", code);
        }
        self.last_verdict = Some(verdict);
        Ok(verdict)
    }

    /// The assignment found by the last run, which must have been satisfiable.
    pub fn model(&self) -> Result<Model> {
        let engine = self.engine.as_ref().ok_or(Error::Closed)?;
        match self.last_verdict {
            Some(Verdict::Satisfiable) => Ok(materialize(engine)?),
            _ => Err(Error::NoModel),
        }
    }

    /// Adds a clause outside of ingestion. Invalidates the current model.
    pub(crate) fn add_clause<I: IntoIterator<Item = i32>>(&mut self, literals: I) -> Result<()> {
        let engine = self.engine_mut()?;
        for literal in literals {
            engine.add(literal);
        }
        engine.add(0);
        self.last_verdict = None;
        Ok(())
    }

    /// Tears the engine down. Closing a closed session does nothing.
    pub fn close(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.reset();
            self.last_verdict = None;
        }
    }
}

impl<E: Engine + Send + 'static> Session<E> {
    /// Runs [`Session::run`] on a dedicated worker thread and hands the session
    /// back together with the verdict once the search has finished.
    pub async fn run_detached(mut self) -> Result<(Self, Verdict)> {
        let (sender, receiver) = channel::bounded(1);
        thread::Builder::new()
            .name("allsat-search".to_string())
            .spawn(move || {
                let verdict = self.run();
                let _ = sender.try_send((self, verdict));
            })
            .map_err(|error| Error::Worker(error.to_string()))?;

        let (session, verdict) = receiver
            .recv()
            .await
            .map_err(|_| Error::Worker("search worker terminated without a verdict".to_string()))?;
        Ok((session, verdict?))
    }
}

impl<E: Engine> Drop for Session<E> {
    fn drop(&mut self) {
        self.close();
    }
}
