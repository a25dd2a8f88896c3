use std::fmt;
use std::fmt::Write as FmtWrite;
use std::iter::FromIterator;

use log::warn;
use rayon::prelude::*;

use crate::engine::Engine;
use crate::error::AllocError;

const MAX_LITERALS_PER_LINE: usize = 8;

/// A satisfying assignment: literal `i` if variable `i` is true, `-i` otherwise,
/// ordered by variable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Model(Vec<i32>);

impl Model {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn literals(&self) -> &[i32] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, i32> {
        self.0.iter()
    }

    /// Truth value of `variable`, `None` if it lies outside of the model.
    pub fn value(&self, variable: usize) -> Option<bool> {
        variable
            .checked_sub(1)
            .and_then(|index| self.0.get(index))
            .map(|literal| *literal > 0)
    }

    /// Whether `literal` is true under this model. Literals over unknown variables are false.
    pub fn holds(&self, literal: i32) -> bool {
        match self.value(literal.unsigned_abs() as usize) {
            Some(value) => value == (literal > 0),
            None => false,
        }
    }

    /// Checks every clause for a true literal.
    pub fn satisfies<C>(&self, clauses: &[C]) -> bool
    where
        C: AsRef<[i32]> + Sync,
    {
        clauses
            .par_iter()
            .all(|clause| clause.as_ref().iter().any(|&literal| self.holds(literal)))
    }

    pub fn into_vec(self) -> Vec<i32> {
        self.0
    }
}

impl From<Model> for Vec<i32> {
    fn from(model: Model) -> Self {
        model.0
    }
}

impl FromIterator<bool> for Model {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        Model(
            iter.into_iter()
                .zip(1..)
                .map(|(value, variable)| if value { variable } else { -variable })
                .collect(),
        )
    }
}

impl IntoIterator for Model {
    type Item = i32;
    type IntoIter = std::vec::IntoIter<i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Model {
    type Item = &'a i32;
    type IntoIter = std::slice::Iter<'a, i32>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", itertools::join(&self.0, ", "))
    }
}

/// Reads the current assignment of `engine` for variables `1..=engine.variables()`.
///
/// Only meaningful directly after a satisfiable run.
pub(crate) fn materialize<E: Engine + ?Sized>(engine: &E) -> Result<Model, AllocError> {
    let variables = engine.variables();
    let mut literals: Vec<i32> = Vec::new();
    literals
        .try_reserve_exact(variables)
        .map_err(|_| AllocError {
            requested: variables,
        })?;
    literals.extend(
        (1..=variables)
            .zip(1..)
            .map(|(variable, literal): (usize, i32)| match engine.value(variable) {
                0 => {
                    warn!("variable {} is unassigned in a satisfying assignment, reporting it false", variable);
                    -literal
                }
                value if value > 0 => literal,
                _ => -literal,
            }),
    );
    Ok(Model(literals))
}

/// Outcome of a one-shot solve.
#[derive(Clone, PartialEq, Eq)]
pub enum Solution {
    Satisfiable(Model),
    Unsatisfiable,
    Unknown,
}

impl Solution {
    pub fn is_sat(&self) -> bool {
        matches!(self, Solution::Satisfiable(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Solution::Unsatisfiable)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Solution::Unknown)
    }

    pub fn model(&self) -> Option<&Model> {
        match self {
            Solution::Satisfiable(model) => Some(model),
            _ => None,
        }
    }

    pub fn into_model(self) -> Option<Model> {
        match self {
            Solution::Satisfiable(model) => Some(model),
            _ => None,
        }
    }

    pub fn to_dimacs(&self) -> String {
        match self {
            Solution::Unsatisfiable => "s UNSATISFIABLE\n".to_string(),
            Solution::Unknown => "s UNKNOWN\n".to_string(),
            Solution::Satisfiable(model) => format!("s SATISFIABLE\n{}", model_to_dimacs(model)),
        }
    }
}

/// `v` lines of a model, terminated by `0`.
pub fn model_to_dimacs(model: &Model) -> String {
    let mut out = String::new();
    for chunk in model.literals().chunks(MAX_LITERALS_PER_LINE) {
        out.push('v');
        for literal in chunk {
            // writing into a String cannot fail
            let _ = write!(&mut out, " {}", literal);
        }
        out.push('\n');
    }
    out.push_str("v 0\n");
    out
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solution::Unsatisfiable => write!(f, "UNSAT"),
            Solution::Unknown => write!(f, "UNKNOWN"),
            Solution::Satisfiable(model) => write!(f, "{}", model),
        }
    }
}
