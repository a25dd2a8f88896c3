use std::fmt;
use std::iter::FromIterator;

use dimacs::parse_dimacs;
use itertools::Itertools;
use rustc_hash::FxHashSet;

use crate::error::DimacsError;

/// Type used for referencing logical variables
pub type VarId = usize;

/// Representation of logical formulae in CNF form
/// (conjunction of clauses)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CNF {
    /// Vector of inner clauses
    pub clauses: Vec<CNFClause>,
    /// Number of variables announced by the DIMACS header, or the largest
    /// variable seen when built in code
    pub num_variables: usize,
}

/// Representation of a clause (disjunction of variables)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CNFClause {
    /// Vector of inner variables
    pub vars: Vec<CNFVar>,
}

/// Logical variable
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct CNFVar {
    /// Identifier of a variable
    pub id: VarId,
    /// Variable is negated iff `sign == false`
    pub sign: bool,
}

impl CNF {
    /// Creates an empty CNF formula
    pub fn empty() -> CNF {
        CNF::default()
    }

    /// Creates a singleton CNF formula out of a single clause
    pub fn single(clause: CNFClause) -> CNF {
        let mut formula = CNF::empty();
        formula.push(clause);
        formula
    }

    /// Inserts a new clause into the formula
    pub fn push(&mut self, c: CNFClause) {
        self.num_variables = self.num_variables.max(c.max_var());
        self.clauses.push(c)
    }

    /// Concatenates two formulae
    pub fn extend(&mut self, c: CNF) {
        self.num_variables = self.num_variables.max(c.num_variables);
        self.clauses.extend(c.clauses)
    }

    /// Returns number of clauses in the formula
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Collects all variable identifiers that appear in the formula
    pub fn vars(&self) -> FxHashSet<VarId> {
        self.clauses
            .iter()
            .flat_map(|clause| clause.vars.iter().map(CNFVar::id))
            .unique()
            .collect()
    }

    /// Prints formula in DIMACS compatible form
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.num_variables, self.clauses.len());
        for clause in &self.clauses {
            for var in &clause.vars {
                out.push_str(&var.to_i32().to_string());
                out.push(' ');
            }
            out.push_str("0\n");
        }
        out
    }

    /// Parse DIMACS string into CNF structure
    pub fn from_dimacs(input: &str) -> Result<CNF, DimacsError> {
        match parse_dimacs(input) {
            Ok(dimacs::Instance::Cnf { num_vars, clauses }) => {
                let mut formula: CNF = clauses
                    .iter()
                    .map(|clause| {
                        clause
                            .lits()
                            .iter()
                            .map(|lit| CNFVar {
                                id: lit.var().to_u64() as VarId,
                                sign: lit.sign() == dimacs::Sign::Pos,
                            })
                            .collect()
                    })
                    .collect();
                formula.num_variables = formula.num_variables.max(num_vars as usize);
                Ok(formula)
            }
            Ok(_) => Err(DimacsError::NotCnf),
            Err(error) => Err(DimacsError::Syntax(format!("{:?}", error))),
        }
    }
}

impl FromIterator<CNFClause> for CNF {
    fn from_iter<I: IntoIterator<Item = CNFClause>>(iter: I) -> Self {
        let mut formula = CNF::empty();
        for clause in iter {
            formula.push(clause);
        }
        formula
    }
}

impl IntoIterator for CNF {
    type Item = CNFClause;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl CNFClause {
    /// Creates an empty CNF clause
    pub fn new() -> CNFClause {
        CNFClause { vars: vec![] }
    }

    /// Creates a CNF clause containing a single variable
    pub fn single(var: CNFVar) -> CNFClause {
        CNFClause { vars: vec![var] }
    }

    /// Adds a single variable into the clause
    pub fn push(&mut self, v: CNFVar) {
        self.vars.push(v)
    }

    /// Concatenates two clauses
    pub fn extend(&mut self, c: CNFClause) {
        self.vars.extend(c.vars)
    }

    fn max_var(&self) -> VarId {
        self.vars.iter().map(CNFVar::id).max().unwrap_or(0)
    }
}

impl AsRef<[CNFVar]> for CNFClause {
    fn as_ref(&self) -> &[CNFVar] {
        &self.vars
    }
}

impl FromIterator<CNFVar> for CNFClause {
    fn from_iter<I: IntoIterator<Item = CNFVar>>(iter: I) -> Self {
        CNFClause {
            vars: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CNFClause {
    type Item = CNFVar;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

impl CNFVar {
    /// Creates variable with given identifier and positivity
    pub fn new(id: VarId, sign: bool) -> CNFVar {
        CNFVar { id, sign }
    }

    /// Creates a positive variable with given identifier
    pub fn pos(id: VarId) -> CNFVar {
        CNFVar { id, sign: true }
    }

    /// Creates a negative variable with given identifier
    pub fn neg(id: VarId) -> CNFVar {
        CNFVar { id, sign: false }
    }

    /// Gets the identifier of a variable
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Checks if the variable is positive
    pub fn sign(&self) -> bool {
        self.sign
    }

    /// Converts to signed integer. The absolute value indicates
    /// the identifier and sign states for positivity.
    ///
    /// **NOTE** it is not integer-overflow friendly.
    pub fn to_i32(&self) -> i32 {
        if self.sign {
            self.id as i32
        } else {
            -(self.id as i32)
        }
    }

    /// Same as [`CNFVar::to_i32`] but wide enough for every identifier.
    pub fn to_i64(&self) -> i64 {
        if self.sign {
            self.id as i64
        } else {
            -(self.id as i64)
        }
    }
}

impl fmt::Display for CNF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.clauses {
            writeln!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Display for CNFClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.vars {
            write!(f, "({})  ", c)?;
        }
        Ok(())
    }
}

impl fmt::Display for CNFVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_i32())
    }
}
