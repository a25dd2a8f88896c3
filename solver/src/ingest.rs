//! Validation and streaming of caller formulas into an [`Engine`].

use std::convert::TryFrom;

use serde_json::Value;

use crate::cnf::{CNFClause, CNFVar, CNF};
use crate::engine::Engine;
use crate::error::IngestError;

/// A literal as the caller handed it over, before validation.
enum RawLiteral {
    Integer(i64),
    TooLarge(String),
    Other(&'static str),
}

/// Integer-like values accepted as literals in typed formulas.
pub trait AsLiteral {
    fn as_literal(&self) -> i64;
}

macro_rules! as_literal_for_int {
    ($($ty:ty),*) => {
        $(impl AsLiteral for $ty {
            fn as_literal(&self) -> i64 {
                i64::from(*self)
            }
        })*
    };
}

as_literal_for_int!(i8, i16, i32, i64);

impl AsLiteral for isize {
    fn as_literal(&self) -> i64 {
        *self as i64
    }
}

impl AsLiteral for CNFVar {
    fn as_literal(&self) -> i64 {
        self.to_i64()
    }
}

/// A caller-side CNF representation that can be streamed into an engine.
pub trait Formula {
    /// Rejects values that are not a sequence of clauses at all.
    /// Called before any engine is created.
    fn check_shape(&self) -> Result<(), IngestError> {
        Ok(())
    }

    /// Forwards every clause to `engine`, each followed by the `0` terminator.
    fn ingest_into<E: Engine + ?Sized>(&self, engine: &mut E) -> Result<(), IngestError>;
}

/// Streams `formula` into `engine`.
///
/// On error the engine holds a prefix of the formula and must be discarded.
pub fn ingest<E, F>(engine: &mut E, formula: &F) -> Result<(), IngestError>
where
    E: Engine + ?Sized,
    F: Formula + ?Sized,
{
    formula.check_shape()?;
    formula.ingest_into(engine)
}

fn add_clause<E, I>(engine: &mut E, clause: usize, literals: I) -> Result<(), IngestError>
where
    E: Engine + ?Sized,
    I: IntoIterator<Item = RawLiteral>,
{
    for (position, literal) in literals.into_iter().enumerate() {
        let value = match literal {
            RawLiteral::Integer(value) => value,
            RawLiteral::TooLarge(value) => {
                return Err(IngestError::LiteralOutOfRange {
                    clause,
                    position,
                    value,
                })
            }
            RawLiteral::Other(found) => {
                return Err(IngestError::NotAnInteger {
                    clause,
                    position,
                    found,
                })
            }
        };
        if value == 0 {
            return Err(IngestError::ZeroLiteral { clause, position });
        }
        // i32::MIN has no negation
        let literal = match i32::try_from(value) {
            Ok(literal) if literal != i32::MIN => literal,
            _ => {
                return Err(IngestError::LiteralOutOfRange {
                    clause,
                    position,
                    value: value.to_string(),
                })
            }
        };
        engine.add(literal);
    }
    engine.add(0);
    Ok(())
}

/// A clause of a typed formula.
pub trait ClauseLiterals {
    type Literal: AsLiteral;

    fn literals(&self) -> &[Self::Literal];
}

impl<L: AsLiteral> ClauseLiterals for Vec<L> {
    type Literal = L;

    fn literals(&self) -> &[L] {
        self
    }
}

impl<L: AsLiteral> ClauseLiterals for [L] {
    type Literal = L;

    fn literals(&self) -> &[L] {
        self
    }
}

impl<'a, L: AsLiteral> ClauseLiterals for &'a [L] {
    type Literal = L;

    fn literals(&self) -> &[L] {
        self
    }
}

impl<L: AsLiteral, const N: usize> ClauseLiterals for [L; N] {
    type Literal = L;

    fn literals(&self) -> &[L] {
        self
    }
}

impl ClauseLiterals for CNFClause {
    type Literal = CNFVar;

    fn literals(&self) -> &[CNFVar] {
        &self.vars
    }
}

fn ingest_typed<'a, E, C>(
    engine: &mut E,
    clauses: impl Iterator<Item = &'a C>,
) -> Result<(), IngestError>
where
    E: Engine + ?Sized,
    C: ClauseLiterals + ?Sized + 'a,
{
    for (index, clause) in clauses.enumerate() {
        add_clause(
            engine,
            index,
            clause
                .literals()
                .iter()
                .map(|literal| RawLiteral::Integer(literal.as_literal())),
        )?;
    }
    Ok(())
}

impl<C: ClauseLiterals> Formula for [C] {
    fn ingest_into<E: Engine + ?Sized>(&self, engine: &mut E) -> Result<(), IngestError> {
        ingest_typed(engine, self.iter())
    }
}

impl<C: ClauseLiterals> Formula for Vec<C> {
    fn ingest_into<E: Engine + ?Sized>(&self, engine: &mut E) -> Result<(), IngestError> {
        ingest_typed(engine, self.iter())
    }
}

impl Formula for CNF {
    fn ingest_into<E: Engine + ?Sized>(&self, engine: &mut E) -> Result<(), IngestError> {
        ingest_typed(engine, self.clauses.iter())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn json_literal(item: &Value) -> RawLiteral {
    match item {
        Value::Number(number) => match number.as_i64() {
            Some(value) => RawLiteral::Integer(value),
            None if number.is_u64() => RawLiteral::TooLarge(number.to_string()),
            None => RawLiteral::Other(json_type_name(item)),
        },
        other => RawLiteral::Other(json_type_name(other)),
    }
}

/// Dynamically typed formulas, e.g. `[[1, -2], [3]]`.
impl Formula for Value {
    fn check_shape(&self) -> Result<(), IngestError> {
        match self {
            Value::Array(_) => Ok(()),
            _ => Err(IngestError::FormulaNotASequence),
        }
    }

    fn ingest_into<E: Engine + ?Sized>(&self, engine: &mut E) -> Result<(), IngestError> {
        let clauses = self.as_array().ok_or(IngestError::FormulaNotASequence)?;
        for (index, clause) in clauses.iter().enumerate() {
            let literals = clause
                .as_array()
                .ok_or(IngestError::NotASequence { clause: index })?;
            add_clause(engine, index, literals.iter().map(json_literal))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dpll::DpllEngine;

    fn dimacs_of(engine: &DpllEngine) -> String {
        let mut out = String::new();
        engine.print_formula(&mut out).unwrap();
        out
    }

    #[test]
    fn typed_clauses_are_terminated_once() {
        let mut engine = DpllEngine::new();
        ingest(&mut engine, &vec![vec![1, -2], vec![3]]).unwrap();
        assert_eq!(dimacs_of(&engine), "p cnf 3 2\n1 -2 0\n3 0\n");
    }

    #[test]
    fn zero_literal_is_rejected_with_position() {
        let mut engine = DpllEngine::new();
        let result = ingest(&mut engine, &vec![vec![4], vec![1, 0, 2]]);
        assert_eq!(
            result,
            Err(IngestError::ZeroLiteral {
                clause: 1,
                position: 1
            })
        );
    }

    #[test]
    fn out_of_range_literals_are_rejected() {
        let mut engine = DpllEngine::new();
        let result = ingest(&mut engine, &vec![vec![i64::from(i32::MAX) + 1]]);
        assert!(matches!(
            result,
            Err(IngestError::LiteralOutOfRange { clause: 0, position: 0, .. })
        ));
        let result = ingest(&mut DpllEngine::new(), &vec![vec![i32::MIN]]);
        assert!(matches!(result, Err(IngestError::LiteralOutOfRange { .. })));
    }

    #[test]
    fn cnf_literals_are_signed() {
        let mut engine = DpllEngine::new();
        let formula = CNF::single(vec![CNFVar::neg(2), CNFVar::pos(1)].into_iter().collect());
        ingest(&mut engine, &formula).unwrap();
        assert_eq!(dimacs_of(&engine), "p cnf 2 1\n-2 1 0\n");
    }

    #[test]
    fn json_formula_is_accepted() {
        let mut engine = DpllEngine::new();
        ingest(&mut engine, &json!([[1, -2], [], [3]])).unwrap();
        assert_eq!(dimacs_of(&engine), "p cnf 3 3\n1 -2 0\n0\n3 0\n");
    }

    #[test]
    fn json_top_level_must_be_a_sequence() {
        assert_eq!(
            json!({"clauses": []}).check_shape(),
            Err(IngestError::FormulaNotASequence)
        );
        assert_eq!(json!(7).check_shape(), Err(IngestError::FormulaNotASequence));
    }

    #[test]
    fn json_clause_must_be_a_sequence() {
        let mut engine = DpllEngine::new();
        let result = ingest(&mut engine, &json!([[1], 2]));
        assert_eq!(result, Err(IngestError::NotASequence { clause: 1 }));
    }

    #[test]
    fn json_literals_must_be_integers() {
        let mut engine = DpllEngine::new();
        assert_eq!(
            ingest(&mut engine, &json!([[1, "x"]])),
            Err(IngestError::NotAnInteger {
                clause: 0,
                position: 1,
                found: "string"
            })
        );
        let mut engine = DpllEngine::new();
        assert_eq!(
            ingest(&mut engine, &json!([[1.5]])),
            Err(IngestError::NotAnInteger {
                clause: 0,
                position: 0,
                found: "float"
            })
        );
        let mut engine = DpllEngine::new();
        assert!(matches!(
            ingest(&mut engine, &json!([[u64::MAX]])),
            Err(IngestError::LiteralOutOfRange { .. })
        ));
    }

    #[test]
    fn failure_leaves_a_prefix_in_the_engine() {
        let mut engine = DpllEngine::new();
        let _ = ingest(&mut engine, &json!([[1, 2], [3, null]]));
        assert_eq!(engine.num_clauses(), 1);
    }
}
