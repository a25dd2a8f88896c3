//! Naive reference used to check the solver on small formulas.

/// Largest variable mentioned in `formula`.
pub fn num_variables(formula: &[Vec<i32>]) -> usize {
    formula
        .iter()
        .flatten()
        .map(|literal| literal.unsigned_abs() as usize)
        .max()
        .unwrap_or(0)
}

pub fn check_valuation(formula: &[Vec<i32>], valuation: &[bool]) -> bool {
    formula.iter().all(|clause| {
        clause
            .iter()
            .any(|&literal| valuation[literal.unsigned_abs() as usize - 1] == (literal > 0))
    })
}

/// Counts the satisfying valuations over variables `1..=num_variables` by
/// trying every one of them.
pub fn count_models(formula: &[Vec<i32>], num_variables: usize) -> usize {
    let mut valuation = vec![false; num_variables];
    count(formula, 0, &mut valuation)
}

fn count(formula: &[Vec<i32>], change: usize, valuation: &mut Vec<bool>) -> usize {
    if change == valuation.len() {
        return check_valuation(formula, valuation) as usize;
    }
    valuation[change] = false;
    let without = count(formula, change + 1, valuation);
    valuation[change] = true;
    let with = count(formula, change + 1, valuation);
    valuation[change] = false;
    without + with
}
