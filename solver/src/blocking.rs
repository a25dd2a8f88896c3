use crate::engine::Engine;
use crate::error::{AllocError, Result};
use crate::session::Session;

/// Grows `scratch` to hold one polarity per variable, indexed from 1.
fn fit_scratch(scratch: &mut Vec<i8>, variables: usize) -> Result<(), AllocError> {
    let needed = variables.checked_add(1).ok_or(AllocError {
        requested: variables,
    })?;
    if scratch.len() < needed {
        scratch
            .try_reserve_exact(needed - scratch.len())
            .map_err(|_| AllocError {
                requested: variables,
            })?;
        scratch.resize(needed, 0);
    }
    Ok(())
}

/// Adds the clause excluding exactly the current model of `session`.
///
/// For every variable `i` the clause holds the literal that is false under
/// the model. `scratch` keeps the recorded polarities and is reused across
/// calls. With no variables the clause is empty and the next run is
/// unsatisfiable.
pub fn block_current_model<E: Engine>(session: &mut Session<E>, scratch: &mut Vec<i8>) -> Result<()> {
    let engine = session.engine_mut()?;
    let variables = engine.variables();
    fit_scratch(scratch, variables)?;
    for (variable, polarity) in scratch.iter_mut().enumerate().take(variables + 1).skip(1) {
        *polarity = if engine.value(variable) > 0 { 1 } else { -1 };
    }

    let blocking = scratch[1..=variables]
        .iter()
        .zip(1..)
        .map(|(&polarity, variable): (&i8, i32)| if polarity < 0 { variable } else { -variable });
    session.add_clause(blocking)
}
