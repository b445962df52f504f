//! Extracts the plotting coordinates attached to states.

use crate::types::{Automaton, DfaError};

/// Returns one `(x, y)` pair per state, in declaration order.
///
/// Fails with `DfaError::MissingCoordinate` naming the first state without a position.
pub fn coordinates_of(automaton: &Automaton) -> Result<Vec<(f64, f64)>, DfaError> {
    automaton
        .states()
        .iter()
        .map(|state| {
            state
                .position
                .map(|position| (position.x, position.y))
                .ok_or_else(|| DfaError::MissingCoordinate(state.name.clone()))
        })
        .collect()
}
