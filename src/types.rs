//! This module defines the core data structures and types used throughout the automaton
//! simulator, including the automaton itself, execution verdicts, trace steps, and error types.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use thiserror::Error;

/// Index of a state inside [`Automaton::states`].
pub type StateId = usize;

/// A 2-D position attached to a state for external plotting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

/// A single state of an automaton.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    /// The unique identifier of the state.
    pub name: String,
    /// Optional plotting position. Carries no meaning during execution.
    pub position: Option<Coordinate>,
}

/// Controls how strictly the alphabet is enforced while loading a definition.
///
/// - `Normal` (default): a transition on a symbol missing from a declared alphabet
///   is reported as a [`Warning`].
/// - `Strict`: the same situation fails the load with a validation error.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    /// Alphabet violations are warnings.
    #[default]
    Normal,
    /// Alphabet violations are errors.
    Strict,
}

/// Non-fatal findings produced while validating a definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A transition uses a symbol that the declared alphabet does not contain.
    SymbolOutsideAlphabet { state: String, symbol: char },
    /// States that can never be entered from the initial state.
    UnreachableStates(Vec<String>),
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::SymbolOutsideAlphabet { state, symbol } => write!(
                f,
                "Transition from state '{state}' uses symbol '{symbol}' which is not in the alphabet"
            ),
            Warning::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {states:?}")
            }
        }
    }
}

/// A validated deterministic finite automaton.
///
/// Built once by the loader and never mutated afterwards. Transitions are stored as a
/// single `(state, symbol) -> state` table regardless of the shape the definition used.
#[derive(Debug, Clone, PartialEq)]
pub struct Automaton {
    pub(crate) name: Option<String>,
    pub(crate) mode: Mode,
    pub(crate) states: Vec<State>,
    pub(crate) index: HashMap<String, StateId>,
    pub(crate) alphabet: BTreeSet<char>,
    pub(crate) transitions: HashMap<(StateId, char), StateId>,
    pub(crate) initial: StateId,
    pub(crate) finals: BTreeSet<StateId>,
    pub(crate) warnings: Vec<Warning>,
}

impl Automaton {
    /// Returns the optional name of the automaton.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the alphabet enforcement mode the definition was loaded with.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Returns the states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Looks up a state's index by its name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    /// Returns the name of the state at `id`, or `None` if `id` is out of range.
    pub fn state_name(&self, id: StateId) -> Option<&str> {
        self.states.get(id).map(|state| state.name.as_str())
    }

    /// Name lookup for ids that came from this automaton's own tables.
    pub(crate) fn name_of(&self, id: StateId) -> &str {
        &self.states[id].name
    }

    /// Returns the set of symbols known to the automaton: the declared alphabet
    /// plus every symbol used by a transition.
    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Returns the index of the initial state.
    pub fn initial_id(&self) -> StateId {
        self.initial
    }

    /// Returns the name of the initial state.
    pub fn initial_state(&self) -> &str {
        self.name_of(self.initial)
    }

    /// Returns the names of the final states in declaration order.
    pub fn final_states(&self) -> Vec<&str> {
        self.finals.iter().map(|&id| self.name_of(id)).collect()
    }

    /// Checks whether the state at `id` is final.
    pub fn is_final(&self, id: StateId) -> bool {
        self.finals.contains(&id)
    }

    /// Returns the destination for `(state, symbol)`, if one is defined.
    pub fn transition(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// Returns the number of defined `(state, symbol)` pairs.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Iterates over every transition as `(from, symbol, to)` using state names.
    /// The order is unspecified.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, char, &str)> + '_ {
        self.transitions
            .iter()
            .map(|(&(from, symbol), &to)| (self.name_of(from), symbol, self.name_of(to)))
    }

    /// Returns the non-fatal findings collected while the definition was validated.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}

/// Why an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Rejection {
    /// The whole input was consumed but the automaton stopped in a non-final state.
    NotFinal { state: String },
    /// No transition was defined for `symbol` in `state`; `position` is the index
    /// of that symbol in the input.
    Stuck {
        state: String,
        symbol: char,
        position: usize,
    },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::NotFinal { state } => write!(f, "ended in non-final state '{state}'"),
            Rejection::Stuck {
                state,
                symbol,
                position,
            } => write!(
                f,
                "no transition from state '{state}' on symbol '{symbol}' at position {position}"
            ),
        }
    }
}

/// The outcome of running an input through an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    /// Returns the rejection reason, if any.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(reason) => Some(reason),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "Accepted"),
            Verdict::Rejected(_) => write!(f, "Rejected"),
        }
    }
}

/// Represents the outcome of a single engine step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// One symbol was consumed and execution continues.
    Continue,
    /// Execution is over.
    Halt(Verdict),
}

/// One consumed symbol in an execution trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStep<'a> {
    /// Index of the symbol in the input.
    pub position: usize,
    pub symbol: char,
    pub from: &'a str,
    pub to: &'a str,
}

/// Represents the errors that can occur while loading or using an automaton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DfaError {
    /// The definition bytes are not a structurally valid document.
    #[error("Definition parsing error: {0}")]
    ParseError(String),
    /// The definition decoded but is semantically inconsistent.
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// A state has no coordinate, so the automaton cannot be plotted.
    #[error("State '{0}' has no coordinate")]
    MissingCoordinate(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// A lookup by name or index matched nothing.
    #[error("Automaton not found: {0}")]
    NotFound(String),
    /// An operation needed the current automaton but none has been loaded.
    #[error("No automaton loaded")]
    NoAutomatonLoaded,
}

impl From<serde_json::Error> for DfaError {
    fn from(error: serde_json::Error) -> Self {
        DfaError::ParseError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_string(&Mode::Strict).unwrap();
        assert_eq!(json, "\"Strict\"");

        let mode: Mode = serde_json::from_str("\"Normal\"").unwrap();
        assert_eq!(mode, Mode::Normal);
        assert_eq!(Mode::default(), Mode::Normal);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Accepted.to_string(), "Accepted");

        let rejected = Verdict::Rejected(Rejection::NotFinal {
            state: "q0".to_string(),
        });
        assert_eq!(rejected.to_string(), "Rejected");
        assert!(!rejected.is_accepted());
        assert!(rejected
            .rejection()
            .unwrap()
            .to_string()
            .contains("non-final state 'q0'"));
    }

    #[test]
    fn test_stuck_rejection_display() {
        let reason = Rejection::Stuck {
            state: "q1".to_string(),
            symbol: '2',
            position: 3,
        };

        let msg = reason.to_string();
        assert!(msg.contains("'q1'"));
        assert!(msg.contains("'2'"));
        assert!(msg.contains("position 3"));
    }

    #[test]
    fn test_error_display() {
        let error = DfaError::ValidationError("No initial state".to_string());

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("validation error"));
        assert!(error_msg.contains("No initial state"));

        let error = DfaError::MissingCoordinate("q3".to_string());
        assert_eq!(error.to_string(), "State 'q3' has no coordinate");
    }

    #[test]
    fn test_serde_error_becomes_parse_error() {
        let err = serde_json::from_str::<Mode>("{").unwrap_err();
        assert!(matches!(DfaError::from(err), DfaError::ParseError(_)));
    }
}
