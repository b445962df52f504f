//! This module converts an [`Automaton`] back into the flat definition layout, so that a
//! loaded automaton can be saved and reloaded with the same behavior.

use crate::parser::parse;
use crate::types::{Automaton, DfaError, Mode};
use serde::Serialize;
use std::collections::BTreeMap;

/// An automaton in the flat definition layout, ready to be serialized.
///
/// Transitions are keyed by state name then symbol. States that carry a position are
/// written as `{ "name", "x", "y" }` objects; the others as plain names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedAutomaton {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub mode: Mode,
    pub states: Vec<EncodedState>,
    pub alphabet: Vec<String>,
    pub transitions: BTreeMap<String, BTreeMap<String, String>>,
    pub initial_state: String,
    pub final_states: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EncodedState {
    Name(String),
    Plotted { name: String, x: f64, y: f64 },
}

/// Encodes an automaton into the flat definition layout.
///
/// # Arguments
///
/// * `automaton` - The automaton to encode.
///
/// # Returns
///
/// * `EncodedAutomaton` - The definition; transitions are ordered by state then symbol.
pub fn encode(automaton: &Automaton) -> EncodedAutomaton {
    let states = automaton
        .states()
        .iter()
        .map(|state| match state.position {
            Some(position) => EncodedState::Plotted {
                name: state.name.clone(),
                x: position.x,
                y: position.y,
            },
            None => EncodedState::Name(state.name.clone()),
        })
        .collect();

    let mut transitions: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
    for (from, symbol, to) in automaton.transitions() {
        transitions
            .entry(from.to_string())
            .or_default()
            .insert(symbol.to_string(), to.to_string());
    }

    EncodedAutomaton {
        name: automaton.name().map(str::to_string),
        mode: automaton.mode(),
        states,
        alphabet: automaton.alphabet().iter().map(char::to_string).collect(),
        transitions,
        initial_state: automaton.initial_state().to_string(),
        final_states: automaton
            .final_states()
            .into_iter()
            .map(str::to_string)
            .collect(),
    }
}

/// Encodes an automaton as pretty-printed JSON.
pub fn to_json(automaton: &Automaton) -> Result<String, DfaError> {
    Ok(serde_json::to_string_pretty(&encode(automaton))?)
}

/// Decodes a JSON definition back into an automaton. Equivalent to loading it.
pub fn decode(encoded: &str) -> Result<Automaton, DfaError> {
    parse(encoded.as_bytes())
}
