//! Sample automata compiled into the binary.

use crate::parser::parse;
use crate::types::{Automaton, DfaError};

// File name and contents of every embedded definition
const AUTOMATON_SOURCES: [(&str, &str); 4] = [
    (
        "ends-with-zero.json",
        include_str!("../automata/ends-with-zero.json"),
    ),
    ("even-ones.json", include_str!("../automata/even-ones.json")),
    (
        "divisible-by-three.json",
        include_str!("../automata/divisible-by-three.json"),
    ),
    ("plotted-ab.json", include_str!("../automata/plotted-ab.json")),
];

lazy_static::lazy_static! {
    static ref BUILTINS: Result<Vec<Automaton>, DfaError> = AUTOMATON_SOURCES
        .iter()
        .map(|(file, text)| parse(text.as_bytes()).map_err(|e| in_source(file, e)))
        .collect();
}

/// Prefixes a load failure with the embedded file it came from.
fn in_source(file: &str, error: DfaError) -> DfaError {
    match error {
        DfaError::ParseError(msg) => DfaError::ParseError(format!("{file}: {msg}")),
        DfaError::ValidationError(msg) => DfaError::ValidationError(format!("{file}: {msg}")),
        other => other,
    }
}

/// Read-only access to the built-in automata. They are parsed on first use.
pub struct AutomatonCatalog;

impl AutomatonCatalog {
    /// Returns every built-in automaton in catalog order, or the error that stopped one of
    /// them from loading.
    pub fn all() -> Result<&'static [Automaton], DfaError> {
        BUILTINS.as_deref().map_err(Clone::clone)
    }

    pub fn count() -> Result<usize, DfaError> {
        Ok(Self::all()?.len())
    }

    /// Get an automaton by its index
    pub fn get_by_index(index: usize) -> Result<&'static Automaton, DfaError> {
        Self::all()?
            .get(index)
            .ok_or_else(|| DfaError::NotFound(format!("index {index}")))
    }

    /// Get an automaton by its name
    pub fn get_by_name(name: &str) -> Result<&'static Automaton, DfaError> {
        Self::all()?
            .iter()
            .find(|automaton| automaton.name() == Some(name))
            .ok_or_else(|| DfaError::NotFound(format!("'{name}'")))
    }

    pub fn names() -> Result<Vec<&'static str>, DfaError> {
        Ok(Self::all()?
            .iter()
            .map(|automaton| automaton.name().unwrap_or_default())
            .collect())
    }

    /// Get summary information about an automaton by its index
    pub fn info(index: usize) -> Result<AutomatonInfo, DfaError> {
        let automaton = Self::get_by_index(index)?;

        Ok(AutomatonInfo {
            index,
            name: automaton.name().unwrap_or_default().to_string(),
            initial_state: automaton.initial_state().to_string(),
            state_count: automaton.states().len(),
            final_count: automaton.final_states().len(),
            transition_count: automaton.transition_count(),
        })
    }

    /// Returns the indices of the automata whose name contains `query`, ignoring case.
    pub fn search(query: &str) -> Result<Vec<usize>, DfaError> {
        let query = query.to_lowercase();

        Ok(Self::names()?
            .iter()
            .enumerate()
            .filter(|(_, name)| name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect())
    }

    /// Returns the embedded definition text, exactly as it was compiled in.
    pub fn text_by_index(index: usize) -> Result<&'static str, DfaError> {
        AUTOMATON_SOURCES
            .get(index)
            .map(|(_, text)| *text)
            .ok_or_else(|| DfaError::NotFound(format!("index {index}")))
    }
}

#[derive(Debug, Clone)]
pub struct AutomatonInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    pub final_count: usize,
    pub transition_count: usize,
}
