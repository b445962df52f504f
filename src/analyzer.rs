//! This module provides functions for analyzing normalized automaton definitions to detect
//! structural errors before an [`Automaton`](crate::Automaton) is built. This includes checks
//! for the initial state, undefined states, symbol shapes, determinism, and alphabet use.

use crate::parser::{parse_symbol, Definition};
use crate::types::{DfaError, Mode, Warning};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Represents the errors that can be found during the analysis of a definition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The definition declares no states at all.
    NoStates,
    /// The same state name is declared more than once.
    DuplicateStates(Vec<String>),
    /// Symbols that are not exactly one character long.
    InvalidSymbols(Vec<String>),
    /// Neither an `initialState` field nor an `is_initial` flag was found.
    NoInitialState,
    /// More than one distinct state is declared initial.
    MultipleInitialStates(Vec<String>),
    /// The initial state is not one of the declared states.
    InvalidInitialState(String),
    /// Final states that are not declared states.
    UndefinedFinalStates(Vec<String>),
    /// Transitions leaving states that are not declared.
    UndefinedSourceStates(Vec<String>),
    /// Transitions reference destination states that are not declared.
    UndefinedNextStates(Vec<String>),
    /// The same `(state, symbol)` pair leads to different destinations.
    NondeterministicTransitions(Vec<String>),
    /// In strict mode, transitions on symbols missing from the alphabet.
    SymbolsOutsideAlphabet(Vec<String>),
}

impl From<AnalysisError> for DfaError {
    /// Converts an `AnalysisError` into a `DfaError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NoStates => DfaError::ValidationError("No states defined".to_string()),
            AnalysisError::DuplicateStates(states) => {
                DfaError::ValidationError(format!("Duplicate states: {:?}", states))
            }
            AnalysisError::InvalidSymbols(symbols) => DfaError::ValidationError(format!(
                "Symbols must be exactly one character: {:?}",
                symbols
            )),
            AnalysisError::NoInitialState => {
                DfaError::ValidationError("No initial state declared".to_string())
            }
            AnalysisError::MultipleInitialStates(states) => {
                DfaError::ValidationError(format!("Multiple initial states: {:?}", states))
            }
            AnalysisError::InvalidInitialState(state) => {
                DfaError::ValidationError(format!("Invalid initial state: {}", state))
            }
            AnalysisError::UndefinedFinalStates(states) => {
                DfaError::ValidationError(format!("Undefined final states: {:?}", states))
            }
            AnalysisError::UndefinedSourceStates(states) => DfaError::ValidationError(format!(
                "Transitions leave undefined states: {:?}",
                states
            )),
            AnalysisError::UndefinedNextStates(states) => DfaError::ValidationError(format!(
                "Transitions reference undefined states: {:?}",
                states
            )),
            AnalysisError::NondeterministicTransitions(pairs) => DfaError::ValidationError(
                format!("Conflicting transitions: {:?}", pairs),
            ),
            AnalysisError::SymbolsOutsideAlphabet(symbols) => DfaError::ValidationError(format!(
                "Transitions use symbols outside the alphabet: {:?}",
                symbols
            )),
        }
    }
}

/// Analyzes a normalized [`Definition`] for structural and logical errors.
///
/// Every check runs and the first failure is reported. When all checks pass, the non-fatal
/// findings are returned so that the caller can surface them.
///
/// # Returns
///
/// * `Ok(Vec<Warning>)` if no errors are found.
/// * `Err(DfaError::ValidationError)` if any validation rule is violated.
pub fn analyze(definition: &Definition) -> Result<Vec<Warning>, DfaError> {
    let errors = [
        check_structure,
        check_symbols,
        check_initial_state,
        check_final_states,
        check_transition_states,
        check_determinism,
        check_alphabet,
    ]
    .iter()
    .filter_map(|f| f(definition).err())
    .collect::<Vec<_>>();

    if let Some(first_error) = errors.into_iter().next() {
        return Err(first_error.into());
    }

    let mut warnings = symbols_outside_alphabet(definition);
    let unreachable = unreachable_states(definition);
    if !unreachable.is_empty() {
        warnings.push(Warning::UnreachableStates(unreachable));
    }

    Ok(warnings)
}

fn declared_states(definition: &Definition) -> HashSet<&str> {
    definition
        .states
        .iter()
        .map(|state| state.name.as_str())
        .collect()
}

/// Checks that at least one state exists and that names are unique.
fn check_structure(definition: &Definition) -> Result<(), AnalysisError> {
    if definition.states.is_empty() {
        return Err(AnalysisError::NoStates);
    }

    let mut seen = HashSet::new();
    let duplicates = definition
        .states
        .iter()
        .filter(|state| !seen.insert(state.name.as_str()))
        .map(|state| state.name.clone())
        .collect::<BTreeSet<_>>();

    if !duplicates.is_empty() {
        return Err(AnalysisError::DuplicateStates(
            duplicates.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that every alphabet entry and transition key is a single character.
fn check_symbols(definition: &Definition) -> Result<(), AnalysisError> {
    let invalid = definition
        .alphabet
        .iter()
        .chain(definition.rules.iter().map(|rule| &rule.symbol))
        .filter(|symbol| parse_symbol(symbol).is_none())
        .cloned()
        .collect::<BTreeSet<_>>();

    if !invalid.is_empty() {
        return Err(AnalysisError::InvalidSymbols(invalid.into_iter().collect()));
    }

    Ok(())
}

/// Checks that exactly one state is declared initial and that it exists.
///
/// The top-level `initialState` field and per-state `is_initial` flags are both
/// declarations. They may agree on the same state; anything else is ambiguous.
fn check_initial_state(definition: &Definition) -> Result<(), AnalysisError> {
    let mut candidates: Vec<&str> = Vec::new();
    for name in definition
        .initial_state
        .iter()
        .chain(definition.flagged_initial.iter())
    {
        if !candidates.contains(&name.as_str()) {
            candidates.push(name);
        }
    }

    match candidates.as_slice() {
        [] => Err(AnalysisError::NoInitialState),
        [single] => {
            if declared_states(definition).contains(single) {
                Ok(())
            } else {
                Err(AnalysisError::InvalidInitialState(single.to_string()))
            }
        }
        many => Err(AnalysisError::MultipleInitialStates(
            many.iter().map(|name| name.to_string()).collect(),
        )),
    }
}

fn check_final_states(definition: &Definition) -> Result<(), AnalysisError> {
    let states = declared_states(definition);
    let undefined = definition
        .final_states
        .iter()
        .filter(|name| !states.contains(name.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>();

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedFinalStates(
            undefined.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that every transition starts and ends in a declared state.
fn check_transition_states(definition: &Definition) -> Result<(), AnalysisError> {
    let states = declared_states(definition);

    let sources = definition
        .rules
        .iter()
        .filter(|rule| !states.contains(rule.from.as_str()))
        .map(|rule| rule.from.clone())
        .collect::<BTreeSet<_>>();

    if !sources.is_empty() {
        return Err(AnalysisError::UndefinedSourceStates(
            sources.into_iter().collect(),
        ));
    }

    let targets = definition
        .rules
        .iter()
        .filter(|rule| !states.contains(rule.to.as_str()))
        .map(|rule| rule.to.clone())
        .collect::<BTreeSet<_>>();

    if !targets.is_empty() {
        return Err(AnalysisError::UndefinedNextStates(
            targets.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that each `(state, symbol)` pair has at most one destination.
/// Repeating an identical rule is allowed.
fn check_determinism(definition: &Definition) -> Result<(), AnalysisError> {
    let mut table: HashMap<(&str, &str), &str> = HashMap::new();
    let mut conflicts = BTreeSet::new();

    for rule in &definition.rules {
        let key = (rule.from.as_str(), rule.symbol.as_str());
        match table.get(&key) {
            Some(&existing) if existing != rule.to => {
                conflicts.insert(format!(
                    "{} --{}--> {{{}, {}}}",
                    rule.from, rule.symbol, existing, rule.to
                ));
            }
            Some(_) => {}
            None => {
                table.insert(key, &rule.to);
            }
        }
    }

    if !conflicts.is_empty() {
        return Err(AnalysisError::NondeterministicTransitions(
            conflicts.into_iter().collect(),
        ));
    }

    Ok(())
}

/// In strict mode, checks that every transition symbol belongs to the alphabet.
fn check_alphabet(definition: &Definition) -> Result<(), AnalysisError> {
    if definition.mode != Mode::Strict {
        return Ok(());
    }

    let alphabet = definition
        .alphabet
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();

    let outside = definition
        .rules
        .iter()
        .filter(|rule| !alphabet.contains(rule.symbol.as_str()))
        .map(|rule| rule.symbol.clone())
        .collect::<BTreeSet<_>>();

    if !outside.is_empty() {
        return Err(AnalysisError::SymbolsOutsideAlphabet(
            outside.into_iter().collect(),
        ));
    }

    Ok(())
}

/// In normal mode, reports transitions on symbols missing from a declared alphabet.
///
/// An omitted alphabet is inferred from the transitions and produces no warnings.
fn symbols_outside_alphabet(definition: &Definition) -> Vec<Warning> {
    if definition.mode != Mode::Normal || definition.alphabet.is_empty() {
        return Vec::new();
    }

    let alphabet = definition
        .alphabet
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>();

    let mut seen = HashSet::new();
    definition
        .rules
        .iter()
        .filter(|rule| !alphabet.contains(rule.symbol.as_str()))
        .filter_map(|rule| {
            let symbol = parse_symbol(&rule.symbol)?;
            seen.insert((rule.from.as_str(), symbol))
                .then(|| Warning::SymbolOutsideAlphabet {
                    state: rule.from.clone(),
                    symbol,
                })
        })
        .collect()
}

/// Finds the declared states that cannot be reached from the initial state, in
/// declaration order.
fn unreachable_states(definition: &Definition) -> Vec<String> {
    let Some(initial) = definition
        .initial_state
        .as_deref()
        .or(definition.flagged_initial.first().map(String::as_str))
    else {
        return Vec::new();
    };

    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for rule in &definition.rules {
        edges.entry(&rule.from).or_default().push(&rule.to);
    }

    let mut reachable = HashSet::from([initial]);
    let mut queue = VecDeque::from([initial]);
    while let Some(state) = queue.pop_front() {
        for &next in edges.get(state).into_iter().flatten() {
            if reachable.insert(next) {
                queue.push_back(next);
            }
        }
    }

    definition
        .states
        .iter()
        .filter(|state| !reachable.contains(state.name.as_str()))
        .map(|state| state.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_definition, Rule};
    use crate::types::State;

    fn state(name: &str) -> State {
        State {
            name: name.to_string(),
            position: None,
        }
    }

    fn rule(from: &str, symbol: &str, to: &str) -> Rule {
        Rule {
            from: from.to_string(),
            symbol: symbol.to_string(),
            to: to.to_string(),
        }
    }

    fn create_definition() -> Definition {
        Definition {
            name: None,
            mode: Mode::Normal,
            states: vec![state("q0"), state("q1")],
            alphabet: vec!["0".to_string(), "1".to_string()],
            rules: vec![
                rule("q0", "0", "q1"),
                rule("q0", "1", "q0"),
                rule("q1", "0", "q1"),
                rule("q1", "1", "q0"),
            ],
            initial_state: Some("q0".to_string()),
            flagged_initial: vec![],
            final_states: vec!["q1".to_string()],
        }
    }

    fn validation_message(definition: &Definition) -> String {
        match analyze(definition) {
            Err(DfaError::ValidationError(msg)) => msg,
            other => panic!("Expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_definition() {
        let warnings = analyze(&create_definition()).unwrap();
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_no_states() {
        let mut definition = create_definition();
        definition.states.clear();
        definition.rules.clear();
        definition.initial_state = None;
        definition.final_states.clear();

        assert_eq!(check_structure(&definition), Err(AnalysisError::NoStates));
        assert!(validation_message(&definition).contains("No states"));
    }

    #[test]
    fn test_duplicate_states() {
        let mut definition = create_definition();
        definition.states.push(state("q1"));

        assert_eq!(
            check_structure(&definition),
            Err(AnalysisError::DuplicateStates(vec!["q1".to_string()]))
        );
    }

    #[test]
    fn test_no_initial_state() {
        let mut definition = create_definition();
        definition.initial_state = None;

        assert_eq!(
            check_initial_state(&definition),
            Err(AnalysisError::NoInitialState)
        );
        assert!(validation_message(&definition).contains("No initial state"));
    }

    #[test]
    fn test_two_flagged_initial_states() {
        let mut definition = create_definition();
        definition.initial_state = None;
        definition.flagged_initial = vec!["q0".to_string(), "q1".to_string()];

        assert_eq!(
            check_initial_state(&definition),
            Err(AnalysisError::MultipleInitialStates(vec![
                "q0".to_string(),
                "q1".to_string()
            ]))
        );
    }

    #[test]
    fn test_field_and_flag_must_agree() {
        let mut definition = create_definition();
        definition.flagged_initial = vec!["q0".to_string()];
        assert!(check_initial_state(&definition).is_ok());

        definition.flagged_initial = vec!["q1".to_string()];
        assert!(matches!(
            check_initial_state(&definition),
            Err(AnalysisError::MultipleInitialStates(_))
        ));
    }

    #[test]
    fn test_invalid_initial_state() {
        let mut definition = create_definition();
        definition.initial_state = Some("missing".to_string());

        assert_eq!(
            check_initial_state(&definition),
            Err(AnalysisError::InvalidInitialState("missing".to_string()))
        );
    }

    #[test]
    fn test_undefined_final_state() {
        let mut definition = create_definition();
        definition.final_states.push("q9".to_string());

        assert_eq!(
            check_final_states(&definition),
            Err(AnalysisError::UndefinedFinalStates(vec!["q9".to_string()]))
        );
    }

    #[test]
    fn test_dangling_destination() {
        let mut definition = create_definition();
        definition.rules.push(rule("q1", "2", "q7"));

        assert_eq!(
            check_transition_states(&definition),
            Err(AnalysisError::UndefinedNextStates(vec!["q7".to_string()]))
        );
        assert!(validation_message(&definition).contains("q7"));
    }

    #[test]
    fn test_undefined_source() {
        let mut definition = create_definition();
        definition.rules.push(rule("ghost", "0", "q0"));

        assert_eq!(
            check_transition_states(&definition),
            Err(AnalysisError::UndefinedSourceStates(vec![
                "ghost".to_string()
            ]))
        );
    }

    #[test]
    fn test_multi_character_symbol() {
        let mut definition = create_definition();
        definition.rules.push(rule("q0", "01", "q1"));

        assert_eq!(
            check_symbols(&definition),
            Err(AnalysisError::InvalidSymbols(vec!["01".to_string()]))
        );
    }

    #[test]
    fn test_conflicting_transitions() {
        let mut definition = create_definition();
        definition.rules.push(rule("q0", "0", "q0"));

        assert!(matches!(
            check_determinism(&definition),
            Err(AnalysisError::NondeterministicTransitions(_))
        ));

        // An identical repeat is not a conflict
        let mut definition = create_definition();
        definition.rules.push(rule("q0", "0", "q1"));
        assert!(check_determinism(&definition).is_ok());
    }

    #[test]
    fn test_symbol_outside_alphabet_warns_in_normal_mode() {
        let mut definition = create_definition();
        definition.rules.push(rule("q1", "2", "q1"));

        let warnings = analyze(&definition).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::SymbolOutsideAlphabet {
                state: "q1".to_string(),
                symbol: '2'
            }]
        );
    }

    #[test]
    fn test_symbol_outside_alphabet_fails_in_strict_mode() {
        let mut definition = create_definition();
        definition.mode = Mode::Strict;
        definition.rules.push(rule("q1", "2", "q1"));

        assert_eq!(
            check_alphabet(&definition),
            Err(AnalysisError::SymbolsOutsideAlphabet(vec!["2".to_string()]))
        );
    }

    #[test]
    fn test_missing_alphabet_is_inferred() {
        let mut definition = create_definition();
        definition.alphabet.clear();

        assert!(analyze(&definition).unwrap().is_empty());
    }

    #[test]
    fn test_unreachable_states_warning() {
        let mut definition = create_definition();
        definition.states.push(state("island"));

        let warnings = analyze(&definition).unwrap();
        assert_eq!(
            warnings,
            vec![Warning::UnreachableStates(vec!["island".to_string()])]
        );
    }

    #[test]
    fn test_analyze_reports_first_error() {
        let content = r#"{
            "states": [
                { "name": "a", "is_initial": true },
                { "name": "b", "is_initial": true }
            ],
            "transitions": { "a": { "x": "nowhere" } }
        }"#;

        let definition = parse_definition(content.as_bytes()).unwrap();
        assert!(validation_message(&definition).contains("Multiple initial states"));
    }
}
