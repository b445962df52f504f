//! This module decodes automaton definitions with `serde_json` and normalizes the accepted
//! document shapes into a single name-based [`Definition`], which is then validated by the
//! analyzer and compiled into an [`Automaton`].
//!
//! Two layouts are accepted, and may be mixed in one document:
//!
//! * a flat table keyed by state then symbol, with `initialState` / `finalStates` fields;
//! * per-state objects carrying their own transitions and `is_initial` / `is_final` flags.

use crate::{
    analyzer::analyze,
    types::{Automaton, Coordinate, DfaError, Mode, State, Warning},
};
use serde::de::value::{MapAccessDeserializer, SeqAccessDeserializer};
use serde::de::{Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;

/// Raw top-level document as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    mode: Mode,
    states: Vec<StateDocument>,
    #[serde(default)]
    alphabet: Vec<String>,
    #[serde(default)]
    transitions: Entries<Entries<TargetDocument>>,
    #[serde(default, alias = "initial_state")]
    initial_state: Option<String>,
    #[serde(default, alias = "final_states")]
    final_states: Option<FinalStatesDocument>,
}

/// The entries of a JSON object in document order. Repeated keys are kept.
#[derive(Debug)]
struct Entries<T>(Vec<(String, T)>);

impl<T> Default for Entries<T> {
    fn default() -> Self {
        Entries(Vec::new())
    }
}

fn collect_entries<'de, A, T>(mut map: A) -> Result<Entries<T>, A::Error>
where
    A: MapAccess<'de>,
    T: Deserialize<'de>,
{
    let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
    while let Some(entry) = map.next_entry()? {
        entries.push(entry);
    }
    Ok(Entries(entries))
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Entries<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<T>(PhantomData<T>);

        impl<'de, T: Deserialize<'de>> Visitor<'de> for EntriesVisitor<T> {
            type Value = Entries<T>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object")
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                collect_entries(map)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// A state given either as a bare name or as an object.
#[derive(Debug)]
enum StateDocument {
    Name(String),
    Object(StateObject),
}

impl<'de> Deserialize<'de> for StateDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StateVisitor;

        impl<'de> Visitor<'de> for StateVisitor {
            type Value = StateDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a state name or a state object")
            }

            fn visit_str<E: serde::de::Error>(self, name: &str) -> Result<Self::Value, E> {
                Ok(StateDocument::Name(name.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                StateObject::deserialize(MapAccessDeserializer::new(map)).map(StateDocument::Object)
            }
        }

        deserializer.deserialize_any(StateVisitor)
    }
}

#[derive(Debug, Deserialize)]
struct StateObject {
    name: String,
    #[serde(default, alias = "isInitial")]
    is_initial: bool,
    #[serde(default, alias = "isFinal")]
    is_final: bool,
    #[serde(default)]
    transitions: Option<StateTransitions>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
}

/// Transitions attached to a single state object.
#[derive(Debug)]
enum StateTransitions {
    List(Vec<RuleDocument>),
    Map(Entries<TargetDocument>),
}

impl<'de> Deserialize<'de> for StateTransitions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TransitionsVisitor;

        impl<'de> Visitor<'de> for TransitionsVisitor {
            type Value = StateTransitions;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of rules or an object keyed by symbol")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                Vec::deserialize(SeqAccessDeserializer::new(seq)).map(StateTransitions::List)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                collect_entries(map).map(StateTransitions::Map)
            }
        }

        deserializer.deserialize_any(TransitionsVisitor)
    }
}

/// The value stored under a symbol key: either the destination name or a rule object.
#[derive(Debug)]
enum TargetDocument {
    Name(String),
    Rule(RuleDocument),
}

impl<'de> Deserialize<'de> for TargetDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TargetVisitor;

        impl<'de> Visitor<'de> for TargetVisitor {
            type Value = TargetDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a destination state name or a rule object")
            }

            fn visit_str<E: serde::de::Error>(self, name: &str) -> Result<Self::Value, E> {
                Ok(TargetDocument::Name(name.to_string()))
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                RuleDocument::deserialize(MapAccessDeserializer::new(map)).map(TargetDocument::Rule)
            }
        }

        deserializer.deserialize_any(TargetVisitor)
    }
}

#[derive(Debug, Deserialize)]
struct RuleDocument {
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default)]
    from: Option<String>,
    to: String,
}

#[derive(Debug)]
enum FinalStatesDocument {
    List(Vec<String>),
    Flags(Entries<bool>),
}

impl<'de> Deserialize<'de> for FinalStatesDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FinalStatesVisitor;

        impl<'de> Visitor<'de> for FinalStatesVisitor {
            type Value = FinalStatesDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a list of state names or an object of flags")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, seq: A) -> Result<Self::Value, A::Error> {
                Vec::deserialize(SeqAccessDeserializer::new(seq)).map(FinalStatesDocument::List)
            }

            fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Self::Value, A::Error> {
                collect_entries(map).map(FinalStatesDocument::Flags)
            }
        }

        deserializer.deserialize_any(FinalStatesVisitor)
    }
}

/// The input-string document: `{ "input": "0110" }`.
#[derive(Debug, Deserialize)]
struct InputDocument {
    input: String,
}

/// A single `(from, symbol) -> to` rule, still expressed with names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub from: String,
    pub symbol: String,
    pub to: String,
}

/// A decoded definition reduced to one canonical layout but not yet validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    pub name: Option<String>,
    pub mode: Mode,
    pub states: Vec<State>,
    pub alphabet: Vec<String>,
    pub rules: Vec<Rule>,
    /// The top-level `initialState` field, if present.
    pub initial_state: Option<String>,
    /// States flagged `is_initial`, in declaration order.
    pub flagged_initial: Vec<String>,
    pub final_states: Vec<String>,
}

/// Parses definition bytes into a validated [`Automaton`].
///
/// # Returns
///
/// * `Ok(Automaton)` if the bytes decode and the definition is consistent.
/// * `Err(DfaError::ParseError)` if the bytes are not a well-formed definition document.
/// * `Err(DfaError::ValidationError)` if the definition fails validation.
pub fn parse(input: &[u8]) -> Result<Automaton, DfaError> {
    let definition = parse_definition(input)?;
    let warnings = analyze(&definition)?;

    build(definition, warnings)
}

/// Decodes and normalizes definition bytes without running the analyzer.
pub fn parse_definition(input: &[u8]) -> Result<Definition, DfaError> {
    let document: Document = serde_json::from_slice(input)?;
    normalize(document)
}

/// Decodes an input-string document and returns its `input` field.
pub fn parse_input(input: &[u8]) -> Result<String, DfaError> {
    let document: InputDocument = serde_json::from_slice(input)?;
    Ok(document.input)
}

/// Reduces every accepted layout to a [`Definition`].
fn normalize(document: Document) -> Result<Definition, DfaError> {
    let mut states = Vec::with_capacity(document.states.len());
    let mut rules = Vec::new();
    let mut flagged_initial = Vec::new();
    let mut final_states = Vec::new();

    for entry in document.states {
        match entry {
            StateDocument::Name(name) => states.push(State {
                name,
                position: None,
            }),
            StateDocument::Object(object) => {
                let position = parse_position(&object)?;

                if object.is_initial {
                    flagged_initial.push(object.name.clone());
                }
                if object.is_final {
                    final_states.push(object.name.clone());
                }
                if let Some(transitions) = object.transitions {
                    rules.extend(parse_state_transitions(&object.name, transitions)?);
                }

                states.push(State {
                    name: object.name,
                    position,
                });
            }
        }
    }

    for (from, targets) in document.transitions.0 {
        for (symbol, target) in targets.0 {
            rules.push(parse_target(&from, symbol, target)?);
        }
    }

    match document.final_states {
        Some(FinalStatesDocument::List(names)) => final_states.extend(names),
        Some(FinalStatesDocument::Flags(flags)) => final_states.extend(
            flags
                .0
                .into_iter()
                .filter_map(|(name, is_final)| is_final.then_some(name)),
        ),
        None => {}
    }

    Ok(Definition {
        name: document.name,
        mode: document.mode,
        states,
        alphabet: document.alphabet,
        rules,
        initial_state: document.initial_state,
        flagged_initial,
        final_states,
    })
}

/// Extracts the optional plotting position of a state object. Both axes must be given.
fn parse_position(object: &StateObject) -> Result<Option<Coordinate>, DfaError> {
    match (object.x, object.y) {
        (Some(x), Some(y)) => Ok(Some(Coordinate { x, y })),
        (None, None) => Ok(None),
        _ => Err(DfaError::ValidationError(format!(
            "State '{}' has an incomplete coordinate",
            object.name
        ))),
    }
}

/// Parses the transitions owned by a state object.
fn parse_state_transitions(
    state: &str,
    transitions: StateTransitions,
) -> Result<Vec<Rule>, DfaError> {
    match transitions {
        StateTransitions::List(list) => list
            .into_iter()
            .map(|rule| {
                let symbol = rule.symbol.clone().ok_or_else(|| {
                    DfaError::ValidationError(format!(
                        "Transition from state '{state}' to '{}' has no symbol",
                        rule.to
                    ))
                })?;
                parse_rule(state, symbol, rule)
            })
            .collect(),
        StateTransitions::Map(entries) => entries
            .0
            .into_iter()
            .map(|(symbol, target)| parse_target(state, symbol, target))
            .collect(),
    }
}

fn parse_target(from: &str, symbol: String, target: TargetDocument) -> Result<Rule, DfaError> {
    match target {
        TargetDocument::Name(to) => Ok(Rule {
            from: from.to_string(),
            symbol,
            to,
        }),
        TargetDocument::Rule(rule) => parse_rule(from, symbol, rule),
    }
}

/// Checks that the redundant fields of a rule object agree with where it was declared.
fn parse_rule(from: &str, symbol: String, rule: RuleDocument) -> Result<Rule, DfaError> {
    if let Some(declared) = rule.from.as_deref() {
        if declared != from {
            return Err(DfaError::ValidationError(format!(
                "Transition declared under state '{from}' names '{declared}' as its source"
            )));
        }
    }

    if let Some(declared) = rule.symbol.as_deref() {
        if declared != symbol {
            return Err(DfaError::ValidationError(format!(
                "Transition from state '{from}' is keyed by symbol '{symbol}' but declares '{declared}'"
            )));
        }
    }

    Ok(Rule {
        from: from.to_string(),
        symbol,
        to: rule.to,
    })
}

/// Converts a symbol string into a `char`. Symbols are exactly one character long.
pub(crate) fn parse_symbol(symbol: &str) -> Option<char> {
    let mut chars = symbol.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Compiles an analyzed definition into the indexed [`Automaton`] representation.
fn build(definition: Definition, warnings: Vec<Warning>) -> Result<Automaton, DfaError> {
    let index: HashMap<String, usize> = definition
        .states
        .iter()
        .enumerate()
        .map(|(id, state)| (state.name.clone(), id))
        .collect();

    let lookup = |name: &str| {
        index
            .get(name)
            .copied()
            .ok_or_else(|| DfaError::ValidationError(format!("Undefined state: {name}")))
    };
    let symbol = |s: &str| {
        parse_symbol(s)
            .ok_or_else(|| DfaError::ValidationError(format!("Invalid symbol: {s:?}")))
    };

    let initial_name = definition
        .initial_state
        .as_deref()
        .or(definition.flagged_initial.first().map(String::as_str))
        .ok_or_else(|| DfaError::ValidationError("No initial state declared".to_string()))?;
    let initial = lookup(initial_name)?;

    let finals = definition
        .final_states
        .iter()
        .map(|name| lookup(name.as_str()))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let mut alphabet = definition
        .alphabet
        .iter()
        .map(|s| symbol(s.as_str()))
        .collect::<Result<BTreeSet<_>, _>>()?;

    let mut transitions = HashMap::with_capacity(definition.rules.len());
    for rule in &definition.rules {
        let c = symbol(rule.symbol.as_str())?;
        alphabet.insert(c);
        transitions.insert((lookup(rule.from.as_str())?, c), lookup(rule.to.as_str())?);
    }

    Ok(Automaton {
        name: definition.name,
        mode: definition.mode,
        states: definition.states,
        index,
        alphabet,
        transitions,
        initial,
        finals,
        warnings,
    })
}
