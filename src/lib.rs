//! This crate provides the core logic for a deterministic finite automaton simulator.
//! It includes modules for loading and validating automaton definitions, executing them
//! against input strings, projecting state coordinates for plotting, and managing a
//! collection of built-in sample automata.

pub mod analyzer;
pub mod catalog;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod projector;
pub mod slot;
pub mod types;

/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports `AutomatonCatalog` and `AutomatonInfo` from the catalog module.
pub use catalog::{AutomatonCatalog, AutomatonInfo};
/// Re-exports the encoding functions from the encoder module.
pub use encoder::{decode, encode, to_json};
/// Re-exports the `AutomatonLoader` struct from the loader module.
pub use loader::AutomatonLoader;
/// Re-exports the engine entry points from the machine module.
pub use machine::{run, trace, DfaMachine, Trace};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the `coordinates_of` function from the projector module.
pub use projector::coordinates_of;
/// Re-exports the `AutomatonSlot` struct from the slot module.
pub use slot::AutomatonSlot;
/// Re-exports the data model and error types from the types module.
pub use types::{
    Automaton, Coordinate, DfaError, Mode, Rejection, State, StateId, Step, TraceStep, Verdict,
    Warning,
};
