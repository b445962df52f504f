//! This module provides `AutomatonSlot`, the single "current automaton" handle a front end
//! holds. Reloading replaces the whole automaton at once; runs already in progress keep the
//! snapshot they started with.

use crate::machine::run;
use crate::parser::parse;
use crate::types::{Automaton, DfaError, Verdict};
use std::sync::{Arc, PoisonError, RwLock};

#[derive(Debug, Default)]
pub struct AutomatonSlot {
    current: RwLock<Option<Arc<Automaton>>>,
}

impl AutomatonSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `bytes` and, on success, makes the result the current automaton.
    ///
    /// Loading is all-or-nothing: if parsing or validation fails, the previously
    /// loaded automaton stays current.
    pub fn load(&self, bytes: &[u8]) -> Result<Arc<Automaton>, DfaError> {
        let automaton = parse(bytes)?;
        Ok(self.replace(automaton))
    }

    /// Makes `automaton` the current one and returns the shared handle.
    pub fn replace(&self, automaton: Automaton) -> Arc<Automaton> {
        let automaton = Arc::new(automaton);
        // A writer only ever assigns a complete value, so a poisoned lock still holds a
        // consistent automaton.
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(automaton.clone());
        automaton
    }

    /// Returns a snapshot of the current automaton, if one has been loaded.
    pub fn current(&self) -> Option<Arc<Automaton>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.current().is_some()
    }

    /// Runs `input` against the current automaton.
    ///
    /// # Returns
    ///
    /// * `Ok(Verdict)` with the outcome of the run.
    /// * `Err(DfaError::NoAutomatonLoaded)` if nothing has been loaded yet.
    pub fn run(&self, input: &str) -> Result<Verdict, DfaError> {
        let automaton = self.current().ok_or(DfaError::NoAutomatonLoaded)?;
        Ok(run(&automaton, input))
    }

    /// Drops the current automaton.
    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const ENDS_WITH_ZERO: &str = r#"{
        "states": ["q0", "q1"],
        "transitions": {
            "q0": { "0": "q1", "1": "q0" },
            "q1": { "0": "q1", "1": "q0" }
        },
        "initialState": "q0",
        "finalStates": ["q1"]
    }"#;

    const ACCEPT_EMPTY: &str = r#"{
        "states": [{ "name": "s", "is_initial": true, "is_final": true }]
    }"#;

    #[test]
    fn test_empty_slot() {
        let slot = AutomatonSlot::new();

        assert!(!slot.is_loaded());
        assert_eq!(slot.run("0"), Err(DfaError::NoAutomatonLoaded));
    }

    #[test]
    fn test_load_and_run() {
        let slot = AutomatonSlot::new();
        slot.load(ENDS_WITH_ZERO.as_bytes()).unwrap();

        assert_eq!(slot.run("10"), Ok(Verdict::Accepted));
        assert!(!slot.run("11").unwrap().is_accepted());
    }

    #[test]
    fn test_failed_load_keeps_previous_automaton() {
        let slot = AutomatonSlot::new();
        slot.load(ENDS_WITH_ZERO.as_bytes()).unwrap();

        let result = slot.load(br#"{ "states": ["a", "b"] }"#);
        assert!(matches!(result, Err(DfaError::ValidationError(_))));

        let result = slot.load(b"not json");
        assert!(matches!(result, Err(DfaError::ParseError(_))));

        assert_eq!(slot.current().unwrap().initial_state(), "q0");
        assert_eq!(slot.run("0"), Ok(Verdict::Accepted));
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let slot = AutomatonSlot::new();
        let before = slot.load(ENDS_WITH_ZERO.as_bytes()).unwrap();
        slot.load(ACCEPT_EMPTY.as_bytes()).unwrap();

        // The old snapshot still behaves as before
        assert!(before.accepts("0"));
        assert!(!before.accepts(""));
        assert!(slot.current().unwrap().accepts(""));
    }

    #[test]
    fn test_concurrent_runs() {
        let slot = Arc::new(AutomatonSlot::new());
        slot.load(ENDS_WITH_ZERO.as_bytes()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let slot = Arc::clone(&slot);
                thread::spawn(move || {
                    let automaton = slot.current().unwrap();
                    (0..100).all(|_| automaton.accepts("1010"))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }

    #[test]
    fn test_clear() {
        let slot = AutomatonSlot::new();
        slot.load(ACCEPT_EMPTY.as_bytes()).unwrap();
        slot.clear();

        assert!(slot.current().is_none());
    }
}
