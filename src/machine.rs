//! This module defines the `DfaMachine` struct, which executes an [`Automaton`] against an
//! input string one symbol at a time, together with the [`run`] and [`trace`] helpers built
//! on top of it.
//!
//! The machine only borrows the automaton, so any number of machines may run the same
//! automaton concurrently.

use crate::types::{Automaton, Rejection, StateId, Step, TraceStep, Verdict};

/// A cursor executing an automaton over a fixed input.
#[derive(Debug, Clone)]
pub struct DfaMachine<'a> {
    automaton: &'a Automaton,
    input: Vec<char>,
    state: StateId,
    position: usize,
    verdict: Option<Verdict>,
}

impl<'a> DfaMachine<'a> {
    /// Creates a new machine positioned at the initial state, before the first symbol.
    pub fn new(automaton: &'a Automaton, input: &str) -> Self {
        Self {
            automaton,
            input: input.chars().collect(),
            state: automaton.initial_id(),
            position: 0,
            verdict: None,
        }
    }

    /// Consumes a single symbol.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a symbol was consumed.
    /// * `Step::Halt(verdict)` once the input is exhausted or no transition exists for the
    ///   next symbol. Further calls keep returning the same verdict.
    pub fn step(&mut self) -> Step {
        if let Some(verdict) = &self.verdict {
            return Step::Halt(verdict.clone());
        }

        let Some(&symbol) = self.input.get(self.position) else {
            let verdict = if self.automaton.is_final(self.state) {
                Verdict::Accepted
            } else {
                Verdict::Rejected(Rejection::NotFinal {
                    state: self.state().to_string(),
                })
            };
            return self.halt(verdict);
        };

        match self.automaton.transition(self.state, symbol) {
            Some(next) => {
                self.state = next;
                self.position += 1;
                Step::Continue
            }
            None => self.halt(Verdict::Rejected(Rejection::Stuck {
                state: self.state().to_string(),
                symbol,
                position: self.position,
            })),
        }
    }

    fn halt(&mut self, verdict: Verdict) -> Step {
        self.verdict = Some(verdict.clone());
        Step::Halt(verdict)
    }

    /// Runs until the machine halts and returns the verdict.
    ///
    /// Every step consumes one symbol, so this always terminates.
    pub fn run(&mut self) -> Verdict {
        loop {
            if let Step::Halt(verdict) = self.step() {
                return verdict;
            }
        }
    }

    /// Rewinds the machine to the initial state and the start of the input.
    pub fn reset(&mut self) {
        self.state = self.automaton.initial_id();
        self.position = 0;
        self.verdict = None;
    }

    /// Returns the name of the current state.
    pub fn state(&self) -> &'a str {
        self.automaton.name_of(self.state)
    }

    pub fn state_id(&self) -> StateId {
        self.state
    }

    /// Returns the index of the next symbol to consume.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the part of the input not consumed yet.
    pub fn remaining(&self) -> &[char] {
        &self.input[self.position..]
    }

    pub fn is_halted(&self) -> bool {
        self.verdict.is_some()
    }

    /// Returns the verdict if the machine has halted.
    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    pub fn automaton(&self) -> &'a Automaton {
        self.automaton
    }
}

/// Runs `input` through `automaton` and returns the verdict.
///
/// A missing transition is not an error: the input is rejected with
/// [`Rejection::Stuck`].
pub fn run(automaton: &Automaton, input: &str) -> Verdict {
    DfaMachine::new(automaton, input).run()
}

/// Returns a lazy trace of the run of `input` through `automaton`.
pub fn trace<'a>(automaton: &'a Automaton, input: &str) -> Trace<'a> {
    Trace {
        machine: DfaMachine::new(automaton, input),
    }
}

impl Automaton {
    /// Checks whether the automaton accepts `input`.
    pub fn accepts(&self, input: &str) -> bool {
        run(self, input).is_accepted()
    }

    /// Runs `input` through the automaton.
    pub fn run(&self, input: &str) -> Verdict {
        run(self, input)
    }

    /// Returns a lazy trace of the run of `input`.
    pub fn trace(&self, input: &str) -> Trace<'_> {
        trace(self, input)
    }
}

/// A finite iterator over the symbols consumed during a run.
///
/// The trace ends at the end of the input or at the first symbol without a transition.
/// Cloning a trace, or calling [`Trace::restart`], yields an independent iterator.
#[derive(Debug, Clone)]
pub struct Trace<'a> {
    machine: DfaMachine<'a>,
}

impl<'a> Trace<'a> {
    /// Returns a fresh trace over the same input, starting from the first symbol.
    pub fn restart(&self) -> Trace<'a> {
        let mut machine = self.machine.clone();
        machine.reset();
        Trace { machine }
    }

    /// Returns the verdict of the whole run without advancing this trace.
    pub fn verdict(&self) -> Verdict {
        self.restart().machine.run()
    }
}

impl<'a> Iterator for Trace<'a> {
    type Item = TraceStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let position = self.machine.position();
        let from = self.machine.state();
        let symbol = self.machine.remaining().first().copied()?;

        match self.machine.step() {
            Step::Continue => Some(TraceStep {
                position,
                symbol,
                from,
                to: self.machine.state(),
            }),
            Step::Halt(_) => None,
        }
    }
}
