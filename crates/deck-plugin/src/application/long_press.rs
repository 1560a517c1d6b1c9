//! Per-context long-press state machine.
//!
//! ```text
//!            begin(ctx) → gen
//!   Idle ───────────────────────► Armed(gen)
//!    ▲  ▲                          │      │
//!    │  │  release / cancel        │      │ expire(ctx, gen)   (threshold elapsed)
//!    │  └──────────────────────────┘      ▼
//!    │                                  Fired
//!    └──────────────── release / consume_fired ─┘
//! ```
//!
//! The timer itself is a `tokio::time::sleep` task owned by the router; this
//! type only holds the state it races against.  Every arm gets a fresh
//! generation number, so a sleep left over from an earlier press can never
//! fire for a later one: its `expire` call names a stale generation and is
//! ignored.

use std::collections::HashMap;

/// State of one context's timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerState {
    #[default]
    Idle,
    Armed(u64),
    Fired,
}

/// How a press cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Released before the threshold: run the short-press callback.
    Short,
    /// The long-press callback already ran: suppress the short one.
    Long,
}

#[derive(Debug, Default)]
pub struct LongPressTimers {
    states: HashMap<String, TimerState>,
    next_generation: u64,
}

impl LongPressTimers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer for `context`, superseding any earlier arm.
    pub fn begin(&mut self, context: &str) -> u64 {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.states
            .insert(context.to_string(), TimerState::Armed(generation));
        generation
    }

    /// Disarms an armed timer.  Returns `true` if one was armed.
    pub fn cancel(&mut self, context: &str) -> bool {
        match self.states.get_mut(context) {
            Some(state) if matches!(state, TimerState::Armed(_)) => {
                *state = TimerState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Called when a sleep of generation `generation` completes.  Returns
    /// `true` (and moves to `Fired`) only if that exact arm is still live.
    pub fn expire(&mut self, context: &str, generation: u64) -> bool {
        match self.states.get_mut(context) {
            Some(state) if *state == TimerState::Armed(generation) => {
                *state = TimerState::Fired;
                true
            }
            _ => false,
        }
    }

    /// Moves `Fired` back to `Idle`.  Returns `true` if the timer had fired.
    pub fn consume_fired(&mut self, context: &str) -> bool {
        match self.states.get_mut(context) {
            Some(state) if *state == TimerState::Fired => {
                *state = TimerState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Resolves a release.  A release with no prior press counts as short.
    pub fn release(&mut self, context: &str) -> PressOutcome {
        if self.consume_fired(context) {
            PressOutcome::Long
        } else {
            self.cancel(context);
            PressOutcome::Short
        }
    }

    /// Forgets `context` entirely.
    pub fn remove(&mut self, context: &str) {
        self.states.remove(context);
    }

    pub fn state(&self, context: &str) -> TimerState {
        self.states.get(context).copied().unwrap_or_default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
