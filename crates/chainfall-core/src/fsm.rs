//! Generic finite state sequencer.
//!
//! States are registered under a key with optional enter/update/exit hooks.
//! Hooks receive the caller's context and a [`Transition`] handle; requesting
//! a transition from inside a hook queues it, and the machine applies queued
//! transitions in a loop until none remain. Tail transitions therefore never
//! grow the call stack.
//!
//! # Transition order
//!
//! 1. The previous state's `on_exit` runs (if any)
//! 2. The current key switches
//! 3. The new state's `on_enter` runs (if any)
//!
//! `on_update` only ever runs from [`StateMachine::update`]. When both an exit
//! and an enter hook request a transition, the last request wins.
//!
//! # Example
//!
//! ```
//! use chainfall_core::fsm::{StateHooks, StateMachine, Transition};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Light {
//!     Red,
//!     Green,
//! }
//!
//! fn count_down(ticks: &mut u32, next: &mut Transition<Light>) {
//!     *ticks += 1;
//!     if *ticks == 3 {
//!         next.set_state(Light::Green);
//!     }
//! }
//!
//! let mut machine = StateMachine::new()
//!     .with_state(Light::Red, StateHooks::new().on_update(count_down))
//!     .with_state(Light::Green, StateHooks::new());
//!
//! let mut ticks = 0;
//! machine.set_state(&mut ticks, Light::Red);
//! for _ in 0..3 {
//!     machine.update(&mut ticks);
//! }
//! assert_eq!(machine.current(), Some(Light::Green));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::trace;

/// Hook signature: mutable context plus a handle for requesting transitions.
pub type Hook<K, C> = fn(&mut C, &mut Transition<K>);

/// Handle through which hooks request a transition.
#[derive(Debug)]
pub struct Transition<K> {
    requested: Option<K>,
}

impl<K> Transition<K> {
    fn new() -> Self {
        Self { requested: None }
    }

    /// Requests a transition to `key` once the current hook returns.
    pub fn set_state(&mut self, key: K) {
        self.requested = Some(key);
    }

    /// Returns the pending request, if any.
    #[must_use]
    pub fn requested(&self) -> Option<&K> {
        self.requested.as_ref()
    }
}

/// Hooks registered for one state.
pub struct StateHooks<K, C> {
    enter: Option<Hook<K, C>>,
    update: Option<Hook<K, C>>,
    exit: Option<Hook<K, C>>,
}

impl<K, C> StateHooks<K, C> {
    /// Creates a state with no hooks.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            enter: None,
            update: None,
            exit: None,
        }
    }

    /// Sets the enter hook.
    #[must_use]
    pub fn on_enter(mut self, hook: Hook<K, C>) -> Self {
        self.enter = Some(hook);
        self
    }

    /// Sets the update hook.
    #[must_use]
    pub fn on_update(mut self, hook: Hook<K, C>) -> Self {
        self.update = Some(hook);
        self
    }

    /// Sets the exit hook.
    #[must_use]
    pub fn on_exit(mut self, hook: Hook<K, C>) -> Self {
        self.exit = Some(hook);
        self
    }
}

impl<K, C> Default for StateHooks<K, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> Clone for StateHooks<K, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C> Copy for StateHooks<K, C> {}

impl<K, C> fmt::Debug for StateHooks<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHooks")
            .field("enter", &self.enter.is_some())
            .field("update", &self.update.is_some())
            .field("exit", &self.exit.is_some())
            .finish()
    }
}

/// Keyed state machine driven by an external context.
///
/// # Panics
///
/// Registering a key twice, or transitioning to an unregistered key, panics.
/// Both indicate a broken integration rather than a runtime condition.
pub struct StateMachine<K, C> {
    states: HashMap<K, StateHooks<K, C>>,
    current: Option<K>,
    transitions: u64,
}

impl<K, C> fmt::Debug for StateMachine<K, C>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("states", &format!("[{} states]", self.states.len()))
            .field("current", &self.current)
            .field("transitions", &self.transitions)
            .finish()
    }
}

impl<K, C> Default for StateMachine<K, C>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, C> StateMachine<K, C>
where
    K: Copy + Eq + Hash + fmt::Debug,
{
    /// Creates an empty machine with no current state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: HashMap::new(),
            current: None,
            transitions: 0,
        }
    }

    /// Registers a state.
    ///
    /// # Panics
    ///
    /// Panics if `key` is already registered.
    pub fn add(&mut self, key: K, hooks: StateHooks<K, C>) -> &mut Self {
        assert!(
            !self.states.contains_key(&key),
            "state {key:?} registered twice"
        );
        self.states.insert(key, hooks);
        self
    }

    /// Builder form of [`add`](Self::add).
    ///
    /// # Panics
    ///
    /// Panics if `key` is already registered.
    #[must_use]
    pub fn with_state(mut self, key: K, hooks: StateHooks<K, C>) -> Self {
        self.add(key, hooks);
        self
    }

    /// Returns true if `key` is registered.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.states.contains_key(&key)
    }

    /// Returns the current state key.
    #[must_use]
    pub fn current(&self) -> Option<K> {
        self.current
    }

    /// Returns true if the current state is `key`.
    #[must_use]
    pub fn is_in(&self, key: K) -> bool {
        self.current == Some(key)
    }

    /// Total transitions applied since creation.
    #[must_use]
    pub fn transition_count(&self) -> u64 {
        self.transitions
    }

    fn hooks(&self, key: K) -> StateHooks<K, C> {
        match self.states.get(&key) {
            Some(hooks) => *hooks,
            None => panic!("state {key:?} was never registered"),
        }
    }

    /// Exits the current state and enters `key`, then applies any transitions
    /// the hooks requested until the machine is stable.
    ///
    /// # Panics
    ///
    /// Panics if `key`, or any key requested by a hook, was never registered.
    pub fn set_state(&mut self, ctx: &mut C, key: K) {
        let mut pending = Some(key);
        while let Some(target) = pending.take() {
            let entering = self.hooks(target);
            let mut next = Transition::new();

            if let Some(previous) = self.current {
                if let Some(exit) = self.hooks(previous).exit {
                    exit(ctx, &mut next);
                }
            }

            trace!(from = ?self.current, to = ?target, "state transition");
            self.current = Some(target);
            self.transitions += 1;

            if let Some(enter) = entering.enter {
                enter(ctx, &mut next);
            }
            pending = next.requested;
        }
    }

    /// Runs the current state's update hook, then applies any requested transition.
    ///
    /// No-op when there is no current state or it has no update hook.
    pub fn update(&mut self, ctx: &mut C) {
        let Some(current) = self.current else {
            return;
        };
        let Some(update) = self.hooks(current).update else {
            return;
        };
        let mut next = Transition::new();
        update(ctx, &mut next);
        if let Some(key) = next.requested {
            self.set_state(ctx, key);
        }
    }
}
