//! The reducer trait: decide with `handle`, evolve with `apply`.
//!
//! Reducers carry all business logic. A command is validated against the
//! current state and either rejected with a typed error or turned into a
//! batch of events; events are then folded into state one by one. Because
//! `handle` takes `&State` and `apply` is infallible, a command can never
//! leave state half-written: the [`Store`](crate::store::Store) applies the
//! whole batch under its serialization point, or nothing at all.

use smallvec::SmallVec;

/// The core abstraction for domain logic.
///
/// # Type Parameters
///
/// - `State`: the domain state this reducer operates on
/// - `Command`: requests to change state
/// - `Event`: facts recorded when a command succeeds
/// - `Error`: the typed rejection returned to callers
/// - `Environment`: injected dependencies (clock, id sources)
///
/// # Contract
///
/// - `handle` must not mutate anything observable; it only reads state and
///   the environment and decides.
/// - `apply` must not fail and must not consult the environment; everything
///   an event needs is carried in the event itself.
pub trait Reducer {
    /// The state type this reducer operates on.
    type State;

    /// The command type this reducer processes.
    type Command;

    /// The event type this reducer emits.
    type Event;

    /// The error type returned when a command is rejected.
    type Error;

    /// The environment type with injected dependencies.
    type Environment;

    /// Decide what a command means against the current state.
    ///
    /// Returns the events to record, or the typed error the caller sees.
    /// No state is mutated here.
    ///
    /// # Errors
    ///
    /// Returns `Self::Error` when the command's preconditions do not hold;
    /// in that case nothing is recorded.
    fn handle(
        &self,
        state: &Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error>;

    /// Fold one event into state. Infallible.
    fn apply(&self, state: &mut Self::State, event: &Self::Event);
}
