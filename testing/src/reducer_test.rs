//! Ergonomic testing for reducers with Given/When/Then syntax.
//!
//! A test sets up state, dispatches one command through the reducer the same
//! way a store would (decide, then fold the events), and asserts on the
//! resulting state, the committed events, or the typed rejection.

#![allow(clippy::module_name_repetitions)] // ReducerTest is the natural name

use seatline_core::Reducer;

/// Type alias for state assertion functions.
type StateAssertion<S> = Box<dyn FnOnce(&S)>;

/// Type alias for event assertion functions.
type EventAssertion<E> = Box<dyn FnOnce(&[E])>;

/// Type alias for error assertion functions.
type ErrorAssertion<E> = Box<dyn FnOnce(&E)>;

/// Fluent API for testing reducers.
///
/// # Example
///
/// ```ignore
/// ReducerTest::new(TicketingReducer::new())
///     .with_env(test_environment())
///     .given_state(seeded_state())
///     .when_command(TicketingCommand::Transfers(TransferCommand::AcceptTransfer { .. }))
///     .then_state(|state| {
///         assert_eq!(state.transfers.get(&transfer_id).unwrap().status, TransferStatus::Accepted);
///     })
///     .run();
/// ```
///
/// Exactly one of the success path (`then_state` / `then_events`) and the
/// failure path (`then_error`) is expected to fire; a mismatch fails the
/// test.
pub struct ReducerTest<R>
where
    R: Reducer,
{
    reducer: R,
    environment: Option<R::Environment>,
    initial_state: Option<R::State>,
    command: Option<R::Command>,
    state_assertions: Vec<StateAssertion<R::State>>,
    event_assertions: Vec<EventAssertion<R::Event>>,
    error_assertion: Option<ErrorAssertion<R::Error>>,
}

impl<R> ReducerTest<R>
where
    R: Reducer,
    R::Error: std::fmt::Debug,
{
    /// Create a new reducer test with the given reducer.
    #[must_use]
    pub const fn new(reducer: R) -> Self {
        Self {
            reducer,
            environment: None,
            initial_state: None,
            command: None,
            state_assertions: Vec::new(),
            event_assertions: Vec::new(),
            error_assertion: None,
        }
    }

    /// Set the environment for the test.
    #[must_use]
    pub fn with_env(mut self, env: R::Environment) -> Self {
        self.environment = Some(env);
        self
    }

    /// Set the initial state (Given).
    #[must_use]
    pub fn given_state(mut self, state: R::State) -> Self {
        self.initial_state = Some(state);
        self
    }

    /// Set the command to dispatch (When).
    #[must_use]
    pub fn when_command(mut self, command: R::Command) -> Self {
        self.command = Some(command);
        self
    }

    /// Assert on the state after the command's events are applied (Then).
    #[must_use]
    pub fn then_state<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::State) + 'static,
    {
        self.state_assertions.push(Box::new(assertion));
        self
    }

    /// Assert on the committed events (Then).
    #[must_use]
    pub fn then_events<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&[R::Event]) + 'static,
    {
        self.event_assertions.push(Box::new(assertion));
        self
    }

    /// Assert that the command is rejected, and on the rejection (Then).
    ///
    /// When set, the command must fail; state must be left exactly as given
    /// (the harness cannot check that structurally, but no events are
    /// applied).
    #[must_use]
    pub fn then_error<F>(mut self, assertion: F) -> Self
    where
        F: FnOnce(&R::Error) + 'static,
    {
        self.error_assertion = Some(Box::new(assertion));
        self
    }

    /// Run the test and execute all assertions.
    ///
    /// # Panics
    ///
    /// Panics if initial state, command, or environment is not set, if the
    /// command's outcome (success/rejection) does not match the assertions
    /// configured, or if any assertion fails.
    #[allow(clippy::panic)] // Test code can panic
    #[allow(clippy::expect_used)] // Test code can use expect
    pub fn run(self) {
        let mut state = self
            .initial_state
            .expect("Initial state must be set with given_state()");

        let command = self
            .command
            .expect("Command must be set with when_command()");

        let env = self
            .environment
            .expect("Environment must be set with with_env()");

        match self.reducer.handle(&state, command, &env) {
            Ok(events) => {
                assert!(
                    self.error_assertion.is_none(),
                    "Expected the command to be rejected, but it committed {} event(s)",
                    events.len()
                );

                for event in &events {
                    self.reducer.apply(&mut state, event);
                }

                for assertion in self.state_assertions {
                    assertion(&state);
                }
                for assertion in self.event_assertions {
                    assertion(&events);
                }
            }
            Err(error) => {
                let Some(assertion) = self.error_assertion else {
                    panic!("Command was rejected unexpectedly: {error:?}");
                };
                assertion(&error);
            }
        }
    }
}

/// Helper assertions for committed events.
pub mod assertions {
    /// Assert the number of committed events.
    ///
    /// # Panics
    ///
    /// Panics if the number of events doesn't match expected.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_event_count<E>(events: &[E], expected: usize) {
        assert_eq!(
            events.len(),
            expected,
            "Expected {} event(s), but found {}",
            expected,
            events.len()
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use seatline_core::{SmallVec, smallvec};

    #[derive(Clone, Debug)]
    struct TestState {
        count: i32,
    }

    enum TestCommand {
        Increment,
        Reject,
    }

    #[derive(Clone, Debug)]
    enum TestEvent {
        Incremented,
    }

    #[derive(Debug, PartialEq, Eq)]
    struct Rejected;

    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Command = TestCommand;
        type Event = TestEvent;
        type Error = Rejected;
        type Environment = ();

        fn handle(
            &self,
            _state: &Self::State,
            command: Self::Command,
            _env: &Self::Environment,
        ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
            match command {
                TestCommand::Increment => Ok(smallvec![TestEvent::Incremented]),
                TestCommand::Reject => Err(Rejected),
            }
        }

        fn apply(&self, state: &mut Self::State, event: &Self::Event) {
            match event {
                TestEvent::Incremented => state.count += 1,
            }
        }
    }

    #[test]
    fn success_path_applies_events() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState { count: 0 })
            .when_command(TestCommand::Increment)
            .then_state(|state| {
                assert_eq!(state.count, 1);
            })
            .then_events(|events| {
                assertions::assert_event_count(events, 1);
            })
            .run();
    }

    #[test]
    fn failure_path_surfaces_the_error() {
        ReducerTest::new(TestReducer)
            .with_env(())
            .given_state(TestState { count: 0 })
            .when_command(TestCommand::Reject)
            .then_error(|error| {
                assert_eq!(*error, Rejected);
            })
            .run();
    }
}
