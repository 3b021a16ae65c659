//! # Seatline Core
//!
//! Core traits and runtime for the Seatline ticketing architecture.
//!
//! This crate provides the fundamental abstractions the domain crates build
//! on: domain logic is written as reducers, and a [`Store`] linearizes every
//! command against the state it owns.
//!
//! ## Core Concepts
//!
//! - **State**: the domain state a store owns
//! - **Command**: a request to change state, validated before anything mutates
//! - **Event**: a fact about what happened, folded into state infallibly
//! - **Reducer**: `handle` decides (command → events or a typed error),
//!   `apply` evolves (event → state)
//! - **Environment**: injected dependencies via traits (clock, id sources)
//!
//! ## Architecture Principles
//!
//! - Functional core, imperative shell
//! - Commands are atomic: all of a command's events are applied under one
//!   serialization point, or none are
//! - Explicit dependencies (no ambient clock, no global state)
//!
//! ## Example
//!
//! ```
//! use seatline_core::{Reducer, SmallVec, smallvec};
//!
//! #[derive(Default)]
//! struct CounterState {
//!     count: u32,
//! }
//!
//! enum CounterCommand {
//!     Increment,
//! }
//!
//! #[derive(Clone)]
//! enum CounterEvent {
//!     Incremented,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Command = CounterCommand;
//!     type Event = CounterEvent;
//!     type Error = std::convert::Infallible;
//!     type Environment = ();
//!
//!     fn handle(
//!         &self,
//!         _state: &Self::State,
//!         command: Self::Command,
//!         _env: &Self::Environment,
//!     ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
//!         match command {
//!             CounterCommand::Increment => Ok(smallvec![CounterEvent::Incremented]),
//!         }
//!     }
//!
//!     fn apply(&self, state: &mut Self::State, event: &Self::Event) {
//!         match event {
//!             CounterEvent::Incremented => state.count += 1,
//!         }
//!     }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod environment;
pub mod reducer;
pub mod store;

pub use environment::{Clock, SystemClock};
pub use reducer::Reducer;
pub use store::Store;

// Re-export commonly used types so domain crates depend on one surface.
pub use chrono::{DateTime, Utc};
pub use smallvec::{SmallVec, smallvec};
