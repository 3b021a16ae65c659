//! The store: owns state and linearizes every command against it.
//!
//! A [`Store`] is the imperative shell around a [`Reducer`]. Dispatching a
//! command takes the write lock, runs `handle`, and folds the resulting
//! events into state before the lock is released. That write path is the
//! single serialization point for the state the store owns: two concurrent
//! dispatches are ordered, one sees the other's effects, and a conditional
//! check inside `handle` (a capacity guard, a status guard) can never be
//! invalidated between deciding and applying.
//!
//! Committed events are appended to an in-memory journal and broadcast to
//! subscribers, so downstream consumers (notification, read models) observe
//! every transition in commit order without the store pushing anything
//! itself.

use std::sync::Arc;

use smallvec::SmallVec;
use tokio::sync::{RwLock, broadcast};

use crate::reducer::Reducer;

/// Default capacity of the event broadcast channel.
const DEFAULT_BROADCAST_CAPACITY: usize = 64;

struct StoreInner<R: Reducer> {
    state: R::State,
    journal: Vec<R::Event>,
}

/// Owns a reducer's state and serializes commands against it.
///
/// Cloning a `Store` is cheap and every clone addresses the same state, so
/// request handlers, background tasks, and tests can all hold one.
///
/// # Example
///
/// ```ignore
/// let store = Store::new(TicketingState::default(), TicketingReducer::new(), env);
///
/// let events = store
///     .dispatch(TicketingCommand::Inventory(InventoryCommand::Reserve { .. }))
///     .await?;
/// ```
pub struct Store<R: Reducer> {
    inner: Arc<RwLock<StoreInner<R>>>,
    reducer: Arc<R>,
    environment: Arc<R::Environment>,
    events: broadcast::Sender<R::Event>,
}

impl<R: Reducer> Clone for Store<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            reducer: Arc::clone(&self.reducer),
            environment: Arc::clone(&self.environment),
            events: self.events.clone(),
        }
    }
}

impl<R> Store<R>
where
    R: Reducer,
    R::Event: Clone,
{
    /// Creates a store with the default broadcast capacity.
    #[must_use]
    pub fn new(initial_state: R::State, reducer: R, environment: R::Environment) -> Self {
        Self::with_broadcast_capacity(initial_state, reducer, environment, DEFAULT_BROADCAST_CAPACITY)
    }

    /// Creates a store with an explicit broadcast capacity.
    ///
    /// Slow subscribers that fall more than `capacity` events behind observe
    /// a lag error on their receiver; state and journal are unaffected.
    #[must_use]
    pub fn with_broadcast_capacity(
        initial_state: R::State,
        reducer: R,
        environment: R::Environment,
        capacity: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                state: initial_state,
                journal: Vec::new(),
            })),
            reducer: Arc::new(reducer),
            environment: Arc::new(environment),
            events,
        }
    }

    /// Dispatches a command and returns the events it committed.
    ///
    /// The write lock is held across decide and apply, so the command is
    /// atomic: either every returned event is in state and in the journal,
    /// or the error left nothing behind.
    ///
    /// # Errors
    ///
    /// Returns the reducer's rejection unchanged; no state was mutated.
    pub async fn dispatch(
        &self,
        command: R::Command,
    ) -> Result<SmallVec<[R::Event; 4]>, R::Error> {
        let mut inner = self.inner.write().await;
        let events = self
            .reducer
            .handle(&inner.state, command, &self.environment)?;
        for event in &events {
            self.reducer.apply(&mut inner.state, event);
            inner.journal.push(event.clone());
            // Send while the lock is held so the feed preserves commit order.
            // An error only means there are currently no subscribers.
            let _ = self.events.send(event.clone());
        }
        Ok(events)
    }

    /// Reads state through a closure without cloning it.
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&R::State) -> T,
    {
        let inner = self.inner.read().await;
        f(&inner.state)
    }

    /// A snapshot of every committed event, in commit order.
    pub async fn journal(&self) -> Vec<R::Event> {
        let inner = self.inner.read().await;
        inner.journal.clone()
    }

    /// Number of committed events.
    pub async fn journal_len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.journal.len()
    }

    /// Subscribes to the live event feed.
    ///
    /// Only events committed after this call are delivered; use
    /// [`journal`](Self::journal) for history.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<R::Event> {
        self.events.subscribe()
    }

    /// The environment this store injects into its reducer.
    #[must_use]
    pub fn environment(&self) -> &R::Environment {
        &self.environment
    }
}
