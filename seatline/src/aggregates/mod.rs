//! The ticketing aggregates and their composition.
//!
//! Each aggregate owns a slice of [`TicketingState`] and contributes a
//! command/event pair; the [`TicketingReducer`] delegates by wrapper variant
//! so one store serializes every transition. Cross-slice reads (the ledger
//! consulting catalog prices, the transfer machine consulting ticket
//! ownership) happen inside `handle` against the same state snapshot the
//! command will commit against, which is what makes the conditional checks
//! race-free.

pub mod catalog;
pub mod inventory;
pub mod orders;
pub mod transfers;

use std::sync::Arc;

use seatline_core::{Clock, Reducer, SmallVec, SystemClock};
use serde::{Deserialize, Serialize};

use crate::codes::{CodeIssuer, RandomCodeIssuer};
use crate::config::SeatlineConfig;
use crate::error::TicketingError;

pub use catalog::{CatalogCommand, CatalogEvent, CatalogReducer, CatalogState};
pub use inventory::{InventoryCommand, InventoryEvent, InventoryReducer, InventoryState};
pub use orders::{OrderCommand, OrderEvent, OrderReducer, OrderState};
pub use transfers::{TransferCommand, TransferEvent, TransferReducer, TransferState};

/// All ticketing state, sliced by aggregate.
///
/// Entities live in arena maps keyed by id; relations are id-valued foreign
/// keys plus the secondary indices each slice maintains.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TicketingState {
    /// Reference data: users, organizers, venues, events, ticket types.
    pub catalog: CatalogState,
    /// Issued counters, tickets, and the code index.
    pub inventory: InventoryState,
    /// Orders.
    pub orders: OrderState,
    /// Transfers and the pending-per-ticket index.
    pub transfers: TransferState,
}

impl TicketingState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Environment dependencies injected into every aggregate.
#[derive(Clone)]
pub struct TicketingEnvironment {
    /// Clock for timestamps and deadline checks.
    pub clock: Arc<dyn Clock>,
    /// Source of candidate ticket codes.
    pub codes: Arc<dyn CodeIssuer>,
    /// Subsystem configuration (transfer TTL, sweep interval).
    pub config: SeatlineConfig,
}

impl TicketingEnvironment {
    /// Creates an environment from explicit dependencies.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        codes: Arc<dyn CodeIssuer>,
        config: SeatlineConfig,
    ) -> Self {
        Self {
            clock,
            codes,
            config,
        }
    }

    /// Production wiring: system clock and random code issuance.
    #[must_use]
    pub fn production(config: SeatlineConfig) -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomCodeIssuer), config)
    }
}

/// All commands the ticketing store accepts.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TicketingCommand {
    /// Reference-data registration.
    Catalog(CatalogCommand),
    /// Reserve or release inventory.
    Inventory(InventoryCommand),
    /// Order lifecycle.
    Orders(OrderCommand),
    /// Transfer lifecycle and expiry sweep.
    Transfers(TransferCommand),
}

impl From<CatalogCommand> for TicketingCommand {
    fn from(command: CatalogCommand) -> Self {
        Self::Catalog(command)
    }
}

impl From<InventoryCommand> for TicketingCommand {
    fn from(command: InventoryCommand) -> Self {
        Self::Inventory(command)
    }
}

impl From<OrderCommand> for TicketingCommand {
    fn from(command: OrderCommand) -> Self {
        Self::Orders(command)
    }
}

impl From<TransferCommand> for TicketingCommand {
    fn from(command: TransferCommand) -> Self {
        Self::Transfers(command)
    }
}

/// All events the ticketing store commits, in one feed for downstream
/// consumers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketingEvent {
    /// Reference data changed.
    Catalog(CatalogEvent),
    /// Inventory was reserved or released.
    Inventory(InventoryEvent),
    /// An order transitioned.
    Orders(OrderEvent),
    /// A transfer transitioned.
    Transfers(TransferEvent),
}

/// Delegating reducer over all four aggregates.
#[derive(Clone, Copy, Debug, Default)]
pub struct TicketingReducer {
    catalog: CatalogReducer,
    inventory: InventoryReducer,
    orders: OrderReducer,
    transfers: TransferReducer,
}

impl TicketingReducer {
    /// Creates the composed reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            catalog: CatalogReducer::new(),
            inventory: InventoryReducer::new(),
            orders: OrderReducer::new(),
            transfers: TransferReducer::new(),
        }
    }
}

impl Reducer for TicketingReducer {
    type State = TicketingState;
    type Command = TicketingCommand;
    type Event = TicketingEvent;
    type Error = TicketingError;
    type Environment = TicketingEnvironment;

    fn handle(
        &self,
        state: &Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
        match command {
            TicketingCommand::Catalog(command) => self
                .catalog
                .handle(state, command, env)
                .map(|events| events.into_iter().map(TicketingEvent::Catalog).collect()),
            TicketingCommand::Inventory(command) => self
                .inventory
                .handle(state, command, env)
                .map(|events| events.into_iter().map(TicketingEvent::Inventory).collect()),
            TicketingCommand::Orders(command) => self
                .orders
                .handle(state, command, env)
                .map(|events| events.into_iter().map(TicketingEvent::Orders).collect()),
            TicketingCommand::Transfers(command) => self
                .transfers
                .handle(state, command, env)
                .map(|events| events.into_iter().map(TicketingEvent::Transfers).collect()),
        }
    }

    fn apply(&self, state: &mut Self::State, event: &Self::Event) {
        match event {
            TicketingEvent::Catalog(event) => self.catalog.apply(state, event),
            TicketingEvent::Inventory(event) => self.inventory.apply(state, event),
            TicketingEvent::Orders(event) => self.orders.apply(state, event),
            TicketingEvent::Transfers(event) => self.transfers.apply(state, event),
        }
    }
}
