//! # Seatline
//!
//! An event-ticketing domain: organizers publish events with priced,
//! capacity-bounded ticket types; buyers purchase tickets bundled into
//! orders; owned tickets move between users through a time-boxed
//! accept/decline transfer workflow.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │   Catalog    │  │  Inventory   │  │    Orders    │  │  Transfers   │
//! │ (reference)  │  │   (ledger)   │  │  (workflow)  │  │ (state mach.)│
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        └─────────────────┴────────┬────────┴─────────────────┘
//!                                   │
//!                          TicketingReducer
//!                                   │
//!                              Store (serialized dispatch)
//!                               │         │
//!                         event journal   broadcast feed
//! ```
//!
//! All four aggregates share one [`TicketingState`] behind one store, so
//! every command is validated and applied under a single serialization
//! point. That is what makes the two hard guarantees hold:
//!
//! - **No oversell**: `Reserve` checks `issued + quantity <= capacity`
//!   against the state it commits to. Concurrent buyers of the last
//!   tickets are ordered; the loser gets `CapacityExceeded` (retryable).
//! - **Single-winner transitions**: a transfer leaves `Pending` exactly
//!   once. Accept, decline, cancel, and the expiry sweep all contend
//!   through the same dispatch; losers observe `TransferNotPending`.
//!
//! Order creation spans multiple ticket types and is the one multi-dispatch
//! workflow: a compensating saga in [`services::orders::create_order`] that
//! releases earlier reservations when a later line item fails, persisting
//! the order row only after every reservation succeeded.
//!
//! Transfer deadlines are domain data (`expires_at`), not runtime timers:
//! acceptance checks the deadline lazily, and the [`sweeper`] finalizes
//! lapsed offers eagerly on an interval. Both use the same predicate.
//!
//! # Usage
//!
//! ```ignore
//! let config = SeatlineConfig::from_env();
//! let store = TicketingStore::new(
//!     TicketingState::new(),
//!     TicketingReducer::new(),
//!     TicketingEnvironment::production(config.clone()),
//! );
//!
//! let buyer = services::catalog::register_user(&store, "a@example.com", "a").await?;
//! let order = services::orders::create_order(&store, buyer, line_items).await?;
//! services::orders::confirm_order(&store, buyer, order).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregates;
pub mod codes;
pub mod config;
pub mod error;
pub mod services;
pub mod sweeper;
pub mod types;

pub use aggregates::{
    TicketingCommand, TicketingEnvironment, TicketingEvent, TicketingReducer, TicketingState,
};
pub use config::SeatlineConfig;
pub use error::{ErrorKind, TicketingError};

/// The store every service function and the sweeper operate on.
pub type TicketingStore = seatline_core::Store<TicketingReducer>;
