//! Inventory ledger: issued counters and the ticket arena.
//!
//! This aggregate is what prevents overselling. The reserve command checks
//! `issued + quantity <= capacity` against the same state snapshot its
//! events will be applied to; the store's dispatch lock makes that check a
//! conditional update, so concurrent reservations for the last tickets
//! cannot both pass.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use seatline_core::{Reducer, SmallVec, smallvec};
use serde::{Deserialize, Serialize};

use super::{TicketingEnvironment, TicketingState};
use crate::error::TicketingError;
use crate::types::{
    OrderId, Ticket, TicketCode, TicketId, TicketStatus, TicketTypeId, UserId,
};

/// Ledger state: counters, tickets, and the indices over them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct InventoryState {
    /// Units issued per ticket type. Absent means zero.
    ///
    /// Invariant: `0 <= issued <= capacity` for every ticket type, under
    /// arbitrary interleavings of reserve and release.
    pub issued: HashMap<TicketTypeId, u32>,
    /// All tickets by id, provisional and finalized alike.
    pub tickets: HashMap<TicketId, Ticket>,
    /// Order → tickets created for it.
    pub tickets_by_order: HashMap<OrderId, Vec<TicketId>>,
    /// Issued admission codes, enforcing global uniqueness.
    pub codes: HashMap<TicketCode, TicketId>,
}

impl InventoryState {
    /// Units issued against a ticket type.
    #[must_use]
    pub fn issued_count(&self, id: &TicketTypeId) -> u32 {
        self.issued.get(id).copied().unwrap_or(0)
    }

    /// Looks up a ticket.
    #[must_use]
    pub fn ticket(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.get(id)
    }

    /// Tickets created for an order, in reservation order.
    #[must_use]
    pub fn order_tickets(&self, order_id: &OrderId) -> &[TicketId] {
        self.tickets_by_order
            .get(order_id)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether an admission code is already taken.
    #[must_use]
    pub fn code_in_use(&self, code: &TicketCode) -> bool {
        self.codes.contains_key(code)
    }
}

/// Commands for the inventory ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum InventoryCommand {
    /// Atomically reserve `quantity` units of a ticket type for an order.
    ///
    /// Either all units are reserved or none are; there is no partial
    /// reservation.
    Reserve {
        /// The order the tickets belong to.
        order_id: OrderId,
        /// The purchasing user, who owns the provisional tickets.
        user_id: UserId,
        /// Ticket type to draw from.
        ticket_type_id: TicketTypeId,
        /// How many units. Must be at least one.
        quantity: u32,
    },
    /// Void provisional tickets and return their units to the pool.
    ///
    /// Compensating operation for abandoned reservations. Idempotent:
    /// already-void or unknown tickets are skipped, so a retried release
    /// has no further effect.
    Release {
        /// The tickets to release.
        ticket_ids: Vec<TicketId>,
    },
}

/// Events committed by the inventory ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    /// Units were reserved and provisional tickets created.
    TicketsReserved {
        /// The order the tickets belong to.
        order_id: OrderId,
        /// Owner of the provisional tickets.
        user_id: UserId,
        /// Ticket type drawn from.
        ticket_type_id: TicketTypeId,
        /// Ids of the created tickets; length is the reserved quantity.
        ticket_ids: Vec<TicketId>,
        /// When the reservation happened.
        reserved_at: DateTime<Utc>,
    },
    /// Provisional tickets were voided and their units returned.
    TicketsReleased {
        /// The tickets actually released (already-void ones are absent).
        ticket_ids: Vec<TicketId>,
        /// When the release happened.
        released_at: DateTime<Utc>,
    },
}

/// Reducer for the inventory ledger.
#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryReducer;

impl InventoryReducer {
    /// Creates a new `InventoryReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn handle_reserve(
        state: &TicketingState,
        order_id: OrderId,
        user_id: UserId,
        ticket_type_id: TicketTypeId,
        quantity: u32,
        env: &TicketingEnvironment,
    ) -> Result<InventoryEvent, TicketingError> {
        if quantity == 0 {
            return Err(TicketingError::InvalidQuantity);
        }
        let ticket_type = state
            .catalog
            .ticket_type(&ticket_type_id)
            .ok_or(TicketingError::TicketTypeNotFound(ticket_type_id))?;
        let event = state
            .catalog
            .event(&ticket_type.event_id)
            .ok_or(TicketingError::EventNotFound(ticket_type.event_id))?;
        if !event.is_open_for_sales(env.clock.now()) {
            return Err(TicketingError::EventClosed(event.id));
        }

        // The oversell guard. Dispatch serialization turns this read into a
        // conditional update: no other reservation can commit between this
        // check and the event being applied.
        let issued = state.inventory.issued_count(&ticket_type_id);
        let available = ticket_type.capacity.value().saturating_sub(issued);
        if quantity > available {
            return Err(TicketingError::CapacityExceeded {
                ticket_type_id,
                requested: quantity,
                available,
            });
        }

        let ticket_ids = (0..quantity).map(|_| TicketId::new()).collect();
        Ok(InventoryEvent::TicketsReserved {
            order_id,
            user_id,
            ticket_type_id,
            ticket_ids,
            reserved_at: env.clock.now(),
        })
    }

    fn handle_release(
        state: &TicketingState,
        ticket_ids: &[TicketId],
        env: &TicketingEnvironment,
    ) -> Option<InventoryEvent> {
        let released: Vec<TicketId> = ticket_ids
            .iter()
            .copied()
            .filter(|id| {
                state
                    .inventory
                    .ticket(id)
                    .is_some_and(|ticket| ticket.status == TicketStatus::Provisional)
            })
            .collect();
        if released.is_empty() {
            // Nothing left to do; the reservation was already released.
            return None;
        }
        Some(InventoryEvent::TicketsReleased {
            ticket_ids: released,
            released_at: env.clock.now(),
        })
    }
}

/// Voids provisional tickets and decrements their type counters.
///
/// Shared between the ledger's own release event and order cancellation,
/// so both paths count units back identically. Skips anything not
/// provisional, which is what makes release idempotent.
pub(crate) fn apply_release(state: &mut TicketingState, ticket_ids: &[TicketId]) {
    for ticket_id in ticket_ids {
        let Some(ticket) = state.inventory.tickets.get_mut(ticket_id) else {
            continue;
        };
        if ticket.status != TicketStatus::Provisional {
            continue;
        }
        ticket.status = TicketStatus::Void;
        let ticket_type_id = ticket.ticket_type_id;
        if let Some(issued) = state.inventory.issued.get_mut(&ticket_type_id) {
            *issued = issued.saturating_sub(1);
        }
    }
}

impl Reducer for InventoryReducer {
    type State = TicketingState;
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = TicketingError;
    type Environment = TicketingEnvironment;

    fn handle(
        &self,
        state: &Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
        match command {
            InventoryCommand::Reserve {
                order_id,
                user_id,
                ticket_type_id,
                quantity,
            } => Self::handle_reserve(state, order_id, user_id, ticket_type_id, quantity, env)
                .map(|event| smallvec![event]),
            InventoryCommand::Release { ticket_ids } => {
                Ok(Self::handle_release(state, &ticket_ids, env)
                    .map_or_else(SmallVec::new, |event| smallvec![event]))
            }
        }
    }

    fn apply(&self, state: &mut Self::State, event: &Self::Event) {
        match event {
            InventoryEvent::TicketsReserved {
                order_id,
                user_id,
                ticket_type_id,
                ticket_ids,
                ..
            } => {
                #[allow(clippy::cast_possible_truncation)]
                {
                    *state.inventory.issued.entry(*ticket_type_id).or_insert(0) +=
                        ticket_ids.len() as u32;
                }
                for ticket_id in ticket_ids {
                    state.inventory.tickets.insert(
                        *ticket_id,
                        Ticket {
                            id: *ticket_id,
                            ticket_type_id: *ticket_type_id,
                            order_id: *order_id,
                            owner_user_id: *user_id,
                            code: None,
                            status: TicketStatus::Provisional,
                        },
                    );
                }
                state
                    .inventory
                    .tickets_by_order
                    .entry(*order_id)
                    .or_default()
                    .extend(ticket_ids.iter().copied());
            }
            InventoryEvent::TicketsReleased { ticket_ids, .. } => {
                apply_release(state, ticket_ids);
            }
        }
    }
}
