//! Order workflow: open, confirm, cancel.
//!
//! Orders are the only path that finalizes tickets. Confirmation assigns
//! every provisional ticket of the order a globally unique admission code
//! and flips it to Active in the same command, so a confirmed order can
//! never be observed with unfinalized tickets. Cancellation releases the
//! reserved units through the same helper the ledger uses.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use seatline_core::{Reducer, SmallVec, smallvec};
use serde::{Deserialize, Serialize};

use super::inventory::apply_release;
use super::{TicketingEnvironment, TicketingState};
use crate::error::TicketingError;
use crate::types::{
    LineItem, Money, Order, OrderId, OrderStatus, TicketCode, TicketId, TicketStatus, UserId,
};

/// How many candidate codes to try per ticket before giving up.
const MAX_CODE_ATTEMPTS: usize = 8;

/// Order arena.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderState {
    /// All orders by id.
    pub orders: HashMap<OrderId, Order>,
}

impl OrderState {
    /// Looks up an order.
    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.get(id)
    }
}

/// Commands for the order workflow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum OrderCommand {
    /// Persist a pending order whose line items have all been reserved.
    ///
    /// The total is computed here from catalog unit prices; the command
    /// fails without side effects if any line item is unknown or the sum
    /// overflows.
    OpenOrder {
        /// Id for the new order.
        order_id: OrderId,
        /// Purchasing user.
        user_id: UserId,
        /// What was bought.
        line_items: Vec<LineItem>,
    },
    /// Finalize a pending order: assign codes, activate tickets.
    ConfirmOrder {
        /// Order to confirm.
        order_id: OrderId,
        /// Verified caller; must own the order.
        user_id: UserId,
    },
    /// Abandon a pending order and release its reservations.
    CancelOrder {
        /// Order to cancel.
        order_id: OrderId,
        /// Verified caller; must own the order.
        user_id: UserId,
    },
}

/// Events committed by the order workflow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderEvent {
    /// A pending order was persisted.
    OrderOpened {
        /// New order id.
        order_id: OrderId,
        /// Purchasing user.
        user_id: UserId,
        /// Total computed from unit prices.
        total_amount: Money,
        /// Creation time.
        opened_at: DateTime<Utc>,
    },
    /// A pending order was confirmed and its tickets finalized.
    OrderConfirmed {
        /// The order.
        order_id: OrderId,
        /// Code assigned to each ticket of the order.
        codes: Vec<(TicketId, TicketCode)>,
        /// Confirmation time.
        confirmed_at: DateTime<Utc>,
    },
    /// A pending order was cancelled and its reservations released.
    OrderCancelled {
        /// The order.
        order_id: OrderId,
        /// The provisional tickets released with it.
        ticket_ids: Vec<TicketId>,
        /// Cancellation time.
        cancelled_at: DateTime<Utc>,
    },
}

/// Reducer for the order workflow.
#[derive(Clone, Copy, Debug, Default)]
pub struct OrderReducer;

impl OrderReducer {
    /// Creates a new `OrderReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn handle_open_order(
        state: &TicketingState,
        order_id: OrderId,
        user_id: UserId,
        line_items: &[LineItem],
        env: &TicketingEnvironment,
    ) -> Result<OrderEvent, TicketingError> {
        if state.orders.orders.contains_key(&order_id) {
            return Err(TicketingError::OrderAlreadyExists(order_id));
        }
        if line_items.is_empty() {
            return Err(TicketingError::EmptyOrder);
        }

        let mut total = Money::from_cents(0);
        for item in line_items {
            if item.quantity == 0 {
                return Err(TicketingError::InvalidQuantity);
            }
            let ticket_type = state
                .catalog
                .ticket_type(&item.ticket_type_id)
                .ok_or(TicketingError::TicketTypeNotFound(item.ticket_type_id))?;
            let line_total = ticket_type
                .unit_price
                .checked_multiply(item.quantity)
                .ok_or(TicketingError::AmountOverflow)?;
            total = total
                .checked_add(line_total)
                .ok_or(TicketingError::AmountOverflow)?;
        }

        Ok(OrderEvent::OrderOpened {
            order_id,
            user_id,
            total_amount: total,
            opened_at: env.clock.now(),
        })
    }

    /// Loads a pending order owned by `user_id`, or says why not.
    fn pending_order<'a>(
        state: &'a TicketingState,
        order_id: OrderId,
        user_id: UserId,
    ) -> Result<&'a Order, TicketingError> {
        let order = state
            .orders
            .order(&order_id)
            .ok_or(TicketingError::OrderNotFound(order_id))?;
        if order.user_id != user_id {
            return Err(TicketingError::OrderNotOwned { order_id, user_id });
        }
        if order.status != OrderStatus::Pending {
            return Err(TicketingError::OrderNotPending(order_id));
        }
        Ok(order)
    }

    /// The order's tickets still awaiting finalization.
    fn provisional_tickets(state: &TicketingState, order_id: OrderId) -> Vec<TicketId> {
        state
            .inventory
            .order_tickets(&order_id)
            .iter()
            .copied()
            .filter(|id| {
                state
                    .inventory
                    .ticket(id)
                    .is_some_and(|ticket| ticket.status == TicketStatus::Provisional)
            })
            .collect()
    }

    fn handle_confirm_order(
        state: &TicketingState,
        order_id: OrderId,
        user_id: UserId,
        env: &TicketingEnvironment,
    ) -> Result<OrderEvent, TicketingError> {
        Self::pending_order(state, order_id, user_id)?;

        // Issue a unique code per ticket. Candidates are re-checked against
        // the ledger's code index and against this batch before commit;
        // a colliding source gets a bounded number of retries.
        let mut codes = Vec::new();
        let mut batch: HashSet<TicketCode> = HashSet::new();
        for ticket_id in Self::provisional_tickets(state, order_id) {
            let mut assigned = None;
            for _ in 0..MAX_CODE_ATTEMPTS {
                let candidate = env.codes.issue();
                if !state.inventory.code_in_use(&candidate) && !batch.contains(&candidate) {
                    assigned = Some(candidate);
                    break;
                }
            }
            let code = assigned.ok_or(TicketingError::CodeSpaceExhausted)?;
            batch.insert(code.clone());
            codes.push((ticket_id, code));
        }

        Ok(OrderEvent::OrderConfirmed {
            order_id,
            codes,
            confirmed_at: env.clock.now(),
        })
    }

    fn handle_cancel_order(
        state: &TicketingState,
        order_id: OrderId,
        user_id: UserId,
        env: &TicketingEnvironment,
    ) -> Result<OrderEvent, TicketingError> {
        Self::pending_order(state, order_id, user_id)?;
        Ok(OrderEvent::OrderCancelled {
            order_id,
            ticket_ids: Self::provisional_tickets(state, order_id),
            cancelled_at: env.clock.now(),
        })
    }
}

impl Reducer for OrderReducer {
    type State = TicketingState;
    type Command = OrderCommand;
    type Event = OrderEvent;
    type Error = TicketingError;
    type Environment = TicketingEnvironment;

    fn handle(
        &self,
        state: &Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
        let event = match command {
            OrderCommand::OpenOrder {
                order_id,
                user_id,
                line_items,
            } => Self::handle_open_order(state, order_id, user_id, &line_items, env)?,
            OrderCommand::ConfirmOrder { order_id, user_id } => {
                Self::handle_confirm_order(state, order_id, user_id, env)?
            }
            OrderCommand::CancelOrder { order_id, user_id } => {
                Self::handle_cancel_order(state, order_id, user_id, env)?
            }
        };
        Ok(smallvec![event])
    }

    fn apply(&self, state: &mut Self::State, event: &Self::Event) {
        match event {
            OrderEvent::OrderOpened {
                order_id,
                user_id,
                total_amount,
                opened_at,
            } => {
                state.orders.orders.insert(
                    *order_id,
                    Order {
                        id: *order_id,
                        user_id: *user_id,
                        total_amount: *total_amount,
                        status: OrderStatus::Pending,
                        created_at: *opened_at,
                    },
                );
            }
            OrderEvent::OrderConfirmed {
                order_id, codes, ..
            } => {
                if let Some(order) = state.orders.orders.get_mut(order_id) {
                    order.status = OrderStatus::Confirmed;
                }
                for (ticket_id, code) in codes {
                    if let Some(ticket) = state.inventory.tickets.get_mut(ticket_id) {
                        ticket.status = TicketStatus::Active;
                        ticket.code = Some(code.clone());
                    }
                    state.inventory.codes.insert(code.clone(), *ticket_id);
                }
            }
            OrderEvent::OrderCancelled {
                order_id,
                ticket_ids,
                ..
            } => {
                if let Some(order) = state.orders.orders.get_mut(order_id) {
                    order.status = OrderStatus::Cancelled;
                }
                apply_release(state, ticket_ids);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use seatline_testing::ReducerTest;

    use super::*;
    use crate::aggregates::fixtures::{seeded_state, test_environment};
    use crate::aggregates::inventory::{InventoryCommand, InventoryReducer};

    /// Seeds a state with an opened order holding `quantity` reserved
    /// tickets.
    fn state_with_pending_order(
        quantity: u32,
    ) -> (TicketingState, TicketingEnvironment, OrderId, UserId) {
        let now = Utc::now();
        let (mut state, seed) = seeded_state(now);
        let env = test_environment(now);
        let order_id = OrderId::new();

        let inventory = InventoryReducer::new();
        let events = inventory
            .handle(
                &state,
                InventoryCommand::Reserve {
                    order_id,
                    user_id: seed.alice,
                    ticket_type_id: seed.ticket_type_id,
                    quantity,
                },
                &env,
            )
            .unwrap();
        for event in &events {
            inventory.apply(&mut state, event);
        }

        let orders = OrderReducer::new();
        let events = orders
            .handle(
                &state,
                OrderCommand::OpenOrder {
                    order_id,
                    user_id: seed.alice,
                    line_items: vec![LineItem {
                        ticket_type_id: seed.ticket_type_id,
                        quantity,
                    }],
                },
                &env,
            )
            .unwrap();
        for event in &events {
            orders.apply(&mut state, event);
        }

        (state, env, order_id, seed.alice)
    }

    #[test]
    fn open_order_totals_from_unit_prices() {
        let (state, _env, order_id, _user) = state_with_pending_order(3);
        let order = state.orders.order(&order_id).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        // 3 x $25.00
        assert_eq!(order.total_amount, Money::from_cents(7500));
    }

    #[test]
    fn open_order_rejects_empty_line_items() {
        let now = Utc::now();
        let (state, seed) = seeded_state(now);

        ReducerTest::new(OrderReducer::new())
            .with_env(test_environment(now))
            .given_state(state)
            .when_command(OrderCommand::OpenOrder {
                order_id: OrderId::new(),
                user_id: seed.alice,
                line_items: vec![],
            })
            .then_error(|error| {
                assert_eq!(*error, TicketingError::EmptyOrder);
            })
            .run();
    }

    #[test]
    fn confirm_assigns_unique_codes_and_activates_tickets() {
        let (state, env, order_id, user_id) = state_with_pending_order(2);

        ReducerTest::new(OrderReducer::new())
            .with_env(env)
            .given_state(state)
            .when_command(OrderCommand::ConfirmOrder { order_id, user_id })
            .then_state(move |state| {
                assert_eq!(
                    state.orders.order(&order_id).unwrap().status,
                    OrderStatus::Confirmed
                );
                let mut seen = HashSet::new();
                for ticket_id in state.inventory.order_tickets(&order_id) {
                    let ticket = state.inventory.ticket(ticket_id).unwrap();
                    assert_eq!(ticket.status, TicketStatus::Active);
                    let code = ticket.code.clone().unwrap();
                    assert!(state.inventory.code_in_use(&code));
                    assert!(seen.insert(code), "codes must be unique");
                }
            })
            .run();
    }

    #[test]
    fn confirm_requires_the_order_owner() {
        let (state, env, order_id, _user) = state_with_pending_order(1);
        let stranger = UserId::new();

        ReducerTest::new(OrderReducer::new())
            .with_env(env)
            .given_state(state)
            .when_command(OrderCommand::ConfirmOrder {
                order_id,
                user_id: stranger,
            })
            .then_error(move |error| {
                assert_eq!(
                    *error,
                    TicketingError::OrderNotOwned {
                        order_id,
                        user_id: stranger,
                    }
                );
            })
            .run();
    }

    #[test]
    fn cancel_releases_reservations() {
        let (mut state, env, order_id, user_id) = state_with_pending_order(2);
        let ticket_type_id = state
            .inventory
            .ticket(&state.inventory.order_tickets(&order_id)[0])
            .unwrap()
            .ticket_type_id;
        assert_eq!(state.inventory.issued_count(&ticket_type_id), 2);

        let reducer = OrderReducer::new();
        let events = reducer
            .handle(&state, OrderCommand::CancelOrder { order_id, user_id }, &env)
            .unwrap();
        for event in &events {
            reducer.apply(&mut state, event);
        }

        assert_eq!(
            state.orders.order(&order_id).unwrap().status,
            OrderStatus::Cancelled
        );
        assert_eq!(state.inventory.issued_count(&ticket_type_id), 0);

        // Terminal: a second cancel (or a confirm) is a conflict.
        let result = reducer.handle(&state, OrderCommand::CancelOrder { order_id, user_id }, &env);
        assert_eq!(result, Err(TicketingError::OrderNotPending(order_id)));
        let result = reducer.handle(&state, OrderCommand::ConfirmOrder { order_id, user_id }, &env);
        assert_eq!(result, Err(TicketingError::OrderNotPending(order_id)));
    }
}
