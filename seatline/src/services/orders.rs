//! Order operations, including the creation saga.
//!
//! Creating an order spans one reservation per line item plus the order row
//! itself. Those are independent dispatches forming a compensating saga
//! rather than one transaction: a failed line item (or a
//! failed order open) releases everything reserved so far, and since the
//! order row is only written after every reservation succeeded, no partial
//! order is ever persisted.

use tracing::{error, info, warn};

use crate::TicketingStore;
use crate::aggregates::{
    InventoryCommand, InventoryEvent, OrderCommand, TicketingEvent,
};
use crate::error::TicketingError;
use crate::types::{LineItem, OrderId, TicketId, UserId};

/// Creates an order for `user_id`, reserving every line item.
///
/// Returns the new order's id; the order is `Pending` with all its tickets
/// reserved provisionally.
///
/// # Errors
///
/// The first `InventoryError` encountered (`CapacityExceeded`,
/// `TicketTypeNotFound`, `EventClosed`, `InvalidQuantity`), or `EmptyOrder`
/// for no line items. On any error every reservation already made for this
/// order has been released and nothing was persisted.
pub async fn create_order(
    store: &TicketingStore,
    user_id: UserId,
    line_items: Vec<LineItem>,
) -> Result<OrderId, TicketingError> {
    if line_items.is_empty() {
        return Err(TicketingError::EmptyOrder);
    }

    let order_id = OrderId::new();
    let mut reserved: Vec<TicketId> = Vec::new();

    for item in &line_items {
        let result = store
            .dispatch(
                InventoryCommand::Reserve {
                    order_id,
                    user_id,
                    ticket_type_id: item.ticket_type_id,
                    quantity: item.quantity,
                }
                .into(),
            )
            .await;
        match result {
            Ok(events) => {
                for event in events {
                    if let TicketingEvent::Inventory(InventoryEvent::TicketsReserved {
                        ticket_ids,
                        ..
                    }) = event
                    {
                        reserved.extend(ticket_ids);
                    }
                }
            }
            Err(rejection) => {
                warn!(
                    %order_id,
                    ticket_type_id = %item.ticket_type_id,
                    code = rejection.code(),
                    "line item reservation failed, rolling back"
                );
                release_reserved(store, reserved).await;
                return Err(rejection);
            }
        }
    }

    if let Err(rejection) = store
        .dispatch(
            OrderCommand::OpenOrder {
                order_id,
                user_id,
                line_items,
            }
            .into(),
        )
        .await
    {
        release_reserved(store, reserved).await;
        return Err(rejection);
    }

    info!(%order_id, %user_id, tickets = reserved.len(), "order opened");
    Ok(order_id)
}

/// Compensation: return already-reserved units to the pool.
async fn release_reserved(store: &TicketingStore, ticket_ids: Vec<TicketId>) {
    if ticket_ids.is_empty() {
        return;
    }
    if let Err(rejection) = store
        .dispatch(InventoryCommand::Release { ticket_ids }.into())
        .await
    {
        // Release skips anything already released, so a rejection here
        // means a bug rather than a race; surface it loudly.
        error!(code = rejection.code(), "compensating release failed");
    }
}

/// Confirms a pending order owned by `user_id`: codes assigned, tickets
/// activated.
///
/// # Errors
///
/// `OrderNotFound`, `OrderNotOwned`, `OrderNotPending`, or
/// `CodeSpaceExhausted`.
pub async fn confirm_order(
    store: &TicketingStore,
    user_id: UserId,
    order_id: OrderId,
) -> Result<(), TicketingError> {
    store
        .dispatch(OrderCommand::ConfirmOrder { order_id, user_id }.into())
        .await?;
    info!(%order_id, %user_id, "order confirmed");
    Ok(())
}

/// Cancels a pending order owned by `user_id`, releasing its reservations.
///
/// # Errors
///
/// `OrderNotFound`, `OrderNotOwned`, or `OrderNotPending`.
pub async fn cancel_order(
    store: &TicketingStore,
    user_id: UserId,
    order_id: OrderId,
) -> Result<(), TicketingError> {
    store
        .dispatch(OrderCommand::CancelOrder { order_id, user_id }.into())
        .await?;
    info!(%order_id, %user_id, "order cancelled");
    Ok(())
}
