//! Shared harness for the integration tests: a store over a pinned clock
//! with a seeded catalog, built through the public service layer.

#![allow(dead_code)] // each test binary uses a subset of the harness
#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Duration;
use seatline::codes::SequentialCodeIssuer;
use seatline::types::{Capacity, EventId, LineItem, Money, OrderId, TicketTypeId, UserId};
use seatline::{
    SeatlineConfig, TicketingEnvironment, TicketingReducer, TicketingState, TicketingStore,
    services,
};
use seatline_testing::{Clock, FixedClock};

/// Ids created by [`seeded_store`].
pub struct Seeded {
    pub alice: UserId,
    pub bob: UserId,
    pub event_id: EventId,
    pub general: TicketTypeId,
}

/// A store with two users and one published event selling a `capacity`-seat
/// general-admission type at $25, everything driven through the services.
pub async fn seeded_store_with_config(
    capacity: u32,
    config: SeatlineConfig,
) -> (TicketingStore, Arc<FixedClock>, Seeded) {
    let clock = Arc::new(FixedClock::default());
    let now = clock.now();
    let env = TicketingEnvironment::new(
        clock.clone(),
        Arc::new(SequentialCodeIssuer::new()),
        config,
    );
    let store = TicketingStore::new(TicketingState::new(), TicketingReducer::new(), env);

    let alice = services::catalog::register_user(&store, "alice@example.com", "Alice")
        .await
        .unwrap();
    let bob = services::catalog::register_user(&store, "bob@example.com", "Bob")
        .await
        .unwrap();
    let organizer =
        services::catalog::register_organizer(&store, alice, "Alice Presents", "alice@example.com")
            .await
            .unwrap();
    let venue = services::catalog::register_venue(&store, "The Hall", "Lisbon")
        .await
        .unwrap();
    let event_id = services::catalog::create_event(
        &store,
        organizer,
        venue,
        "Opening Night",
        "",
        now + Duration::days(7),
        now + Duration::days(7) + Duration::hours(4),
    )
    .await
    .unwrap();
    services::catalog::publish_event(&store, event_id).await.unwrap();
    let general = services::catalog::add_ticket_type(
        &store,
        event_id,
        "General admission",
        Money::from_dollars(25),
        Capacity::new(capacity),
    )
    .await
    .unwrap();

    (
        store,
        clock,
        Seeded {
            alice,
            bob,
            event_id,
            general,
        },
    )
}

/// [`seeded_store_with_config`] with default configuration.
pub async fn seeded_store(capacity: u32) -> (TicketingStore, Arc<FixedClock>, Seeded) {
    seeded_store_with_config(capacity, SeatlineConfig::default()).await
}

/// Buys and confirms `quantity` tickets for `buyer`; returns the order and
/// its (now Active) tickets.
pub async fn confirmed_purchase(
    store: &TicketingStore,
    seeded: &Seeded,
    buyer: UserId,
    quantity: u32,
) -> (OrderId, Vec<seatline::types::TicketId>) {
    let order_id = services::orders::create_order(
        store,
        buyer,
        vec![LineItem {
            ticket_type_id: seeded.general,
            quantity,
        }],
    )
    .await
    .unwrap();
    services::orders::confirm_order(store, buyer, order_id)
        .await
        .unwrap();
    let tickets = store
        .state(|state| state.inventory.order_tickets(&order_id).to_vec())
        .await;
    (order_id, tickets)
}
