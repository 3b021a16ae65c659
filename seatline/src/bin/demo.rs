//! End-to-end demo: seed a catalog, sell an order, transfer a ticket, and
//! run the expiry sweeper once.
//!
//! ```text
//! SEATLINE_LOG_LEVEL=debug cargo run --bin demo
//! ```

use anyhow::Result;
use chrono::{Duration, Utc};
use seatline::types::{Capacity, LineItem, Money};
use seatline::{
    SeatlineConfig, TicketingEnvironment, TicketingReducer, TicketingState, TicketingStore,
    services, sweeper,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SeatlineConfig::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    let store = TicketingStore::new(
        TicketingState::new(),
        TicketingReducer::new(),
        TicketingEnvironment::production(config),
    );

    // Catalog: two users, an organizer, a venue, one published event.
    let alice = services::catalog::register_user(&store, "alice@example.com", "Alice").await?;
    let bob = services::catalog::register_user(&store, "bob@example.com", "Bob").await?;
    let organizer =
        services::catalog::register_organizer(&store, alice, "Alice Presents", "alice@example.com")
            .await?;
    let venue = services::catalog::register_venue(&store, "The Hall", "Lisbon").await?;
    let now = Utc::now();
    let event = services::catalog::create_event(
        &store,
        organizer,
        venue,
        "Opening Night",
        "First show of the season",
        now + Duration::days(7),
        now + Duration::days(7) + Duration::hours(4),
    )
    .await?;
    services::catalog::publish_event(&store, event).await?;
    let general = services::catalog::add_ticket_type(
        &store,
        event,
        "General admission",
        Money::from_dollars(25),
        Capacity::new(100),
    )
    .await?;

    // Alice buys two tickets and confirms the order.
    let order = services::orders::create_order(
        &store,
        alice,
        vec![LineItem {
            ticket_type_id: general,
            quantity: 2,
        }],
    )
    .await?;
    services::orders::confirm_order(&store, alice, order).await?;

    let (issued, first_ticket) = store
        .state(|state| {
            let tickets = state.inventory.order_tickets(&order);
            (state.inventory.issued_count(&general), tickets[0])
        })
        .await;
    info!(%order, issued, "order confirmed");

    // Alice offers one ticket to Bob, who accepts.
    let transfer = services::transfers::request_transfer(&store, alice, first_ticket, bob).await?;
    services::transfers::accept_transfer(&store, bob, transfer).await?;

    let owner = store
        .state(|state| state.inventory.ticket(&first_ticket).map(|t| t.owner_user_id))
        .await;
    info!(%transfer, ?owner, "ticket handed over");

    // One manual sweep; nothing is due this early.
    let expired = sweeper::sweep_once(&store).await?;
    info!(expired, events = store.journal_len().await, "demo finished");

    Ok(())
}
