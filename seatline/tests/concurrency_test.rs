//! Concurrency tests for the inventory ledger: reservations racing over the
//! last tickets must never oversell, and the counter must settle to exactly
//! the committed sum.

#![allow(clippy::unwrap_used)]

mod common;

use common::seeded_store;
use seatline::TicketingError;
use seatline::services;
use seatline::types::LineItem;

#[tokio::test]
async fn three_buyers_two_seats_exactly_one_loses() {
    let (store, _clock, seeded) = seeded_store(2).await;

    let mut handles = Vec::new();
    for _ in 0..3 {
        let store = store.clone();
        let buyer = seeded.alice;
        let ticket_type_id = seeded.general;
        handles.push(tokio::spawn(async move {
            services::orders::create_order(
                &store,
                buyer,
                vec![LineItem {
                    ticket_type_id,
                    quantity: 1,
                }],
            )
            .await
        }));
    }

    let mut successes = 0;
    let mut capacity_losses = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(rejection) => {
                assert!(matches!(
                    rejection,
                    TicketingError::CapacityExceeded {
                        requested: 1,
                        available: 0,
                        ..
                    }
                ));
                assert!(rejection.is_retryable());
                capacity_losses += 1;
            }
        }
    }

    assert_eq!(successes, 2);
    assert_eq!(capacity_losses, 1);
    assert_eq!(
        store
            .state(|state| state.inventory.issued_count(&seeded.general))
            .await,
        2
    );
}

#[tokio::test]
async fn wide_fan_out_settles_at_capacity() {
    let capacity = 10;
    let (store, _clock, seeded) = seeded_store(capacity).await;

    let mut handles = Vec::new();
    for _ in 0..32 {
        let store = store.clone();
        let buyer = seeded.alice;
        let ticket_type_id = seeded.general;
        handles.push(tokio::spawn(async move {
            services::orders::create_order(
                &store,
                buyer,
                vec![LineItem {
                    ticket_type_id,
                    quantity: 1,
                }],
            )
            .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }

    assert_eq!(successes, capacity);
    let (issued, orders) = store
        .state(|state| {
            (
                state.inventory.issued_count(&seeded.general),
                state.orders.orders.len(),
            )
        })
        .await;
    assert_eq!(issued, capacity);
    assert_eq!(orders, capacity as usize);
}

#[tokio::test]
async fn cancelling_concurrent_winners_frees_every_seat() {
    let (store, _clock, seeded) = seeded_store(4).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let store = store.clone();
        let buyer = seeded.alice;
        let ticket_type_id = seeded.general;
        handles.push(tokio::spawn(async move {
            services::orders::create_order(
                &store,
                buyer,
                vec![LineItem {
                    ticket_type_id,
                    quantity: 1,
                }],
            )
            .await
        }));
    }

    let mut won = Vec::new();
    for handle in handles {
        if let Ok(order_id) = handle.await.unwrap() {
            won.push(order_id);
        }
    }
    assert_eq!(won.len(), 4);

    for order_id in won {
        services::orders::cancel_order(&store, seeded.alice, order_id)
            .await
            .unwrap();
    }

    // Reserve-then-release round-trips the counter to zero.
    assert_eq!(
        store
            .state(|state| state.inventory.issued_count(&seeded.general))
            .await,
        0
    );
}
