//! The transfer expiry sweeper.
//!
//! A recurring background task that finalizes transfer offers whose
//! deadline passed without a decision. Each run dispatches one
//! `SweepExpired` command; the transition uses the same serialized
//! single-winner primitive as accept/decline/cancel, so a sweep racing a
//! recipient (or another sweeper replica) simply finds nothing left to do.

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::TicketingStore;
use crate::aggregates::TransferCommand;
use crate::config::SeatlineConfig;
use crate::error::TicketingError;

/// Runs one sweep and returns how many transfers it expired.
///
/// Safe to call from any number of concurrent tasks: only Pending
/// transfers past their deadline transition, and each at most once.
///
/// # Errors
///
/// Propagates a store rejection; the sweep command itself rejects nothing
/// today.
pub async fn sweep_once(store: &TicketingStore) -> Result<usize, TicketingError> {
    let events = store.dispatch(TransferCommand::SweepExpired.into()).await?;
    Ok(events.len())
}

/// The recurring sweeper task.
pub struct TransferSweeper {
    store: TicketingStore,
    interval: Duration,
}

impl TransferSweeper {
    /// Creates a sweeper with an explicit interval.
    #[must_use]
    pub const fn new(store: TicketingStore, interval: Duration) -> Self {
        Self { store, interval }
    }

    /// Creates a sweeper using the configured interval.
    #[must_use]
    pub const fn from_config(store: TicketingStore, config: &SeatlineConfig) -> Self {
        Self::new(store, config.sweep_interval())
    }

    /// Spawns the sweep loop; it runs until `shutdown` fires.
    ///
    /// Ticks that pile up while a sweep is slow are delayed, not bursted.
    pub fn spawn(self, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        let Self { store, interval } = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!(interval_secs = interval.as_secs(), "transfer sweeper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => match sweep_once(&store).await {
                        Ok(0) => debug!("no transfers due"),
                        Ok(expired) => info!(expired, "expired stale transfers"),
                        Err(rejection) => {
                            error!(code = rejection.code(), "transfer sweep failed");
                        }
                    },
                    _ = shutdown.recv() => {
                        info!("transfer sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}
