//! Ticket transfer state machine.
//!
//! A transfer is a time-boxed offer: `Pending` and then exactly one of
//! `Accepted`, `Declined`, `Expired`, `Cancelled`. Every transition goes
//! through the same serialized dispatch, so when a recipient races the
//! sweeper (or the sender) over one transfer, exactly one transition
//! commits and the loser observes a terminal status. Accepting reassigns
//! ticket ownership in the same event that flips the status, so a transfer
//! can never be Accepted while the sender still owns the ticket.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use seatline_core::{Reducer, SmallVec, smallvec};
use serde::{Deserialize, Serialize};

use super::{TicketingEnvironment, TicketingState};
use crate::error::TicketingError;
use crate::types::{TicketId, TicketTransfer, TransferId, TransferStatus, UserId};

/// Transfer arena plus the one-pending-offer-per-ticket index.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransferState {
    /// All transfers by id, historical and open.
    pub transfers: HashMap<TransferId, TicketTransfer>,
    /// Ticket → its open transfer. The partial-uniqueness constraint:
    /// at most one Pending transfer exists per ticket.
    pub pending_by_ticket: HashMap<TicketId, TransferId>,
}

impl TransferState {
    /// Looks up a transfer.
    #[must_use]
    pub fn transfer(&self, id: &TransferId) -> Option<&TicketTransfer> {
        self.transfers.get(id)
    }

    /// The open transfer for a ticket, if any.
    #[must_use]
    pub fn pending_for(&self, ticket_id: &TicketId) -> Option<&TicketTransfer> {
        self.pending_by_ticket
            .get(ticket_id)
            .and_then(|id| self.transfers.get(id))
    }
}

/// Commands for the transfer state machine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum TransferCommand {
    /// Offer a ticket to another user.
    RequestTransfer {
        /// Id for the new transfer.
        transfer_id: TransferId,
        /// Ticket on offer.
        ticket_id: TicketId,
        /// Verified caller; must own the ticket.
        from_user_id: UserId,
        /// Recipient of the offer.
        to_user_id: UserId,
    },
    /// Accept an offer; moves ownership.
    AcceptTransfer {
        /// Transfer to accept.
        transfer_id: TransferId,
        /// Verified caller; must be the recipient.
        by_user_id: UserId,
    },
    /// Decline an offer; ownership unchanged.
    DeclineTransfer {
        /// Transfer to decline.
        transfer_id: TransferId,
        /// Verified caller; must be the recipient.
        by_user_id: UserId,
    },
    /// Withdraw an offer.
    CancelTransfer {
        /// Transfer to cancel.
        transfer_id: TransferId,
        /// Verified caller; must be the sender.
        by_user_id: UserId,
    },
    /// Expire every pending transfer whose deadline has passed.
    ///
    /// Idempotent: only Pending transfers match, so concurrent sweeps (or a
    /// sweep racing an accept) never double-process anything.
    SweepExpired,
}

/// Events committed by the transfer state machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferEvent {
    /// An offer was made.
    TransferRequested {
        /// New transfer id.
        transfer_id: TransferId,
        /// Ticket on offer.
        ticket_id: TicketId,
        /// Sender.
        from_user_id: UserId,
        /// Recipient.
        to_user_id: UserId,
        /// When the offer was made.
        requested_at: DateTime<Utc>,
        /// When the offer lapses.
        expires_at: DateTime<Utc>,
    },
    /// The recipient accepted; the ticket changed owner.
    TransferAccepted {
        /// The transfer.
        transfer_id: TransferId,
        /// The ticket whose owner changed.
        ticket_id: TicketId,
        /// The new owner.
        to_user_id: UserId,
        /// When it was accepted.
        accepted_at: DateTime<Utc>,
    },
    /// The recipient declined; ownership unchanged.
    TransferDeclined {
        /// The transfer.
        transfer_id: TransferId,
        /// The ticket, which stays with the sender.
        ticket_id: TicketId,
        /// When it was declined.
        declined_at: DateTime<Utc>,
    },
    /// The sender withdrew the offer.
    TransferCancelled {
        /// The transfer.
        transfer_id: TransferId,
        /// The ticket, which stays with the sender.
        ticket_id: TicketId,
        /// When it was cancelled.
        cancelled_at: DateTime<Utc>,
    },
    /// The deadline passed without a decision; ownership unchanged.
    TransferExpired {
        /// The transfer.
        transfer_id: TransferId,
        /// The ticket, which stays with the sender.
        ticket_id: TicketId,
        /// When the sweep recorded the expiry.
        expired_at: DateTime<Utc>,
    },
}

/// Reducer for the transfer state machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransferReducer;

impl TransferReducer {
    /// Creates a new `TransferReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn handle_request(
        state: &TicketingState,
        transfer_id: TransferId,
        ticket_id: TicketId,
        from_user_id: UserId,
        to_user_id: UserId,
        env: &TicketingEnvironment,
    ) -> Result<TransferEvent, TicketingError> {
        if state.transfers.transfers.contains_key(&transfer_id) {
            return Err(TicketingError::TransferAlreadyExists(transfer_id));
        }
        if to_user_id == from_user_id {
            return Err(TicketingError::TransferToSelf);
        }
        let ticket = state
            .inventory
            .ticket(&ticket_id)
            .ok_or(TicketingError::TicketNotFound(ticket_id))?;
        if ticket.owner_user_id != from_user_id {
            return Err(TicketingError::TicketNotOwned {
                ticket_id,
                user_id: from_user_id,
            });
        }
        if !ticket.is_transferable() {
            return Err(TicketingError::TicketNotTransferable(ticket_id));
        }
        if !state.catalog.users.contains_key(&to_user_id) {
            return Err(TicketingError::UserNotFound(to_user_id));
        }
        if state.transfers.pending_by_ticket.contains_key(&ticket_id) {
            return Err(TicketingError::TransferAlreadyPending(ticket_id));
        }

        let now = env.clock.now();
        Ok(TransferEvent::TransferRequested {
            transfer_id,
            ticket_id,
            from_user_id,
            to_user_id,
            requested_at: now,
            expires_at: now + env.config.transfer_ttl(),
        })
    }

    /// Loads a transfer that is still Pending, or says who won instead.
    fn pending_transfer<'a>(
        state: &'a TicketingState,
        transfer_id: TransferId,
    ) -> Result<&'a TicketTransfer, TicketingError> {
        let transfer = state
            .transfers
            .transfer(&transfer_id)
            .ok_or(TicketingError::TransferNotFound(transfer_id))?;
        if transfer.status != TransferStatus::Pending {
            return Err(TicketingError::TransferNotPending(transfer_id));
        }
        Ok(transfer)
    }

    fn handle_accept(
        state: &TicketingState,
        transfer_id: TransferId,
        by_user_id: UserId,
        env: &TicketingEnvironment,
    ) -> Result<TransferEvent, TicketingError> {
        let transfer = Self::pending_transfer(state, transfer_id)?;
        if transfer.to_user_id != by_user_id {
            return Err(TicketingError::NotRecipient {
                transfer_id,
                user_id: by_user_id,
            });
        }
        let now = env.clock.now();
        if transfer.is_expired(now) {
            // The deadline already passed: treat it as swept even if the
            // sweeper has not run yet.
            return Err(TicketingError::TransferExpired(transfer_id));
        }
        Ok(TransferEvent::TransferAccepted {
            transfer_id,
            ticket_id: transfer.ticket_id,
            to_user_id: transfer.to_user_id,
            accepted_at: now,
        })
    }

    fn handle_decline(
        state: &TicketingState,
        transfer_id: TransferId,
        by_user_id: UserId,
        env: &TicketingEnvironment,
    ) -> Result<TransferEvent, TicketingError> {
        let transfer = Self::pending_transfer(state, transfer_id)?;
        if transfer.to_user_id != by_user_id {
            return Err(TicketingError::NotRecipient {
                transfer_id,
                user_id: by_user_id,
            });
        }
        let now = env.clock.now();
        if transfer.is_expired(now) {
            return Err(TicketingError::TransferExpired(transfer_id));
        }
        Ok(TransferEvent::TransferDeclined {
            transfer_id,
            ticket_id: transfer.ticket_id,
            declined_at: now,
        })
    }

    fn handle_cancel(
        state: &TicketingState,
        transfer_id: TransferId,
        by_user_id: UserId,
        env: &TicketingEnvironment,
    ) -> Result<TransferEvent, TicketingError> {
        let transfer = Self::pending_transfer(state, transfer_id)?;
        if transfer.from_user_id != by_user_id {
            return Err(TicketingError::NotSender {
                transfer_id,
                user_id: by_user_id,
            });
        }
        let now = env.clock.now();
        if transfer.is_expired(now) {
            return Err(TicketingError::TransferExpired(transfer_id));
        }
        Ok(TransferEvent::TransferCancelled {
            transfer_id,
            ticket_id: transfer.ticket_id,
            cancelled_at: now,
        })
    }

    fn handle_sweep(
        state: &TicketingState,
        env: &TicketingEnvironment,
    ) -> SmallVec<[TransferEvent; 4]> {
        let now = env.clock.now();
        let mut due: Vec<&TicketTransfer> = state
            .transfers
            .transfers
            .values()
            .filter(|transfer| {
                transfer.status == TransferStatus::Pending && transfer.is_expired(now)
            })
            .collect();
        // Map iteration order is arbitrary; expire in a stable order.
        due.sort_by_key(|transfer| (transfer.requested_at, transfer.id));
        due.into_iter()
            .map(|transfer| TransferEvent::TransferExpired {
                transfer_id: transfer.id,
                ticket_id: transfer.ticket_id,
                expired_at: now,
            })
            .collect()
    }
}

impl Reducer for TransferReducer {
    type State = TicketingState;
    type Command = TransferCommand;
    type Event = TransferEvent;
    type Error = TicketingError;
    type Environment = TicketingEnvironment;

    fn handle(
        &self,
        state: &Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
        match command {
            TransferCommand::RequestTransfer {
                transfer_id,
                ticket_id,
                from_user_id,
                to_user_id,
            } => Self::handle_request(state, transfer_id, ticket_id, from_user_id, to_user_id, env)
                .map(|event| smallvec![event]),
            TransferCommand::AcceptTransfer {
                transfer_id,
                by_user_id,
            } => Self::handle_accept(state, transfer_id, by_user_id, env)
                .map(|event| smallvec![event]),
            TransferCommand::DeclineTransfer {
                transfer_id,
                by_user_id,
            } => Self::handle_decline(state, transfer_id, by_user_id, env)
                .map(|event| smallvec![event]),
            TransferCommand::CancelTransfer {
                transfer_id,
                by_user_id,
            } => Self::handle_cancel(state, transfer_id, by_user_id, env)
                .map(|event| smallvec![event]),
            TransferCommand::SweepExpired => Ok(Self::handle_sweep(state, env)),
        }
    }

    fn apply(&self, state: &mut Self::State, event: &Self::Event) {
        match event {
            TransferEvent::TransferRequested {
                transfer_id,
                ticket_id,
                from_user_id,
                to_user_id,
                requested_at,
                expires_at,
            } => {
                state.transfers.transfers.insert(
                    *transfer_id,
                    TicketTransfer {
                        id: *transfer_id,
                        ticket_id: *ticket_id,
                        from_user_id: *from_user_id,
                        to_user_id: *to_user_id,
                        status: TransferStatus::Pending,
                        requested_at: *requested_at,
                        expires_at: *expires_at,
                        accepted_at: None,
                    },
                );
                state
                    .transfers
                    .pending_by_ticket
                    .insert(*ticket_id, *transfer_id);
            }
            TransferEvent::TransferAccepted {
                transfer_id,
                ticket_id,
                to_user_id,
                accepted_at,
            } => {
                // Status flip and ownership handoff are one event: they
                // commit together or not at all.
                if let Some(transfer) = state.transfers.transfers.get_mut(transfer_id) {
                    transfer.status = TransferStatus::Accepted;
                    transfer.accepted_at = Some(*accepted_at);
                }
                state.transfers.pending_by_ticket.remove(ticket_id);
                if let Some(ticket) = state.inventory.tickets.get_mut(ticket_id) {
                    ticket.owner_user_id = *to_user_id;
                }
            }
            TransferEvent::TransferDeclined {
                transfer_id,
                ticket_id,
                ..
            } => {
                if let Some(transfer) = state.transfers.transfers.get_mut(transfer_id) {
                    transfer.status = TransferStatus::Declined;
                }
                state.transfers.pending_by_ticket.remove(ticket_id);
            }
            TransferEvent::TransferCancelled {
                transfer_id,
                ticket_id,
                ..
            } => {
                if let Some(transfer) = state.transfers.transfers.get_mut(transfer_id) {
                    transfer.status = TransferStatus::Cancelled;
                }
                state.transfers.pending_by_ticket.remove(ticket_id);
            }
            TransferEvent::TransferExpired {
                transfer_id,
                ticket_id,
                ..
            } => {
                if let Some(transfer) = state.transfers.transfers.get_mut(transfer_id) {
                    transfer.status = TransferStatus::Expired;
                }
                state.transfers.pending_by_ticket.remove(ticket_id);
            }
        }
    }
}
