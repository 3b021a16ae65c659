//! Transfer operations.
//!
//! Thin orchestration over the transfer state machine: id generation,
//! caller identity threading, and logging. All preconditions and the
//! single-winner transition semantics live in the reducer.

use tracing::info;

use crate::TicketingStore;
use crate::aggregates::TransferCommand;
use crate::error::TicketingError;
use crate::types::{TicketId, TransferId, UserId};

/// Offers `ticket_id` to `to_user_id` on behalf of its owner.
///
/// # Errors
///
/// `TicketNotFound`, `TicketNotOwned`, `TicketNotTransferable`,
/// `TransferToSelf`, `UserNotFound` (unknown recipient), or
/// `TransferAlreadyPending`.
pub async fn request_transfer(
    store: &TicketingStore,
    from_user_id: UserId,
    ticket_id: TicketId,
    to_user_id: UserId,
) -> Result<TransferId, TicketingError> {
    let transfer_id = TransferId::new();
    store
        .dispatch(
            TransferCommand::RequestTransfer {
                transfer_id,
                ticket_id,
                from_user_id,
                to_user_id,
            }
            .into(),
        )
        .await?;
    info!(%transfer_id, %ticket_id, %from_user_id, %to_user_id, "transfer requested");
    Ok(transfer_id)
}

/// Accepts a pending transfer as its recipient; ownership moves.
///
/// # Errors
///
/// `TransferNotFound`, `TransferNotPending` (someone else's transition won),
/// `NotRecipient`, or `TransferExpired` (deadline already passed).
pub async fn accept_transfer(
    store: &TicketingStore,
    by_user_id: UserId,
    transfer_id: TransferId,
) -> Result<(), TicketingError> {
    store
        .dispatch(
            TransferCommand::AcceptTransfer {
                transfer_id,
                by_user_id,
            }
            .into(),
        )
        .await?;
    info!(%transfer_id, %by_user_id, "transfer accepted");
    Ok(())
}

/// Declines a pending transfer as its recipient; ownership unchanged.
///
/// # Errors
///
/// Same as [`accept_transfer`].
pub async fn decline_transfer(
    store: &TicketingStore,
    by_user_id: UserId,
    transfer_id: TransferId,
) -> Result<(), TicketingError> {
    store
        .dispatch(
            TransferCommand::DeclineTransfer {
                transfer_id,
                by_user_id,
            }
            .into(),
        )
        .await?;
    info!(%transfer_id, %by_user_id, "transfer declined");
    Ok(())
}

/// Withdraws a pending transfer as its sender.
///
/// # Errors
///
/// `TransferNotFound`, `TransferNotPending`, `NotSender`, or
/// `TransferExpired`.
pub async fn cancel_transfer(
    store: &TicketingStore,
    by_user_id: UserId,
    transfer_id: TransferId,
) -> Result<(), TicketingError> {
    store
        .dispatch(
            TransferCommand::CancelTransfer {
                transfer_id,
                by_user_id,
            }
            .into(),
        )
        .await?;
    info!(%transfer_id, %by_user_id, "transfer cancelled");
    Ok(())
}
