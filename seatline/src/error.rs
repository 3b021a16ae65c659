//! The error taxonomy for every ticketing operation.
//!
//! All operations return [`TicketingError`]. Variants carry only identifiers
//! the caller already supplied, map to a stable machine-readable code, and
//! classify into one of four kinds. No error leaves partial writes behind:
//! rejection happens before any event is applied.

use thiserror::Error;

use crate::types::{
    EventId, OrderId, OrganizerId, TicketId, TicketTypeId, TransferId, UserId, VenueId,
};

/// Coarse classification of a rejection, for callers that map errors to a
/// transport (HTTP status, gRPC code) without matching every variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input was malformed; nothing was consulted or changed.
    Validation,
    /// A referenced entity does not exist.
    NotFound,
    /// The operation lost to existing state (capacity, terminal status,
    /// duplicate pending transfer); state is unchanged.
    Conflict,
    /// The caller is not the party this operation requires.
    Authorization,
}

/// Every way a ticketing operation can be rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TicketingError {
    // ---- validation ----
    /// A reservation or line item asked for zero tickets.
    #[error("quantity must be at least one")]
    InvalidQuantity,

    /// An order was submitted with no line items.
    #[error("an order needs at least one line item")]
    EmptyOrder,

    /// A transfer named its sender as the recipient.
    #[error("a ticket cannot be transferred to its current owner")]
    TransferToSelf,

    /// An event's end does not come after its start.
    #[error("event schedule is invalid: the event must end after it starts")]
    InvalidEventSchedule,

    /// A ticket type was declared with zero capacity.
    #[error("capacity must be at least one")]
    InvalidCapacity,

    /// Summing unit prices overflowed the supported amount.
    #[error("order total overflows the supported amount")]
    AmountOverflow,

    // ---- not found ----
    /// No such user.
    #[error("user {0} not found")]
    UserNotFound(UserId),

    /// No such organizer.
    #[error("organizer {0} not found")]
    OrganizerNotFound(OrganizerId),

    /// No such venue.
    #[error("venue {0} not found")]
    VenueNotFound(VenueId),

    /// No such event.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// No such ticket type.
    #[error("ticket type {0} not found")]
    TicketTypeNotFound(TicketTypeId),

    /// No such order.
    #[error("order {0} not found")]
    OrderNotFound(OrderId),

    /// No such ticket.
    #[error("ticket {0} not found")]
    TicketNotFound(TicketId),

    /// No such transfer.
    #[error("transfer {0} not found")]
    TransferNotFound(TransferId),

    // ---- conflict ----
    /// Not enough remaining units; nothing was reserved. Retryable: units
    /// may come back when another pending order is cancelled.
    #[error(
        "ticket type {ticket_type_id} has {available} of the requested {requested} ticket(s) left"
    )]
    CapacityExceeded {
        /// The contended ticket type.
        ticket_type_id: TicketTypeId,
        /// How many tickets the caller asked for.
        requested: u32,
        /// How many were actually left.
        available: u32,
    },

    /// The event is not selling: unpublished, cancelled, or already ended.
    #[error("event {0} is not open for sales")]
    EventClosed(EventId),

    /// The order already reached a terminal status.
    #[error("order {0} is not pending")]
    OrderNotPending(OrderId),

    /// An order with this id already exists.
    #[error("order {0} already exists")]
    OrderAlreadyExists(OrderId),

    /// A transfer with this id already exists.
    #[error("transfer {0} already exists")]
    TransferAlreadyExists(TransferId),

    /// The ticket already has an open transfer offer.
    #[error("ticket {0} already has a pending transfer")]
    TransferAlreadyPending(TicketId),

    /// The transfer already reached a terminal status; whoever raced this
    /// caller won.
    #[error("transfer {0} is not pending")]
    TransferNotPending(TransferId),

    /// The offer's deadline has passed; only the sweeper will touch it now.
    #[error("transfer {0} has expired")]
    TransferExpired(TransferId),

    /// The ticket is provisional or void and cannot be offered.
    #[error("ticket {0} is not transferable")]
    TicketNotTransferable(TicketId),

    /// The user already has an organizer profile.
    #[error("user {0} already has an organizer profile")]
    OrganizerAlreadyRegistered(UserId),

    /// A user with this email is already registered.
    #[error("email {0} is already registered")]
    EmailAlreadyRegistered(String),

    /// Only draft events can be published.
    #[error("event {0} is not a draft")]
    EventNotDraft(EventId),

    /// Code issuance kept colliding with existing codes.
    #[error("could not issue a unique ticket code")]
    CodeSpaceExhausted,

    // ---- authorization ----
    /// The caller does not own the ticket.
    #[error("user {user_id} does not own ticket {ticket_id}")]
    TicketNotOwned {
        /// Ticket the caller tried to act on.
        ticket_id: TicketId,
        /// The caller.
        user_id: UserId,
    },

    /// The caller does not own the order.
    #[error("user {user_id} does not own order {order_id}")]
    OrderNotOwned {
        /// Order the caller tried to act on.
        order_id: OrderId,
        /// The caller.
        user_id: UserId,
    },

    /// Only the recipient may accept or decline a transfer.
    #[error("user {user_id} is not the recipient of transfer {transfer_id}")]
    NotRecipient {
        /// Transfer the caller tried to act on.
        transfer_id: TransferId,
        /// The caller.
        user_id: UserId,
    },

    /// Only the sender may cancel a transfer.
    #[error("user {user_id} is not the sender of transfer {transfer_id}")]
    NotSender {
        /// Transfer the caller tried to act on.
        transfer_id: TransferId,
        /// The caller.
        user_id: UserId,
    },
}

impl TicketingError {
    /// Classifies this rejection.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidQuantity
            | Self::EmptyOrder
            | Self::TransferToSelf
            | Self::InvalidEventSchedule
            | Self::InvalidCapacity
            | Self::AmountOverflow => ErrorKind::Validation,

            Self::UserNotFound(_)
            | Self::OrganizerNotFound(_)
            | Self::VenueNotFound(_)
            | Self::EventNotFound(_)
            | Self::TicketTypeNotFound(_)
            | Self::OrderNotFound(_)
            | Self::TicketNotFound(_)
            | Self::TransferNotFound(_) => ErrorKind::NotFound,

            Self::CapacityExceeded { .. }
            | Self::EventClosed(_)
            | Self::OrderNotPending(_)
            | Self::OrderAlreadyExists(_)
            | Self::TransferAlreadyExists(_)
            | Self::TransferAlreadyPending(_)
            | Self::TransferNotPending(_)
            | Self::TransferExpired(_)
            | Self::TicketNotTransferable(_)
            | Self::OrganizerAlreadyRegistered(_)
            | Self::EmailAlreadyRegistered(_)
            | Self::EventNotDraft(_)
            | Self::CodeSpaceExhausted => ErrorKind::Conflict,

            Self::TicketNotOwned { .. }
            | Self::OrderNotOwned { .. }
            | Self::NotRecipient { .. }
            | Self::NotSender { .. } => ErrorKind::Authorization,
        }
    }

    /// Stable machine-readable code for transports and logs.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidQuantity => "invalid_quantity",
            Self::EmptyOrder => "empty_order",
            Self::TransferToSelf => "transfer_to_self",
            Self::InvalidEventSchedule => "invalid_event_schedule",
            Self::InvalidCapacity => "invalid_capacity",
            Self::AmountOverflow => "amount_overflow",
            Self::UserNotFound(_) => "user_not_found",
            Self::OrganizerNotFound(_) => "organizer_not_found",
            Self::VenueNotFound(_) => "venue_not_found",
            Self::EventNotFound(_) => "event_not_found",
            Self::TicketTypeNotFound(_) => "ticket_type_not_found",
            Self::OrderNotFound(_) => "order_not_found",
            Self::TicketNotFound(_) => "ticket_not_found",
            Self::TransferNotFound(_) => "transfer_not_found",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::EventClosed(_) => "event_closed",
            Self::OrderNotPending(_) => "order_not_pending",
            Self::OrderAlreadyExists(_) => "order_already_exists",
            Self::TransferAlreadyExists(_) => "transfer_already_exists",
            Self::TransferAlreadyPending(_) => "transfer_already_pending",
            Self::TransferNotPending(_) => "transfer_not_pending",
            Self::TransferExpired(_) => "transfer_expired",
            Self::TicketNotTransferable(_) => "ticket_not_transferable",
            Self::OrganizerAlreadyRegistered(_) => "organizer_already_registered",
            Self::EmailAlreadyRegistered(_) => "email_already_registered",
            Self::EventNotDraft(_) => "event_not_draft",
            Self::CodeSpaceExhausted => "code_space_exhausted",
            Self::TicketNotOwned { .. } => "ticket_not_owned",
            Self::OrderNotOwned { .. } => "order_not_owned",
            Self::NotRecipient { .. } => "not_recipient",
            Self::NotSender { .. } => "not_sender",
        }
    }

    /// Whether retrying the same operation can possibly succeed.
    ///
    /// Losing a capacity race is the one retryable outcome: units return to
    /// the pool when a competing pending order is cancelled. Everything else
    /// is terminal for the inputs given.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::CapacityExceeded { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_classify_the_taxonomy() {
        assert_eq!(TicketingError::InvalidQuantity.kind(), ErrorKind::Validation);
        assert_eq!(
            TicketingError::TicketTypeNotFound(TicketTypeId::new()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TicketingError::CapacityExceeded {
                ticket_type_id: TicketTypeId::new(),
                requested: 3,
                available: 1,
            }
            .kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            TicketingError::NotRecipient {
                transfer_id: TransferId::new(),
                user_id: UserId::new(),
            }
            .kind(),
            ErrorKind::Authorization
        );
    }

    #[test]
    fn only_lost_capacity_races_are_retryable() {
        assert!(
            TicketingError::CapacityExceeded {
                ticket_type_id: TicketTypeId::new(),
                requested: 1,
                available: 0,
            }
            .is_retryable()
        );
        assert!(!TicketingError::TransferExpired(TransferId::new()).is_retryable());
        assert!(!TicketingError::OrderNotPending(OrderId::new()).is_retryable());
    }

    #[test]
    fn codes_are_stable_snake_case() {
        let error = TicketingError::TransferAlreadyPending(TicketId::new());
        assert_eq!(error.code(), "transfer_already_pending");
    }
}
