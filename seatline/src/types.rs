//! Domain types for the Seatline ticketing platform.
//!
//! Identifiers are uuid newtypes, money is cents-based, and every relation
//! between entities is an id-valued foreign key resolved through the state's
//! arena maps, never an embedded reference.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `UserId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an organizer profile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrganizerId(Uuid);

impl OrganizerId {
    /// Creates a new random `OrganizerId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an `OrganizerId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrganizerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrganizerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a venue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VenueId(Uuid);

impl VenueId {
    /// Creates a new random `VenueId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `VenueId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for VenueId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VenueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a new random `EventId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an `EventId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketTypeId(Uuid);

impl TicketTypeId {
    /// Creates a new random `TicketTypeId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TicketTypeId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketTypeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random `OrderId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an `OrderId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TicketId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransferId(Uuid);

impl TransferId {
    /// Creates a new random `TransferId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TransferId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money Value Object (cents-based to avoid floating point errors)
// ============================================================================

/// Represents money in cents to avoid floating-point arithmetic errors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from dollars.
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (dollars * 100 > `u64::MAX`).
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn from_dollars(dollars: u64) -> Self {
        match dollars.checked_mul(100) {
            Some(cents) => Self(cents),
            None => panic!("Money::from_dollars overflow"),
        }
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity with overflow checking.
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Capacity and Ticket Codes
// ============================================================================

/// Fixed capacity of a ticket type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Capacity(u32);

impl Capacity {
    /// Creates a capacity.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the capacity value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Globally unique admission code printed on a finalized ticket.
///
/// Codes exist only for tickets whose order has been confirmed; provisional
/// tickets have none.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketCode(String);

impl TicketCode {
    /// Wraps an already-issued code.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Reference Data Entities
// ============================================================================

/// A registered user. Reference data; credentials live in the identity layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User identifier.
    pub id: UserId,
    /// Contact email, stored lowercased.
    pub email: String,
    /// Display name.
    pub display_name: String,
    /// When the user registered.
    pub created_at: DateTime<Utc>,
}

/// An organizer profile. At most one per user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    /// Organizer identifier.
    pub id: OrganizerId,
    /// The owning user.
    pub user_id: UserId,
    /// Public display name.
    pub display_name: String,
    /// Contact email for attendees.
    pub contact_email: String,
}

/// A venue events take place at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue identifier.
    pub id: VenueId,
    /// Venue name.
    pub name: String,
    /// City the venue is in.
    pub city: String,
}

/// Lifecycle of an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
    /// Created but not yet on sale.
    #[default]
    Draft,
    /// On sale until the event ends.
    Published,
    /// Called off; never sells again.
    Cancelled,
}

/// A published happening with a schedule and ticket types.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Organizer running the event.
    pub organizer_id: OrganizerId,
    /// Where it takes place.
    pub venue_id: VenueId,
    /// Title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// When doors open.
    pub starts_at: DateTime<Utc>,
    /// When the event ends; no sales past this instant.
    pub ends_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: EventStatus,
}

impl Event {
    /// Whether tickets for this event can be sold at `now`.
    #[must_use]
    pub fn is_open_for_sales(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Published && now < self.ends_at
    }
}

/// A priced, capacity-bounded category of admission for one event.
///
/// The issued counter lives in the inventory ledger, keyed by this id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Ticket type identifier.
    pub id: TicketTypeId,
    /// Event this type admits to.
    pub event_id: EventId,
    /// Name, e.g. "General admission".
    pub name: String,
    /// Price per ticket.
    pub unit_price: Money,
    /// Hard capacity; issuance never exceeds it.
    pub capacity: Capacity,
}

// ============================================================================
// Orders and Tickets
// ============================================================================

/// Order lifecycle. Pending is the only non-terminal status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created, inventory reserved, awaiting confirmation.
    #[default]
    Pending,
    /// Paid for and finalized; tickets are active.
    Confirmed,
    /// Abandoned; reservations released.
    Cancelled,
}

impl OrderStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }
}

/// A purchase bundling tickets reserved together.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order identifier.
    pub id: OrderId,
    /// Purchasing user.
    pub user_id: UserId,
    /// Total computed from unit prices at creation time.
    pub total_amount: Money,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// When the order was created.
    pub created_at: DateTime<Utc>,
}

/// Ticket lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Reserved against an unconfirmed order; no code yet.
    #[default]
    Provisional,
    /// Finalized and usable for admission.
    Active,
    /// Reserved in the schema contract; this subsystem never assigns it
    /// (an accepted transfer reassigns ownership and keeps the ticket
    /// active).
    Transferred,
    /// Released before confirmation; the unit went back to the pool.
    Void,
}

/// A single unit of admission, owned by a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Which ticket type it was issued against.
    pub ticket_type_id: TicketTypeId,
    /// The order that created it.
    pub order_id: OrderId,
    /// Current owner; changes only through a completed transfer.
    pub owner_user_id: UserId,
    /// Admission code, assigned at order confirmation.
    pub code: Option<TicketCode>,
    /// Lifecycle status.
    pub status: TicketStatus,
}

impl Ticket {
    /// Whether the ticket can be offered for transfer.
    #[must_use]
    pub const fn is_transferable(&self) -> bool {
        matches!(self.status, TicketStatus::Active)
    }
}

/// One line of an order request: a ticket type and how many.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Ticket type to reserve.
    pub ticket_type_id: TicketTypeId,
    /// Number of tickets. Must be at least one.
    pub quantity: u32,
}

// ============================================================================
// Ticket Transfers
// ============================================================================

/// Transfer lifecycle. Pending is the only non-terminal status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Offered, awaiting the recipient's decision.
    #[default]
    Pending,
    /// Recipient accepted; ownership moved.
    Accepted,
    /// Recipient declined; ownership unchanged.
    Declined,
    /// Deadline passed without a decision.
    Expired,
    /// Sender withdrew the offer.
    Cancelled,
}

impl TransferStatus {
    /// Whether this status admits no further transitions.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A time-boxed offer to reassign one ticket to another user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketTransfer {
    /// Transfer identifier.
    pub id: TransferId,
    /// Ticket on offer.
    pub ticket_id: TicketId,
    /// Current owner making the offer.
    pub from_user_id: UserId,
    /// User the ticket is offered to.
    pub to_user_id: UserId,
    /// Lifecycle status.
    pub status: TransferStatus,
    /// When the offer was made.
    pub requested_at: DateTime<Utc>,
    /// Deadline; the offer lapses at this instant.
    pub expires_at: DateTime<Utc>,
    /// When the recipient accepted, if they did.
    pub accepted_at: Option<DateTime<Utc>>,
}

impl TicketTransfer {
    /// Whether the offer's deadline has passed at `now`.
    ///
    /// This is the single deadline predicate: accept/decline/cancel enforce
    /// it lazily and the sweeper enforces it eagerly, so both always agree.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(100).to_string(), "$1.00");
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_dollars(42).to_string(), "$42.00");
    }

    #[test]
    fn money_checked_arithmetic() {
        let price = Money::from_cents(2500);
        assert_eq!(price.checked_multiply(4), Some(Money::from_cents(10_000)));
        assert_eq!(Money::from_cents(u64::MAX).checked_multiply(2), None);
        assert_eq!(
            Money::from_cents(u64::MAX).checked_add(Money::from_cents(1)),
            None
        );
    }

    #[test]
    fn event_sales_window() {
        let now = Utc::now();
        let event = Event {
            id: EventId::new(),
            organizer_id: OrganizerId::new(),
            venue_id: VenueId::new(),
            title: "Show".to_string(),
            description: String::new(),
            starts_at: now + chrono::Duration::hours(1),
            ends_at: now + chrono::Duration::hours(3),
            status: EventStatus::Published,
        };
        assert!(event.is_open_for_sales(now));
        assert!(!event.is_open_for_sales(now + chrono::Duration::hours(3)));

        let draft = Event {
            status: EventStatus::Draft,
            ..event
        };
        assert!(!draft.is_open_for_sales(now));
    }

    #[test]
    fn transfer_deadline_is_inclusive() {
        let now = Utc::now();
        let transfer = TicketTransfer {
            id: TransferId::new(),
            ticket_id: TicketId::new(),
            from_user_id: UserId::new(),
            to_user_id: UserId::new(),
            status: TransferStatus::Pending,
            requested_at: now,
            expires_at: now + chrono::Duration::hours(1),
            accepted_at: None,
        };
        assert!(!transfer.is_expired(now));
        assert!(transfer.is_expired(now + chrono::Duration::hours(1)));
        assert!(transfer.is_expired(now + chrono::Duration::hours(2)));
    }

    #[test]
    fn status_terminality() {
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(OrderStatus::Confirmed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!TransferStatus::Pending.is_terminal());
        assert!(TransferStatus::Expired.is_terminal());
    }
}
