//! Registration operations for reference data.

use tracing::debug;

use crate::TicketingStore;
use crate::aggregates::CatalogCommand;
use crate::error::TicketingError;
use crate::types::{
    Capacity, EventId, Money, OrganizerId, TicketTypeId, UserId, VenueId,
};
use chrono::{DateTime, Utc};

/// Registers a user account and returns its id.
///
/// # Errors
///
/// `EmailAlreadyRegistered` if the normalized email is taken.
pub async fn register_user(
    store: &TicketingStore,
    email: impl Into<String>,
    display_name: impl Into<String>,
) -> Result<UserId, TicketingError> {
    let user_id = UserId::new();
    store
        .dispatch(
            CatalogCommand::RegisterUser {
                user_id,
                email: email.into(),
                display_name: display_name.into(),
            }
            .into(),
        )
        .await?;
    debug!(%user_id, "user registered");
    Ok(user_id)
}

/// Registers an organizer profile for an existing user.
///
/// # Errors
///
/// `UserNotFound` for an unknown user, `OrganizerAlreadyRegistered` if the
/// user already has a profile.
pub async fn register_organizer(
    store: &TicketingStore,
    user_id: UserId,
    display_name: impl Into<String>,
    contact_email: impl Into<String>,
) -> Result<OrganizerId, TicketingError> {
    let organizer_id = OrganizerId::new();
    store
        .dispatch(
            CatalogCommand::RegisterOrganizer {
                organizer_id,
                user_id,
                display_name: display_name.into(),
                contact_email: contact_email.into(),
            }
            .into(),
        )
        .await?;
    debug!(%organizer_id, %user_id, "organizer registered");
    Ok(organizer_id)
}

/// Registers a venue.
///
/// # Errors
///
/// Currently infallible beyond store dispatch; kept fallible for parity
/// with the other registrations.
pub async fn register_venue(
    store: &TicketingStore,
    name: impl Into<String>,
    city: impl Into<String>,
) -> Result<VenueId, TicketingError> {
    let venue_id = VenueId::new();
    store
        .dispatch(
            CatalogCommand::RegisterVenue {
                venue_id,
                name: name.into(),
                city: city.into(),
            }
            .into(),
        )
        .await?;
    debug!(%venue_id, "venue registered");
    Ok(venue_id)
}

/// Creates a draft event.
///
/// # Errors
///
/// `OrganizerNotFound` / `VenueNotFound` for unknown references,
/// `InvalidEventSchedule` when the event would not end after it starts.
pub async fn create_event(
    store: &TicketingStore,
    organizer_id: OrganizerId,
    venue_id: VenueId,
    title: impl Into<String>,
    description: impl Into<String>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> Result<EventId, TicketingError> {
    let event_id = EventId::new();
    store
        .dispatch(
            CatalogCommand::CreateEvent {
                event_id,
                organizer_id,
                venue_id,
                title: title.into(),
                description: description.into(),
                starts_at,
                ends_at,
            }
            .into(),
        )
        .await?;
    debug!(%event_id, %organizer_id, "event created");
    Ok(event_id)
}

/// Puts a draft event on sale.
///
/// # Errors
///
/// `EventNotFound` for an unknown event, `EventNotDraft` if it already left
/// the draft status.
pub async fn publish_event(
    store: &TicketingStore,
    event_id: EventId,
) -> Result<(), TicketingError> {
    store
        .dispatch(CatalogCommand::PublishEvent { event_id }.into())
        .await?;
    debug!(%event_id, "event published");
    Ok(())
}

/// Adds a ticket type to an event.
///
/// # Errors
///
/// `EventNotFound` for an unknown event, `InvalidCapacity` for a zero
/// capacity.
pub async fn add_ticket_type(
    store: &TicketingStore,
    event_id: EventId,
    name: impl Into<String>,
    unit_price: Money,
    capacity: Capacity,
) -> Result<TicketTypeId, TicketingError> {
    let ticket_type_id = TicketTypeId::new();
    store
        .dispatch(
            CatalogCommand::AddTicketType {
                ticket_type_id,
                event_id,
                name: name.into(),
                unit_price,
                capacity,
            }
            .into(),
        )
        .await?;
    debug!(%ticket_type_id, %event_id, "ticket type added");
    Ok(ticket_type_id)
}
