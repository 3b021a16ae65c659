//! Catalog aggregate: users, organizers, venues, events, ticket types.
//!
//! Read-mostly reference data. The ledger and the order workflow consult it
//! for prices, capacities, and event timing; nothing here changes after an
//! event goes on sale except the event's own lifecycle status.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use seatline_core::{Reducer, SmallVec, smallvec};
use serde::{Deserialize, Serialize};

use super::{TicketingEnvironment, TicketingState};
use crate::error::TicketingError;
use crate::types::{
    Capacity, Event, EventId, EventStatus, Money, Organizer, OrganizerId, TicketType,
    TicketTypeId, User, UserId, Venue, VenueId,
};

/// Reference-data arenas and their uniqueness indices.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CatalogState {
    /// All users by id.
    pub users: HashMap<UserId, User>,
    /// Normalized email → user, enforcing one account per address.
    pub users_by_email: HashMap<String, UserId>,
    /// All organizer profiles by id.
    pub organizers: HashMap<OrganizerId, Organizer>,
    /// User → organizer profile, enforcing at most one per user.
    pub organizer_by_user: HashMap<UserId, OrganizerId>,
    /// All venues by id.
    pub venues: HashMap<VenueId, Venue>,
    /// All events by id.
    pub events: HashMap<EventId, Event>,
    /// All ticket types by id.
    pub ticket_types: HashMap<TicketTypeId, TicketType>,
}

impl CatalogState {
    /// Looks up a ticket type.
    #[must_use]
    pub fn ticket_type(&self, id: &TicketTypeId) -> Option<&TicketType> {
        self.ticket_types.get(id)
    }

    /// Looks up an event.
    #[must_use]
    pub fn event(&self, id: &EventId) -> Option<&Event> {
        self.events.get(id)
    }
}

/// Commands for the catalog aggregate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum CatalogCommand {
    /// Register a user account.
    RegisterUser {
        /// Id for the new user.
        user_id: UserId,
        /// Contact email; normalized to lowercase, unique.
        email: String,
        /// Display name.
        display_name: String,
    },
    /// Register an organizer profile for an existing user.
    RegisterOrganizer {
        /// Id for the new profile.
        organizer_id: OrganizerId,
        /// Owning user.
        user_id: UserId,
        /// Public display name.
        display_name: String,
        /// Contact email for attendees.
        contact_email: String,
    },
    /// Register a venue.
    RegisterVenue {
        /// Id for the new venue.
        venue_id: VenueId,
        /// Venue name.
        name: String,
        /// City.
        city: String,
    },
    /// Create an event as a draft.
    CreateEvent {
        /// Id for the new event.
        event_id: EventId,
        /// Organizer running it.
        organizer_id: OrganizerId,
        /// Where it happens.
        venue_id: VenueId,
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Doors open.
        starts_at: DateTime<Utc>,
        /// Event ends; must be after `starts_at`.
        ends_at: DateTime<Utc>,
    },
    /// Put a draft event on sale.
    PublishEvent {
        /// Event to publish.
        event_id: EventId,
    },
    /// Add a priced, capacity-bounded ticket type to an event.
    AddTicketType {
        /// Id for the new ticket type.
        ticket_type_id: TicketTypeId,
        /// Event it admits to.
        event_id: EventId,
        /// Name.
        name: String,
        /// Price per ticket.
        unit_price: Money,
        /// Hard capacity; must be at least one.
        capacity: Capacity,
    },
}

/// Events committed by the catalog aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CatalogEvent {
    /// A user registered.
    UserRegistered {
        /// New user id.
        user_id: UserId,
        /// Normalized email.
        email: String,
        /// Display name.
        display_name: String,
        /// Registration time.
        registered_at: DateTime<Utc>,
    },
    /// An organizer profile was created.
    OrganizerRegistered {
        /// New profile id.
        organizer_id: OrganizerId,
        /// Owning user.
        user_id: UserId,
        /// Public display name.
        display_name: String,
        /// Contact email.
        contact_email: String,
    },
    /// A venue was registered.
    VenueRegistered {
        /// New venue id.
        venue_id: VenueId,
        /// Name.
        name: String,
        /// City.
        city: String,
    },
    /// An event was created as a draft.
    EventCreated {
        /// New event id.
        event_id: EventId,
        /// Organizer.
        organizer_id: OrganizerId,
        /// Venue.
        venue_id: VenueId,
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Doors open.
        starts_at: DateTime<Utc>,
        /// Event ends.
        ends_at: DateTime<Utc>,
    },
    /// A draft event went on sale.
    EventPublished {
        /// The event.
        event_id: EventId,
    },
    /// A ticket type was added to an event.
    TicketTypeAdded {
        /// New ticket type id.
        ticket_type_id: TicketTypeId,
        /// Owning event.
        event_id: EventId,
        /// Name.
        name: String,
        /// Price per ticket.
        unit_price: Money,
        /// Capacity.
        capacity: Capacity,
    },
}

/// Reducer for the catalog aggregate.
#[derive(Clone, Copy, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn handle_register_user(
        state: &TicketingState,
        user_id: UserId,
        email: &str,
        display_name: String,
        env: &TicketingEnvironment,
    ) -> Result<CatalogEvent, TicketingError> {
        let email = email.trim().to_ascii_lowercase();
        if state.catalog.users_by_email.contains_key(&email) {
            return Err(TicketingError::EmailAlreadyRegistered(email));
        }
        Ok(CatalogEvent::UserRegistered {
            user_id,
            email,
            display_name,
            registered_at: env.clock.now(),
        })
    }

    fn handle_register_organizer(
        state: &TicketingState,
        organizer_id: OrganizerId,
        user_id: UserId,
        display_name: String,
        contact_email: String,
    ) -> Result<CatalogEvent, TicketingError> {
        if !state.catalog.users.contains_key(&user_id) {
            return Err(TicketingError::UserNotFound(user_id));
        }
        if state.catalog.organizer_by_user.contains_key(&user_id) {
            return Err(TicketingError::OrganizerAlreadyRegistered(user_id));
        }
        Ok(CatalogEvent::OrganizerRegistered {
            organizer_id,
            user_id,
            display_name,
            contact_email,
        })
    }

    #[allow(clippy::too_many_arguments)] // Mirrors the command's fields
    fn handle_create_event(
        state: &TicketingState,
        event_id: EventId,
        organizer_id: OrganizerId,
        venue_id: VenueId,
        title: String,
        description: String,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<CatalogEvent, TicketingError> {
        if !state.catalog.organizers.contains_key(&organizer_id) {
            return Err(TicketingError::OrganizerNotFound(organizer_id));
        }
        if !state.catalog.venues.contains_key(&venue_id) {
            return Err(TicketingError::VenueNotFound(venue_id));
        }
        if starts_at >= ends_at {
            return Err(TicketingError::InvalidEventSchedule);
        }
        Ok(CatalogEvent::EventCreated {
            event_id,
            organizer_id,
            venue_id,
            title,
            description,
            starts_at,
            ends_at,
        })
    }

    fn handle_publish_event(
        state: &TicketingState,
        event_id: EventId,
    ) -> Result<CatalogEvent, TicketingError> {
        let event = state
            .catalog
            .event(&event_id)
            .ok_or(TicketingError::EventNotFound(event_id))?;
        if event.status != EventStatus::Draft {
            return Err(TicketingError::EventNotDraft(event_id));
        }
        Ok(CatalogEvent::EventPublished { event_id })
    }

    fn handle_add_ticket_type(
        state: &TicketingState,
        ticket_type_id: TicketTypeId,
        event_id: EventId,
        name: String,
        unit_price: Money,
        capacity: Capacity,
    ) -> Result<CatalogEvent, TicketingError> {
        if !state.catalog.events.contains_key(&event_id) {
            return Err(TicketingError::EventNotFound(event_id));
        }
        if capacity.value() == 0 {
            return Err(TicketingError::InvalidCapacity);
        }
        Ok(CatalogEvent::TicketTypeAdded {
            ticket_type_id,
            event_id,
            name,
            unit_price,
            capacity,
        })
    }
}

impl Reducer for CatalogReducer {
    type State = TicketingState;
    type Command = CatalogCommand;
    type Event = CatalogEvent;
    type Error = TicketingError;
    type Environment = TicketingEnvironment;

    fn handle(
        &self,
        state: &Self::State,
        command: Self::Command,
        env: &Self::Environment,
    ) -> Result<SmallVec<[Self::Event; 4]>, Self::Error> {
        let event = match command {
            CatalogCommand::RegisterUser {
                user_id,
                email,
                display_name,
            } => Self::handle_register_user(state, user_id, &email, display_name, env)?,
            CatalogCommand::RegisterOrganizer {
                organizer_id,
                user_id,
                display_name,
                contact_email,
            } => Self::handle_register_organizer(
                state,
                organizer_id,
                user_id,
                display_name,
                contact_email,
            )?,
            CatalogCommand::RegisterVenue {
                venue_id,
                name,
                city,
            } => CatalogEvent::VenueRegistered {
                venue_id,
                name,
                city,
            },
            CatalogCommand::CreateEvent {
                event_id,
                organizer_id,
                venue_id,
                title,
                description,
                starts_at,
                ends_at,
            } => Self::handle_create_event(
                state,
                event_id,
                organizer_id,
                venue_id,
                title,
                description,
                starts_at,
                ends_at,
            )?,
            CatalogCommand::PublishEvent { event_id } => {
                Self::handle_publish_event(state, event_id)?
            }
            CatalogCommand::AddTicketType {
                ticket_type_id,
                event_id,
                name,
                unit_price,
                capacity,
            } => Self::handle_add_ticket_type(
                state,
                ticket_type_id,
                event_id,
                name,
                unit_price,
                capacity,
            )?,
        };
        Ok(smallvec![event])
    }

    fn apply(&self, state: &mut Self::State, event: &Self::Event) {
        match event {
            CatalogEvent::UserRegistered {
                user_id,
                email,
                display_name,
                registered_at,
            } => {
                state.catalog.users.insert(
                    *user_id,
                    User {
                        id: *user_id,
                        email: email.clone(),
                        display_name: display_name.clone(),
                        created_at: *registered_at,
                    },
                );
                state.catalog.users_by_email.insert(email.clone(), *user_id);
            }
            CatalogEvent::OrganizerRegistered {
                organizer_id,
                user_id,
                display_name,
                contact_email,
            } => {
                state.catalog.organizers.insert(
                    *organizer_id,
                    Organizer {
                        id: *organizer_id,
                        user_id: *user_id,
                        display_name: display_name.clone(),
                        contact_email: contact_email.clone(),
                    },
                );
                state
                    .catalog
                    .organizer_by_user
                    .insert(*user_id, *organizer_id);
            }
            CatalogEvent::VenueRegistered {
                venue_id,
                name,
                city,
            } => {
                state.catalog.venues.insert(
                    *venue_id,
                    Venue {
                        id: *venue_id,
                        name: name.clone(),
                        city: city.clone(),
                    },
                );
            }
            CatalogEvent::EventCreated {
                event_id,
                organizer_id,
                venue_id,
                title,
                description,
                starts_at,
                ends_at,
            } => {
                state.catalog.events.insert(
                    *event_id,
                    Event {
                        id: *event_id,
                        organizer_id: *organizer_id,
                        venue_id: *venue_id,
                        title: title.clone(),
                        description: description.clone(),
                        starts_at: *starts_at,
                        ends_at: *ends_at,
                        status: EventStatus::Draft,
                    },
                );
            }
            CatalogEvent::EventPublished { event_id } => {
                if let Some(event) = state.catalog.events.get_mut(event_id) {
                    event.status = EventStatus::Published;
                }
            }
            CatalogEvent::TicketTypeAdded {
                ticket_type_id,
                event_id,
                name,
                unit_price,
                capacity,
            } => {
                state.catalog.ticket_types.insert(
                    *ticket_type_id,
                    TicketType {
                        id: *ticket_type_id,
                        event_id: *event_id,
                        name: name.clone(),
                        unit_price: *unit_price,
                        capacity: *capacity,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, Utc};
    use seatline_testing::ReducerTest;

    use super::*;
    use crate::aggregates::fixtures::{seeded_state, test_environment};

    #[test]
    fn register_user_normalizes_email() {
        let now = Utc::now();
        let user_id = UserId::new();

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_environment(now))
            .given_state(TicketingState::new())
            .when_command(CatalogCommand::RegisterUser {
                user_id,
                email: "  Carol@Example.COM ".to_string(),
                display_name: "carol".to_string(),
            })
            .then_state(move |state| {
                let user = state.catalog.users.get(&user_id).unwrap();
                assert_eq!(user.email, "carol@example.com");
                assert_eq!(
                    state.catalog.users_by_email.get("carol@example.com"),
                    Some(&user_id)
                );
            })
            .run();
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let now = Utc::now();
        let (state, seed) = seeded_state(now);
        let alice_email = state
            .catalog
            .users
            .get(&seed.alice)
            .unwrap()
            .email
            .clone();

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_environment(now))
            .given_state(state)
            .when_command(CatalogCommand::RegisterUser {
                user_id: UserId::new(),
                email: alice_email.clone(),
                display_name: "imposter".to_string(),
            })
            .then_error(move |error| {
                assert_eq!(
                    *error,
                    TicketingError::EmailAlreadyRegistered(alice_email.clone())
                );
            })
            .run();
    }

    #[test]
    fn one_organizer_profile_per_user() {
        let now = Utc::now();
        let (state, seed) = seeded_state(now);

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_environment(now))
            .given_state(state)
            .when_command(CatalogCommand::RegisterOrganizer {
                organizer_id: OrganizerId::new(),
                user_id: seed.alice,
                display_name: "Alice Again".to_string(),
                contact_email: "alice@example.com".to_string(),
            })
            .then_error(move |error| {
                assert_eq!(
                    *error,
                    TicketingError::OrganizerAlreadyRegistered(seed.alice)
                );
            })
            .run();
    }

    #[test]
    fn events_are_created_as_drafts_and_published_once() {
        let now = Utc::now();
        let (mut state, _seed) = seeded_state(now);
        let organizer_id = *state.catalog.organizers.keys().next().unwrap();
        let venue_id = *state.catalog.venues.keys().next().unwrap();
        let event_id = EventId::new();

        let env = test_environment(now);
        let reducer = CatalogReducer::new();
        let events = reducer
            .handle(
                &state,
                CatalogCommand::CreateEvent {
                    event_id,
                    organizer_id,
                    venue_id,
                    title: "Encore".to_string(),
                    description: String::new(),
                    starts_at: now + Duration::days(1),
                    ends_at: now + Duration::days(1) + Duration::hours(2),
                },
                &env,
            )
            .unwrap();
        for event in &events {
            reducer.apply(&mut state, event);
        }
        assert_eq!(
            state.catalog.events.get(&event_id).unwrap().status,
            EventStatus::Draft
        );

        let events = reducer
            .handle(&state, CatalogCommand::PublishEvent { event_id }, &env)
            .unwrap();
        for event in &events {
            reducer.apply(&mut state, event);
        }
        assert_eq!(
            state.catalog.events.get(&event_id).unwrap().status,
            EventStatus::Published
        );

        let result = reducer.handle(&state, CatalogCommand::PublishEvent { event_id }, &env);
        assert_eq!(result, Err(TicketingError::EventNotDraft(event_id)));
    }

    #[test]
    fn event_must_end_after_it_starts() {
        let now = Utc::now();
        let (state, _seed) = seeded_state(now);
        let organizer_id = *state.catalog.organizers.keys().next().unwrap();
        let venue_id = *state.catalog.venues.keys().next().unwrap();

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_environment(now))
            .given_state(state)
            .when_command(CatalogCommand::CreateEvent {
                event_id: EventId::new(),
                organizer_id,
                venue_id,
                title: "Backwards".to_string(),
                description: String::new(),
                starts_at: now + Duration::hours(2),
                ends_at: now + Duration::hours(1),
            })
            .then_error(|error| {
                assert_eq!(*error, TicketingError::InvalidEventSchedule);
            })
            .run();
    }

    #[test]
    fn zero_capacity_ticket_types_are_rejected() {
        let now = Utc::now();
        let (state, seed) = seeded_state(now);

        ReducerTest::new(CatalogReducer::new())
            .with_env(test_environment(now))
            .given_state(state)
            .when_command(CatalogCommand::AddTicketType {
                ticket_type_id: TicketTypeId::new(),
                event_id: seed.event_id,
                name: "Phantom".to_string(),
                unit_price: Money::from_cents(1000),
                capacity: Capacity::new(0),
            })
            .then_error(|error| {
                assert_eq!(*error, TicketingError::InvalidCapacity);
            })
            .run();
    }
}
