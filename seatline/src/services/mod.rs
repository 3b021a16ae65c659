//! The service layer: explicit functions over the store handle.
//!
//! Every function takes the [`TicketingStore`](crate::TicketingStore) and,
//! for order and transfer operations, the verified caller identity supplied
//! by the upstream auth collaborator. No ambient context anywhere.
//! Authorization itself happens inside the reducers, so it holds no matter
//! which path dispatches a command; the services add orchestration (the
//! order-creation saga), id generation, and logging.

pub mod catalog;
pub mod orders;
pub mod transfers;
