// Application layer: event sources and the work they defer.

pub mod events;
pub mod intercore;
pub mod message;

pub use events::{Deferred, EventQueue};
pub use intercore::Intercore;
