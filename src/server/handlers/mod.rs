pub mod bids;
pub mod bookings;
pub mod conversations;
pub mod health;
pub mod listings;
pub mod notifications;
pub mod support;
pub mod trucks;
