pub use super::booking::Entity as Booking;
pub use super::event::Entity as Event;
