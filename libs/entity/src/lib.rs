pub mod booking;
pub mod event;

pub mod prelude {
    pub use crate::booking::Booking as BookingEntity;
    pub use crate::booking::NewBooking;
    pub use crate::event::Event as EventEntity;
    pub use crate::event::EventMode;
    pub use crate::event::EventSummary;
    pub use crate::event::NewEvent;
    pub use crate::ValidationError;
}

/// A submitted value broke one of the model's rules.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}
