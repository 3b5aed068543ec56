use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::ValidationError;

#[derive(Debug, Default, PartialEq, Clone)]
pub struct Booking {
    pub id: String,
    pub event_id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, PartialEq, Clone)]
pub struct NewBooking {
    pub event_id: String,
    pub email: String,
}

impl NewBooking {
    /// Normalizes and validates the email. Whether the event exists is
    /// checked by the repository.
    pub fn into_booking(self) -> Result<Booking, ValidationError> {
        let event_id = self.event_id.trim();
        if event_id.is_empty() {
            return Err(ValidationError::new("Event reference is required"));
        }

        let email = normalize_email(&self.email);
        if email.is_empty() {
            return Err(ValidationError::new("Email is required"));
        }
        if !is_valid_email(&email) {
            return Err(ValidationError::new(
                "Please provide a valid email address",
            ));
        }

        Ok(Booking {
            event_id: event_id.to_string(),
            email,
            ..Default::default()
        })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();

    EMAIL
        .get_or_init(|| {
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
                .expect("email pattern is valid")
        })
        .is_match(email)
}
