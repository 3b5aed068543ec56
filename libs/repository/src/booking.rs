use std::sync::Arc;

use chrono::{DateTime, Utc};
use entity::prelude::*;
use sea_orm::{ActiveModelTrait, ActiveValue};
use tracing::{info, warn};

use crate::active_models::*;
use crate::event::EventRepository;
use crate::{ConnectionManager, RepositoryError, Response};

#[derive(Clone, Debug)]
pub struct BookingRepository {
    connection: Arc<ConnectionManager>,
    events: EventRepository,
}

impl BookingRepository {
    pub fn new(
        connection: Arc<ConnectionManager>,
        events: EventRepository,
    ) -> Self {
        Self { connection, events }
    }
}

impl From<booking::Model> for BookingEntity {
    fn from(value: booking::Model) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            email: value.email,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<BookingEntity> for booking::ActiveModel {
    fn from(value: BookingEntity) -> Self {
        let now = Utc::now();

        Self {
            id: if value.id.is_empty() {
                ActiveValue::Set(uuid::Uuid::new_v4().to_string())
            } else {
                ActiveValue::Set(value.id)
            },
            event_id: ActiveValue::Set(value.event_id),
            email: ActiveValue::Set(value.email),
            created_at: if value.created_at == DateTime::<Utc>::default() {
                ActiveValue::Set(now)
            } else {
                ActiveValue::Set(value.created_at)
            },
            updated_at: ActiveValue::Set(now),
        }
    }
}

impl BookingRepository {
    /// Inserts a booking once its email is valid and its event exists.
    pub async fn create(
        &self,
        new_booking: NewBooking,
    ) -> Response<BookingEntity> {
        let booking = new_booking.into_booking()?;

        if self.events.find_by_id(&booking.event_id).await?.is_none() {
            warn!(task = "reject booking", event_id = %booking.event_id);
            return Err(RepositoryError::Reference {
                event_id: booking.event_id,
            });
        }

        let db = self.connection.ensure_connection().await?;
        let inserted = booking::ActiveModel::from(booking).insert(&db).await;
        let inserted =
            self.connection.check(inserted, "in booking insert").await?;

        info!(task = "booking created", id = %inserted.id, event_id = %inserted.event_id);

        Ok(BookingEntity::from(inserted))
    }
}
