use std::sync::Arc;

use chrono::{DateTime, Utc};
use entity::event::normalize_slug;
use entity::prelude::*;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use tracing::{debug, info, warn};

use crate::active_models::{prelude::*, *};
use crate::{ConnectionManager, RepositoryError, Response};

#[derive(Clone, Debug)]
pub struct EventRepository {
    connection: Arc<ConnectionManager>,
}

impl EventRepository {
    pub fn new(connection: Arc<ConnectionManager>) -> Self {
        Self { connection }
    }
}

impl From<event::Model> for EventEntity {
    fn from(value: event::Model) -> Self {
        let mode = value.mode.parse().unwrap_or_else(|_| {
            warn!(id = %value.id, mode = %value.mode, "unknown stored event mode");
            EventMode::default()
        });

        Self {
            id: value.id,
            title: value.title,
            slug: value.slug,
            description: value.description,
            overview: value.overview,
            image: value.image,
            venue: value.venue,
            location: value.location,
            date: value.date,
            time: value.time,
            mode,
            audience: value.audience,
            agenda: value.agenda.0,
            organizer: value.organizer,
            tags: value.tags.0,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl From<EventEntity> for event::ActiveModel {
    fn from(value: EventEntity) -> Self {
        let now = Utc::now();

        Self {
            id: if value.id.is_empty() {
                ActiveValue::Set(uuid::Uuid::new_v4().to_string())
            } else {
                ActiveValue::Set(value.id)
            },
            title: ActiveValue::Set(value.title),
            slug: ActiveValue::Set(value.slug),
            description: ActiveValue::Set(value.description),
            overview: ActiveValue::Set(value.overview),
            image: ActiveValue::Set(value.image),
            venue: ActiveValue::Set(value.venue),
            location: ActiveValue::Set(value.location),
            date: ActiveValue::Set(value.date),
            time: ActiveValue::Set(value.time),
            mode: ActiveValue::Set(value.mode.to_string()),
            audience: ActiveValue::Set(value.audience),
            agenda: ActiveValue::Set(StringList(value.agenda)),
            organizer: ActiveValue::Set(value.organizer),
            tags: ActiveValue::Set(StringList(value.tags)),
            created_at: if value.created_at == DateTime::<Utc>::default() {
                ActiveValue::Set(now)
            } else {
                ActiveValue::Set(value.created_at)
            },
            updated_at: ActiveValue::Set(now),
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct SummaryRow {
    id: String,
    title: String,
    slug: String,
    created_at: DateTime<Utc>,
}

impl From<SummaryRow> for EventSummary {
    fn from(value: SummaryRow) -> Self {
        Self {
            id: value.id,
            title: value.title,
            slug: value.slug,
            created_at: value.created_at,
        }
    }
}

impl EventRepository {
    /// Validates the submission, derives slug/date/time and inserts it.
    pub async fn create(&self, new_event: NewEvent) -> Response<EventEntity> {
        let candidate = new_event.into_event()?;
        let db = self.connection.ensure_connection().await?;

        let existing = Event::find()
            .filter(event::Column::Slug.eq(candidate.slug.as_str()))
            .one(&db)
            .await;
        if self
            .connection
            .check(existing, "in event slug lookup")
            .await?
            .is_some()
        {
            return Err(RepositoryError::Uniqueness {
                slug: candidate.slug,
            });
        }

        let slug = candidate.slug.clone();
        let inserted =
            match event::ActiveModel::from(candidate).insert(&db).await {
            Err(e) if matches!(
                e.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(_))
            ) =>
            {
                return Err(RepositoryError::Uniqueness { slug });
            }
            result => {
                self.connection.check(result, "in event insert").await?
            }
        };

        info!(task = "event created", id = %inserted.id, slug = %inserted.slug);

        Ok(EventEntity::from(inserted))
    }

    /// Case- and whitespace-insensitive exact slug match.
    pub async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Response<Option<EventEntity>> {
        let slug = normalize_slug(slug);
        debug!(task = "find event by slug", slug = %slug);

        let db = self.connection.ensure_connection().await?;
        let event = Event::find()
            .filter(event::Column::Slug.eq(slug))
            .one(&db)
            .await;

        let event = self.connection.check(event, "in event find by slug").await?;

        Ok(event.map(EventEntity::from))
    }

    pub async fn find_by_id(&self, id: &str) -> Response<Option<EventEntity>> {
        let db = self.connection.ensure_connection().await?;
        let event = Event::find_by_id(id.to_string()).one(&db).await;

        let event = self.connection.check(event, "in event find by id").await?;

        Ok(event.map(EventEntity::from))
    }

    /// Every event, newest first.
    pub async fn find_all(&self) -> Response<Vec<EventEntity>> {
        let db = self.connection.ensure_connection().await?;
        let events = Event::find()
            .order_by_desc(event::Column::CreatedAt)
            .all(&db)
            .await;

        let events = self.connection.check(events, "in event find all").await?;

        Ok(events.into_iter().map(EventEntity::from).collect())
    }

    pub async fn list_summaries(&self) -> Response<Vec<EventSummary>> {
        let db = self.connection.ensure_connection().await?;
        let rows = Event::find()
            .select_only()
            .columns([
                event::Column::Id,
                event::Column::Title,
                event::Column::Slug,
                event::Column::CreatedAt,
            ])
            .order_by_desc(event::Column::CreatedAt)
            .into_model::<SummaryRow>()
            .all(&db)
            .await;

        let rows = self.connection.check(rows, "in event summaries").await?;

        Ok(rows.into_iter().map(EventSummary::from).collect())
    }
}
