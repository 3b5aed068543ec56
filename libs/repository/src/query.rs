use std::sync::Arc;

use entity::prelude::*;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::debug;

use crate::active_models::{prelude::*, *};
use crate::event::EventRepository;
use crate::{ConnectionManager, Response};

/// Read-side lookups that combine more than one query.
#[derive(Clone, Debug)]
pub struct QueryService {
    connection: Arc<ConnectionManager>,
    events: EventRepository,
}

impl QueryService {
    pub fn new(
        connection: Arc<ConnectionManager>,
        events: EventRepository,
    ) -> Self {
        Self { connection, events }
    }

    /// Other events sharing at least one tag with the event at `slug`, in
    /// storage order. Unknown slugs yield an empty list.
    pub async fn find_similar_by_slug(
        &self,
        slug: &str,
    ) -> Response<Vec<EventEntity>> {
        let Some(source) = self.events.find_by_slug(slug).await? else {
            return Ok(vec![]);
        };

        let db = self.connection.ensure_connection().await?;
        let others = Event::find()
            .filter(event::Column::Id.ne(source.id.as_str()))
            .all(&db)
            .await;
        let others =
            self.connection.check(others, "in similar events lookup").await?;

        let similar: Vec<EventEntity> = others
            .into_iter()
            .map(EventEntity::from)
            .filter(|other| other.shares_tag_with(&source))
            .collect();

        debug!(task = "similar events", slug = %source.slug, count = similar.len());

        Ok(similar)
    }
}
