use entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventResp {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub overview: String,
    pub image: String,
    pub venue: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub mode: String,
    pub audience: String,
    pub agenda: Vec<String>,
    pub organizer: String,
    pub tags: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<EventEntity> for EventResp {
    fn from(value: EventEntity) -> Self {
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
            mode: value.mode.to_string(),
            audience: value.audience,
            agenda: value.agenda,
            organizer: value.organizer,
            tags: value.tags,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct GetEventsResp {
    pub message: String,
    pub events: Vec<EventResp>,
}

#[derive(Serialize, ToSchema)]
pub struct GetEventResp {
    pub success: bool,
    pub data: EventResp,
}

#[derive(Serialize, ToSchema)]
pub struct CreateEventResp {
    pub message: String,
    pub event: EventResp,
}

#[derive(Serialize, ToSchema)]
pub struct SimilarEventsResp {
    pub success: bool,
    pub data: Vec<EventResp>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventSummaryResp {
    pub title: String,
    pub slug: String,
    pub id: String,
    pub created_at: String,
}

impl From<EventSummary> for EventSummaryResp {
    fn from(value: EventSummary) -> Self {
        Self {
            title: value.title,
            slug: value.slug,
            id: value.id,
            created_at: value.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DebugEventsResp {
    pub success: bool,
    pub total_events: usize,
    pub events: Vec<EventSummaryResp>,
}
