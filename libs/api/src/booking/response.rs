use entity::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResp {
    pub id: String,
    pub event_id: String,
    pub email: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<BookingEntity> for BookingResp {
    fn from(value: BookingEntity) -> Self {
        Self {
            id: value.id,
            event_id: value.event_id,
            email: value.email,
            created_at: value.created_at.to_rfc3339(),
            updated_at: value.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct CreateBookingResp {
    pub success: bool,
    pub booking: BookingResp,
}
