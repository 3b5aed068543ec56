use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBookingRequest {
    pub event_id: String,
    pub email: String,
}
