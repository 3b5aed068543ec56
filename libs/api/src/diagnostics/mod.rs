use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Envelope, IntoApiResponse};
use crate::ApiState;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DbStateResp {
    pub success: bool,
    pub db_state: DbState,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DbState {
    /// 0 = disconnected, 1 = connected, 2 = connecting
    pub ready_state: u8,
    pub db_name: Option<String>,
    pub host: Option<String>,
}

/// Current database connection state
#[utoipa::path(
    get,
    path = "/diagnostics/db",
    tag = "diagnostics",
    responses(
        (status = 200, description = "Connected", body = DbStateResp),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn get_db_state(
    State(state): State<ApiState>,
) -> ApiResponse<Json<DbStateResp>> {
    state
        .repo
        .connection
        .ensure_connection()
        .await
        .into_response(Envelope::Status)?;

    let db = state.repo.connection.describe().await;

    Ok(Json(DbStateResp {
        success: true,
        db_state: DbState {
            ready_state: db.ready_state,
            db_name: db.db_name,
            host: db.host,
        },
    }))
}
