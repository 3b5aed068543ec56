use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use entity::prelude::NewBooking;
use tracing::warn;

pub mod request;
pub mod response;

use crate::response::{ApiResponse, Envelope, IntoApiResponse};
use crate::{ApiError, ApiState};

use self::{
    request::CreateBookingRequest,
    response::{BookingResp, CreateBookingResp},
};

/// Book a seat for an event
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Booking created", body = CreateBookingResp),
        (status = 400, description = "Malformed body, invalid email or missing event reference"),
        (status = 404, description = "Referenced event does not exist")
    )
)]
pub async fn create_booking(
    State(state): State<ApiState>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> ApiResponse<(StatusCode, Json<CreateBookingResp>)> {
    let Json(body) = body.map_err(|e| {
        warn!(error = %e, "unreadable booking request");
        ApiError::ClientError(Envelope::Status.wrap(e.body_text()))
    })?;

    let booking = state
        .repo
        .booking
        .create(NewBooking {
            event_id: body.event_id,
            email: body.email,
        })
        .await
        .into_response(Envelope::Status)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingResp {
            success: true,
            booking: BookingResp::from(booking),
        }),
    ))
}
