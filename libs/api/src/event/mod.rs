use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use entity::event::{normalize_slug, slugify};
use entity::prelude::NewEvent;
use tracing::{debug, warn};

pub mod request;
pub mod response;

use crate::response::{ApiResponse, Envelope, ErrorBody, IntoApiResponse};
use crate::{ApiError, ApiState};

use self::{
    request::{EventForm, ImageInput},
    response::{
        CreateEventResp, DebugEventsResp, EventResp, EventSummaryResp,
        GetEventResp, GetEventsResp, SimilarEventsResp,
    },
};

const CREATE_FAILED: Envelope = Envelope::Message("Event Creation Failed");
/// Stands in for the image URL until the upload returns one.
const PENDING_UPLOAD: &str = "pending-upload";

/// List all events, newest first
#[utoipa::path(
    get,
    path = "/events",
    tag = "events",
    responses(
        (status = 200, description = "List all events successfully", body = GetEventsResp),
        (status = 500, description = "Event fetching failed")
    )
)]
pub async fn get_events(
    State(state): State<ApiState>,
) -> ApiResponse<Json<GetEventsResp>> {
    let events = state
        .repo
        .event
        .find_all()
        .await
        .into_response(Envelope::Message("Event fetching failed"))?;

    debug!(task = "list events", count = events.len());

    Ok(Json(GetEventsResp {
        message: "Events fetched successfully".to_string(),
        events: events.into_iter().map(EventResp::from).collect(),
    }))
}

/// Get an event by slug
#[utoipa::path(
    get,
    path = "/events/{slug}",
    tag = "events",
    params(
        ("slug" = String, Path, description = "event slug, matched case-insensitively"),
    ),
    responses(
        (status = 200, description = "Event found", body = GetEventResp),
        (status = 400, description = "Invalid or missing slug parameter"),
        (status = 404, description = "No event with this slug")
    )
)]
pub async fn get_event(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> ApiResponse<Json<GetEventResp>> {
    if slug.trim().is_empty() {
        return Err(ApiError::ClientError(
            Envelope::Status.wrap("Invalid or missing slug parameter"),
        ));
    }

    let slug = normalize_slug(&slug);
    let event = state
        .repo
        .event
        .find_by_slug(&slug)
        .await
        .into_response(Envelope::Status)?;

    let Some(event) = event else {
        return Err(ApiError::NotFound(Envelope::Status.wrap(format!(
            "Event with slug '{slug}' not found"
        ))));
    };

    Ok(Json(GetEventResp {
        success: true,
        data: EventResp::from(event),
    }))
}

/// Events sharing at least one tag with the given event
#[utoipa::path(
    get,
    path = "/events/{slug}/similar",
    tag = "events",
    params(
        ("slug" = String, Path, description = "event slug"),
    ),
    responses(
        (status = 200, description = "Similar events, empty when the slug is unknown", body = SimilarEventsResp)
    )
)]
pub async fn get_similar_events(
    State(state): State<ApiState>,
    Path(slug): Path<String>,
) -> ApiResponse<Json<SimilarEventsResp>> {
    let events = state
        .repo
        .query
        .find_similar_by_slug(&slug)
        .await
        .into_response(Envelope::Status)?;

    Ok(Json(SimilarEventsResp {
        success: true,
        data: events.into_iter().map(EventResp::from).collect(),
    }))
}

/// Lightweight listing of every stored event
#[utoipa::path(
    get,
    path = "/events/debug/all",
    tag = "events",
    responses(
        (status = 200, description = "Event summaries, newest first", body = DebugEventsResp)
    )
)]
pub async fn get_debug_events(
    State(state): State<ApiState>,
) -> ApiResponse<Json<DebugEventsResp>> {
    let summaries = state
        .repo
        .event
        .list_summaries()
        .await
        .into_response(Envelope::Status)?;

    Ok(Json(DebugEventsResp {
        success: true,
        total_events: summaries.len(),
        events: summaries.into_iter().map(EventSummaryResp::from).collect(),
    }))
}

/// Create an event from a multipart form
///
/// `image` is either a URL text field or a file part; `agenda` and `tags`
/// are JSON arrays of strings.
#[utoipa::path(
    post,
    path = "/events",
    tag = "events",
    responses(
        (status = 201, description = "Event created successfully", body = CreateEventResp),
        (status = 400, description = "Missing image, invalid lists or invalid fields"),
        (status = 409, description = "An event with the same slug exists"),
        (status = 500, description = "Upload or persistence failure")
    )
)]
pub async fn create_event(
    State(state): State<ApiState>,
    multipart: Multipart,
) -> ApiResponse<(StatusCode, Json<CreateEventResp>)> {
    let mut form = EventForm::read(multipart).await.map_err(|e| {
        warn!(error = %e, "unreadable event form");
        ApiError::ClientError(ErrorBody::Message {
            message: "Invalid form data format".to_string(),
            error: Some(e.body_text()),
        })
    })?;

    let Some(image) = form.take_image() else {
        warn!(title = %form.title, "event submitted without a usable image");
        return Err(ApiError::ClientError(ErrorBody::Message {
            message: "Image (file or URL string) is required".to_string(),
            error: None,
        }));
    };

    let (image_url, file) = match image {
        ImageInput::Url(url) => (url, None),
        ImageInput::File(file) => (String::new(), Some(file)),
    };

    let mut new_event = form
        .into_new_event(image_url)
        .map_err(|e| ApiError::ClientError(CREATE_FAILED.wrap(e)))?;

    // Checked up front so a rejected form never uploads anything.
    let uploaded = file.is_some();
    if let Some(file) = file {
        NewEvent {
            image: PENDING_UPLOAD.to_string(),
            ..new_event.clone()
        }
        .into_event()
        .map_err(|e| ApiError::ClientError(CREATE_FAILED.wrap(e.message())))?;

        let slug = slugify(&new_event.title);
        let existing = state
            .repo
            .event
            .find_by_slug(&slug)
            .await
            .into_response(CREATE_FAILED)?;
        if existing.is_some() {
            return Err(ApiError::Conflict(CREATE_FAILED.wrap(format!(
                "An event with slug '{slug}' already exists"
            ))));
        }

        new_event.image = state
            .images
            .upload(file)
            .await
            .into_response(CREATE_FAILED)?;
    }

    let image = new_event.image.clone();
    let event = state
        .repo
        .event
        .create(new_event)
        .await
        .map_err(|e| {
            if uploaded {
                warn!(image = %image, "event not stored, uploaded image is orphaned");
            }
            e
        })
        .into_response(CREATE_FAILED)?;

    Ok((
        StatusCode::CREATED,
        Json(CreateEventResp {
            message: "Event created successfully".to_string(),
            event: EventResp::from(event),
        }),
    ))
}
