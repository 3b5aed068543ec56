use axum::{http::StatusCode, response::IntoResponse, Json};
use repository::RepositoryError;
use serde::Serialize;
use tracing::{error, warn};

use crate::ApiError;

const INTERNAL_ERROR: &str = "Internal server error";

/// JSON error payloads. Routes differ in which shape they answer with.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum ErrorBody {
    Status {
        success: bool,
        error: String,
    },
    Message {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },
}

#[derive(Clone, Copy, Debug)]
pub enum Envelope {
    /// `{"success": false, "error": ...}`
    Status,
    /// `{"message": <summary>, "error": ...}`
    Message(&'static str),
}

impl Envelope {
    pub fn wrap(self, error: impl Into<String>) -> ErrorBody {
        match self {
            Envelope::Status => ErrorBody::Status {
                success: false,
                error: error.into(),
            },
            Envelope::Message(message) => ErrorBody::Message {
                message: message.to_string(),
                error: Some(error.into()),
            },
        }
    }

    pub fn internal(self) -> ErrorBody {
        self.wrap(INTERNAL_ERROR)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, body) = match self {
            ApiError::ClientError(body) => (StatusCode::BAD_REQUEST, body),
            ApiError::NotFound(body) => (StatusCode::NOT_FOUND, body),
            ApiError::Conflict(body) => (StatusCode::CONFLICT, body),
            ApiError::ServerError(body) => {
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };

        (status_code, Json(body)).into_response()
    }
}

pub type ApiResponse<T> = Result<T, ApiError>;

pub trait IntoApiResponse<T> {
    fn into_response(self, envelope: Envelope) -> ApiResponse<T>;
}

impl<T> IntoApiResponse<T> for repository::Response<T> {
    fn into_response(self, envelope: Envelope) -> ApiResponse<T> {
        self.map_err(|e| match e {
            RepositoryError::Validation(e) => {
                warn!(error = %e, "rejected submission");
                ApiError::ClientError(envelope.wrap(e.message()))
            }
            e @ RepositoryError::Uniqueness { .. } => {
                warn!(error = %e, "rejected submission");
                ApiError::Conflict(envelope.wrap(e.to_string()))
            }
            e @ RepositoryError::Reference { .. } => {
                warn!(error = %e, "rejected submission");
                ApiError::NotFound(envelope.wrap(e.to_string()))
            }
            e => {
                error!("{:?}", e);
                ApiError::ServerError(envelope.internal())
            }
        })
    }
}

impl<T> IntoApiResponse<T> for anyhow::Result<T> {
    fn into_response(self, envelope: Envelope) -> ApiResponse<T> {
        self.map_err(|e| {
            error!("{:?}", e);
            ApiError::ServerError(envelope.internal())
        })
    }
}
