use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cliptube_core::{listing::ListingError, AuthError, ContentError, DatabaseError, MediaError};
use log::error;
use serde::Serialize;
use thiserror::Error;

pub type ServerResult<T> = Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{resource}:{identifier} not found")]
    NotFound {
        resource: &'static str,
        identifier: &'static str,
    },
    #[error("{resource} with {field} of value {value} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
        value: String,
    },
    #[error("Unknown internal error: {0}")]
    Unknown(String),
}

/// The body every failed request resolves to
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    status_code: u16,
    message: String,
    success: bool,
    errors: Vec<String>,
}

impl ServerError {
    fn as_status_code(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if let Self::Unknown(reason) = &self {
            error!("Request failed: {reason}");
        }

        let status = self.as_status_code();

        let body = ErrorBody {
            status_code: status.as_u16(),
            message: self.to_string(),
            success: false,
            errors: vec![],
        };

        (status, Json(body)).into_response()
    }
}

impl From<DatabaseError> for ServerError {
    fn from(value: DatabaseError) -> Self {
        match value {
            DatabaseError::NotFound {
                resource,
                identifier,
            } => Self::NotFound {
                resource,
                identifier,
            },
            DatabaseError::Conflict {
                resource,
                field,
                value,
            } => Self::Conflict {
                resource,
                field,
                value,
            },
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<AuthError> for ServerError {
    fn from(value: AuthError) -> Self {
        match value {
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::InvalidToken => Self::Unauthorized("Invalid access token".to_string()),
            AuthError::Db(e) => e.into(),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<MediaError> for ServerError {
    fn from(value: MediaError) -> Self {
        match value {
            MediaError::UploadRejected(reason) => Self::InvalidArgument(reason),
            e => Self::Unknown(e.to_string()),
        }
    }
}

impl From<ListingError> for ServerError {
    fn from(value: ListingError) -> Self {
        Self::InvalidArgument(value.to_string())
    }
}

impl From<ContentError> for ServerError {
    fn from(value: ContentError) -> Self {
        match value {
            ContentError::NotOwner(resource) => {
                Self::Unauthorized(format!("Only the owner can modify this {resource}"))
            }
            ContentError::Db(e) => e.into(),
            ContentError::Media(e) => e.into(),
            ContentError::Listing(e) => e.into(),
        }
    }
}

/// Parses a path or query id, distinguishing a malformed id (a 400)
/// from a missing resource (a 404, raised later by the lookup).
pub fn parse_id(raw: &str, name: &'static str) -> ServerResult<i32> {
    raw.parse()
        .map_err(|_| ServerError::InvalidArgument(format!("{name} must be a number")))
}
