//! Error-to-envelope mapping for HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::common::{EnvelopeBuilder, ErrorDescriptor};
use crate::domains::places::PlaceError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found")]
    NotFound,

    #[error("{message}")]
    BadRequest {
        field: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Place(#[from] PlaceError),
}

impl ApiError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    fn status_and_descriptor(&self) -> (StatusCode, ErrorDescriptor) {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not found".into()),
            ApiError::BadRequest { field, message }
            | ApiError::Place(PlaceError::Validation { field, message }) => (
                StatusCode::BAD_REQUEST,
                ErrorDescriptor {
                    message: message.clone(),
                    field: field.clone(),
                },
            ),
            ApiError::Place(PlaceError::Conflict(message)) => {
                (StatusCode::CONFLICT, message.as_str().into())
            }
            ApiError::Place(PlaceError::LookupUnavailable(_)) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Places lookup is currently unavailable".into(),
            ),
            ApiError::Place(PlaceError::Store(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unexpected error".into(),
            ),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest {
            field: None,
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, descriptor) = self.status_and_descriptor();

        if status.is_server_error() {
            error!(error = ?self, status = %status, "Request failed");
        }

        let envelope = EnvelopeBuilder::default().error(descriptor).build();
        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (ApiError::invalid("dominant", "Invalid value"), StatusCode::BAD_REQUEST),
            (
                PlaceError::validation("bounds.ne", "Invalid coordinate array for \"ne\"").into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PlaceError::Conflict("Place p1 is deleted".into()).into(),
                StatusCode::CONFLICT,
            ),
            (
                PlaceError::LookupUnavailable(anyhow::anyhow!("down")).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                PlaceError::Store(StoreError::InvalidData("bad row".into())).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_and_descriptor().0, expected);
        }
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let error: ApiError = PlaceError::Store(StoreError::InvalidData("secret".into())).into();
        let (_, descriptor) = error.status_and_descriptor();

        assert_eq!(descriptor.message, "Unexpected error");
        assert!(descriptor.field.is_none());
    }

    #[test]
    fn test_validation_keeps_field() {
        let error: ApiError = PlaceError::validation("bounds.sw", "Invalid").into();
        let (_, descriptor) = error.status_and_descriptor();

        assert_eq!(descriptor.field.as_deref(), Some("bounds.sw"));
    }
}
