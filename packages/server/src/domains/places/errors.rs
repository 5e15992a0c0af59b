use thiserror::Error;

use crate::common::GeoError;
use crate::kernel::StoreError;

/// Errors raised by the places domain.
///
/// "Not found" is not an error: lookups return `Option::None` and the
/// transport layer renders it.
#[derive(Error, Debug)]
pub enum PlaceError {
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Places lookup unavailable: {0}")]
    LookupUnavailable(#[source] anyhow::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl PlaceError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        PlaceError::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }
}

impl From<GeoError> for PlaceError {
    fn from(err: GeoError) -> Self {
        PlaceError::Validation {
            field: Some(err.field),
            message: err.message,
        }
    }
}
