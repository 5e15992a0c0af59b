use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Extension, Path, Query,
    },
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::common::{BoundsInput, Envelope, GeoBounds, Position};
use crate::domains::places::{
    self, AnswerInput, PlaceError, PlaceQuery, PlaceStatus, ResolveOptions, StatusFilter,
};
use crate::server::app::AppState;
use crate::server::routes::parse_bool_param;
use crate::server::ApiError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListPlacesParams {
    /// Northeast corner as `lat,lng`
    pub ne: Option<String>,
    /// Southwest corner as `lat,lng`
    pub sw: Option<String>,
    pub dominant: Option<String>,
    pub status: Option<String>,
}

impl ListPlacesParams {
    fn into_query(self) -> Result<PlaceQuery, ApiError> {
        let bounds = BoundsInput::from_pairs(self.ne.as_deref(), self.sw.as_deref())
            .map(|input| GeoBounds::parse(&input))
            .transpose()
            .map_err(PlaceError::from)?;

        Ok(PlaceQuery {
            bounds,
            dominant: parse_bool_param("dominant", self.dominant.as_deref())?,
            status: parse_status_param(self.status.as_deref())?,
        })
    }
}

/// Only `ACTIVE` may be requested explicitly
pub(crate) fn parse_status_param(value: Option<&str>) -> Result<Option<PlaceStatus>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => match value.parse::<PlaceStatus>() {
            Ok(PlaceStatus::Active) => Ok(Some(PlaceStatus::Active)),
            _ => Err(ApiError::invalid("status", "Invalid value")),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetPlaceParams {
    pub expand: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAnswerBody {
    pub answer: bool,
    /// `[latitude, longitude]`, used when the place is unknown everywhere
    #[serde(default)]
    pub position: Option<Position>,
}

/// GET /places
pub async fn list_places_handler(
    Extension(state): Extension<AppState>,
    params: Result<Query<ListPlacesParams>, QueryRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let Query(params) = params?;
    let query = params.into_query()?;

    let envelope = places::list_places(query, &state.deps).await?;
    Ok(Json(envelope))
}

/// GET /places/:place_id
pub async fn get_place_handler(
    Extension(state): Extension<AppState>,
    Path(place_id): Path<String>,
    params: Result<Query<GetPlaceParams>, QueryRejection>,
) -> Result<Json<Envelope>, ApiError> {
    let Query(params) = params?;
    let options = ResolveOptions {
        expand: parse_bool_param("expand", params.expand.as_deref())?.unwrap_or(false),
        status: StatusFilter::NotDeleted,
    };

    places::get_place(&place_id, options, &state.deps)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// POST /places/:place_id/answers
///
/// 201 when this answer created the place, 200 otherwise.
pub async fn add_answer_handler(
    Extension(state): Extension<AppState>,
    Path(place_id): Path<String>,
    body: Result<Json<AddAnswerBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope>), ApiError> {
    let Json(body) = body?;
    let input = AnswerInput {
        answer: body.answer,
        position: body.position,
    };

    let outcome = places::add_answer(&place_id, input, &state.deps)
        .await?
        .ok_or(ApiError::NotFound)?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.envelope)))
}
