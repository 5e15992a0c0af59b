//! Place mutation actions

use tracing::{info, instrument, warn};

use super::links::place_envelope;
use crate::common::{Envelope, Position};
use crate::domains::places::data::AnswerInput;
use crate::domains::places::errors::PlaceError;
use crate::domains::places::models::{Place, StatusFilter};
use crate::domains::places::repository::{PlaceRepository, ResolveOptions};
use crate::kernel::{ServerDeps, StoreError};

/// Attempts at the resolve/append/save cycle before a concurrent update is
/// reported as a conflict
pub const MAX_SAVE_ATTEMPTS: usize = 3;

/// Result of [`add_answer`]
#[derive(Debug, Clone)]
pub struct AnswerOutcome {
    /// True when this answer created the stored record
    pub created: bool,
    pub envelope: Envelope,
}

/// Record an answer, creating the place on first answer.
///
/// The place is taken from the store, then from the lookup, then built from
/// the client-supplied position. `Ok(None)` when none of them yields a place.
#[instrument(skip(deps))]
pub async fn add_answer(
    place_id: &str,
    input: AnswerInput,
    deps: &ServerDeps,
) -> Result<Option<AnswerOutcome>, PlaceError> {
    let repository = PlaceRepository::new(deps);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let Some(mut place) = load_or_create(&repository, place_id, input.position).await? else {
            return Ok(None);
        };
        let created = place.version() == 0;

        place.add_answer(input.answer)?;

        match repository.save(&place).await {
            Ok(saved) => {
                info!(
                    place_id = %saved.id(),
                    answer = input.answer,
                    created,
                    total = saved.answer_summary().total(),
                    "Answer recorded"
                );
                return Ok(Some(AnswerOutcome {
                    created,
                    envelope: place_envelope(deps.envelope(), &saved).build(),
                }));
            }
            Err(PlaceError::Store(StoreError::VersionConflict { id })) => {
                if attempt >= MAX_SAVE_ATTEMPTS {
                    warn!(place_id = %id, attempt, "Giving up after concurrent updates");
                    return Err(PlaceError::Conflict(format!(
                        "Place {id} is being updated concurrently, try again"
                    )));
                }
                warn!(place_id = %id, attempt, "Concurrent update, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

async fn load_or_create(
    repository: &PlaceRepository,
    place_id: &str,
    position: Option<Position>,
) -> Result<Option<Place>, PlaceError> {
    // Deleted places are loaded so the aggregate can refuse the answer.
    let options = ResolveOptions {
        expand: false,
        status: StatusFilter::Any,
    };

    let resolved = match repository.resolve(place_id, options).await {
        Ok(resolved) => resolved,
        Err(PlaceError::LookupUnavailable(err)) if position.is_some() => {
            warn!(error = %err, "Places lookup failed, using client position");
            None
        }
        Err(err) => return Err(err),
    };

    match (resolved, position) {
        (Some(resolved), _) => Ok(Some(resolved.place)),
        (None, Some(position)) => Ok(Some(Place::create(place_id, position, None)?)),
        (None, None) => Ok(None),
    }
}
