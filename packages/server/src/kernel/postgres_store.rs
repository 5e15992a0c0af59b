//! Postgres-backed place store (sqlx).
//!
//! Filters are bound as nullable parameters so list reads share one static
//! statement. Geospatial containment relies on the native `point <@ polygon`
//! operator.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{BoxStream, StreamExt};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;

use super::{BasePlaceStore, StoreError};
use crate::common::Position;
use crate::domains::places::models::{Answer, Place, PlaceFilter, PlaceParts, StatusFilter};

const PLACE_COLUMNS: &str =
    "id, aliases, latitude, longitude, status, answers, created_at, modified_at, version";

// $1 = exact status, $2 = include deleted when $1 is NULL
const STATUS_CLAUSE: &str =
    "(($1::text IS NULL AND ($2::boolean OR status <> 'DELETED')) OR status = $1)";

const SELECT_PLACES_SQL: &str = "SELECT id, aliases, latitude, longitude, status, answers, \
            created_at, modified_at, version \
     FROM places \
     WHERE (($1::text IS NULL AND ($2::boolean OR status <> 'DELETED')) OR status = $1) \
       AND ($3::text IS NULL OR point(longitude, latitude) <@ $3::text::polygon) \
       AND ($4::boolean IS NULL OR dominant = $4) \
     ORDER BY seq ASC";

/// Raw `places` row
#[derive(Debug, sqlx::FromRow)]
struct PlaceRow {
    id: String,
    aliases: Vec<String>,
    latitude: f64,
    longitude: f64,
    status: String,
    answers: Json<Vec<Answer>>,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
    version: i64,
}

impl TryFrom<PlaceRow> for Place {
    type Error = StoreError;

    fn try_from(row: PlaceRow) -> Result<Self, Self::Error> {
        let invalid = |message: String| StoreError::InvalidData(format!("{}: {}", row.id, message));

        let position =
            Position::new(row.latitude, row.longitude).map_err(|e| invalid(e.to_string()))?;
        let status = row.status.parse().map_err(|e: anyhow::Error| invalid(e.to_string()))?;

        Place::restore(PlaceParts {
            id: row.id.clone(),
            aliases: row.aliases,
            position,
            status,
            answers: row.answers.0,
            created_at: row.created_at,
            modified_at: row.modified_at,
            version: row.version,
        })
        .map_err(|e| StoreError::InvalidData(format!("{}: {}", row.id, e)))
    }
}

/// Bind values for [`STATUS_CLAUSE`]
fn status_params(status: StatusFilter) -> (Option<String>, bool) {
    match status {
        StatusFilter::NotDeleted => (None, false),
        StatusFilter::Only(status) => (Some(status.to_string()), false),
        StatusFilter::Any => (None, true),
    }
}

pub struct PostgresPlaceStore {
    pool: PgPool,
}

impl PostgresPlaceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations from `migrations/`
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn find_one(
        &self,
        predicate: &str,
        key: &str,
        status: StatusFilter,
    ) -> Result<Option<Place>, StoreError> {
        let sql = format!(
            "SELECT {PLACE_COLUMNS} FROM places WHERE {predicate} AND {STATUS_CLAUSE} \
             ORDER BY seq ASC LIMIT 1"
        );
        let (exact, include_deleted) = status_params(status);

        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(exact)
            .bind(include_deleted)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Place::try_from).transpose()
    }

    async fn insert(&self, place: &Place) -> Result<Option<PlaceRow>, StoreError> {
        let summary = place.answer_summary();
        let sql = format!(
            "INSERT INTO places \
               (id, aliases, latitude, longitude, status, answers, \
                false_count, true_count, total, dominant, created_at, modified_at, version) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
                     COALESCE($11, NOW()), COALESCE($12, NOW()), 1) \
             ON CONFLICT (id) DO NOTHING \
             RETURNING {PLACE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(place.id())
            .bind(place.aliases())
            .bind(place.position().latitude())
            .bind(place.position().longitude())
            .bind(place.status().to_string())
            .bind(Json(place.answers().entries()))
            .bind(summary.false_count() as i64)
            .bind(summary.true_count() as i64)
            .bind(summary.total() as i64)
            .bind(summary.dominant())
            .bind(place.created_at())
            .bind(place.modified_at())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn update(&self, place: &Place) -> Result<Option<PlaceRow>, StoreError> {
        let summary = place.answer_summary();
        let sql = format!(
            "UPDATE places SET \
               aliases = $2, status = $3, answers = $4, \
               false_count = $5, true_count = $6, total = $7, dominant = $8, \
               modified_at = COALESCE($9, NOW()), version = version + 1 \
             WHERE id = $1 AND version = $10 \
             RETURNING {PLACE_COLUMNS}"
        );

        let row = sqlx::query_as::<_, PlaceRow>(&sql)
            .bind(place.id())
            .bind(place.aliases())
            .bind(place.status().to_string())
            .bind(Json(place.answers().entries()))
            .bind(summary.false_count() as i64)
            .bind(summary.true_count() as i64)
            .bind(summary.total() as i64)
            .bind(summary.dominant())
            .bind(place.modified_at())
            .bind(place.version())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }
}

#[async_trait]
impl BasePlaceStore for PostgresPlaceStore {
    async fn find_by_id(
        &self,
        id: &str,
        status: StatusFilter,
    ) -> Result<Option<Place>, StoreError> {
        self.find_one("id = $3", id, status).await
    }

    async fn find_by_alias(
        &self,
        alias: &str,
        status: StatusFilter,
    ) -> Result<Option<Place>, StoreError> {
        self.find_one("$3 = ANY(aliases)", alias, status).await
    }

    async fn find(&self, filter: &PlaceFilter) -> Result<Vec<Place>, StoreError> {
        let (exact, include_deleted) = status_params(filter.status);

        let rows = sqlx::query_as::<_, PlaceRow>(SELECT_PLACES_SQL)
            .bind(exact)
            .bind(include_deleted)
            .bind(filter.within.map(|polygon| polygon.to_pg_literal()))
            .bind(filter.dominant)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Loaded places");
        rows.into_iter().map(Place::try_from).collect()
    }

    fn stream(&self, filter: PlaceFilter) -> BoxStream<'_, Result<Place, StoreError>> {
        let (exact, include_deleted) = status_params(filter.status);

        sqlx::query_as::<_, PlaceRow>(SELECT_PLACES_SQL)
            .bind(exact)
            .bind(include_deleted)
            .bind(filter.within.map(|polygon| polygon.to_pg_literal()))
            .bind(filter.dominant)
            .fetch(&self.pool)
            .map(|row| row.map_err(StoreError::from).and_then(Place::try_from))
            .boxed()
    }

    async fn save(&self, place: &Place) -> Result<Place, StoreError> {
        let row = if place.version() == 0 {
            self.insert(place).await?
        } else {
            self.update(place).await?
        };

        match row {
            Some(row) => Place::try_from(row),
            None => Err(StoreError::VersionConflict {
                id: place.id().to_string(),
            }),
        }
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
