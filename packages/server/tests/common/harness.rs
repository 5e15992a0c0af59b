//! Test harness with testcontainers for the Postgres store.
//!
//! One container is started for the whole test binary and migrated once.
//! Tests use unique place ids so they can share the database.

use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use places_core::kernel::PostgresPlaceStore;
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

struct SharedTestInfra {
    db_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Run tests with: RUST_LOG=debug cargo test -- --ignored --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let host = postgres.get_host().await?;
        let port = postgres.get_host_port_ipv4(5432).await?;
        let db_url = format!("postgresql://postgres:postgres@{}:{}/postgres", host, port);

        let pool = PgPool::connect(&db_url)
            .await
            .context("Failed to connect to Postgres for migrations")?;
        PostgresPlaceStore::new(pool)
            .migrate()
            .await
            .context("Failed to run migrations")?;

        Ok(Self {
            db_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Fresh store over the shared database
pub struct PostgresHarness {
    pub pool: PgPool,
    pub store: PostgresPlaceStore,
}

impl PostgresHarness {
    /// Place id no other test uses
    pub fn unique_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl AsyncTestContext for PostgresHarness {
    async fn setup() -> Self {
        let infra = SharedTestInfra::get().await;
        let pool = PgPool::connect(&infra.db_url)
            .await
            .expect("Failed to connect to test database");

        Self {
            store: PostgresPlaceStore::new(pool.clone()),
            pool,
        }
    }
}
