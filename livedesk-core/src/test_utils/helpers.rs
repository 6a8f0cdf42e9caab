// File: livedesk-core/src/test_utils/helpers.rs

use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection, Pool, Postgres};
use tracing::debug;

use crate::Error;
use crate::db::Database;

const TEST_DB: &str = "livedesk_test";

/// URL of the test database, if one is configured.
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok()
}

/// Creates the test database when missing. Needs `DATABASE_ADMIN_URL`.
pub async fn ensure_test_database_exists() -> Result<(), Error> {
    let Ok(admin_url) = std::env::var("DATABASE_ADMIN_URL") else {
        return Ok(());
    };
    let mut conn = PgConnection::connect(&admin_url).await?;

    let create_db_sql = format!("CREATE DATABASE {TEST_DB};");
    match sqlx::query(&create_db_sql).execute(&mut conn).await {
        Ok(_) => debug!("Created test DB '{TEST_DB}'."),
        // 42P04 => duplicate_database
        Err(e)
            if e.as_database_error()
                .and_then(|db_err| db_err.code())
                .is_some_and(|code| code == "42P04") =>
        {
            debug!("Test DB '{TEST_DB}' already exists.");
        }
        Err(e) => return Err(Error::Database(e)),
    }

    Ok(())
}

pub async fn create_test_db_pool(url: &str) -> Result<Pool<Postgres>, Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(url)
        .await?;
    Ok(pool)
}

/// Wipes out test data so each test can start fresh.
pub async fn clean_database(pool: &Pool<Postgres>) -> Result<(), Error> {
    sqlx::query(r#"
        TRUNCATE TABLE
            livechats,
            message_contexts;
    "#)
        .execute(pool)
        .await?;

    Ok(())
}

/// Returns a migrated, empty test DB handle, or `None` when
/// `TEST_DATABASE_URL` is unset and Postgres tests should be skipped.
pub async fn setup_test_database() -> Result<Option<Database>, Error> {
    let Some(url) = test_database_url() else {
        return Ok(None);
    };
    ensure_test_database_exists().await?;

    let db = Database::from_pool(create_test_db_pool(&url).await?);
    db.migrate().await?;
    clean_database(db.pool()).await?;

    Ok(Some(db))
}
