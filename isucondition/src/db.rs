use crate::errors::{Error, Result};
use crate::metrics::DB_FAILURES_TOTAL;
use crate::model::{Isu, IsuCondition, IsuWithLatestCondition, TrendRow};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{error, info, warn};

const UNIQUE_VIOLATION: &str = "23505";

pub async fn make_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;

    info!("Database connection established");
    info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Migrations completed");

    Ok(pool)
}

pub async fn insert_conditions(pool: &PgPool, batch: &[IsuCondition]) -> Result<()> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut attempts = 0;
    let max_attempts = 5;

    loop {
        attempts += 1;
        match insert_conditions_inner(pool, batch).await {
            Ok(()) => return Ok(()),
            Err(Error::Database(db_err))
                if attempts < max_attempts && is_transient_error(&db_err) =>
            {
                let wait_ms = 100 * 2_u64.pow(attempts - 1).min(32);
                warn!(
                    "Condition insert failed (attempt {}/{}), retrying in {}ms: {}",
                    attempts, max_attempts, wait_ms, db_err
                );
                DB_FAILURES_TOTAL.inc();
                tokio::time::sleep(Duration::from_millis(wait_ms)).await;
            }
            Err(e) => {
                error!(
                    "Condition insert failed permanently after {} attempts: {}",
                    attempts, e
                );
                return Err(e);
            }
        }
    }
}

async fn insert_conditions_inner(pool: &PgPool, batch: &[IsuCondition]) -> Result<()> {
    let uuids: Vec<&str> = batch.iter().map(|c| c.jia_isu_uuid.as_str()).collect();
    let timestamps: Vec<DateTime<Utc>> = batch.iter().map(|c| c.timestamp).collect();
    let sitting: Vec<bool> = batch.iter().map(|c| c.is_sitting).collect();
    let conditions: Vec<&str> = batch.iter().map(|c| c.condition.as_str()).collect();
    let messages: Vec<&str> = batch.iter().map(|c| c.message.as_str()).collect();

    let query = r#"
        INSERT INTO isu_condition (jia_isu_uuid, ts, is_sitting, condition, message)
        SELECT * FROM UNNEST($1::text[], $2::timestamptz[], $3::bool[], $4::text[], $5::text[])
        "#;

    sqlx::query(query)
        .bind(&uuids)
        .bind(&timestamps)
        .bind(&sitting)
        .bind(&conditions)
        .bind(&messages)
        .execute(pool)
        .await?;

    Ok(())
}

fn is_transient_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db_err) => {
            // Connection-class SQLSTATEs only
            db_err.code().is_some_and(|code| {
                code == "08000" || // connection_exception
                code == "08003" || // connection_does_not_exist
                code == "08006" || // connection_failure
                code == "57P03" || // cannot_connect_now
                code == "53300" // too_many_connections
            })
        }
        _ => false,
    }
}

pub fn is_unique_violation(err: &Error) -> bool {
    match err {
        Error::Database(sqlx::Error::Database(db_err)) => {
            db_err.code().is_some_and(|code| code == UNIQUE_VIOLATION)
        }
        _ => false,
    }
}

pub async fn insert_isu(
    pool: &PgPool,
    jia_isu_uuid: &str,
    name: &str,
    character: &str,
    jia_user_id: &str,
) -> Result<Isu> {
    let isu = sqlx::query_as::<_, Isu>(
        r#"
        INSERT INTO isu (jia_isu_uuid, name, "character", jia_user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, jia_isu_uuid, name, "character", jia_user_id
        "#,
    )
    .bind(jia_isu_uuid)
    .bind(name)
    .bind(character)
    .bind(jia_user_id)
    .fetch_one(pool)
    .await?;

    Ok(isu)
}

/// Looks up an Isu owned by the given user
pub async fn find_isu(pool: &PgPool, jia_isu_uuid: &str, jia_user_id: &str) -> Result<Option<Isu>> {
    let isu = sqlx::query_as::<_, Isu>(
        r#"
        SELECT id, jia_isu_uuid, name, "character", jia_user_id
        FROM isu
        WHERE jia_isu_uuid = $1 AND jia_user_id = $2
        "#,
    )
    .bind(jia_isu_uuid)
    .bind(jia_user_id)
    .fetch_optional(pool)
    .await?;

    Ok(isu)
}

pub async fn isu_exists(pool: &PgPool, jia_isu_uuid: &str) -> Result<bool> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM isu WHERE jia_isu_uuid = $1)")
            .bind(jia_isu_uuid)
            .fetch_one(pool)
            .await?;

    Ok(exists)
}

pub async fn list_isus_with_latest(
    pool: &PgPool,
    jia_user_id: &str,
) -> Result<Vec<IsuWithLatestCondition>> {
    let rows = sqlx::query_as::<_, IsuWithLatestCondition>(
        r#"
        SELECT i.id, i.jia_isu_uuid, i.name, i."character",
               c.ts AS timestamp, c.is_sitting, c.condition, c.message
        FROM isu i
        LEFT JOIN LATERAL (
            SELECT ts, is_sitting, condition, message
            FROM isu_condition
            WHERE jia_isu_uuid = i.jia_isu_uuid
            ORDER BY ts DESC
            LIMIT 1
        ) c ON true
        WHERE i.jia_user_id = $1
        ORDER BY i.id DESC
        "#,
    )
    .bind(jia_user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Conditions in `[start, end)`, oldest first
pub async fn conditions_ascending(
    pool: &PgPool,
    jia_isu_uuid: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<Vec<IsuCondition>> {
    let rows = sqlx::query_as::<_, IsuCondition>(
        r#"
        SELECT jia_isu_uuid, ts AS timestamp, is_sitting, condition, message
        FROM isu_condition
        WHERE jia_isu_uuid = $1 AND ts >= $2 AND ts < $3
        ORDER BY ts ASC
        "#,
    )
    .bind(jia_isu_uuid)
    .bind(start)
    .bind(end)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Conditions before `end` (and at or after `start` when given), newest first
pub async fn conditions_descending(
    pool: &PgPool,
    jia_isu_uuid: &str,
    start: Option<DateTime<Utc>>,
    end: DateTime<Utc>,
) -> Result<Vec<IsuCondition>> {
    let rows = sqlx::query_as::<_, IsuCondition>(
        r#"
        SELECT jia_isu_uuid, ts AS timestamp, is_sitting, condition, message
        FROM isu_condition
        WHERE jia_isu_uuid = $1
          AND ts < $2
          AND ($3::timestamptz IS NULL OR ts >= $3)
        ORDER BY ts DESC
        "#,
    )
    .bind(jia_isu_uuid)
    .bind(end)
    .bind(start)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

pub async fn trend_rows(pool: &PgPool) -> Result<Vec<TrendRow>> {
    let rows = sqlx::query_as::<_, TrendRow>(
        r#"
        SELECT i.id AS isu_id, i."character", c.ts AS timestamp, c.condition
        FROM isu i
        LEFT JOIN LATERAL (
            SELECT ts, condition
            FROM isu_condition
            WHERE jia_isu_uuid = i.jia_isu_uuid
            ORDER BY ts DESC
            LIMIT 1
        ) c ON true
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
