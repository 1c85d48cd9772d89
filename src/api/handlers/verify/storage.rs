//! Database helpers for account and device-link state.
//!
//! All statements are parameterized and run against the caller's transaction
//! so the state machine can roll everything back on a denial.

use anyhow::{Context, Result};
use sqlx::{Row, Transaction};
use tracing::Instrument;

use super::machine::AccountRecord;

/// Insert a bare account row if none exists. Never overwrites existing state.
pub(super) async fn ensure_account(
    tx: &mut Transaction<'_, sqlx::Postgres>,
    account_id: i64,
) -> Result<()> {
    let query = "INSERT INTO accounts (account_id) VALUES ($1) ON CONFLICT (account_id) DO NOTHING";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to ensure account row")?;

    Ok(())
}

/// Fetch the verification fields the state machine decides on.
pub(super) async fn load_account(
    tx: &mut Transaction<'_, sqlx::Postgres>,
    account_id: i64,
) -> Result<Option<AccountRecord>> {
    let query =
        "SELECT verified, verify_token, verify_token_expires FROM accounts WHERE account_id = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to load account")?;

    Ok(row.map(|row| AccountRecord {
        verified: row.get("verified"),
        verify_token: row.get("verify_token"),
        verify_token_expires: row.get("verify_token_expires"),
    }))
}

/// Look up which account, if any, the fingerprint is already bound to.
pub(super) async fn device_owner(
    tx: &mut Transaction<'_, sqlx::Postgres>,
    fingerprint: &str,
) -> Result<Option<i64>> {
    let query = "SELECT account_id FROM device_links WHERE device_token = $1";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(fingerprint)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to look up device link")?;

    Ok(row.map(|row| row.get("account_id")))
}

/// Bind the fingerprint to the account.
///
/// The upsert only updates a row whose owner already equals the account, so a
/// fingerprint held by someone else is never stolen; in that case no row
/// comes back and the caller must refuse the commit. The primary key on
/// `device_token` makes two concurrent first-writes serialize onto the same
/// row.
pub(super) async fn bind_device(
    tx: &mut Transaction<'_, sqlx::Postgres>,
    fingerprint: &str,
    account_id: i64,
) -> Result<bool> {
    let query = r"
        INSERT INTO device_links (device_token, account_id)
        VALUES ($1, $2)
        ON CONFLICT (device_token) DO UPDATE SET account_id = EXCLUDED.account_id
        WHERE device_links.account_id = EXCLUDED.account_id
        RETURNING account_id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(fingerprint)
        .bind(account_id)
        .fetch_optional(&mut **tx)
        .instrument(span)
        .await
        .context("failed to bind device link")?;

    Ok(row.is_some())
}

/// Flip the account to verified and clear the consumed token fields.
pub(super) async fn mark_verified(
    tx: &mut Transaction<'_, sqlx::Postgres>,
    account_id: i64,
) -> Result<()> {
    let query = r"
        UPDATE accounts
        SET verified = TRUE, verified_at = NOW(), verify_token = NULL, verify_token_expires = NULL
        WHERE account_id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    sqlx::query(query)
        .bind(account_id)
        .execute(&mut **tx)
        .instrument(span)
        .await
        .context("failed to mark account verified")?;

    Ok(())
}
