//! Verification state machine.
//!
//! Runs only for the commit step. Each check short-circuits to a terminal
//! outcome; the commit itself is one transaction, so either the device link
//! and the verified flag both land or neither does.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use super::storage;

/// Terminal outcome of a commit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// Account verified by this request.
    Verified,
    /// Account was verified before this request; nothing is mutated and the
    /// token is not re-checked.
    AlreadyVerified,
    /// Stored token missing or not equal to the supplied one. A consumed
    /// token looks identical to a wrong guess, deliberately.
    InvalidLink,
    /// Token expiry missing or at/before the current time.
    Expired,
    /// Device fingerprint already bound to a different account.
    DeviceConflict,
    /// Account row missing even after the ensure step. Should not happen.
    NotFound,
}

/// Account fields the state machine decides on.
#[derive(Debug)]
pub(super) struct AccountRecord {
    pub verified: bool,
    pub verify_token: Option<String>,
    pub verify_token_expires: Option<DateTime<Utc>>,
}

/// Device-lock decision: the fingerprint may bind to the account only when
/// it is unowned or already owned by that same account.
fn device_allows(owner: Option<i64>, account_id: i64) -> bool {
    owner.map_or(true, |owner| owner == account_id)
}

/// Idempotence, token, and expiry checks, in that order.
/// `None` means the commit may proceed.
fn validate(record: &AccountRecord, token: &str, now: DateTime<Utc>) -> Option<Outcome> {
    if record.verified {
        return Some(Outcome::AlreadyVerified);
    }

    if record.verify_token.as_deref() != Some(token) {
        return Some(Outcome::InvalidLink);
    }

    match record.verify_token_expires {
        Some(expires) if expires > now => None,
        _ => Some(Outcome::Expired),
    }
}

/// Run the full commit: ensure the account row exists, validate token and
/// expiry, enforce the device lock, bind the device, and flip the account to
/// verified.
pub(super) async fn commit(
    pool: &PgPool,
    account_id: i64,
    token: &str,
    fingerprint: &str,
) -> Result<Outcome> {
    let mut tx = pool
        .begin()
        .await
        .context("begin verification transaction")?;

    storage::ensure_account(&mut tx, account_id).await?;

    let Some(record) = storage::load_account(&mut tx, account_id).await? else {
        let _ = tx.rollback().await;
        return Ok(Outcome::NotFound);
    };

    if let Some(outcome) = validate(&record, token, Utc::now()) {
        let _ = tx.rollback().await;
        if outcome == Outcome::AlreadyVerified {
            info!(account_id, "account already verified");
        }
        return Ok(outcome);
    }

    let owner = storage::device_owner(&mut tx, fingerprint).await?;
    if !device_allows(owner, account_id) {
        let _ = tx.rollback().await;
        info!(account_id, ?owner, "device already linked to another account");
        return Ok(Outcome::DeviceConflict);
    }

    // The upsert re-checks ownership atomically; a concurrent commit for a
    // different account loses here even if the lookup above saw no owner.
    if !storage::bind_device(&mut tx, fingerprint, account_id).await? {
        let _ = tx.rollback().await;
        return Ok(Outcome::DeviceConflict);
    }

    storage::mark_verified(&mut tx, account_id).await?;

    tx.commit()
        .await
        .context("commit verification transaction")?;

    info!(account_id, "account verified");

    Ok(Outcome::Verified)
}
