//! Web verification flow.
//!
//! Flow Overview: the bot sends the user a link `/verify?uid=…&token=…`. The
//! first visit renders a confirmation page whose only link re-issues the
//! request with `step=do`. The commit step resolves the device fingerprint
//! cookie, runs the state machine, and either redirects back to the bot or
//! renders a terminal page.

pub(crate) mod device;
pub(crate) mod machine;
mod pages;
mod params;
mod state;
pub(crate) mod storage;

pub use self::params::VerifyQuery;
pub use self::state::VerifyConfig;

use axum::{
    extract::{Extension, Query},
    http::header::SET_COOKIE,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::error;

use self::machine::Outcome;
use self::params::Step;

#[utoipa::path(
    get,
    path = "/verify",
    params(
        ("uid" = i64, Query, description = "Account identifier issued by the bot"),
        ("token" = String, Query, description = "Single-use verification token"),
        ("step" = Option<String>, Query, description = "`do` performs the verification; anything else shows the confirmation page")
    ),
    responses(
        (status = 200, description = "Confirmation or terminal page", content_type = "text/html"),
        (status = 303, description = "Verified; redirecting back to the bot")
    ),
    tag = "verify"
)]
// axum handler for the verification link
pub async fn verify(
    headers: HeaderMap,
    Query(query): Query<VerifyQuery>,
    pool: Extension<PgPool>,
    config: Extension<Arc<VerifyConfig>>,
) -> Response {
    // Invalid links are rejected before any cookie or database work.
    let Some(request) = params::parse(&query) else {
        return pages::invalid_link().into_response();
    };

    if request.step == Step::Confirm {
        return pages::confirm(request.account_id, &request.token).into_response();
    }

    let device = match device::resolve(&headers) {
        Ok(device) => device,
        Err(err) => {
            error!("Failed to resolve device fingerprint: {err}");
            return pages::internal_error().into_response();
        }
    };

    let mut response = match machine::commit(
        &pool,
        request.account_id,
        &request.token,
        &device.fingerprint,
    )
    .await
    {
        Ok(outcome) => respond(&config, outcome),
        Err(err) => {
            // Operational detail stays in the log; the client gets the
            // generic page.
            error!("Verification commit failed: {err}");
            pages::database_error().into_response()
        }
    };

    // A freshly minted cookie accompanies whichever response goes out, the
    // generic error page included.
    if let Some(cookie) = device.set_cookie {
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    response
}

/// Map a terminal outcome to its page or redirect.
fn respond(config: &VerifyConfig, outcome: Outcome) -> Response {
    match outcome {
        Outcome::Verified | Outcome::AlreadyVerified => match config.redirect_url() {
            Some(url) => Redirect::to(&url).into_response(),
            None if outcome == Outcome::AlreadyVerified => {
                pages::already_verified().into_response()
            }
            None => pages::done().into_response(),
        },
        Outcome::InvalidLink => pages::invalid_link().into_response(),
        Outcome::Expired => pages::expired().into_response(),
        Outcome::DeviceConflict => pages::blocked().into_response(),
        Outcome::NotFound => pages::not_found().into_response(),
    }
}
