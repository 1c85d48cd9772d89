//! # Verilink
//!
//! `verilink` is the web half of a messaging-bot verification flow. The bot
//! hands a user a single-use link (`/verify?uid=…&token=…`); following it
//! binds the user's account to a cookie-persisted device fingerprint and
//! marks the account verified. A device fingerprint can only ever be bound to
//! one account, which is the anti-abuse invariant the whole service exists
//! to enforce.

pub mod api;
pub mod cli;
