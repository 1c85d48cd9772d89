//! Runtime configuration for the verification flow.
//!
//! Built once at startup and passed down as an extension so the flow never
//! reads ambient environment state.

/// Host successful verifications redirect back to.
const REDIRECT_BASE: &str = "https://t.me";

#[derive(Debug, Clone)]
pub struct VerifyConfig {
    bot_username: Option<String>,
}

impl VerifyConfig {
    /// A leading `@` is tolerated; an empty name degrades success responses
    /// to the static done page instead of a redirect.
    #[must_use]
    pub fn new(bot_username: Option<String>) -> Self {
        let bot_username = bot_username
            .map(|name| name.trim().trim_start_matches('@').to_string())
            .filter(|name| !name.is_empty());

        Self { bot_username }
    }

    /// Redirect target for successful verifications, if configured.
    #[must_use]
    pub fn redirect_url(&self) -> Option<String> {
        self.bot_username
            .as_deref()
            .map(|bot| format!("{REDIRECT_BASE}/{bot}"))
    }
}
