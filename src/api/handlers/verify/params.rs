//! Query parameter validation for the verification endpoint.

use serde::Deserialize;

/// The literal `step` value that performs the verification.
const COMMIT_STEP: &str = "do";

/// Raw query parameters as they arrive on the wire.
///
/// Everything is optional here so malformed requests reach our own "invalid
/// link" page instead of a framework rejection.
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    pub uid: Option<String>,
    pub token: Option<String>,
    pub step: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Step {
    Confirm,
    Commit,
}

/// A validated verification request.
#[derive(Debug, PartialEq, Eq)]
pub(super) struct VerifyRequest {
    pub account_id: i64,
    pub token: String,
    pub step: Step,
}

/// Validate the raw query into a request, or `None` for an invalid link.
///
/// The account identifier must be a positive integer and the token non-empty
/// after trimming. Any `step` other than the commit literal falls back to the
/// confirmation page.
pub(super) fn parse(query: &VerifyQuery) -> Option<VerifyRequest> {
    let account_id = query.uid.as_deref()?.trim().parse::<i64>().ok()?;
    if account_id <= 0 {
        return None;
    }

    let token = query.token.as_deref()?.trim();
    if token.is_empty() {
        return None;
    }

    let step = match query.step.as_deref() {
        Some(COMMIT_STEP) => Step::Commit,
        _ => Step::Confirm,
    };

    Some(VerifyRequest {
        account_id,
        token: token.to_string(),
        step,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(uid: Option<&str>, token: Option<&str>, step: Option<&str>) -> VerifyQuery {
        VerifyQuery {
            uid: uid.map(String::from),
            token: token.map(String::from),
            step: step.map(String::from),
        }
    }

    #[test]
    fn test_parse_confirm_default() {
        let request = parse(&query(Some("1001"), Some("abc123"), None)).unwrap();
        assert_eq!(request.account_id, 1001);
        assert_eq!(request.token, "abc123");
        assert_eq!(request.step, Step::Confirm);
    }

    #[test]
    fn test_parse_commit_step() {
        let request = parse(&query(Some("1001"), Some("abc123"), Some("do"))).unwrap();
        assert_eq!(request.step, Step::Commit);
    }

    #[test]
    fn test_parse_unknown_step_is_confirm() {
        let request = parse(&query(Some("1001"), Some("abc123"), Some("DO"))).unwrap();
        assert_eq!(request.step, Step::Confirm);

        let request = parse(&query(Some("1001"), Some("abc123"), Some("commit"))).unwrap();
        assert_eq!(request.step, Step::Confirm);
    }

    #[test]
    fn test_parse_trims_token() {
        let request = parse(&query(Some("1001"), Some("  abc123  "), None)).unwrap();
        assert_eq!(request.token, "abc123");
    }

    #[test]
    fn test_parse_rejects_zero_uid() {
        assert!(parse(&query(Some("0"), Some("abc123"), None)).is_none());
    }

    #[test]
    fn test_parse_rejects_negative_uid() {
        assert!(parse(&query(Some("-5"), Some("abc123"), None)).is_none());
    }

    #[test]
    fn test_parse_rejects_non_numeric_uid() {
        assert!(parse(&query(Some("12ab"), Some("abc123"), None)).is_none());
    }

    #[test]
    fn test_parse_rejects_missing_uid() {
        assert!(parse(&query(None, Some("abc123"), None)).is_none());
    }

    #[test]
    fn test_parse_rejects_empty_token() {
        assert!(parse(&query(Some("1001"), Some(""), None)).is_none());
        assert!(parse(&query(Some("1001"), Some("   "), None)).is_none());
        assert!(parse(&query(Some("1001"), None, None)).is_none());
    }
}
