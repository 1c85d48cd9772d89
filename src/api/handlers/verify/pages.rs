//! Fixed HTML pages for the verification flow.
//!
//! One card layout, a titled message, and at most one action link. Terminal
//! pages carry no link; the user re-initiates from the bot.

use axum::response::Html;

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, message: &str, action: Option<&str>) -> Html<String> {
    let button = action.map_or_else(String::new, |href| {
        format!(
            r#"<a class="btn" href="{}">Verify now</a>"#,
            escape_html(href)
        )
    });

    Html(format!(
        r#"<!doctype html>
<html><head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  body{{margin:0;height:100vh;display:flex;align-items:center;justify-content:center;background:#0b1220;font-family:system-ui;color:#fff}}
  .card{{width:min(560px,92vw);background:#111827;border-radius:18px;padding:22px;box-shadow:0 20px 60px rgba(0,0,0,.45)}}
  .h{{font-size:26px;font-weight:800;margin:0 0 10px}}
  .p{{opacity:.85;line-height:1.4;margin:0 0 16px;font-size:16px}}
  .btn{{display:block;text-align:center;background:#22c55e;color:#000;padding:14px 16px;border-radius:12px;text-decoration:none;font-weight:800;font-size:18px}}
</style>
</head><body><div class="card">
<div class="h">{title}</div>
<div class="p">{message}</div>
{button}
</div></body></html>"#,
        title = escape_html(title),
        message = escape_html(message),
        button = button,
    ))
}

/// Confirmation page: one link that re-issues the request with the commit
/// step. The token round-trips through the query string, so it is
/// percent-encoded there and HTML-escaped in the attribute.
pub(super) fn confirm(account_id: i64, token: &str) -> Html<String> {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("uid", &account_id.to_string())
        .append_pair("token", token)
        .append_pair("step", "do")
        .finish();

    page("Verification", "Tap below to verify.", Some(&format!("/verify?{query}")))
}

pub(super) fn invalid_link() -> Html<String> {
    page(
        "Invalid",
        "This link is invalid. Request a new one from the bot.",
        None,
    )
}

pub(super) fn expired() -> Html<String> {
    page(
        "Expired",
        "This link has expired. Request a new one from the bot.",
        None,
    )
}

pub(super) fn blocked() -> Html<String> {
    page(
        "Blocked",
        "This device is already linked to another account.",
        None,
    )
}

pub(super) fn not_found() -> Html<String> {
    page("Error", "Account not found.", None)
}

pub(super) fn already_verified() -> Html<String> {
    page("Verified", "This account is already verified.", None)
}

pub(super) fn done() -> Html<String> {
    page("Done", "Verified successfully. You can return to the bot.", None)
}

pub(super) fn database_error() -> Html<String> {
    page("Error", "Database not connected. Try again later.", None)
}

pub(super) fn internal_error() -> Html<String> {
    page("Error", "Something went wrong. Try again later.", None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }

    #[test]
    fn test_confirm_link_reissues_commit_step() {
        let Html(body) = confirm(1001, "abc123");
        assert!(body.contains("uid=1001"));
        assert!(body.contains("token=abc123"));
        assert!(body.contains("step=do"));
        assert!(body.contains("Verify now"));
    }

    #[test]
    fn test_confirm_percent_encodes_token() {
        let Html(body) = confirm(1001, "a b&c");
        // Percent-encoded in the query, then &-escaped in the attribute.
        assert!(body.contains("token=a+b%26c"));
        assert!(!body.contains("token=a b"));
    }

    #[test]
    fn test_terminal_pages_have_no_action() {
        for Html(body) in [
            invalid_link(),
            expired(),
            blocked(),
            not_found(),
            already_verified(),
            done(),
            database_error(),
            internal_error(),
        ] {
            assert!(!body.contains("class=\"btn\""));
        }
    }

    #[test]
    fn test_blocked_page_wording() {
        let Html(body) = blocked();
        assert!(body.contains("Blocked"));
        assert!(body.contains("already linked to another account"));
    }
}
