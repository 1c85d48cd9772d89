//! Device fingerprint resolution.
//!
//! The fingerprint is an opaque bearer value persisted in a long-lived cookie.
//! It is not cryptographically tied to the hardware; the device lock only
//! holds as long as the client keeps the cookie.

use anyhow::{Context, Result};
use axum::http::{
    header::{InvalidHeaderValue, COOKIE},
    HeaderMap, HeaderValue,
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

pub(crate) const DEVICE_COOKIE_NAME: &str = "device_token";

/// Incoming values shorter than this are treated as absent and replaced.
const MIN_FINGERPRINT_LEN: usize = 20;

const COOKIE_MAX_AGE_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Device fingerprint for the current request, plus the cookie to emit when
/// it was freshly minted.
pub(super) struct ResolvedDevice {
    pub fingerprint: String,
    pub set_cookie: Option<HeaderValue>,
}

/// Reuse the fingerprint from the request cookie, or mint a new one and
/// return the `Set-Cookie` value alongside it.
pub(super) fn resolve(headers: &HeaderMap) -> Result<ResolvedDevice> {
    if let Some(fingerprint) = extract_fingerprint(headers) {
        return Ok(ResolvedDevice {
            fingerprint,
            set_cookie: None,
        });
    }

    let fingerprint = generate_fingerprint()?;
    let cookie = device_cookie(&fingerprint, request_is_secure(headers))
        .context("failed to build device cookie")?;

    Ok(ResolvedDevice {
        fingerprint,
        set_cookie: Some(cookie),
    })
}

fn extract_fingerprint(headers: &HeaderMap) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let Some(key) = parts.next() else { continue };
        let Some(val) = parts.next() else { continue };
        let val = val.trim();
        if key.trim() == DEVICE_COOKIE_NAME && val.len() >= MIN_FINGERPRINT_LEN {
            return Some(val.to_string());
        }
    }
    None
}

/// 128 bits of entropy, URL-safe text, well above the minimum length.
fn generate_fingerprint() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate device fingerprint")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// TLS termination happens upstream; the proxy tells us via forwarded-proto.
fn request_is_secure(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

fn device_cookie(fingerprint: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!(
        "{DEVICE_COOKIE_NAME}={fingerprint}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECONDS}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with_cookie(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_resolve_reuses_existing_fingerprint() {
        let headers = headers_with_cookie("device_token=0123456789abcdef0123");
        let device = resolve(&headers).unwrap();
        assert_eq!(device.fingerprint, "0123456789abcdef0123");
        assert!(device.set_cookie.is_none());
    }

    #[test]
    fn test_resolve_skips_other_cookies() {
        let headers =
            headers_with_cookie("session=xyz; device_token=0123456789abcdef0123; theme=dark");
        let device = resolve(&headers).unwrap();
        assert_eq!(device.fingerprint, "0123456789abcdef0123");
        assert!(device.set_cookie.is_none());
    }

    #[test]
    fn test_resolve_replaces_short_fingerprint() {
        let headers = headers_with_cookie("device_token=tooshort");
        let device = resolve(&headers).unwrap();
        assert_ne!(device.fingerprint, "tooshort");
        assert!(device.fingerprint.len() >= MIN_FINGERPRINT_LEN);
        assert!(device.set_cookie.is_some());
    }

    #[test]
    fn test_resolve_mints_when_absent() {
        let device = resolve(&HeaderMap::new()).unwrap();
        assert!(device.fingerprint.len() >= MIN_FINGERPRINT_LEN);

        let cookie = device.set_cookie.unwrap();
        let cookie = cookie.to_str().unwrap();
        assert!(cookie.starts_with("device_token="));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=31536000"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_resolve_marks_secure_behind_tls_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        let device = resolve(&headers).unwrap();
        let cookie = device.set_cookie.unwrap();
        assert!(cookie.to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_resolve_ignores_malformed_pairs() {
        let headers = headers_with_cookie("garbage; device_token=0123456789abcdef0123");
        let device = resolve(&headers).unwrap();
        assert_eq!(device.fingerprint, "0123456789abcdef0123");
    }

    #[test]
    fn test_generated_fingerprints_are_unique() {
        let one = generate_fingerprint().unwrap();
        let two = generate_fingerprint().unwrap();
        assert_ne!(one, two);
    }
}
