//! Identity Token & Session-Consistency Guard
//!
//! The SDK stores a compound identity token in a cookie; its middle segment
//! is base64-encoded JSON claims. A token minted by one environment must not
//! be replayed against the other, so when the decoded audience disagrees
//! with the expected application ID the session is purged.
//!
//! Every decode failure (missing cookie, malformed token, bad encoding,
//! bad JSON) means "no identity present", never an error.

use base64::Engine;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use bridge_core::CookieJar;

use crate::handlers::Navigation;
use crate::sdk::SdkClient;

/// Claims carried in the identity token
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Application ID the token was issued for
    #[serde(default)]
    pub aud: Option<String>,

    /// Subject (user) identifier
    #[serde(default)]
    pub sub: Option<String>,

    /// Expiration, UNIX timestamp
    #[serde(default)]
    pub exp: Option<i64>,
}

fn decode_segment(segment: &str) -> Option<Vec<u8>> {
    let segment = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| STANDARD_NO_PAD.decode(segment))
        .ok()
}

/// Decode the identity claims from the designated cookie
pub fn identity_claims(cookies: &dyn CookieJar, cookie_name: &str) -> Option<IdentityClaims> {
    let token = cookies.get(cookie_name)?;
    let payload = token.split('.').nth(1)?;
    let bytes = decode_segment(payload)?;
    serde_json::from_slice(&bytes).ok()
}

/// Force a logout when the session belongs to a different environment
///
/// Returns the page reload the host must perform after the purge, or `None`
/// when the session is absent or consistent. Runs only off production
/// subdomains; the caller enforces that.
pub fn verify_or_purge(
    cookies: &dyn CookieJar,
    cookie_name: &str,
    expected_aid: &str,
    sdk: &dyn SdkClient,
) -> Option<Navigation> {
    let claims = identity_claims(cookies, cookie_name)?;
    let aud = claims.aud?;

    if aud == expected_aid {
        return None;
    }

    tracing::warn!(
        token_aid = %aud,
        expected_aid = %expected_aid,
        "Forcing logout due to identity cookie environment mismatch"
    );
    sdk.logout();
    Some(Navigation::Reload)
}
