//! Assertion validation against the provider
//!
//! Implements stateless OpenID 2.0 `check_authentication`: every parameter
//! the provider signed is echoed back, and the provider confirms or denies
//! the signature. The claimed identity is additionally checked against the
//! canonical Steam profile URL shape; a "valid" verdict for a foreign or
//! malformed identity is never trusted.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};
use url::form_urlencoded;

use super::{OPENID_LOGIN_URL, OPENID_NS};
use crate::error::{AuthError, Result};
use crate::platform::HttpClient;
use crate::steamid::SteamId;

/// Callback parameters required before any verification attempt
const REQUIRED_PARAMS: [&str; 4] = [
    "openid_assoc_handle",
    "openid_claimed_id",
    "openid_sig",
    "openid_signed",
];

/// Claimed identity shape: canonical profile URL prefix plus 17-25 digits
const CLAIMED_ID_PATTERN: &str = r"^https?://steamcommunity\.com/openid/id/([0-9]{17,25})$";

/// Positive verdict marker in the provider response
const IS_VALID_PATTERN: &str = r"(?i)is_valid\s*:\s*true";

/// True when the parameter map carries the fields of a provider callback
pub fn is_callback(params: &HashMap<String, String>) -> bool {
    REQUIRED_PARAMS.iter().all(|key| params.contains_key(*key))
}

/// Validate the signed assertion by echoing it back to the provider.
///
/// Returns the SteamID extracted from `openid_claimed_id` only when the
/// provider confirms the signature and the claimed identity matches the
/// canonical profile URL. The two checks are independent.
pub async fn verify_assertion(
    params: &HashMap<String, String>,
    http: &dyn HttpClient,
) -> Result<SteamId> {
    // 1. Required callback parameters, checked before any network activity
    let claimed_id = require_param(params, "openid_claimed_id")?;
    let body = build_verification_body(params)?;

    // 2. Echo the signed set to the verification endpoint
    debug!("verifying assertion with provider");
    let response = http
        .post(
            OPENID_LOGIN_URL,
            &[
                ("Content-Type", "application/x-www-form-urlencoded"),
                ("Accept-Language", "en"),
            ],
            body.as_bytes(),
        )
        .await
        .map_err(|e| AuthError::validation_failed(format!("verification request failed: {}", e)))?;

    if response.status != 200 {
        warn!(status = response.status, "provider returned non-success status");
        return Err(AuthError::validation_failed(format!(
            "provider returned status {}",
            response.status
        )));
    }

    let text = response
        .text()
        .map_err(|_| AuthError::validation_failed("provider response is not valid UTF-8"))?;

    // 3. Provider verdict
    let valid_marker = Regex::new(IS_VALID_PATTERN)
        .map_err(|e| AuthError::internal(format!("verdict pattern: {}", e)))?;
    if !valid_marker.is_match(&text) {
        debug!("provider rejected the assertion");
        return Err(AuthError::invalid_assertion(
            "provider did not confirm the signature",
        ));
    }

    // 4. Claimed identity shape, independent of the verdict
    extract_steam_id(claimed_id)
}

/// Reconstruct the `check_authentication` form body from the callback.
///
/// Starts from the handle/signed/sig triple, copies every field named in the
/// signed list back under its dotted name, and forces the verification mode.
fn build_verification_body(params: &HashMap<String, String>) -> Result<String> {
    let assoc_handle = require_param(params, "openid_assoc_handle")?;
    let signed = require_param(params, "openid_signed")?;
    let sig = require_param(params, "openid_sig")?;

    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("openid.assoc_handle", assoc_handle);
    form.append_pair("openid.signed", signed);
    form.append_pair("openid.sig", sig);
    form.append_pair("openid.ns", OPENID_NS);

    for item in signed.split(',') {
        let item = item.trim();
        if item.is_empty() || item == "signed" {
            continue;
        }
        let key = format!("openid_{}", item.replace('.', "_"));
        let value = params.get(&key).ok_or_else(|| {
            AuthError::invalid_assertion(format!("signed field '{}' missing from callback", item))
        })?;
        form.append_pair(&format!("openid.{}", item), value);
    }

    form.append_pair("openid.mode", "check_authentication");
    Ok(form.finish())
}

/// Extract the numeric id from the claimed identity URL
fn extract_steam_id(claimed_id: &str) -> Result<SteamId> {
    let pattern = Regex::new(CLAIMED_ID_PATTERN)
        .map_err(|e| AuthError::internal(format!("claimed id pattern: {}", e)))?;
    let digits = pattern
        .captures(claimed_id)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            AuthError::invalid_assertion(format!(
                "claimed identity '{}' is not a Steam profile URL",
                claimed_id
            ))
        })?;

    let raw: u64 = digits.parse().map_err(|_| {
        AuthError::invalid_assertion(format!("claimed identity id '{}' is out of range", digits))
    })?;
    SteamId::try_from(raw).map_err(|_| {
        AuthError::invalid_assertion(format!("claimed identity id '{}' is out of range", digits))
    })
}

fn require_param<'a>(params: &'a HashMap<String, String>, key: &str) -> Result<&'a str> {
    params.get(key).map(String::as_str).ok_or_else(|| {
        AuthError::invalid_assertion(format!("missing callback parameter '{}'", key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::HttpResponse;
    use crate::test_support::MockHttp;

    const TEST_ID: u64 = 76561197960287930;
    const VALID_RESPONSE: &str = "ns:http://specs.openid.net/auth/2.0\nis_valid:true\n";
    const INVALID_RESPONSE: &str = "ns:http://specs.openid.net/auth/2.0\nis_valid:false\n";

    fn callback_params() -> HashMap<String, String> {
        let claimed = format!("https://steamcommunity.com/openid/id/{}", TEST_ID);
        HashMap::from([
            ("openid_ns".to_string(), OPENID_NS.to_string()),
            ("openid_mode".to_string(), "id_res".to_string()),
            (
                "openid_op_endpoint".to_string(),
                OPENID_LOGIN_URL.to_string(),
            ),
            ("openid_claimed_id".to_string(), claimed.clone()),
            ("openid_identity".to_string(), claimed),
            (
                "openid_return_to".to_string(),
                "https://game.example.com/auth/callback".to_string(),
            ),
            (
                "openid_response_nonce".to_string(),
                "2024-05-01T10:00:00Zd41d8cd9".to_string(),
            ),
            (
                "openid_assoc_handle".to_string(),
                "1234567890".to_string(),
            ),
            (
                "openid_signed".to_string(),
                "signed,op_endpoint,claimed_id,identity,return_to,response_nonce,assoc_handle"
                    .to_string(),
            ),
            ("openid_sig".to_string(), "W0u5PRbNJM0fm+EqCSZ2qUw=".to_string()),
        ])
    }

    fn provider_ok() -> MockHttp {
        MockHttp::new(vec![(
            "openid/login".to_string(),
            HttpResponse {
                status: 200,
                body: VALID_RESPONSE.as_bytes().to_vec(),
            },
        )])
    }

    #[test]
    fn test_is_callback_detects_provider_return() {
        assert!(is_callback(&callback_params()));

        let mut partial = callback_params();
        partial.remove("openid_sig");
        assert!(!is_callback(&partial));
        assert!(!is_callback(&HashMap::new()));
    }

    #[tokio::test]
    async fn test_verify_accepts_valid_assertion() {
        let http = provider_ok();
        let id = verify_assertion(&callback_params(), &http).await.unwrap();
        assert_eq!(id.as_u64(), TEST_ID);
        assert_eq!(http.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_verify_rejects_negative_verdict() {
        let http = MockHttp::new(vec![(
            "openid/login".to_string(),
            HttpResponse {
                status: 200,
                body: INVALID_RESPONSE.as_bytes().to_vec(),
            },
        )]);

        let result = verify_assertion(&callback_params(), &http).await;
        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
    }

    #[tokio::test]
    async fn test_verify_verdict_match_is_case_insensitive() {
        let http = MockHttp::new(vec![(
            "openid/login".to_string(),
            HttpResponse {
                status: 200,
                body: b"Is_Valid : TRUE".to_vec(),
            },
        )]);

        let id = verify_assertion(&callback_params(), &http).await.unwrap();
        assert_eq!(id.as_u64(), TEST_ID);
    }

    #[tokio::test]
    async fn test_verify_rejects_foreign_claimed_id_despite_valid_verdict() {
        let mut params = callback_params();
        params.insert(
            "openid_claimed_id".to_string(),
            format!("https://evil.example.com/openid/id/{}", TEST_ID),
        );

        let result = verify_assertion(&params, &provider_ok()).await;
        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
    }

    #[tokio::test]
    async fn test_verify_rejects_claimed_id_with_trailing_path() {
        let mut params = callback_params();
        params.insert(
            "openid_claimed_id".to_string(),
            format!("https://steamcommunity.com/openid/id/{}/games", TEST_ID),
        );

        let result = verify_assertion(&params, &provider_ok()).await;
        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
    }

    #[tokio::test]
    async fn test_verify_rejects_overflowing_digit_run() {
        let mut params = callback_params();
        params.insert(
            "openid_claimed_id".to_string(),
            "https://steamcommunity.com/openid/id/99999999999999999999999".to_string(),
        );

        let result = verify_assertion(&params, &provider_ok()).await;
        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
    }

    #[tokio::test]
    async fn test_verify_missing_sig_makes_no_network_call() {
        let mut params = callback_params();
        params.remove("openid_sig");

        let http = MockHttp::new(vec![]);
        let result = verify_assertion(&params, &http).await;

        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
        assert!(http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_verify_missing_signed_field_makes_no_network_call() {
        let mut params = callback_params();
        params.remove("openid_response_nonce");

        let http = MockHttp::new(vec![]);
        let result = verify_assertion(&params, &http).await;

        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
        assert!(http.calls().is_empty());
    }

    #[tokio::test]
    async fn test_verify_transport_error_is_validation_failure() {
        let http = MockHttp::new(vec![]);
        let result = verify_assertion(&callback_params(), &http).await;
        assert!(matches!(result, Err(AuthError::ValidationFailed { .. })));
    }

    #[tokio::test]
    async fn test_verify_non_200_is_validation_failure() {
        let http = MockHttp::new(vec![(
            "openid/login".to_string(),
            HttpResponse {
                status: 503,
                body: Vec::new(),
            },
        )]);

        let result = verify_assertion(&callback_params(), &http).await;
        assert!(matches!(result, Err(AuthError::ValidationFailed { .. })));
    }

    #[test]
    fn test_build_verification_body_echoes_signed_fields() {
        let body = build_verification_body(&callback_params()).unwrap();
        let decoded: HashMap<String, String> =
            form_urlencoded::parse(body.as_bytes())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();

        assert_eq!(decoded["openid.mode"], "check_authentication");
        assert_eq!(decoded["openid.ns"], OPENID_NS);
        assert_eq!(decoded["openid.assoc_handle"], "1234567890");
        assert_eq!(
            decoded["openid.claimed_id"],
            format!("https://steamcommunity.com/openid/id/{}", TEST_ID)
        );
        assert_eq!(decoded["openid.op_endpoint"], OPENID_LOGIN_URL);
        assert_eq!(
            decoded["openid.response_nonce"],
            "2024-05-01T10:00:00Zd41d8cd9"
        );
    }

    #[test]
    fn test_extract_steam_id_accepts_legacy_http_scheme() {
        let id =
            extract_steam_id("http://steamcommunity.com/openid/id/76561197960287930").unwrap();
        assert_eq!(id.as_u64(), TEST_ID);
    }

    #[test]
    fn test_extract_steam_id_rejects_short_digit_run() {
        let result = extract_steam_id("https://steamcommunity.com/openid/id/1234567");
        assert!(matches!(result, Err(AuthError::InvalidAssertion { .. })));
    }
}
