//! Login redirect URL construction

use url::Url;

use super::{OPENID_IDENTIFIER_SELECT, OPENID_LOGIN_URL, OPENID_NS};
use crate::error::{AuthError, Result};

/// Origin and path of the request being served.
///
/// Replaces ambient request state: the realm and the default return target
/// are derived from it explicitly.
#[derive(Debug, Clone)]
pub struct RealmContext {
    /// Scheme and host, e.g. `https://game.example.com`
    pub origin: String,
    /// Path of the current request, e.g. `/auth/callback`
    pub path: String,
}

impl RealmContext {
    pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            path: path.into(),
        }
    }

    /// Absolute URL of the current page
    pub fn current_page(&self) -> String {
        format!("{}{}", self.origin, self.path)
    }
}

/// Build the `checkid_setup` redirect to the Steam login endpoint.
///
/// A caller-supplied `return_to` must parse as an absolute http(s) URL, and
/// its host must be on `allowed_hosts` when the list is non-empty. When
/// omitted, the user returns to the current page.
pub fn build_login_url(
    context: &RealmContext,
    return_to: Option<&str>,
    allowed_hosts: &[String],
) -> Result<String> {
    let return_to = match return_to {
        Some(raw) => {
            validate_return_url(raw, allowed_hosts)?;
            raw.to_string()
        }
        None => context.current_page(),
    };

    let mut url = Url::parse(OPENID_LOGIN_URL)
        .map_err(|e| AuthError::internal(format!("login endpoint URL: {}", e)))?;
    url.query_pairs_mut()
        .append_pair("openid.ns", OPENID_NS)
        .append_pair("openid.mode", "checkid_setup")
        .append_pair("openid.return_to", &return_to)
        .append_pair("openid.realm", &context.origin)
        .append_pair("openid.identity", OPENID_IDENTIFIER_SELECT)
        .append_pair("openid.claimed_id", OPENID_IDENTIFIER_SELECT);

    Ok(url.to_string())
}

fn validate_return_url(raw: &str, allowed_hosts: &[String]) -> Result<()> {
    let parsed = Url::parse(raw).map_err(|e| {
        AuthError::invalid_return_url(format!("'{}' is not an absolute URL: {}", raw, e))
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(AuthError::invalid_return_url(format!(
            "'{}' must use the http or https scheme",
            raw
        )));
    }

    if !allowed_hosts.is_empty() {
        let host = parsed.host_str().unwrap_or("");
        if !allowed_hosts.iter().any(|allowed| allowed == host) {
            return Err(AuthError::invalid_return_url(format!(
                "host '{}' is not on the allow-list",
                host
            )));
        }
    }

    Ok(())
}
