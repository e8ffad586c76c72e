//! OpenID 2.0 protocol support for the Steam provider
//!
//! Steam speaks plain OpenID 2.0 with stateless verification: the relying
//! party echoes the signed callback parameters back to the provider, which
//! answers with an `is_valid` marker.

pub mod login_url;
pub mod verify;

/// Steam OpenID 2.0 endpoint, used for both the redirect and verification
pub const OPENID_LOGIN_URL: &str = "https://steamcommunity.com/openid/login";

/// OpenID 2.0 namespace
pub const OPENID_NS: &str = "http://specs.openid.net/auth/2.0";

/// Sentinel identity asking the provider to select the identifier
pub const OPENID_IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";
