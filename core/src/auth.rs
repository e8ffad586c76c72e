//! Login flow orchestration
//!
//! Ties the OpenID verification and profile retrieval steps together into
//! the operations a web handler calls.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::config::SteamAuthConfig;
use crate::error::Result;
use crate::openid::login_url::{build_login_url, RealmContext};
use crate::openid::verify;
use crate::platform::HttpClient;
use crate::player::Player;
use crate::profile;

/// Build the provider redirect URL for starting a login
pub fn login_url(
    context: &RealmContext,
    return_to: Option<&str>,
    config: &SteamAuthConfig,
) -> Result<String> {
    build_login_url(context, return_to, &config.allowed_hosts)
}

/// Whether the request parameters look like a provider callback
pub fn is_callback(params: &HashMap<String, String>) -> bool {
    verify::is_callback(params)
}

/// Handle a provider callback and produce the authenticated player
pub async fn authenticate(
    params: &HashMap<String, String>,
    config: &SteamAuthConfig,
    http: &dyn HttpClient,
) -> Result<Player> {
    // 1. Verify the assertion with the provider
    let steam_id = verify::verify_assertion(params, http).await?;
    info!(steam_id = %steam_id, "login verified");

    let player = Player::new(steam_id, config.universe_mode());

    // 2. Attach profile info unless retrieval is turned off
    if !config.retrieve_info {
        debug!(steam_id = %steam_id, "profile retrieval disabled");
        return Ok(player);
    }

    let profile = profile::fetch_profile(steam_id, config, http).await?;
    Ok(player.with_profile(profile))
}
