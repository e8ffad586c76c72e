//! Player profile retrieval and normalization
//!
//! Two upstream shapes produce one canonical profile: the community XML feed
//! and the GetPlayerSummaries Web API. The source is a closed choice fixed at
//! configuration time; both normalize to the same field set.

pub mod api;
pub mod feed;

use crate::config::{ProfileMethod, SteamAuthConfig};
use crate::error::Result;
use crate::platform::HttpClient;
use crate::player::PlayerProfile;
use crate::steamid::SteamId;

/// Community profile URL for a numeric id
pub fn numeric_profile_url(id: SteamId) -> String {
    format!("https://steamcommunity.com/profiles/{}", id.as_u64())
}

/// Community profile URL for a vanity path
pub fn vanity_profile_url(vanity: &str) -> String {
    format!("https://steamcommunity.com/id/{}", vanity)
}

/// Fetch and normalize the player profile with the configured source
pub async fn fetch_profile(
    id: SteamId,
    config: &SteamAuthConfig,
    http: &dyn HttpClient,
) -> Result<PlayerProfile> {
    match config.method {
        ProfileMethod::Feed => feed::fetch(id, http).await,
        ProfileMethod::Api => api::fetch(id, config, http).await,
    }
}
