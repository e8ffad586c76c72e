//! GetPlayerSummaries Web API profile source

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SteamAuthConfig;
use crate::error::{AuthError, Result};
use crate::platform::HttpClient;
use crate::player::{AvatarSet, PersonaState, PlayerProfile, PrivacyState};
use crate::steamid::SteamId;

/// Web API endpoint for player summaries
const PLAYER_SUMMARIES_URL: &str =
    "https://api.steampowered.com/ISteamUser/GetPlayerSummaries/v0002/";

#[derive(Debug, Deserialize)]
struct SummariesEnvelope {
    response: SummariesResponse,
}

#[derive(Debug, Deserialize)]
struct SummariesResponse {
    #[serde(default)]
    players: Vec<PlayerSummary>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummary {
    personaname: String,
    #[serde(default)]
    realname: Option<String>,
    personastate: i64,
    communityvisibilitystate: i64,
    profileurl: String,
    avatar: String,
    avatarmedium: String,
    avatarfull: String,
    #[serde(default)]
    timecreated: Option<i64>,
}

pub(crate) fn summaries_url(key: &str, id: SteamId) -> String {
    format!("{}?key={}&steamids={}", PLAYER_SUMMARIES_URL, key, id.as_u64())
}

/// Fetch the player summary and normalize it
pub async fn fetch(
    id: SteamId,
    config: &SteamAuthConfig,
    http: &dyn HttpClient,
) -> Result<PlayerProfile> {
    let key = config.api_key.as_deref().ok_or_else(|| {
        AuthError::missing_credential("api profile method requires STEAM_API_KEY")
    })?;

    let url = summaries_url(key, id);
    debug!(steam_id = %id, "fetching web api profile");

    let response = http
        .get(&url, &[])
        .await
        .map_err(|e| AuthError::profile_fetch_failed(format!("web api request failed: {}", e)))?;

    if response.status != 200 {
        warn!(status = response.status, "web api returned non-success status");
        return Err(AuthError::profile_fetch_failed(format!(
            "web api returned status {}",
            response.status
        )));
    }

    let envelope: SummariesEnvelope = response
        .json()
        .map_err(|e| AuthError::profile_fetch_failed(format!("web api parse error: {}", e)))?;

    let summary = envelope
        .response
        .players
        .into_iter()
        .next()
        .ok_or_else(|| AuthError::profile_fetch_failed(format!("no player data for {}", id)))?;

    Ok(normalize(summary))
}

fn normalize(summary: PlayerSummary) -> PlayerProfile {
    let player_state = if summary.personastate == 0 {
        PersonaState::Offline
    } else {
        PersonaState::Online
    };

    // Unknown persona codes pass through as their decimal form
    let state_message = match PersonaState::from_code(summary.personastate) {
        Some(state) => state.label().to_string(),
        None => summary.personastate.to_string(),
    };

    let privacy_state = match summary.communityvisibilitystate {
        1 | 2 => PrivacyState::Private,
        _ => PrivacyState::Public,
    };

    PlayerProfile {
        name: summary.personaname,
        real_name: summary.realname.filter(|v| !v.is_empty()),
        player_state,
        state_message,
        privacy_state,
        visibility_state: summary.communityvisibilitystate,
        avatar: AvatarSet {
            small: summary.avatar,
            medium: summary.avatarmedium,
            large: summary.avatarfull,
        },
        profile_url: force_https(&summary.profileurl),
        joined: summary
            .timecreated
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
    }
}

fn force_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{}", rest),
        None => url.to_string(),
    }
}
