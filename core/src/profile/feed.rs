//! Community XML feed profile source
//!
//! The feed is the credential-free source: `/profiles/<id64>?xml=1` returns
//! an XML document, or an `<error>` document for missing/taken-down profiles.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AuthError, Result};
use crate::platform::HttpClient;
use crate::player::{AvatarSet, PersonaState, PlayerProfile, PrivacyState};
use crate::steamid::SteamId;

/// Feed document for a visible profile
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedProfile {
    /// Display name (the feed's `steamID` element)
    #[serde(rename = "steamID")]
    steam_id: String,
    #[serde(default)]
    realname: Option<String>,
    online_state: String,
    state_message: String,
    privacy_state: String,
    visibility_state: i64,
    avatar_icon: String,
    avatar_medium: String,
    avatar_full: String,
    #[serde(default, rename = "customURL")]
    custom_url: Option<String>,
    #[serde(default)]
    member_since: Option<String>,
}

/// Minimal envelope for spotting error documents before a full parse
#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    #[serde(default)]
    error: Option<String>,
}

pub(crate) fn feed_url(id: SteamId) -> String {
    format!("{}?xml=1", super::numeric_profile_url(id))
}

/// Fetch the feed document and normalize it
pub async fn fetch(id: SteamId, http: &dyn HttpClient) -> Result<PlayerProfile> {
    let url = feed_url(id);
    debug!(steam_id = %id, "fetching community feed profile");

    let response = http
        .get(&url, &[("Accept-Language", "en")])
        .await
        .map_err(|e| AuthError::profile_fetch_failed(format!("feed request failed: {}", e)))?;

    if response.status != 200 {
        warn!(status = response.status, "feed returned non-success status");
        return Err(AuthError::profile_fetch_failed(format!(
            "feed returned status {}",
            response.status
        )));
    }

    let text = response
        .text()
        .map_err(|_| AuthError::profile_fetch_failed("feed response is not valid UTF-8"))?;

    let envelope: FeedEnvelope = quick_xml::de::from_str(&text)
        .map_err(|e| AuthError::profile_fetch_failed(format!("feed parse error: {}", e)))?;
    if let Some(message) = envelope.error {
        return Err(AuthError::profile_fetch_failed(format!(
            "feed error: {}",
            message.trim()
        )));
    }

    let doc: FeedProfile = quick_xml::de::from_str(&text)
        .map_err(|e| AuthError::profile_fetch_failed(format!("feed parse error: {}", e)))?;

    Ok(normalize(id, doc))
}

fn normalize(id: SteamId, doc: FeedProfile) -> PlayerProfile {
    let player_state = if doc.online_state.eq_ignore_ascii_case("offline") {
        PersonaState::Offline
    } else {
        PersonaState::Online
    };

    let privacy_state = match doc.privacy_state.to_ascii_lowercase().as_str() {
        "private" | "friendsonly" => PrivacyState::Private,
        _ => PrivacyState::Public,
    };

    let profile_url = match doc.custom_url.as_deref().filter(|v| !v.is_empty()) {
        Some(vanity) => super::vanity_profile_url(vanity),
        None => super::numeric_profile_url(id),
    };

    PlayerProfile {
        name: doc.steam_id,
        real_name: doc.realname.filter(|v| !v.is_empty()),
        player_state,
        state_message: doc.state_message,
        privacy_state,
        visibility_state: doc.visibility_state,
        avatar: AvatarSet {
            small: doc.avatar_icon,
            medium: doc.avatar_medium,
            large: doc.avatar_full,
        },
        profile_url,
        joined: doc.member_since.as_deref().and_then(parse_member_since),
    }
}

/// Parse the feed's human-readable join date ("June 1st, 2004")
fn parse_member_since(raw: &str) -> Option<DateTime<Utc>> {
    let cleaned = strip_ordinal_suffix(raw);
    let date = NaiveDate::parse_from_str(cleaned.trim(), "%B %e, %Y").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(DateTime::from_naive_utc_and_offset(midnight, Utc))
}

/// Drop the English ordinal suffix from the day ("1st," -> "1,").
///
/// Only a suffix directly between a digit and the comma is removed, so month
/// names containing "st" stay intact.
fn strip_ordinal_suffix(raw: &str) -> String {
    for suffix in ["st,", "nd,", "rd,", "th,"] {
        if let Some(pos) = raw.find(suffix) {
            if raw[..pos].ends_with(|c: char| c.is_ascii_digit()) {
                let mut cleaned = String::with_capacity(raw.len());
                cleaned.push_str(&raw[..pos]);
                cleaned.push_str(&raw[pos + 2..]);
                return cleaned;
            }
        }
    }
    raw.to_string()
}
