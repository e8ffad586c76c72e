//! Canonical player record produced by the login flow

use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::steamid::{SteamId, UniverseMode};

/// Online presence, as reported by either profile source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonaState {
    Offline,
    Online,
    Busy,
    Away,
    Snooze,
    LookingToTrade,
    LookingToPlay,
}

impl PersonaState {
    /// Map a Web API persona-state code; codes outside the table have no state
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Offline),
            1 => Some(Self::Online),
            2 => Some(Self::Busy),
            3 => Some(Self::Away),
            4 => Some(Self::Snooze),
            5 => Some(Self::LookingToTrade),
            6 => Some(Self::LookingToPlay),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Offline => "Offline",
            Self::Online => "Online",
            Self::Busy => "Busy",
            Self::Away => "Away",
            Self::Snooze => "Snooze",
            Self::LookingToTrade => "Looking to trade",
            Self::LookingToPlay => "Looking to play",
        }
    }
}

impl Serialize for PersonaState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Community profile visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivacyState {
    Private,
    Public,
}

impl PrivacyState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Private => "Private",
            Self::Public => "Public",
        }
    }
}

impl Serialize for PrivacyState {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Avatar URLs at the three provider sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AvatarSet {
    pub small: String,
    pub medium: String,
    pub large: String,
}

/// Normalized profile data, identical in shape for both sources.
///
/// Absent optional fields stay `None` and serialize as explicit nulls so
/// callers always see the same key set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProfile {
    pub name: String,
    pub real_name: Option<String>,
    pub player_state: PersonaState,
    pub state_message: String,
    pub privacy_state: PrivacyState,
    pub visibility_state: i64,
    pub avatar: AvatarSet,
    pub profile_url: String,
    pub joined: Option<DateTime<Utc>>,
}

/// Authenticated player: identity always, profile when retrieval is enabled.
///
/// The id is set once by the validator; the SteamID2/SteamID3 forms are
/// derived on demand and can never drift from it.
#[derive(Debug, Clone)]
pub struct Player {
    steam_id: SteamId,
    universe_mode: UniverseMode,
    profile: Option<PlayerProfile>,
}

impl Player {
    pub fn new(steam_id: SteamId, universe_mode: UniverseMode) -> Self {
        Self {
            steam_id,
            universe_mode,
            profile: None,
        }
    }

    pub fn steam_id(&self) -> SteamId {
        self.steam_id
    }

    /// Legacy `STEAM_X:Y:Z` form of the id
    pub fn steam2(&self) -> String {
        self.steam_id.steam2(self.universe_mode)
    }

    /// Modern `[U:1:W]` form of the id
    pub fn steam3(&self) -> String {
        self.steam_id.steam3()
    }

    pub fn profile(&self) -> Option<&PlayerProfile> {
        self.profile.as_ref()
    }

    pub fn with_profile(mut self, profile: PlayerProfile) -> Self {
        self.profile = Some(profile);
        self
    }
}

impl Serialize for Player {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Player", 4)?;
        state.serialize_field("steamid", &self.steam_id.as_u64().to_string())?;
        state.serialize_field("steamid2", &self.steam2())?;
        state.serialize_field("steamid3", &self.steam3())?;
        state.serialize_field("profile", &self.profile)?;
        state.end()
    }
}
