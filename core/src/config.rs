//! Configuration loaded from the platform environment

use crate::error::{AuthError, Result};
use crate::platform::Environment;
use crate::steamid::UniverseMode;

/// Default timeout for outbound provider requests
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Profile data source, fixed at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileMethod {
    /// Community XML feed (no credential required)
    #[default]
    Feed,
    /// GetPlayerSummaries Web API (requires an API key)
    Api,
}

/// Steam login configuration
#[derive(Debug, Clone)]
pub struct SteamAuthConfig {
    /// Where profile data is pulled from after a successful login
    pub method: ProfileMethod,
    /// Web API key, required when `method` is `Api`
    pub api_key: Option<String>,
    /// Timeout applied to the verification and profile requests
    pub timeout_secs: u64,
    /// Render the real universe digit in the legacy SteamID2 form
    pub steam_universe: bool,
    /// Fetch the player profile after validating the assertion
    pub retrieve_info: bool,
    /// Surface full error causes in responses
    pub debug: bool,
    /// Hosts allowed as caller-supplied return URLs (empty = any)
    pub allowed_hosts: Vec<String>,
}

impl Default for SteamAuthConfig {
    fn default() -> Self {
        Self {
            method: ProfileMethod::Feed,
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            steam_universe: false,
            retrieve_info: true,
            debug: false,
            allowed_hosts: Vec::new(),
        }
    }
}

impl SteamAuthConfig {
    /// Load configuration from platform environment
    pub fn from_env(env: &dyn Environment) -> Result<Self> {
        let method = match env.get_var("STEAM_AUTH_METHOD") {
            Ok(raw) => match raw.to_ascii_lowercase().as_str() {
                "feed" => ProfileMethod::Feed,
                "api" => ProfileMethod::Api,
                other => {
                    return Err(AuthError::internal(format!(
                        "STEAM_AUTH_METHOD must be 'feed' or 'api', got '{}'",
                        other
                    )))
                }
            },
            Err(_) => ProfileMethod::Feed,
        };

        let api_key = env
            .get_secret("STEAM_API_KEY")
            .ok()
            .filter(|key| !key.is_empty());

        let config = Self {
            method,
            api_key,
            timeout_secs: u64_var(env, "STEAM_AUTH_TIMEOUT", DEFAULT_TIMEOUT_SECS)?,
            steam_universe: bool_var(env, "STEAM_AUTH_UNIVERSE", false)?,
            retrieve_info: bool_var(env, "STEAM_AUTH_RETRIEVE_INFO", true)?,
            debug: bool_var(env, "STEAM_AUTH_DEBUG", false)?,
            allowed_hosts: list_var(env, "STEAM_AUTH_ALLOWED_HOSTS"),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<()> {
        if self.method == ProfileMethod::Api && self.api_key.is_none() {
            return Err(AuthError::missing_credential(
                "api profile method requires STEAM_API_KEY",
            ));
        }
        Ok(())
    }

    /// Universe digit rendering derived from the configured flag
    pub fn universe_mode(&self) -> UniverseMode {
        if self.steam_universe {
            UniverseMode::Dynamic
        } else {
            UniverseMode::Legacy
        }
    }
}

fn bool_var(env: &dyn Environment, name: &str, default: bool) -> Result<bool> {
    match env.get_var(name) {
        Ok(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => Err(AuthError::internal(format!(
                "{} must be a boolean, got '{}'",
                name, other
            ))),
        },
        Err(_) => Ok(default),
    }
}

fn u64_var(env: &dyn Environment, name: &str, default: u64) -> Result<u64> {
    match env.get_var(name) {
        Ok(raw) => raw.parse().map_err(|_| {
            AuthError::internal(format!("{} must be a number, got '{}'", name, raw))
        }),
        Err(_) => Ok(default),
    }
}

fn list_var(env: &dyn Environment, name: &str) -> Vec<String> {
    env.get_var(name)
        .map(|raw| {
            raw.split(',')
                .map(|item| item.trim().to_string())
                .filter(|item| !item.is_empty())
                .collect()
        })
        .unwrap_or_default()
}
