//! SteamID representations and conversions
//!
//! A 64-bit SteamID packs a universe byte, account type, instance, and a
//! 32-bit account id. Individual accounts render in three equivalent textual
//! forms: the plain 64-bit decimal, the legacy `STEAM_X:Y:Z` form, and the
//! modern `[U:1:W]` form where `W = 2Z + Y`.

use std::fmt;
use std::str::FromStr;

use crate::error::{AuthError, Result};

/// Smallest valid individual-account SteamID64 (universe 1, type 1, instance 1)
pub const INDIVIDUAL_BASE: u64 = 76561197960265728;

/// Width of the account-number field in the packed id
const ACCOUNT_NUMBER_MASK: u64 = 0x7FFF_FFFF;

/// Universe digit rendering for the legacy `STEAM_X:Y:Z` form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UniverseMode {
    /// Render the universe digit as `0`, as historical Steam clients did
    #[default]
    Legacy,
    /// Render the universe digit actually encoded in the id
    Dynamic,
}

/// 64-bit Steam account identifier for an individual account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SteamId(u64);

impl SteamId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Universe the account belongs to (1 = public)
    pub fn universe(&self) -> u8 {
        ((self.0 >> 56) & 0xFF) as u8
    }

    /// Low parity bit, the `Y` of `STEAM_X:Y:Z`
    pub fn auth_server(&self) -> u64 {
        self.0 & 1
    }

    /// 31-bit account number, the `Z` of `STEAM_X:Y:Z`
    pub fn account_number(&self) -> u64 {
        (self.0 >> 1) & ACCOUNT_NUMBER_MASK
    }

    /// 32-bit account id, the `W` of `[U:1:W]`
    pub fn account_id(&self) -> u64 {
        self.account_number() * 2 + self.auth_server()
    }

    /// Legacy `STEAM_X:Y:Z` rendering
    pub fn steam2(&self, mode: UniverseMode) -> String {
        let universe = match mode {
            UniverseMode::Legacy => 0,
            UniverseMode::Dynamic => u64::from(self.universe()),
        };
        format!(
            "STEAM_{}:{}:{}",
            universe,
            self.auth_server(),
            self.account_number()
        )
    }

    /// Modern `[U:1:W]` rendering
    pub fn steam3(&self) -> String {
        format!("[U:1:{}]", self.account_id())
    }
}

impl TryFrom<u64> for SteamId {
    type Error = AuthError;

    fn try_from(value: u64) -> Result<Self> {
        if value < INDIVIDUAL_BASE {
            return Err(AuthError::invalid_identifier(format!(
                "{} is below the individual account range",
                value
            )));
        }
        Ok(Self(value))
    }
}

impl FromStr for SteamId {
    type Err = AuthError;

    /// Parse any of the three textual forms
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.starts_with("STEAM_") {
            return parse_steam2(s);
        }
        if s.starts_with('[') {
            return parse_steam3(s);
        }
        let raw: u64 = s.parse().map_err(|_| {
            AuthError::invalid_identifier(format!("'{}' is not a SteamID in any known form", s))
        })?;
        Self::try_from(raw)
    }
}

impl fmt::Display for SteamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decode `STEAM_X:Y:Z`. A legacy `0` universe digit means the public universe.
fn parse_steam2(s: &str) -> Result<SteamId> {
    let malformed = || AuthError::invalid_identifier(format!("'{}' is not a STEAM_X:Y:Z id", s));

    let rest = s.strip_prefix("STEAM_").ok_or_else(malformed)?;
    let mut fields = rest.split(':');
    let universe: u64 = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(malformed)?;
    let auth_server: u64 = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(malformed)?;
    let account_number: u64 = fields
        .next()
        .and_then(|f| f.parse().ok())
        .ok_or_else(malformed)?;
    if fields.next().is_some() {
        return Err(malformed());
    }

    if universe > 0xFF || auth_server > 1 || account_number > ACCOUNT_NUMBER_MASK {
        return Err(malformed());
    }

    let universe = if universe == 0 { 1 } else { universe };
    Ok(SteamId(
        (universe << 56) | (1 << 52) | (1 << 32) | (account_number << 1) | auth_server,
    ))
}

/// Decode `[U:1:W]` for the public universe
fn parse_steam3(s: &str) -> Result<SteamId> {
    let malformed = || AuthError::invalid_identifier(format!("'{}' is not a [U:1:W] id", s));

    let account_id: u64 = s
        .strip_prefix("[U:1:")
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|digits| digits.parse().ok())
        .ok_or_else(malformed)?;
    if account_id > u64::from(u32::MAX) {
        return Err(malformed());
    }

    Ok(SteamId(INDIVIDUAL_BASE + account_id))
}
