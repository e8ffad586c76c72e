//! steam-login-core: Platform-agnostic Steam OpenID 2.0 login
//!
//! This crate contains all protocol logic for the Steam login flow: building
//! the provider redirect, validating the signed assertion on the callback,
//! converting the 64-bit SteamID between its textual renderings, and
//! normalizing profile data from the community feed or the Web API into one
//! canonical player record. It depends only on abstract platform traits
//! (HttpClient, Environment, SessionStore) and never imports a concrete
//! HTTP stack.

pub mod auth;
pub mod config;
pub mod error;
pub mod openid;
pub mod platform;
pub mod player;
pub mod profile;
pub mod steamid;

#[cfg(test)]
pub mod test_support;
