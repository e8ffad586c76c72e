//! steam-login-server: standalone Steam login relay
//!
//! Small HTTP server over hyper. Redirects visitors to the Steam OpenID
//! provider, verifies the signed callback, and keeps the resulting player
//! in a cookie-addressed session.

use std::collections::HashMap;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use steam_login_core::auth;
use steam_login_core::config::SteamAuthConfig;
use steam_login_core::error::{AuthError, ErrorResponse};
use steam_login_core::openid::login_url::RealmContext;
use steam_login_core::platform::SessionStore;

mod platform;

use platform::{MemorySessionStore, ProcessEnv, ReqwestHttpClient};

const SESSION_COOKIE: &str = "steam_session";

/// Shared application state
struct AppState {
    config: SteamAuthConfig,
    http: ReqwestHttpClient,
    sessions: MemorySessionStore,
    origin: String,
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("PORT must be a number");

    // Public origin used for the realm and callback URL
    let origin = std::env::var("STEAM_AUTH_ORIGIN")
        .unwrap_or_else(|_| format!("http://localhost:{}", port));

    let config = match SteamAuthConfig::from_env(&ProcessEnv) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "configuration error");
            std::process::exit(1);
        }
    };

    let http = ReqwestHttpClient::new(config.timeout_secs).expect("failed to build HTTP client");

    let state = Arc::new(AppState {
        config,
        http,
        sessions: MemorySessionStore::new(),
        origin,
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("failed to bind");

    info!(port, origin = %state.origin, "steam-login-server listening");

    loop {
        let (stream, _) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let state = state.clone();

        tokio::spawn(async move {
            let io = hyper_util::rt::TokioIo::new(stream);
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(req, &state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!(error = %e, "connection error");
            }
        });
    }
}

type HyperResponse = Response<Full<Bytes>>;

async fn handle_request(
    req: Request<Incoming>,
    state: &AppState,
) -> Result<HyperResponse, std::convert::Infallible> {
    let result = route_request(req, state).await;
    Ok(result)
}

async fn route_request(req: Request<Incoming>, state: &AppState) -> HyperResponse {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/") => handle_health(),
        (Method::GET, "/login") => handle_login(&req, state),
        (Method::GET, "/auth/callback") => handle_callback(&req, state).await,
        (Method::GET, "/session") => handle_session(&req, state).await,
        (Method::POST, "/logout") => handle_logout(&req, state).await,
        _ => json_response(StatusCode::NOT_FOUND, &serde_json::json!({"error": "not_found"})),
    }
}

fn handle_health() -> HyperResponse {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "name": "steam-login-server",
            "documentation": "https://github.com/steam-login/steam-login-rs"
        }),
    )
}

/// Redirect the visitor to the provider login page
fn handle_login(req: &Request<Incoming>, state: &AppState) -> HyperResponse {
    let query = req.uri().query().unwrap_or("");
    let return_to = query_param(query, "return_to");

    let context = RealmContext::new(state.origin.as_str(), "/auth/callback");
    match auth::login_url(&context, return_to.as_deref(), &state.config) {
        Ok(location) => redirect_response(&location),
        Err(e) => error_response(&e, state.config.debug),
    }
}

/// Verify the provider callback and open a session for the player
async fn handle_callback(req: &Request<Incoming>, state: &AppState) -> HyperResponse {
    let query = req.uri().query().unwrap_or("");
    let params = parse_callback_params(query);

    if !auth::is_callback(&params) {
        let err = AuthError::invalid_assertion("missing openid callback parameters");
        return error_response(&err, state.config.debug);
    }

    let player = match auth::authenticate(&params, &state.config, &state.http).await {
        Ok(player) => player,
        Err(e) => return error_response(&e, state.config.debug),
    };

    let session_json = match serde_json::to_string(&player) {
        Ok(json) => json,
        Err(e) => {
            let err = AuthError::internal(format!("failed to serialize player: {}", e));
            return error_response(&err, state.config.debug);
        }
    };

    let token = new_session_token();
    if let Err(e) = state.sessions.put(&token, &session_json).await {
        return error_response(&e, state.config.debug);
    }

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header(
            "Set-Cookie",
            format!("{}={}; Path=/; HttpOnly", SESSION_COOKIE, token),
        )
        .body(Full::new(Bytes::from(session_json)))
        .unwrap()
}

/// Return the player stored for the request's session cookie
async fn handle_session(req: &Request<Incoming>, state: &AppState) -> HyperResponse {
    let token = match session_token(req.headers()) {
        Some(token) => token,
        None => return no_session_response(),
    };

    match state.sessions.get(&token).await {
        Ok(Some(json)) => raw_json_response(StatusCode::OK, json),
        Ok(None) => no_session_response(),
        Err(e) => error_response(&e, state.config.debug),
    }
}

/// Drop the session and expire the cookie
async fn handle_logout(req: &Request<Incoming>, state: &AppState) -> HyperResponse {
    if let Some(token) = session_token(req.headers()) {
        if let Err(e) = state.sessions.remove(&token).await {
            return error_response(&e, state.config.debug);
        }
    }

    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(
            "Set-Cookie",
            format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE),
        )
        .body(Full::new(Bytes::new()))
        .unwrap()
}

/// Collect query parameters with dotted names folded to underscores, so
/// `openid.claimed_id` and `openid_claimed_id` land on the same key
fn parse_callback_params(query: &str) -> HashMap<String, String> {
    match url::Url::parse(&format!("http://localhost?{}", query)) {
        Ok(url) => url
            .query_pairs()
            .map(|(k, v)| (k.replace('.', "_"), v.to_string()))
            .collect(),
        Err(_) => HashMap::new(),
    }
}

fn query_param(query: &str, name: &str) -> Option<String> {
    let url = url::Url::parse(&format!("http://localhost?{}", query)).ok()?;
    url.query_pairs()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.to_string())
}

/// Session token from the request's cookie header
fn session_token(headers: &hyper::HeaderMap) -> Option<String> {
    let cookies = headers.get("Cookie")?.to_str().ok()?;
    cookies.split(';').find_map(|part| {
        part.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(|v| v.to_string())
    })
}

fn new_session_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}

fn no_session_response() -> HyperResponse {
    json_response(
        StatusCode::UNAUTHORIZED,
        &serde_json::json!({"error": "no_session"}),
    )
}

fn error_response(err: &AuthError, debug: bool) -> HyperResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        warn!(error = %err, "request failed");
    }
    json_response(status, &ErrorResponse::from_error(err, debug))
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: &T) -> HyperResponse {
    let json = serde_json::to_vec(body).unwrap_or_default();
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(json)))
        .unwrap()
}

fn raw_json_response(status: StatusCode, body: String) -> HyperResponse {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn redirect_response(location: &str) -> HyperResponse {
    Response::builder()
        .status(StatusCode::FOUND)
        .header("Location", location)
        .body(Full::new(Bytes::new()))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_callback_params_folds_dotted_names() {
        let params = parse_callback_params(
            "openid.claimed_id=https%3A%2F%2Fsteamcommunity.com%2Fopenid%2Fid%2F76561197960287930&openid_sig=abc",
        );

        assert_eq!(
            params.get("openid_claimed_id").map(String::as_str),
            Some("https://steamcommunity.com/openid/id/76561197960287930")
        );
        assert_eq!(params.get("openid_sig").map(String::as_str), Some("abc"));
    }

    #[test]
    fn test_query_param_decodes_value() {
        let query = "return_to=https%3A%2F%2Fgame.example.com%2Fafter&x=1";
        assert_eq!(
            query_param(query, "return_to").as_deref(),
            Some("https://game.example.com/after")
        );
        assert_eq!(query_param(query, "missing"), None);
    }

    #[test]
    fn test_session_token_picks_matching_cookie() {
        let mut headers = hyper::HeaderMap::new();
        headers.insert(
            "Cookie",
            "other=1; steam_session=deadbeef; theme=dark".parse().unwrap(),
        );

        assert_eq!(session_token(&headers).as_deref(), Some("deadbeef"));
    }

    #[test]
    fn test_session_token_ignores_prefixed_names() {
        let mut headers = hyper::HeaderMap::new();
        headers.insert("Cookie", "steam_session_old=stale".parse().unwrap());

        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn test_new_session_token_shape() {
        let a = new_session_token();
        let b = new_session_token();

        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
