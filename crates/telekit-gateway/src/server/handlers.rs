//! HTTP handlers for the gateway server

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, warn};
use url::Url;
use uuid::Uuid;

use telekit_client::device::{
    DeviceCapabilitiesService, DeviceError, DEVICE_CAPABILITIES_SCOPE,
};
use telekit_client::oauth::{CodeExchanger, OAuthService};

use crate::callback::{self, CallbackParams};
use crate::session::{self, SessionStore, SessionTokens};

/// App state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
    pub oauth: Arc<OAuthService>,
    pub exchanger: Arc<dyn CodeExchanger>,
    pub http_client: reqwest::Client,
    pub base_url: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    debug!("[Gateway] Health check");
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Consent kickoff query params
#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    pub scope: Option<String>,
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
}

/// Consent kickoff endpoint.
///
/// Sends the browser to the platform's authorize page. The redirect URI
/// points back at the callback handler with the scope and return URL
/// embedded, so the callback knows where to store the token and where to
/// send the user afterwards.
pub async fn oauth_authorize(
    State(state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> Response {
    let Some(return_url) = params.return_url else {
        warn!("[Gateway] Authorize request missing returnUrl parameter");
        return missing_parameter("returnUrl");
    };

    let scope = params
        .scope
        .unwrap_or_else(|| state.oauth.config().scope_param());

    let callback_uri = match Url::parse(&format!("{}/oauth/callback", state.base_url)) {
        Ok(mut url) => {
            url.query_pairs_mut()
                .append_pair("scope", &scope)
                .append_pair("returnUrl", &return_url);
            url.to_string()
        }
        Err(e) => {
            error!("[Gateway] Could not build callback URI: {}", e);
            return internal_error();
        }
    };

    match state.oauth.authorize_url(&callback_uri, &scope) {
        Ok(url) => found_redirect(&url),
        Err(e) => {
            error!("[Gateway] Could not build consent URL: {}", e);
            internal_error()
        }
    }
}

/// Authorization-code callback endpoint.
///
/// Fetches the session context, runs the callback flow against the
/// token-exchange collaborator, commits the context back, and answers with
/// a single 302 redirect. A new session cookie is issued when the request
/// carried none.
pub async fn auth_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Response {
    let Some(return_url) = params.return_url.clone() else {
        warn!("[Gateway] Callback missing returnUrl parameter");
        return missing_parameter("returnUrl");
    };

    let existing = session::session_id_from_headers(&headers);
    let (session_id, mut tokens) = match existing {
        Some(id) => (
            id,
            state.sessions.tokens(id).await.unwrap_or_default(),
        ),
        None => (Uuid::new_v4(), SessionTokens::default()),
    };

    let location =
        callback::process(&params, &return_url, state.exchanger.as_ref(), &mut tokens).await;

    state.sessions.commit(session_id, tokens).await;

    let mut response = found_redirect(&location);
    if existing.is_none() {
        if let Ok(cookie) = HeaderValue::from_str(&session::session_cookie(session_id)) {
            response.headers_mut().insert(header::SET_COOKIE, cookie);
        }
    }
    response
}

/// Device capability endpoint.
///
/// Reads the session token stored for the capability scope; without one the
/// app has not been authorized by the user. With one, fetches the
/// capability document from the platform and returns the typed record.
pub async fn device_capabilities(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = match session::session_id_from_headers(&headers) {
        Some(id) => state
            .sessions
            .tokens(id)
            .await
            .and_then(|tokens| tokens.token_for_scope(DEVICE_CAPABILITIES_SCOPE).cloned()),
        None => None,
    };

    let Some(token) = token else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "app not authorized by user" })),
        )
            .into_response();
    };

    let service = DeviceCapabilitiesService::with_http_client(
        state.oauth.config().api_host.clone(),
        token,
        state.http_client.clone(),
    );

    match service.device_capabilities().await {
        Ok(record) => Json(record).into_response(),
        Err(e @ DeviceError::Capability(_)) => {
            error!("[Gateway] Capability document rejected: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
        Err(e) => {
            error!("[Gateway] Device capability lookup failed: {}", e);
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": "device capability lookup failed" })),
            )
                .into_response()
        }
    }
}

/// Plain 302 with a Location header. The provider contract promises 302,
/// which axum's Redirect helpers do not emit.
fn found_redirect(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = StatusCode::FOUND.into_response();
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        Err(_) => {
            warn!("[Gateway] Redirect target is not a valid header value");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "invalid redirect target" })),
            )
                .into_response()
        }
    }
}

fn missing_parameter(name: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": format!("missing {name} parameter") })),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "internal error" })),
    )
        .into_response()
}
