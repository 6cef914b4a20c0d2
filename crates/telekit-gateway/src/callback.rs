//! Authorization-code callback flow
//!
//! Once the user has logged in with their credentials, the platform
//! redirects them here with a `code` parameter. The code is exchanged for
//! an access token usable in any later platform call, the token is stored
//! in the session under the requested scope, and the browser is sent back
//! to the caller-supplied return URL. Every failure path redirects too,
//! with an `error` parameter appended.

use serde::Deserialize;
use tracing::{error, warn};
use url::form_urlencoded;

use telekit_client::oauth::{CodeExchanger, OAuthError};

use crate::session::SessionTokens;

/// Query parameters delivered on the authorization redirect
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub scope: Option<String>,
    #[serde(rename = "returnUrl")]
    pub return_url: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Why a callback ended in an error redirect.
///
/// The rendered message becomes the `error` parameter on the redirect.
#[derive(Debug, thiserror::Error)]
pub enum CallbackFailure {
    /// The provider redirected back without a code and without reporting
    /// an error of its own
    #[error("no code and no error message returned from the user authentication")]
    MissingParameter,

    /// The identity provider reported an error, possibly with description
    #[error("{error}{}", .description.as_deref().map(|d| format!(" - {d}")).unwrap_or_default())]
    UpstreamAuth {
        error: String,
        description: Option<String>,
    },

    /// The code-to-token exchange call failed
    #[error("could not convert code to token")]
    Exchange(#[source] OAuthError),
}

/// Run the callback state machine and return the redirect location.
///
/// The exchange is attempted at most once. On success the token is stored
/// in `session` under the request's scope (overwriting any prior token for
/// that scope) and the return URL comes back unmodified; on any failure
/// `session` is left untouched and the redirect carries the failure
/// message.
pub async fn process(
    params: &CallbackParams,
    return_url: &str,
    exchanger: &dyn CodeExchanger,
    session: &mut SessionTokens,
) -> String {
    let code = match &params.code {
        Some(code) => code,
        None => {
            let failure = match &params.error {
                Some(err) => CallbackFailure::UpstreamAuth {
                    error: err.clone(),
                    description: params.error_description.clone(),
                },
                None => CallbackFailure::MissingParameter,
            };
            warn!("[Callback] Authorization failed upstream: {}", failure);
            return redirect_with_error(return_url, &failure.to_string());
        }
    };

    match exchanger.token_from_code(code).await {
        Ok(token) => {
            let scope = params.scope.as_deref().unwrap_or_default();
            session.set_token_for_scope(scope, token);
            return_url.to_string()
        }
        Err(e) => {
            error!("[Callback] Token exchange failed: {}", e);
            redirect_with_error(return_url, &CallbackFailure::Exchange(e).to_string())
        }
    }
}

/// Append `error=<message>` to a URL, form-urlencoded.
///
/// Uses `?` when the URL has no query string yet, `&` otherwise.
pub fn redirect_with_error(url: &str, message: &str) -> String {
    let delimiter = if url.contains('?') { '&' } else { '?' };
    let encoded: String = form_urlencoded::byte_serialize(message.as_bytes()).collect();
    format!("{url}{delimiter}error={encoded}")
}
