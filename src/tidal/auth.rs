use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    config, error, info,
    management::TokenManager,
    server::start_api_server,
    success,
    types::{AccountRole, PkceToken, Token},
    utils, warning,
};

/// Initiates the complete OAuth 2.0 PKCE authentication flow with Tidal for
/// one account role.
///
/// This function orchestrates the entire authentication process including:
/// 1. Generating the PKCE code verifier and challenge
/// 2. Starting a local callback server
/// 3. Opening the authorization URL in the user's browser
/// 4. Waiting for the OAuth callback
/// 5. Persisting the obtained token for the given role
///
/// Run it once with [`AccountRole::Source`] and once with
/// [`AccountRole::Destination`]; the destination login should happen in a
/// private browser window so the two sessions don't bleed into each other.
///
/// # Error Handling
///
/// - Browser launch failures result in a warning with manual URL instructions
/// - Token persistence failures terminate the program with an error
/// - Authentication timeouts or failures terminate with an error message
pub async fn auth(shared_state: Arc<Mutex<Option<PkceToken>>>, role: AccountRole) {
    // generate PKCE verifier and challenge
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    // start API server
    let server_state = Arc::clone(&shared_state);
    tokio::spawn(async move {
        start_api_server(server_state).await;
    });

    // Construct the authorization URL
    let auth_url = format!(
        "{tidal_auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&code_challenge={code_challenge}&code_challenge_method=S256&scope={scope}",
        tidal_auth_url = &config::tidal_apiauth_url(),
        client_id = &config::tidal_client_id(),
        redirect_uri = &config::tidal_redirect_uri(),
        code_challenge = code_challenge,
        scope = &config::tidal_scope()
    );

    // Store verifier in shared state before redirect
    {
        let mut lock = shared_state.lock().await;
        *lock = Some(PkceToken {
            code_verifier: code_verifier.clone(),
            token: None,
        });
    }

    if role == AccountRole::Destination {
        info!("Logging in the DESTINATION account. Use a private browser window.");
    }

    // Open the authorization URL in the default browser
    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    // wait for callback to be hit
    let token = wait_for_token(shared_state).await;

    match token {
        Some(t) => {
            // initialize token manager with token
            let token_manager = TokenManager::new(role, t.clone());
            if let Err(e) = token_manager.persist().await {
                error!("Failed to save {} token to cache: {}", role, e);
            }

            success!("Authentication for {} account successful!", role);
        }
        None => {
            error!("Authentication for {} account failed or timed out.", role);
        }
    }
}

/// Waits for the OAuth callback to complete and return a token.
///
/// Polls the shared state for a completed authentication token with a
/// 60-second timeout. This function runs concurrently with the callback
/// handler that populates the token after a successful exchange.
async fn wait_for_token(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Token> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pkce_token) = lock.as_ref() {
            if let Some(token) = &pkce_token.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Refreshes an expired access token using a refresh token.
///
/// Exchanges a refresh token for a new access token when the current token
/// has expired, so an account stays usable for the whole run without the
/// user re-authorizing.
///
/// # Errors
///
/// Common failures include network connectivity issues, an invalid or
/// expired refresh token, and Tidal API service errors.
pub async fn refresh_token(refresh_token: &str, user_id: u64) -> Result<Token, String> {
    let client = Client::new();
    let res = client
        .post(&config::tidal_apitoken_url())
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &config::tidal_client_id()),
        ])
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let json: Value = res.json().await.map_err(|e| e.to_string())?;

    Ok(token_from_json(&json, Some(user_id)))
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// Completes the OAuth 2.0 PKCE flow by exchanging the authorization code
/// received from the callback for an access token. The response also names
/// the authenticated Tidal user; the numeric user id is kept on the token
/// because the library endpoints are addressed per user.
pub async fn exchange_code_pkce(code: &str, verifier: &str) -> Result<Token, reqwest::Error> {
    let client_id = &config::tidal_client_id();
    let redirect_uri = &config::tidal_redirect_uri();

    let client = Client::new();
    let res = client
        .post(&config::tidal_apitoken_url())
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", client_id),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", redirect_uri),
        ])
        .send()
        .await?;

    let json: Value = res.json().await?;

    Ok(token_from_json(&json, None))
}

fn token_from_json(json: &Value, known_user_id: Option<u64>) -> Token {
    Token {
        access_token: json["access_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        refresh_token: json["refresh_token"]
            .as_str()
            .unwrap_or_default()
            .to_string(),
        scope: json["scope"].as_str().unwrap_or_default().to_string(),
        expires_in: json["expires_in"].as_i64().unwrap_or(3600) as u64,
        obtained_at: Utc::now().timestamp() as u64,
        user_id: json["user"]["userId"]
            .as_u64()
            .or(known_user_id)
            .unwrap_or_default(),
    }
}
