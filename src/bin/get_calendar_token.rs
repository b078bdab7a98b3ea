use schedule_bot::calendar::google::token::{
    open_token_store, StoredToken, TokenManager, TokenResponse, TOKEN_URL,
};
use schedule_bot::config::CalendarConfig;
use schedule_bot::error::{other_error, token_error, BotResult, Error};
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Only the calendar settings are needed here
    let config = CalendarConfig::from_env()?;
    let (client_id, client_secret) = config.google_credentials()?;

    let store = open_token_store(&config)?;
    let token_manager = TokenManager::new(client_id.clone(), client_secret.clone(), store);

    // Generate random state for security
    let state = uuid::Uuid::new_v4().to_string();

    let auth_url = Url::parse_with_params(
        AUTH_URL,
        &[
            ("client_id", client_id.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("response_type", "code"),
            ("access_type", "offline"),
            ("prompt", "consent"),
            ("scope", SCOPE),
            ("state", state.as_str()),
        ],
    )
    .map_err(|e| other_error(&format!("Invalid authorization URL: {}", e)))?;

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    if let Err(e) = webbrowser::open(auth_url.as_str()) {
        println!("Could not open a browser ({}). Visit this URL instead:\n{}", e, auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("0.0.0.0:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv().map_err(Error::from)?;
    let code = match authorization_code(request.url(), &state) {
        Ok(code) => code,
        Err(e) => {
            let response = tiny_http::Response::from_string(format!("Authorization failed: {}", e))
                .with_status_code(400);
            request.respond(response).map_err(Error::from)?;
            return Err(e.into());
        }
    };

    // Exchange code for tokens
    let response = reqwest::Client::new()
        .post(TOKEN_URL)
        .form(&[
            ("client_id", client_id.as_str()),
            ("client_secret", client_secret.as_str()),
            ("code", code.as_str()),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .map_err(Error::from)?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(token_error(&format!("Failed to get token: {}", error_text)).into());
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(Error::from)?;
    let token = StoredToken::from_response(&token_response, None);
    if token.refresh_token.is_none() {
        println!("Warning: no refresh token was returned; you will need to authorize again when the token expires.");
    }

    token_manager.set_token(&token).await?;

    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response).map_err(Error::from)?;

    println!("Token successfully saved to the {:?} token store!", config.token_store);

    Ok(())
}

/// Pull the authorization code out of the callback path, checking the state
fn authorization_code(callback: &str, expected_state: &str) -> BotResult<String> {
    let url = Url::parse(REDIRECT_URI)
        .and_then(|base| base.join(callback))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => {
                return Err(token_error(&format!("Authorization denied: {}", value)));
            }
            _ => {}
        }
    }

    if state.as_deref() != Some(expected_state) {
        return Err(token_error("State mismatch in authorization callback"));
    }
    code.ok_or_else(|| other_error("No authorization code found in callback"))
}
