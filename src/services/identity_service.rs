//! OAuth 2.0 token acquisition for the spreadsheet provider.
//!
//! The session is a plain value: callers hand the current [`Session`] in and
//! store the one handed back. Consent is requested only while no token is
//! cached; afterwards tokens are renewed silently through the refresh grant.
//! There is no retry and no expiry tracking, and an in-flight request cannot
//! be cancelled because the provider offers no way to do so.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{error, info};
use url::Url;

use crate::config::{Config, DRIVE_FILE_SCOPE, SHEETS_SCOPE};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthTokens {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub token_type: String,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Session {
    #[default]
    Uninitialized,
    ClientsReady,
    TokenAcquired(OAuthTokens),
}

impl Session {
    pub fn label(&self) -> &'static str {
        match self {
            Session::Uninitialized => "uninitialized",
            Session::ClientsReady => "clients_ready",
            Session::TokenAcquired(_) => "token_acquired",
        }
    }

    /// Bearer token for provider calls.
    pub fn access_token(&self) -> Result<&str> {
        match self {
            Session::Uninitialized => Err(Error::ProviderUnavailable(
                "Google Sheets API not initialized".to_string(),
            )),
            Session::ClientsReady => Err(Error::Unauthorized(
                "Not authenticated with Google".to_string(),
            )),
            Session::TokenAcquired(tokens) => Ok(&tokens.access_token),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Consent,
    Silent,
}

impl Prompt {
    pub fn for_session(session: &Session) -> Self {
        match session {
            Session::TokenAcquired(_) => Prompt::Silent,
            _ => Prompt::Consent,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Prompt::Consent => "consent",
            Prompt::Silent => "none",
        }
    }
}

#[derive(Clone)]
pub struct IdentityService {
    client: Client,
    client_id: Option<String>,
    client_secret: Option<String>,
    api_key: Option<String>,
    auth_url: String,
    token_url: String,
    redirect_uri: String,
    scopes: Vec<String>,
}

impl IdentityService {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            api_key: config.google_sheets_api_key.clone(),
            auth_url: config.google_oauth_auth_url.clone(),
            token_url: config.google_oauth_token_url.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            scopes: vec![SHEETS_SCOPE.to_string(), DRIVE_FILE_SCOPE.to_string()],
        }
    }

    fn client_id(&self) -> Result<&str> {
        self.client_id
            .as_deref()
            .ok_or_else(|| Error::Config("GOOGLE_CLIENT_ID is not configured".to_string()))
    }

    /// Moves an uninitialized session to `ClientsReady` once credentials check out.
    pub fn init_clients(&self, session: Session) -> Result<Session> {
        self.client_id()?;
        if self.api_key.is_none() {
            return Err(Error::Config("GOOGLE_SHEETS_API_KEY is not configured".to_string()));
        }

        match session {
            Session::Uninitialized => {
                info!("Google Sheets API initialized");
                info!("Google Identity Services initialized");
                Ok(Session::ClientsReady)
            }
            ready => Ok(ready),
        }
    }

    /// Authorization URL the browser is sent to.
    pub fn consent_url(&self, session: &Session, state: &str) -> Result<String> {
        if matches!(session, Session::Uninitialized) {
            return Err(Error::ProviderUnavailable(
                "Google Identity Services not initialized".to_string(),
            ));
        }

        let mut url = Url::parse(&self.auth_url)
            .map_err(|e| Error::Config(format!("Invalid OAuth authorization URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", self.client_id()?)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("include_granted_scopes", "true")
            .append_pair("prompt", Prompt::for_session(session).as_str())
            .append_pair("state", state);
        Ok(url.into())
    }

    /// Resolves with a bearer token and the session to keep.
    ///
    /// A session without a token needs the authorization `code` returned by the
    /// consent screen. A session holding a token renews it silently unless a
    /// fresh code is supplied.
    pub async fn authenticate(&self, session: Session, code: Option<&str>) -> Result<(Session, String)> {
        let tokens = match (&session, code) {
            (Session::Uninitialized, _) => {
                return Err(Error::ProviderUnavailable(
                    "Google Identity Services not initialized".to_string(),
                ))
            }
            (Session::ClientsReady, None) => {
                return Err(Error::Unauthorized("User consent required".to_string()))
            }
            (_, Some(code)) => self.exchange_code(code).await?,
            (Session::TokenAcquired(current), None) => self.refresh(current).await?,
        };

        let access_token = tokens.access_token.clone();
        info!(prompt = Prompt::for_session(&session).as_str(), "Google access token acquired");
        Ok((Session::TokenAcquired(tokens), access_token))
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens> {
        let client_id = self.client_id()?;
        let params = [
            ("client_id", client_id),
            ("client_secret", self.client_secret.as_deref().unwrap_or_default()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        self.request_token(&params, None).await
    }

    async fn refresh(&self, current: &OAuthTokens) -> Result<OAuthTokens> {
        let refresh_token = current.refresh_token.as_deref().ok_or_else(|| Error::Auth {
            error: "invalid_grant".to_string(),
            description: Some("No refresh token cached for silent renewal".to_string()),
        })?;
        let client_id = self.client_id()?;
        let params = [
            ("client_id", client_id),
            ("client_secret", self.client_secret.as_deref().unwrap_or_default()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        self.request_token(&params, Some(refresh_token)).await
    }

    async fn request_token(&self, params: &[(&str, &str)], previous_refresh: Option<&str>) -> Result<OAuthTokens> {
        let resp = self
            .client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "OAuth token request failed");
                Error::Reqwest(e)
            })?;

        let status = resp.status();
        let text = resp.text().await?;
        let body = match serde_json::from_str::<JsonValue>(&text) {
            Ok(body) => body,
            Err(_) if !status.is_success() => {
                error!(status = status.as_u16(), "OAuth token endpoint returned a non-JSON error");
                return Err(Error::Provider {
                    status: status.as_u16(),
                    message: text,
                });
            }
            Err(e) => return Err(Error::Json(e)),
        };

        if let Some(err) = body.get("error") {
            let error = err
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| err.to_string());
            let description = body
                .get("error_description")
                .and_then(|v| v.as_str())
                .map(String::from);
            error!(%error, description = description.as_deref().unwrap_or(""), "OAuth provider rejected token request");
            return Err(Error::Auth { error, description });
        }

        if !status.is_success() {
            error!(status = status.as_u16(), "OAuth token request failed");
            return Err(Error::Provider {
                status: status.as_u16(),
                message: text,
            });
        }

        let access_token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Auth {
                error: "invalid_response".to_string(),
                description: Some("Token response did not include an access token".to_string()),
            })?;

        Ok(OAuthTokens {
            access_token: access_token.to_string(),
            refresh_token: body
                .get("refresh_token")
                .and_then(|v| v.as_str())
                .map(String::from)
                .or_else(|| previous_refresh.map(String::from)),
            expires_in: body.get("expires_in").and_then(|v| v.as_i64()),
            token_type: body["token_type"].as_str().unwrap_or("Bearer").to_string(),
            scope: body.get("scope").and_then(|v| v.as_str()).map(String::from),
        })
    }
}
