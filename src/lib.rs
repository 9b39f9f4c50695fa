pub mod config;
pub mod config_generator;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::utils::token::states_match;
use crate::services::{
    attendance_service::AttendanceService, identity_service::IdentityService,
    identity_service::Session, maps_service::MapsService, sheets_client::GoogleSheetsClient,
};
use reqwest::Client;
use tokio::sync::RwLock;

/// Identity sessions keyed by the Supabase user (`sub`), plus the `state`
/// of each user's outstanding consent request.
#[derive(Debug, Default)]
pub struct AuthRegistry {
    sessions: HashMap<String, Session>,
    pending: HashMap<String, String>,
}

impl AuthRegistry {
    pub fn session(&self, user: &str) -> Session {
        self.sessions.get(user).cloned().unwrap_or_default()
    }

    pub fn store(&mut self, user: &str, session: Session) {
        self.sessions.insert(user.to_string(), session);
    }

    /// Replaces any earlier consent request of the same user.
    pub fn begin_consent(&mut self, user: &str, oauth_state: String) {
        self.pending.insert(user.to_string(), oauth_state);
    }

    /// Consumes the consent request whose state matches and returns its user.
    pub fn complete_consent(&mut self, received: &str) -> Option<String> {
        let user = self
            .pending
            .iter()
            .find(|(_, expected)| states_match(expected, received))
            .map(|(user, _)| user.clone())?;
        self.pending.remove(&user);
        Some(user)
    }

    /// Users holding an access token.
    pub fn signed_in(&self) -> usize {
        self.sessions
            .values()
            .filter(|session| matches!(session, Session::TokenAcquired(_)))
            .count()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub http_client: Client,
    pub identity_service: IdentityService,
    pub maps_service: MapsService,
    pub attendance_service: AttendanceService,
    pub auth: Arc<RwLock<AuthRegistry>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        let identity_service = IdentityService::new(&config, http_client.clone());
        let maps_service = MapsService::new(
            http_client.clone(),
            config.google_maps_base_url.clone(),
            config.google_maps_api_key.clone(),
            config.features.google_maps,
        );

        Ok(Self {
            config: Arc::new(config),
            http_client,
            identity_service,
            maps_service,
            attendance_service: AttendanceService::new(),
            auth: Arc::new(RwLock::new(AuthRegistry::default())),
        })
    }

    /// Sheets client acting with `user`'s Google token.
    pub async fn sheets_client(&self, user: &str) -> Result<GoogleSheetsClient> {
        if !self.config.features.google_sheets {
            return Err(Error::ProviderUnavailable(
                "Google Sheets integration is disabled".to_string(),
            ));
        }
        let session = self.auth.read().await.session(user);
        let token = session.access_token()?;
        Ok(GoogleSheetsClient::new(
            self.http_client.clone(),
            self.config.google_sheets_base_url.clone(),
            self.config.google_drive_base_url.clone(),
            token,
        ))
    }
}
