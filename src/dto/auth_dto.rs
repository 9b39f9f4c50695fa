use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConsentResponse {
    pub authorization_url: String,
    pub prompt: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub session: &'static str,
    pub token_type: &'static str,
    pub access_token: String,
}
