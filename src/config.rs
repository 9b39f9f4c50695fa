use crate::error::{Error, Result};
use dotenvy::dotenv;
use serde::Serialize;
use std::env;
use std::sync::OnceLock;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";
pub const DEFAULT_DRIVE_BASE_URL: &str = "https://www.googleapis.com";
pub const DEFAULT_MAPS_BASE_URL: &str = "https://maps.googleapis.com";
pub const DEFAULT_OAUTH_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_OAUTH_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
pub const DRIVE_FILE_SCOPE: &str = "https://www.googleapis.com/auth/drive.file";

/// Browser-facing feature switches, mirrored into the generated client config.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    pub google_maps: bool,
    pub google_sheets: bool,
    pub qr_scanner: bool,
    pub geolocation: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub google_maps_api_key: String,
    pub google_sheets_api_key: Option<String>,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub google_redirect_uri: String,
    pub google_sheets_base_url: String,
    pub google_drive_base_url: String,
    pub google_maps_base_url: String,
    pub google_oauth_auth_url: String,
    pub google_oauth_token_url: String,
    pub cors_allowed_origin: Option<String>,
    pub api_rps: u32,
    pub features: FeatureFlags,
}

pub static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup: &lookup };

        Ok(Self {
            server_address: vars.required("SERVER_ADDRESS")?,
            supabase_url: vars.required("SUPABASE_URL")?,
            supabase_anon_key: vars.required("SUPABASE_ANON_KEY")?,
            supabase_jwt_secret: vars.required("SUPABASE_JWT_SECRET")?,
            google_maps_api_key: vars.optional("GOOGLE_MAPS_API_KEY").unwrap_or_default(),
            google_sheets_api_key: vars.optional("GOOGLE_SHEETS_API_KEY"),
            google_client_id: vars.optional("GOOGLE_CLIENT_ID"),
            google_client_secret: vars.optional("GOOGLE_CLIENT_SECRET"),
            google_redirect_uri: vars.or(
                "GOOGLE_REDIRECT_URI",
                "http://localhost:8080/api/auth/google/callback",
            ),
            google_sheets_base_url: vars.or("GOOGLE_SHEETS_BASE_URL", DEFAULT_SHEETS_BASE_URL),
            google_drive_base_url: vars.or("GOOGLE_DRIVE_BASE_URL", DEFAULT_DRIVE_BASE_URL),
            google_maps_base_url: vars.or("GOOGLE_MAPS_BASE_URL", DEFAULT_MAPS_BASE_URL),
            google_oauth_auth_url: vars.or("GOOGLE_OAUTH_AUTH_URL", DEFAULT_OAUTH_AUTH_URL),
            google_oauth_token_url: vars.or("GOOGLE_OAUTH_TOKEN_URL", DEFAULT_OAUTH_TOKEN_URL),
            cors_allowed_origin: vars.optional("CORS_ALLOWED_ORIGIN"),
            api_rps: vars.parse_or("API_RPS", 20)?,
            features: FeatureFlags {
                google_maps: vars.parse_or("FEATURE_GOOGLE_MAPS", true)?,
                google_sheets: vars.parse_or("FEATURE_GOOGLE_SHEETS", true)?,
                qr_scanner: vars.parse_or("FEATURE_QR_SCANNER", false)?,
                geolocation: vars.parse_or("FEATURE_GEOLOCATION", true)?,
            },
        })
    }

    pub fn maps_enabled(&self) -> bool {
        self.features.google_maps && !self.google_maps_api_key.is_empty()
    }
}

struct Vars<'a, F> {
    lookup: &'a F,
}

impl<F> Vars<'_, F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, name: &str) -> Result<String> {
        self.optional(name)
            .ok_or_else(|| Error::Config(format!("Missing environment variable: {}", name)))
    }

    fn or(&self, name: &str, default: &str) -> String {
        self.optional(name)
            .unwrap_or_else(|| default.to_string())
            .trim_end_matches('/')
            .to_string()
    }

    fn parse_or<T>(&self, name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
            None => Ok(default),
        }
    }
}

pub fn init_config() -> Result<()> {
    let config = Config::from_env()?;
    CONFIG
        .set(config)
        .map_err(|_| Error::Config("Configuration has already been initialized".to_string()))?;
    Ok(())
}

pub fn get_config() -> Result<&'static Config> {
    CONFIG
        .get()
        .ok_or_else(|| Error::Config("Configuration has not been initialized".to_string()))
}
