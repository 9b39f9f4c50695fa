//! Deploy-time generation of the browser `config.js`.
//!
//! Secrets are read from the build environment and substituted into a fixed
//! template. Nothing is written unless both Supabase values are present.

use std::env;
use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use crate::models::location::{DEFAULT_LOCATION_NAME, DEFAULT_POSITION, DEFAULT_ZOOM};

pub const DEFAULT_OUTPUT: &str = "public/js/config.js";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Missing required environment variables: {}", .names.join(", "))]
pub struct MissingVariables {
    pub names: Vec<&'static str>,
}

/// Raw values as found in the environment.
#[derive(Debug, Clone, Default)]
pub struct GeneratorInput {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub google_maps_api_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSecrets {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub google_maps_api_key: String,
}

impl GeneratorInput {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// The plain name wins over its `NEXT_PUBLIC_` alias; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |names: &[&str]| names.iter().find_map(|n| lookup(*n).filter(|v| !v.is_empty()));
        Self {
            supabase_url: first(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"]),
            supabase_anon_key: first(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"]),
            google_maps_api_key: first(&["GOOGLE_MAPS_API_KEY"]).unwrap_or_default(),
        }
    }

    pub fn resolve(self) -> Result<ClientSecrets, MissingVariables> {
        let mut names = Vec::new();
        if self.supabase_url.is_none() {
            names.push("SUPABASE_URL");
        }
        if self.supabase_anon_key.is_none() {
            names.push("SUPABASE_ANON_KEY");
        }

        match (self.supabase_url, self.supabase_anon_key) {
            (Some(supabase_url), Some(supabase_anon_key)) => Ok(ClientSecrets {
                supabase_url,
                supabase_anon_key,
                google_maps_api_key: self.google_maps_api_key,
            }),
            _ => Err(MissingVariables { names }),
        }
    }
}

/// Escapes a value for a single-quoted JavaScript string literal.
fn js_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

pub fn render_config(secrets: &ClientSecrets) -> String {
    format!(
        r#"// Auto-generated config file - DO NOT EDIT MANUALLY
// Generated at build time from environment variables

const SUPABASE_URL = '{url}';
const SUPABASE_ANON_KEY = '{anon_key}';

const SUPABASE_CONFIG = {{
  url: SUPABASE_URL,
  anonKey: SUPABASE_ANON_KEY
}};

// Database is configured and ready - always use real data
const USE_SUPABASE = true;

// Mock data disabled - using real database only
const MOCK_CONFIG = {{
  enabled: false,
  mockDelay: 0
}};

// Google Maps Configuration
const GOOGLE_MAPS_CONFIG = {{
  apiKey: '{maps_key}',
  defaultLocation: {{
    lat: {lat},
    lng: {lng},
    name: '{location_name}'
  }},
  defaultZoom: {zoom}
}};

// Export for module usage (if needed)
if (typeof module !== 'undefined' && module.exports) {{
  module.exports = {{
    SUPABASE_CONFIG,
    USE_SUPABASE,
    MOCK_CONFIG,
    GOOGLE_MAPS_CONFIG
  }};
}}
"#,
        url = js_string(&secrets.supabase_url),
        anon_key = js_string(&secrets.supabase_anon_key),
        maps_key = js_string(&secrets.google_maps_api_key),
        lat = DEFAULT_POSITION.lat,
        lng = DEFAULT_POSITION.lng,
        location_name = js_string(DEFAULT_LOCATION_NAME),
        zoom = DEFAULT_ZOOM,
    )
}

/// Writes `contents` to `path`, creating missing parent directories.
pub fn write_config(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    fs::write(path, contents)
}

/// First `n` characters of a secret, for log lines.
pub fn preview(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}
