use crate::infrastructure::auth::DEFAULT_IDENTITY_URL;
use crate::infrastructure::cerebras::{DEFAULT_API_URL, DEFAULT_MODEL};

pub const DEFAULT_PUBLIC_ORIGIN: &str = "http://localhost:3000";

/// Runtime settings read from the environment. Every external service is
/// optional; a missing one disables the feature that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub public_origin: String,
    pub cerebras_api_key: Option<String>,
    pub cerebras_api_url: String,
    pub cerebras_model: String,
    pub identity_api_key: Option<String>,
    pub identity_api_url: String,
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn or_default(name: &str, default: &str) -> String {
    optional(name).unwrap_or_else(|| default.to_string())
}

impl Config {
    pub fn from_env() -> Self {
        let google = match (
            optional("GOOGLE_CLIENT_ID"),
            optional("GOOGLE_CLIENT_SECRET"),
        ) {
            (Some(client_id), Some(client_secret)) => Some(GoogleConfig {
                client_id,
                client_secret,
                redirect_uri: or_default(
                    "GOOGLE_REDIRECT_URI",
                    &format!("{}/auth/callback", or_default("PUBLIC_ORIGIN", DEFAULT_PUBLIC_ORIGIN)),
                ),
            }),
            _ => None,
        };

        let config = Self {
            database_url: optional("DATABASE_URL"),
            public_origin: or_default("PUBLIC_ORIGIN", DEFAULT_PUBLIC_ORIGIN)
                .trim_end_matches('/')
                .to_string(),
            cerebras_api_key: optional("CEREBRAS_API_KEY"),
            cerebras_api_url: or_default("CEREBRAS_API_URL", DEFAULT_API_URL),
            cerebras_model: or_default("CEREBRAS_MODEL", DEFAULT_MODEL),
            identity_api_key: optional("FIREBASE_API_KEY"),
            identity_api_url: or_default("IDENTITY_API_URL", DEFAULT_IDENTITY_URL),
            google,
        };
        config.log_summary();
        config
    }

    fn log_summary(&self) {
        tracing::info!("Public origin: {}", self.public_origin);
        if self.cerebras_api_key.is_none() {
            tracing::warn!("CEREBRAS_API_KEY not set, AI drafting helpers are disabled");
        } else {
            tracing::info!("AI drafting via {} ({})", self.cerebras_api_url, self.cerebras_model);
        }
        if self.identity_api_key.is_none() {
            tracing::warn!("FIREBASE_API_KEY not set, email/password sign-in is disabled");
        }
        if self.google.is_none() {
            tracing::warn!("GOOGLE_CLIENT_ID/GOOGLE_CLIENT_SECRET not set, Google sign-in is disabled");
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            public_origin: DEFAULT_PUBLIC_ORIGIN.to_string(),
            cerebras_api_key: None,
            cerebras_api_url: DEFAULT_API_URL.to_string(),
            cerebras_model: DEFAULT_MODEL.to_string(),
            identity_api_key: None,
            identity_api_url: DEFAULT_IDENTITY_URL.to_string(),
            google: None,
        }
    }
}
