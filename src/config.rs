//! Runtime configuration for the community server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    /// Public base URL of this server (Steam redirects back here).
    pub public_url: String,
    /// SPA origin the login flow redirects to once a token is issued.
    pub frontend_url: String,
    /// Steam Web API key; persona names are skipped when absent.
    pub steam_api_key: Option<String>,
    /// Directory holding the built frontend bundle.
    pub static_dir: String,
    /// User token lifetime (days).
    pub user_token_days: i64,
    /// Admin token lifetime (hours).
    pub admin_token_hours: i64,
}

impl Settings {
    fn from_env() -> Self {
        let public_url =
            env::var("PUBLIC_URL").unwrap_or_else(|_| "http://127.0.0.1:8080".into());

        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://127.0.0.1:5173".into());

        let steam_api_key = env::var("STEAM_API_KEY").ok().filter(|k| !k.is_empty());

        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./dist".into());

        let user_token_days = env::var("USER_TOKEN_DAYS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(7);

        let admin_token_hours = env::var("ADMIN_TOKEN_HOURS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(24);

        Settings {
            public_url,
            frontend_url,
            steam_api_key,
            static_dir,
            user_token_days,
            admin_token_hours,
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
