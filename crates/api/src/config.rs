use std::path::PathBuf;

use deckgen_gemini::GeminiConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development except the
/// provider API key, which must be set before generation calls succeed.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory for persisted images (default: `./data`).
    pub storage_dir: PathBuf,
    /// Generation provider endpoint and models.
    pub gemini: GeminiConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                              |
    /// |------------------------|------------------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                            |
    /// | `PORT`                 | `3000`                                               |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                              |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                                 |
    /// | `STORAGE_DIR`          | `./data`                                             |
    /// | `GEMINI_BASE_URL`      | `https://generativelanguage.googleapis.com/v1beta`   |
    /// | `GEMINI_API_KEY`       | *(empty)*                                            |
    /// | `GEMINI_IMAGE_MODEL`   | `gemini-2.5-flash-image`                             |
    /// | `GEMINI_TEXT_MODEL`    | `gemini-2.5-flash`                                   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let storage_dir =
            PathBuf::from(std::env::var("STORAGE_DIR").unwrap_or_else(|_| "./data".into()));

        let gemini = GeminiConfig {
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            image_model: std::env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-image".into()),
            text_model: std::env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".into()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            storage_dir,
            gemini,
        }
    }
}
