use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub base_url: String,
    pub auth_token: String,
    pub db_url: String,
    pub box_office_url: String,
    pub box_office_api_key: String,
    pub enrichment_queue_size: usize,
    pub enrichment_workers: usize,
}

impl Config {
    /// Reads the process environment, loading `.env` first when one exists.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let db_url =
            std::env::var("DB_URL").map_err(|_| AppError::EnvError("DB_URL must be set".into()))?;

        Ok(Self {
            port: parse_env("PORT", 8080)?,
            base_url: env_or("BASE_URL", "http://127.0.0.1:8080"),
            auth_token: env_or("AUTH_TOKEN", ""),
            db_url,
            box_office_url: env_or("BOXOFFICE_URL", ""),
            box_office_api_key: env_or("BOXOFFICE_API_KEY", ""),
            enrichment_queue_size: parse_env("ENRICHMENT_QUEUE_SIZE", 256)?,
            enrichment_workers: parse_env("ENRICHMENT_WORKERS", 4)?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, AppError> {
    match std::env::var(key) {
        Ok(raw) if !raw.is_empty() => raw
            .parse::<T>()
            .map_err(|_| AppError::EnvError(format!("{key} must be a number, got '{raw}'"))),
        _ => Ok(default),
    }
}
