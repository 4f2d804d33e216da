//! Carga de configuración desde variables de entorno.
//! Convención `SEATFLOW_API_URL` y timeout opcional para la API;
//! `SEATFLOW_POLL_INTERVAL_MS` y `SEATFLOW_MAX_POLL_FAILURES` para la sesión.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

use seat_core::SessionConfig;

use crate::error::HttpError;

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// URL base sin barra final.
    pub base_url: String,
    pub timeout: Duration,
    /// Reintentos de lecturas idempotentes ante errores transitorios.
    pub read_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: DEFAULT_API_URL.to_string(), timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS), read_retries: 2 }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into().trim_end_matches('/').to_string(), ..Self::default() }
    }

    pub fn from_env() -> Result<Self, HttpError> {
        // asegura que .env se haya cargado
        Lazy::force(&DOTENV_LOADED);
        let base_url = env::var("SEATFLOW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(HttpError::Config(format!("SEATFLOW_API_URL must be an http(s) URL, got '{base_url}'")));
        }
        let timeout_secs: u64 = env_parse("SEATFLOW_API_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        let read_retries: u32 = env_parse("SEATFLOW_API_READ_RETRIES", 2)?;
        Ok(Self { timeout: Duration::from_secs(timeout_secs.max(1)), read_retries, ..Self::new(base_url) })
    }

    pub fn url(&self, path: &str) -> String { format!("{}/{}", self.base_url, path.trim_start_matches('/')) }
}

/// Lee y parsea una variable; ausente = `default`, inválida = error.
pub fn env_parse<T: FromStr>(name: &str, default: T) -> Result<T, HttpError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| HttpError::Config(format!("{name}: invalid value '{raw}'"))),
        Err(_) => Ok(default),
    }
}

/// Parámetros de sesión; variables ausentes usan los defaults, valores
/// inválidos o en cero son error de configuración.
pub fn session_from_env() -> Result<SessionConfig, HttpError> {
    Lazy::force(&DOTENV_LOADED);
    let defaults = SessionConfig::default();
    let interval_ms: u64 = env_parse("SEATFLOW_POLL_INTERVAL_MS", defaults.poll_interval.as_millis() as u64)?;
    if interval_ms == 0 {
        return Err(HttpError::Config("SEATFLOW_POLL_INTERVAL_MS must be > 0".to_string()));
    }
    let max_failures: u32 = env_parse("SEATFLOW_MAX_POLL_FAILURES", defaults.max_consecutive_poll_failures)?;
    if max_failures == 0 {
        return Err(HttpError::Config("SEATFLOW_MAX_POLL_FAILURES must be >= 1".to_string()));
    }
    Ok(SessionConfig {
        poll_interval: Duration::from_millis(interval_ms),
        max_consecutive_poll_failures: max_failures,
        ..defaults
    })
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() { Lazy::force(&DOTENV_LOADED); }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slashes() {
        let cfg = ApiConfig::new("http://api.local/");
        assert_eq!(cfg.url("/pipelines/"), "http://api.local/pipelines/");
        assert_eq!(cfg.url("images/v1/assets"), "http://api.local/images/v1/assets");
    }

    #[test]
    fn missing_variable_uses_default() {
        let value: u64 = env_parse("SEATFLOW_TEST_SURELY_UNSET_VARIABLE", 7).unwrap();
        assert_eq!(value, 7);
    }
}
