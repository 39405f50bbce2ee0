use secrecy::{ExposeSecret, Secret};
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default model, matching the deployed portfolio frontends.
const DEFAULT_MODEL: &str = "gemini-1.5-flash";

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Origins allowed when `ALLOWED_ORIGINS` is not set.
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:3000,https://myportfolio-frontend-cda8d2fam-gowthams-projects-7cff2d38.vercel.app";

/// 100 KiB, the usual JSON body parser default.
const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

#[derive(Debug, Clone)]
pub struct AskConfig {
    pub common: core_config::Config,
    pub environment: String,
    pub google: GoogleConfig,
    pub model: ModelConfig,
    pub cors: CorsConfig,
    pub max_body_bytes: usize,
}

#[derive(Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Gemini model name (e.g., gemini-1.5-flash)
    pub name: String,
    /// REST base URL, overridable for tests and proxies
    pub api_base: String,
    /// Per-call timeout. `None` leaves the call unbounded.
    pub timeout_secs: Option<u64>,
    /// Probe the model endpoint during startup and fail fast on error.
    pub verify_on_startup: bool,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl AskConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let is_prod = environment == "prod";

        let config = AskConfig {
            common,
            environment,
            google: GoogleConfig {
                api_key: Secret::new(get_env("GOOGLE_API_KEY", None, is_prod)?),
            },
            model: ModelConfig {
                name: get_env("GEMINI_MODEL", Some(DEFAULT_MODEL), is_prod)?,
                api_base: get_env("GEMINI_API_BASE", Some(DEFAULT_API_BASE), is_prod)?,
                timeout_secs: match env::var("GEMINI_TIMEOUT_SECS") {
                    Ok(raw) => Some(parse_value("GEMINI_TIMEOUT_SECS", &raw)?),
                    Err(_) => None,
                },
                verify_on_startup: parse_value(
                    "GEMINI_VERIFY_ON_STARTUP",
                    &get_env("GEMINI_VERIFY_ON_STARTUP", Some("false"), is_prod)?,
                )?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&get_env(
                    "ALLOWED_ORIGINS",
                    Some(DEFAULT_ALLOWED_ORIGINS),
                    is_prod,
                )?),
            },
            max_body_bytes: parse_value(
                "MAX_BODY_BYTES",
                &get_env(
                    "MAX_BODY_BYTES",
                    Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
                    is_prod,
                )?,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.google.api_key.expose_secret().trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_API_KEY must not be empty"
            )));
        }

        if self.model.name.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_MODEL must not be empty"
            )));
        }

        if self.cors.allowed_origins.iter().any(|o| o == "*") {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "Wildcard CORS origin is not supported; list each origin explicitly"
            )));
        }

        if self.model.timeout_secs == Some(0) {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GEMINI_TIMEOUT_SECS must be positive"
            )));
        }

        if self.max_body_bytes == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "MAX_BODY_BYTES must be positive"
            )));
        }

        Ok(())
    }
}

/// Split a comma-separated origin list. Browsers never send a trailing slash
/// in `Origin`, so one is stripped here.
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, AppError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
