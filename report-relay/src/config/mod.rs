use crate::services::providers::gemini::GEMINI_API_BASE;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default request body ceiling. Covers the client's 10 MB file limit after
/// base64 expansion.
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub is_prod: bool,
    pub models: ModelConfig,
    pub google: GoogleConfig,
    pub relay: RelayOptions,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            _ => Err(format!("Invalid model provider: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    /// Model used for report analysis (e.g., gemini-1.5-flash)
    pub model: String,
    pub api_base: String,
    pub request_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Absent only when the mock provider is selected.
    pub api_key: Option<Secret<String>>,
}

/// Which browser origins may call the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigin {
    Any,
    List(Vec<String>),
}

/// Deployment shape of the relay. The API-only default matches a bare
/// function deployment; the server binary adds static hosting.
#[derive(Debug, Clone)]
pub struct RelayOptions {
    pub cors_origin: CorsOrigin,
    pub static_dir: Option<PathBuf>,
    /// Serve `index.html` for any unmatched path under `static_dir`.
    pub spa_fallback: bool,
    pub max_body_bytes: usize,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            cors_origin: CorsOrigin::Any,
            static_dir: None,
            spa_fallback: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        // Plain PORT wins over APP__PORT, matching common hosting platforms.
        if let Ok(port) = env::var("PORT") {
            common_config.port = port.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", port, e))
            })?;
        }

        let provider: ProviderKind = get_env("GENAI_PROVIDER", Some("gemini"))?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        if is_prod && provider == ProviderKind::Mock {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GENAI_PROVIDER=mock is not allowed in production"
            )));
        }

        let api_key = match provider {
            ProviderKind::Gemini => Some(Secret::new(api_key_from_env()?)),
            ProviderKind::Mock => api_key_from_env().ok().map(Secret::new),
        };

        let request_timeout = match env::var("GENAI_REQUEST_TIMEOUT_SECS") {
            Ok(secs) => Some(Duration::from_secs(secs.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "Invalid GENAI_REQUEST_TIMEOUT_SECS '{}': {}",
                    secs,
                    e
                ))
            })?)),
            Err(_) => None,
        };

        let cors_origin = if is_prod {
            let origins = parse_origins(&get_env("CORS_ALLOWED_ORIGINS", None)?);
            if origins.is_empty() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "CORS_ALLOWED_ORIGINS must list at least one origin in production"
                )));
            }
            CorsOrigin::List(origins)
        } else {
            match env::var("CORS_ALLOWED_ORIGINS") {
                Ok(list) if !parse_origins(&list).is_empty() => {
                    CorsOrigin::List(parse_origins(&list))
                }
                _ => CorsOrigin::Any,
            }
        };

        let static_dir = get_env("STATIC_DIR", Some("static"))?;
        let spa_fallback = parse_bool(&get_env("SPA_FALLBACK", Some("true"))?);
        let max_body_bytes = match env::var("MAX_BODY_BYTES") {
            Ok(bytes) => bytes.parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("Invalid MAX_BODY_BYTES '{}': {}", bytes, e))
            })?,
            Err(_) => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(RelayConfig {
            common: common_config,
            is_prod,
            models: ModelConfig {
                provider,
                model: get_env("GENAI_MODEL", Some("gemini-1.5-flash"))?,
                api_base: get_env("GENAI_API_BASE", Some(GEMINI_API_BASE))?,
                request_timeout,
            },
            google: GoogleConfig { api_key },
            relay: RelayOptions {
                cors_origin,
                static_dir: (!static_dir.is_empty()).then(|| PathBuf::from(static_dir)),
                spa_fallback,
                max_body_bytes,
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }
}

fn api_key_from_env() -> Result<String, AppError> {
    env::var("GOOGLE_API_KEY")
        .or_else(|_| env::var("GOOGLE_GENAI_API_KEY"))
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            AppError::ConfigError(anyhow::anyhow!("GOOGLE_API_KEY is required but not set"))
        })
}

fn parse_origins(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn get_env(key: &str, default: Option<&str>) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(def) => Ok(def.to_string()),
            None => Err(AppError::ConfigError(anyhow::anyhow!(
                "{} is required but not set",
                key
            ))),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_filtered() {
        assert_eq!(
            parse_origins(" https://a.example ,,https://b.example "),
            vec!["https://a.example".to_string(), "https://b.example".to_string()]
        );
        assert!(parse_origins(" , ").is_empty());
    }

    #[test]
    fn bool_flags() {
        assert!(parse_bool("TRUE"));
        assert!(parse_bool("1"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool(""));
    }

    #[test]
    fn provider_kind_parses() {
        assert_eq!("Gemini".parse::<ProviderKind>(), Ok(ProviderKind::Gemini));
        assert_eq!("mock".parse::<ProviderKind>(), Ok(ProviderKind::Mock));
        assert!("openai".parse::<ProviderKind>().is_err());
    }
}
