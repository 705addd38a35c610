use crate::auth::JwtConfig;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | DATABASE_URL | sqlite:shelfcure.db | SQLite path or URL |
/// | HTTP_PORT | 8080 | |
/// | ENVIRONMENT | development | development, staging or production |
/// | JWT_SECRET | dev secret | required outside development |
/// | JWT_EXPIRATION_MINUTES | 1440 | |
/// | JWT_ISSUER | shelfcure | |
/// | JWT_AUDIENCE | shelfcure-clients | |
/// | LOG_DIR | unset | enables daily rolling log files |
/// | TRIAL_DAYS | 30 | length of the free trial |
/// | CORS_ORIGINS | unset | comma separated; unset allows any origin |
/// | TRUST_PROXY | false | take the client IP from X-Forwarded-For |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    pub log_dir: Option<String>,
    pub trial_days: i64,
    pub cors_origins: Vec<String>,
    /// Only enable behind a reverse proxy that overwrites X-Forwarded-For
    pub trust_proxy: bool,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production-use-only")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        if val.len() < 32 && environment != "development" {
            return Err(format!("{name} must be at least 32 characters long").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:shelfcure.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt: JwtConfig {
                secret: Self::require_secret("JWT_SECRET", &environment)?,
                expiration_minutes: std::env::var("JWT_EXPIRATION_MINUTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1440),
                issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "shelfcure".into()),
                audience: std::env::var("JWT_AUDIENCE")
                    .unwrap_or_else(|_| "shelfcure-clients".into()),
            },
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            trial_days: std::env::var("TRIAL_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            trust_proxy: std::env::var("TRUST_PROXY")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            environment,
        })
    }

    /// Configuration for tests: in-memory database, fixed secret
    pub fn for_tests() -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "test".into(),
            jwt: JwtConfig {
                secret: "test-secret-key-with-at-least-32-characters".into(),
                expiration_minutes: 60,
                issuer: "shelfcure".into(),
                audience: "shelfcure-clients".into(),
            },
            log_dir: None,
            trial_days: 30,
            cors_origins: Vec::new(),
            trust_proxy: false,
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
