//! Application configuration loaded from environment variables.

use std::env;

use secrecy::{ExposeSecret, SecretString};

/// Cookie carrying the session token.
pub const SESSION_COOKIE: &str = "vf_session";

/// Development default values - NEVER use in production.
pub mod defaults {
    pub const DEV_DATABASE_URL: &str = "postgres://vf:vf@localhost:5432/video_feedback";
    pub const DEV_HOST: &str = "127.0.0.1";
    pub const DEV_PORT: u16 = 8080;
    pub const DEV_DB_MAX_CONNECTIONS: u32 = 10;
    pub const DEV_DB_MIN_CONNECTIONS: u32 = 1;
    pub const DEV_SESSION_SECRET: &str = "dev-session-secret-do-not-use-in-production";
    pub const DEV_SESSION_TTL_SECS: u64 = 43_200; // 12 hours
    pub const DEV_UPLOAD_PREFIX: &str = "videos";

    // S3/MinIO defaults for development
    pub const DEV_S3_ENDPOINT: &str = "http://localhost:9100";
    pub const DEV_S3_BUCKET: &str = "videos";
    pub const DEV_S3_REGION: &str = "us-east-1";
    pub const DEV_S3_ACCESS_KEY: &str = "minioadmin";
    pub const DEV_S3_SECRET_KEY: &str = "minioadmin";

    pub const STREAM_BASE_URL: &str = "https://chat.stream-io-api.com";
}

/// Runtime environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Parse environment from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Some(Self::Development),
            "production" | "prod" => Some(Self::Production),
            _ => None,
        }
    }

    /// Check if this is a development environment.
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Check if this is a production environment.
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
        }
    }
}

/// Database pool settings.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// S3 storage configuration.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    /// S3 endpoint URL (for MinIO or custom S3-compatible services)
    pub endpoint: Option<String>,
    /// S3 bucket name
    pub bucket: String,
    /// S3 region
    pub region: String,
    /// S3 access key ID
    pub access_key: String,
    /// S3 secret access key
    pub secret_key: SecretString,
    /// Key prefix for uploaded videos
    pub upload_prefix: String,
}

/// Session token settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// HS256 signing secret
    pub secret: SecretString,
    /// Token lifetime in seconds
    pub ttl_secs: u64,
}

/// Hosted chat provider credentials.
///
/// Optional in development; chat endpoints answer with a misconfiguration
/// error when absent.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub api_key: Option<String>,
    pub api_secret: Option<SecretString>,
    pub base_url: String,
    /// Users added to every caller's chat upsert (e.g. the support supervisor).
    pub support_member_ids: Vec<String>,
}

impl ChatSettings {
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.api_secret.is_some()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Runtime environment
    pub environment: Environment,
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub session: SessionSettings,
    pub chat: ChatSettings,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In development mode (RUST_ENV=development) every variable has a default.
    /// In production mode (RUST_ENV=production) the server will NOT start with
    /// development defaults, and the bucket, session secret and chat
    /// credentials must be provided.
    ///
    /// Environment variables:
    /// - `RUST_ENV`: Environment (development/production) - REQUIRED
    /// - `VF_HOST`, `VF_PORT`: bind address (default: 127.0.0.1:8080)
    /// - `DATABASE_URL`: PostgreSQL connection string
    /// - `VF_DB_MAX_CONNECTIONS`, `VF_DB_MIN_CONNECTIONS`: pool bounds
    /// - `VF_SESSION_SECRET`: session token signing secret
    /// - `VF_SESSION_TTL_SECS`: session lifetime (default: 12h)
    /// - `VF_UPLOAD_PREFIX`: object key prefix for videos (default: videos)
    /// - `S3_ENDPOINT`, `S3_BUCKET`, `S3_REGION`, `S3_ACCESS_KEY`, `S3_SECRET_KEY`
    /// - `STREAM_API_KEY`, `STREAM_API_SECRET`, `STREAM_BASE_URL`
    /// - `STREAM_SUPPORT_MEMBER_IDS`: comma-separated user ids
    pub fn from_env() -> Result<Self, ConfigError> {
        let env_str = env::var("RUST_ENV").map_err(|_| ConfigError::MissingEnvVar("RUST_ENV"))?;

        let environment = Environment::parse(&env_str).ok_or(ConfigError::InvalidValue(
            "RUST_ENV must be 'development' or 'production'",
        ))?;
        let is_dev = environment.is_development();

        let host = env::var("VF_HOST").unwrap_or_else(|_| defaults::DEV_HOST.to_string());

        let port = env::var("VF_PORT")
            .unwrap_or_else(|_| defaults::DEV_PORT.to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidValue("VF_PORT must be a valid port number"))?;

        let database = DatabaseSettings {
            url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| defaults::DEV_DATABASE_URL.to_string()),
            max_connections: env::var("VF_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| defaults::DEV_DB_MAX_CONNECTIONS.to_string())
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::InvalidValue("VF_DB_MAX_CONNECTIONS must be a valid number")
                })?,
            min_connections: env::var("VF_DB_MIN_CONNECTIONS")
                .unwrap_or_else(|_| defaults::DEV_DB_MIN_CONNECTIONS.to_string())
                .parse::<u32>()
                .map_err(|_| {
                    ConfigError::InvalidValue("VF_DB_MIN_CONNECTIONS must be a valid number")
                })?,
        };

        let bucket = match env::var("S3_BUCKET") {
            Ok(b) if !b.trim().is_empty() => b,
            _ if is_dev => defaults::DEV_S3_BUCKET.to_string(),
            _ => return Err(ConfigError::MissingEnvVar("S3_BUCKET")),
        };

        let storage = StorageSettings {
            endpoint: env::var("S3_ENDPOINT").ok().or_else(|| {
                if is_dev {
                    Some(defaults::DEV_S3_ENDPOINT.to_string())
                } else {
                    None
                }
            }),
            bucket,
            region: env::var("S3_REGION").unwrap_or_else(|_| defaults::DEV_S3_REGION.to_string()),
            access_key: env::var("S3_ACCESS_KEY")
                .unwrap_or_else(|_| defaults::DEV_S3_ACCESS_KEY.to_string()),
            secret_key: SecretString::from(
                env::var("S3_SECRET_KEY")
                    .unwrap_or_else(|_| defaults::DEV_S3_SECRET_KEY.to_string()),
            ),
            upload_prefix: env::var("VF_UPLOAD_PREFIX")
                .unwrap_or_else(|_| defaults::DEV_UPLOAD_PREFIX.to_string()),
        };

        let session_secret = match env::var("VF_SESSION_SECRET") {
            Ok(s) => s,
            Err(_) if is_dev => defaults::DEV_SESSION_SECRET.to_string(),
            Err(_) => return Err(ConfigError::MissingEnvVar("VF_SESSION_SECRET")),
        };

        let session = SessionSettings {
            secret: SecretString::from(session_secret),
            ttl_secs: env::var("VF_SESSION_TTL_SECS")
                .unwrap_or_else(|_| defaults::DEV_SESSION_TTL_SECS.to_string())
                .parse::<u64>()
                .map_err(|_| {
                    ConfigError::InvalidValue("VF_SESSION_TTL_SECS must be a valid number")
                })?,
        };

        let chat = ChatSettings {
            api_key: env::var("STREAM_API_KEY").ok().filter(|s| !s.is_empty()),
            api_secret: env::var("STREAM_API_SECRET")
                .ok()
                .filter(|s| !s.is_empty())
                .map(SecretString::from),
            base_url: env::var("STREAM_BASE_URL")
                .unwrap_or_else(|_| defaults::STREAM_BASE_URL.to_string()),
            support_member_ids: env::var("STREAM_SUPPORT_MEMBER_IDS")
                .map(|s| parse_list(&s))
                .unwrap_or_default(),
        };

        let config = Config {
            environment,
            host,
            port,
            database,
            storage,
            session,
            chat,
        };

        if environment.is_production() {
            config.validate_production()?;
        }

        Ok(config)
    }

    /// Validate that production configuration does not use development defaults.
    fn validate_production(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.database.url == defaults::DEV_DATABASE_URL {
            errors.push(format!(
                "DATABASE_URL is using development default '{}'. Set a production PostgreSQL URL.",
                defaults::DEV_DATABASE_URL
            ));
        }

        if self.storage.access_key == defaults::DEV_S3_ACCESS_KEY
            || self.storage.secret_key.expose_secret() == defaults::DEV_S3_SECRET_KEY
        {
            errors.push(
                "S3_ACCESS_KEY/S3_SECRET_KEY are using development defaults. Set production S3 credentials."
                    .to_string(),
            );
        }

        if self.session.secret.expose_secret() == defaults::DEV_SESSION_SECRET {
            errors.push(
                "VF_SESSION_SECRET is using development default. Set a secure random secret."
                    .to_string(),
            );
        }

        if !self.chat.is_configured() {
            errors.push(
                "STREAM_API_KEY and STREAM_API_SECRET are required in production.".to_string(),
            );
        }

        if !errors.is_empty() {
            return Err(ConfigError::ProductionValidation(errors));
        }

        Ok(())
    }

    /// Get the server bind address.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if running in development mode.
    pub fn is_development(&self) -> bool {
        self.environment.is_development()
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(&'static str),

    #[error("Production configuration validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    ProductionValidation(Vec<String>),
}
