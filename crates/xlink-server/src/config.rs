//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::db::DEFAULT_CROSSLINK_CHUNK_SIZE;
use crate::uniprot::{DEFAULT_UNIPROT_BASE_URL, DEFAULT_UNIPROT_TIMEOUT_SECS};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/xlink";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

// ============================================================================
// Ingestion Constants
// ============================================================================

/// Maximum UniProt lookups in flight per enrichment batch.
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 4;

/// Directory where prepared uploads wait for commit.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Owner of datasets imported by the offline importer.
pub const DEFAULT_SERVICE_ACCOUNT_EMAIL: &str = "importer@xlink.local";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub uniprot: UniProtConfig,
    pub ingest: IngestConfig,
    pub auth: AuthConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniProtConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    pub concurrency: usize,
}

/// Upload staging and import behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    pub upload_dir: PathBuf,
    pub crosslink_chunk_size: usize,
    /// Match organelle names ignoring case.
    pub organelle_case_insensitive: bool,
    /// Insert the organelle catalog at startup.
    pub seed_organelles: bool,
    pub service_account_email: String,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing)]
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .finish()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: env_string("XLINK_HOST", DEFAULT_SERVER_HOST),
                port: env_parse("XLINK_PORT", DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: env_parse("XLINK_SHUTDOWN_TIMEOUT", DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            database: DatabaseConfig::from_env(),
            cors: CorsConfig {
                allowed_origins: env_string("CORS_ALLOWED_ORIGINS", DEFAULT_CORS_ALLOWED_ORIGIN)
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                allow_credentials: env_parse("CORS_ALLOW_CREDENTIALS", true),
            },
            uniprot: UniProtConfig::from_env(),
            ingest: IngestConfig::from_env(),
            auth: AuthConfig {
                jwt_secret: std::env::var("XLINK_JWT_SECRET").unwrap_or_default(),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        self.database.validate()?;
        self.uniprot.validate()?;
        self.ingest.validate()?;

        if self.auth.jwt_secret.len() < 16 {
            anyhow::bail!("XLINK_JWT_SECRET must be set to at least 16 characters");
        }

        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl DatabaseConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_string("DATABASE_URL", DEFAULT_DATABASE_URL),
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", DEFAULT_DATABASE_MAX_CONNECTIONS),
            min_connections: env_parse("DATABASE_MIN_CONNECTIONS", DEFAULT_DATABASE_MIN_CONNECTIONS),
            connect_timeout_secs: env_parse(
                "DATABASE_CONNECT_TIMEOUT",
                DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
            ),
            idle_timeout_secs: env_parse("DATABASE_IDLE_TIMEOUT", DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("Database URL cannot be empty");
        }

        if self.max_connections == 0 {
            anyhow::bail!("Database max_connections must be greater than 0");
        }

        if self.min_connections > self.max_connections {
            anyhow::bail!(
                "Database min_connections ({}) cannot be greater than max_connections ({})",
                self.min_connections,
                self.max_connections
            );
        }

        Ok(())
    }
}

impl UniProtConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("XLINK_UNIPROT_BASE_URL", DEFAULT_UNIPROT_BASE_URL),
            timeout_secs: env_parse("XLINK_UNIPROT_TIMEOUT_SECS", DEFAULT_UNIPROT_TIMEOUT_SECS),
            concurrency: env_parse("XLINK_ENRICHMENT_CONCURRENCY", DEFAULT_ENRICHMENT_CONCURRENCY),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("UniProt base URL must be http(s): {}", self.base_url);
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("UniProt timeout must be greater than 0");
        }
        if self.concurrency == 0 {
            anyhow::bail!("Enrichment concurrency must be greater than 0");
        }
        Ok(())
    }
}

impl IngestConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: PathBuf::from(env_string("XLINK_UPLOAD_DIR", DEFAULT_UPLOAD_DIR)),
            crosslink_chunk_size: env_parse("XLINK_CROSSLINK_CHUNK_SIZE", DEFAULT_CROSSLINK_CHUNK_SIZE),
            organelle_case_insensitive: env_parse("XLINK_ORGANELLE_CASE_INSENSITIVE", false),
            seed_organelles: env_parse("XLINK_SEED_ORGANELLES", true),
            service_account_email: env_string(
                "XLINK_SERVICE_ACCOUNT_EMAIL",
                DEFAULT_SERVICE_ACCOUNT_EMAIL,
            ),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.crosslink_chunk_size == 0 {
            anyhow::bail!("Crosslink chunk size must be greater than 0");
        }
        if !self.service_account_email.contains('@') {
            anyhow::bail!(
                "Service account email is not an address: {}",
                self.service_account_email
            );
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: DEFAULT_DATABASE_MAX_CONNECTIONS,
                min_connections: DEFAULT_DATABASE_MIN_CONNECTIONS,
                connect_timeout_secs: DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS,
                idle_timeout_secs: DEFAULT_DATABASE_IDLE_TIMEOUT_SECS,
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
            uniprot: UniProtConfig {
                base_url: DEFAULT_UNIPROT_BASE_URL.to_string(),
                timeout_secs: DEFAULT_UNIPROT_TIMEOUT_SECS,
                concurrency: DEFAULT_ENRICHMENT_CONCURRENCY,
            },
            ingest: IngestConfig::default(),
            auth: AuthConfig {
                jwt_secret: String::new(),
            },
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            crosslink_chunk_size: DEFAULT_CROSSLINK_CHUNK_SIZE,
            organelle_case_insensitive: false,
            seed_organelles: true,
            service_account_email: DEFAULT_SERVICE_ACCOUNT_EMAIL.to_string(),
        }
    }
}
