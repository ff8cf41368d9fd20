use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::env;

/// Which persistence backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreBackend {
    /// Durable SQLite database.
    Sqlite,
    /// Volatile in-memory store; everything is lost on restart.
    Memory,
}

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub public_base_url: String,
    pub backend: StoreBackend,
    pub max_upload_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Personal image gallery API")]
pub struct Args {
    /// Host to bind to (overrides PICSTASH_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides PICSTASH_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides PICSTASH_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Public base URL used when building share links
    /// (overrides PICSTASH_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Persistence backend (overrides PICSTASH_BACKEND)
    #[arg(long, value_enum)]
    pub backend: Option<StoreBackend>,

    /// Per-file upload size cap in bytes (overrides PICSTASH_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("PICSTASH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("PICSTASH_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing PICSTASH_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading PICSTASH_PORT"),
        };
        let env_db = env::var("PICSTASH_DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./data/picstash.db".into());
        let env_base_url =
            env::var("PICSTASH_PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let env_backend = match env::var("PICSTASH_BACKEND") {
            Ok(value) => StoreBackend::from_str(&value, true)
                .map_err(|err| anyhow::anyhow!("parsing PICSTASH_BACKEND value `{value}`: {err}"))?,
            Err(_) => StoreBackend::Sqlite,
        };
        let env_max_upload = match env::var("PICSTASH_MAX_UPLOAD_BYTES") {
            Ok(value) => value
                .parse::<usize>()
                .with_context(|| format!("parsing PICSTASH_MAX_UPLOAD_BYTES value `{}`", value))?,
            Err(env::VarError::NotPresent) => 10 * 1024 * 1024,
            Err(err) => return Err(err).context("reading PICSTASH_MAX_UPLOAD_BYTES"),
        };

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            public_base_url: args.public_base_url.unwrap_or(env_base_url),
            backend: args.backend.unwrap_or(env_backend),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
