use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub media_dir: String,
    /// Prefix used when building `secure_url` values for stored assets.
    pub public_base_url: String,
    /// HS256 secret the identity verifier checks bearer tokens against.
    pub token_secret: String,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Content & access-control API for a consultancy site")]
pub struct Args {
    /// Host to bind to (overrides CMS_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides CMS_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Database URL (overrides CMS_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Directory where media assets are stored (overrides CMS_MEDIA_DIR)
    #[arg(long)]
    pub media_dir: Option<String>,

    /// Base URL assets are served under (overrides CMS_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Bearer-token secret (overrides CMS_TOKEN_SECRET)
    #[arg(long)]
    pub token_secret: Option<String>,

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
        let env_host = env::var("CMS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("CMS_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing CMS_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 3000,
            Err(err) => return Err(err).context("reading CMS_PORT"),
        };
        let env_db =
            env::var("CMS_DATABASE_URL").unwrap_or_else(|_| "sqlite://./data/cms.db".into());
        let env_media = env::var("CMS_MEDIA_DIR").unwrap_or_else(|_| "./data/media".into());
        let env_base_url =
            env::var("CMS_PUBLIC_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".into());
        let env_secret = env::var("CMS_TOKEN_SECRET")
            .unwrap_or_else(|_| "change-me-in-production".into());

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            database_url: args.database_url.unwrap_or(env_db),
            media_dir: args.media_dir.unwrap_or(env_media),
            public_base_url: args.public_base_url.unwrap_or(env_base_url),
            token_secret: args.token_secret.unwrap_or(env_secret),
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
