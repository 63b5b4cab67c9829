use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use diary_api::service::DeletePolicy;

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "diary=debug,diary_api=debug,diary_db=info,tower_http=debug";

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

pub struct Config {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub delete_policy: DeletePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = var("DIARY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("DIARY_JWT_SECRET is unset or still a placeholder; it must match the account service's secret");
        }

        let db_path: PathBuf = var("DIARY_DB_PATH").unwrap_or_else(|| "diary.db".into()).into();
        let host = var("DIARY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("DIARY_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("DIARY_PORT is not a valid port")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let delete_policy = match var("DIARY_DELETE_POLICY") {
            Some(raw) => raw.parse()?,
            None => DeletePolicy::default(),
        };

        Ok(Self {
            jwt_secret,
            db_path,
            addr,
            delete_policy,
        })
    }
}
