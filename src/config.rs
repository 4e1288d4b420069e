use anyhow::{Context, Result, bail};
use clap::Parser;
use std::{env, str::FromStr};

const ENV_PREFIX: &str = "GALLERY_SITE_";
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage_dir: String,
    pub database_url: String,
    /// Prefix for the public URLs handed out for stored images.
    pub public_base_url: String,
    pub admin_email: String,
    pub admin_password: String,
    pub session_ttl_hours: i64,
    pub max_upload_mb: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Content site with a blog and a country-scoped photo gallery")]
pub struct Args {
    /// Host to bind to (overrides GALLERY_SITE_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GALLERY_SITE_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory where image payloads are stored (overrides GALLERY_SITE_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Database URL (overrides GALLERY_SITE_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Base URL used in public image links (overrides GALLERY_SITE_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Admin login email (overrides GALLERY_SITE_ADMIN_EMAIL)
    #[arg(long)]
    pub admin_email: Option<String>,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let migrate = args.migrate;
        let cfg = Self::resolve(args, |key| env::var(key).ok())?;
        Ok((cfg, migrate))
    }

    /// Merge CLI args over values looked up through `lookup`.
    pub fn resolve(args: Args, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));

        let host = args
            .host
            .or_else(|| var("HOST"))
            .unwrap_or_else(|| "0.0.0.0".into());
        let port = match args.port {
            Some(port) => port,
            None => parse_var(&var, "PORT")?.unwrap_or(3000),
        };
        let storage_dir = args
            .storage_dir
            .or_else(|| var("STORAGE_DIR"))
            .unwrap_or_else(|| "./data/objects".into());
        let database_url = args
            .database_url
            .or_else(|| var("DATABASE_URL"))
            .unwrap_or_else(|| "sqlite://./data/meta/gallery_site.db".into());
        let public_base_url = args
            .public_base_url
            .or_else(|| var("PUBLIC_BASE_URL"))
            .unwrap_or_else(|| {
                let public_host = match host.as_str() {
                    "0.0.0.0" | "::" => "localhost",
                    other => other,
                };
                format!("http://{}:{}", public_host, port)
            });

        let Some(admin_email) = args.admin_email.or_else(|| var("ADMIN_EMAIL")) else {
            bail!("{ENV_PREFIX}ADMIN_EMAIL must be set");
        };
        let Some(admin_password) = var("ADMIN_PASSWORD").filter(|p| !p.is_empty()) else {
            bail!("{ENV_PREFIX}ADMIN_PASSWORD must be set");
        };

        let session_ttl_hours = parse_var(&var, "SESSION_TTL_HOURS")?.unwrap_or(12);
        if !(1..=MAX_SESSION_TTL_HOURS).contains(&session_ttl_hours) {
            bail!(
                "{ENV_PREFIX}SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {session_ttl_hours}"
            );
        }

        Ok(Self {
            host,
            port,
            storage_dir,
            database_url,
            public_base_url,
            admin_email,
            admin_password,
            session_ttl_hours,
            max_upload_mb: parse_var(&var, "MAX_UPLOAD_MB")?.unwrap_or(50),
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("parsing {ENV_PREFIX}{name} value `{value}`")),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const ADMIN: [(&str, &str); 2] = [
        ("GALLERY_SITE_ADMIN_EMAIL", "admin@example.com"),
        ("GALLERY_SITE_ADMIN_PASSWORD", "pw"),
    ];

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::resolve(Args::default(), env_of(&ADMIN)).unwrap();
        assert_eq!(cfg.addr(), "0.0.0.0:3000");
        assert_eq!(cfg.public_base_url, "http://localhost:3000");
        assert_eq!(cfg.session_ttl_hours, 12);
        assert_eq!(cfg.max_upload_bytes(), 50 * 1024 * 1024);
    }

    #[test]
    fn cli_overrides_environment() {
        let mut pairs = ADMIN.to_vec();
        pairs.push(("GALLERY_SITE_PORT", "8080"));
        pairs.push(("GALLERY_SITE_HOST", "10.0.0.1"));
        let args = Args {
            port: Some(9090),
            ..Default::default()
        };
        let cfg = AppConfig::resolve(args, env_of(&pairs)).unwrap();
        assert_eq!(cfg.addr(), "10.0.0.1:9090");
        assert_eq!(cfg.public_base_url, "http://10.0.0.1:9090");
    }

    #[test]
    fn bad_numbers_and_missing_admin_are_errors() {
        let mut pairs = ADMIN.to_vec();
        pairs.push(("GALLERY_SITE_PORT", "eighty"));
        let err = AppConfig::resolve(Args::default(), env_of(&pairs)).unwrap_err();
        assert!(err.to_string().contains("GALLERY_SITE_PORT"));

        let err = AppConfig::resolve(Args::default(), env_of(&[])).unwrap_err();
        assert!(err.to_string().contains("ADMIN_EMAIL"));
    }

    #[test]
    fn session_ttl_must_be_in_range() {
        for bad in ["0", "-3", "9223372036854775807"] {
            let mut pairs = ADMIN.to_vec();
            pairs.push(("GALLERY_SITE_SESSION_TTL_HOURS", bad));
            let err = AppConfig::resolve(Args::default(), env_of(&pairs)).unwrap_err();
            assert!(err.to_string().contains("GALLERY_SITE_SESSION_TTL_HOURS"), "{bad}");
        }

        let mut pairs = ADMIN.to_vec();
        pairs.push(("GALLERY_SITE_SESSION_TTL_HOURS", "8760"));
        let cfg = AppConfig::resolve(Args::default(), env_of(&pairs)).unwrap();
        assert_eq!(cfg.session_ttl_hours, 8760);
    }
}
