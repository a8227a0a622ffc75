use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub session: Session,
    pub user: User,
    pub mysql: Option<MySql>,
    pub http: Http,
    pub log: Log,
}

#[derive(Deserialize)]
pub struct Auth {
    pub signing_key: String,
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
    pub store_timeout_ms: u64,
    pub cookie_secure: bool,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("signing_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("store_timeout_ms", &self.store_timeout_ms)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct Session {
    pub backend: String, // "memory", "redis" or "mysql"
    pub redis_dsn: Option<String>,
    pub purge_interval_secs: u64, // 0 disables the sweep
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "memory" or "mysql"
}

#[derive(Debug, Deserialize)]
pub struct MySql {
    pub dsn: String,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

/// Load the TOML file at `path` (or the build default), then apply
/// `BOARDSIGNAL_<SECTION>__<KEY>` environment overrides.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("BOARDSIGNAL").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.auth.signing_key.trim().is_empty() {
            return Err(anyhow!("auth.signing_key must not be empty"));
        }
        if self.auth.access_ttl_secs <= 0 || self.auth.refresh_ttl_secs <= 0 {
            return Err(anyhow!("token TTLs must be positive"));
        }
        if self.auth.access_ttl_secs >= self.auth.refresh_ttl_secs {
            return Err(anyhow!("access_ttl_secs must be shorter than refresh_ttl_secs"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            auth: Auth {
                signing_key: "dev-secret".to_string(),
                issuer: "boardsignal.auth".to_string(),
                audience: "boardsignal-client".to_string(),
                access_ttl_secs: 1800,
                refresh_ttl_secs: 1_209_600,
                store_timeout_ms: 2000,
                cookie_secure: false,
            },
            session: Session {
                backend: "memory".to_string(),
                redis_dsn: None,
                purge_interval_secs: 0,
            },
            user: User {
                backend: "memory".to_string(),
            },
            mysql: None,
            http: Http {
                address: "127.0.0.1:8080".to_string(),
                cert_path: None,
                key_path: None,
            },
            log: Log {
                filter: "info".to_string(),
            },
        }
    }

    #[test]
    fn accepts_sane_settings() {
        assert!(settings().validate().is_ok());
    }

    #[test]
    fn rejects_empty_signing_key() {
        let mut s = settings();
        s.auth.signing_key = "  ".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn rejects_access_ttl_not_shorter_than_refresh() {
        let mut s = settings();
        s.auth.access_ttl_secs = s.auth.refresh_ttl_secs;
        assert!(s.validate().is_err());
    }

    #[test]
    fn debug_hides_signing_key() {
        assert!(!format!("{:?}", settings()).contains("dev-secret"));
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
