use anyhow::{Result, anyhow};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub http: Http,
    pub jwt: Jwt,
    pub log: Log,
    pub store: Store,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub backend: String, // "fake" or "real"
    #[serde(default)]
    pub accounts: Vec<Account>,
}

#[derive(Deserialize)]
pub struct Account {
    pub user_id: u64,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

#[derive(Deserialize)]
pub struct Jwt {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

impl fmt::Debug for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwt")
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "redis" or "memory"
    #[serde(default)]
    pub dsn: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

fn default_prefix() -> String {
    "cadence".to_string()
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

const ENV_PREFIX: &str = "CADENCE";

/// File settings overlaid by `CADENCE_<SECTION>__<KEY>` environment variables.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    build(Config::builder().add_source(File::with_name(path)))
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [auth]
        backend = "real"
        accounts = [{ user_id = 1, username = "username", password = "password" }]

        [http]
        address = "127.0.0.1:8080"

        [jwt]
        access_secret = "a-secret"
        refresh_secret = "r-secret"
        access_ttl_secs = 900
        refresh_ttl_secs = 604800

        [log]
        filter = "info"

        [store]
        backend = "memory"
    "#;

    #[test]
    fn parses_sample() {
        let s = parse_settings_str(SAMPLE).unwrap();
        assert_eq!(s.auth.accounts.len(), 1);
        assert_eq!(s.auth.accounts[0].user_id, 1);
        assert_eq!(s.jwt.access_ttl_secs, 900);
        assert_eq!(s.store.prefix, "cadence");
        assert!(s.http.cert_path.is_none());
        assert!(!s.log.json);
    }

    #[test]
    fn debug_hides_secrets() {
        let s = parse_settings_str(SAMPLE).unwrap();
        let out = format!("{:?}", s);
        assert!(!out.contains("a-secret"));
        assert!(!out.contains("\"password\""));
    }

    #[test]
    fn missing_section_is_error() {
        assert!(parse_settings_str("[log]\nfilter = \"info\"").is_err());
    }

    #[test]
    fn missing_file_is_error() {
        assert!(parse_settings(Some("does/not/exist")).is_err());
    }
}
