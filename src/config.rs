use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use snafu::ResultExt as _;

use crate::database::DatabaseConfig;
use crate::error::{ApplicationError, ConfigLoadSnafu};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(flatten)]
    pub database: DatabaseConfig,
    #[serde(flatten)]
    pub dashboard: DashboardConfig,
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Print the dashboard figures once and exit.
    #[default]
    Report,
    /// Keep opening a new statistics period every month.
    Record,
}

#[serde_as]
#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde_as(as = "DisplayFromStr")]
    #[serde(rename = "cache_ttl", default = "default_cache_ttl")]
    pub cache_ttl: humantime::Duration,
    #[serde(rename = "dashboard_mode", default)]
    pub mode: Mode,
    /// Instructor whose subscription growth is included in reports.
    #[serde(rename = "dashboard_instructor", default)]
    pub instructor: Option<String>,
}

fn default_cache_ttl() -> humantime::Duration {
    crate::service::DEFAULT_TTL.into()
}

impl DashboardConfig {
    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl.into()
    }
}

pub fn load() -> Result<Config, ApplicationError> {
    envy::from_env::<Config>().context(ConfigLoadSnafu)
}

pub fn from_iter<I>(vars: I) -> Result<Config, ApplicationError>
where
    I: IntoIterator<Item = (String, String)>,
{
    envy::from_iter(vars).context(ConfigLoadSnafu)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_only_the_url_is_set() {
        let config = from_iter(vars(&[("SURREAL_URL", "mem://")])).unwrap();

        assert_eq!(config.log_dir, PathBuf::from("logs"));
        assert_eq!(config.database.namespace, "skillery");
        assert_eq!(config.database.database, "skillery");
        assert!(config.database.credentials.is_none());
        assert_eq!(config.dashboard.cache_ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.dashboard.mode, Mode::Report);
        assert_eq!(config.dashboard.instructor, None);
    }

    #[test]
    fn everything_can_be_overridden() {
        let config = from_iter(vars(&[
            ("SURREAL_URL", "ws://localhost:8000"),
            ("SURREAL_NS", "prod"),
            ("SURREAL_DB", "platform"),
            ("SURREAL_USER", "dashboard"),
            ("SURREAL_PASS", "hunter2"),
            ("LOG_DIR", "/var/log/skillery"),
            ("CACHE_TTL", "1h 30m"),
            ("DASHBOARD_MODE", "record"),
            ("DASHBOARD_INSTRUCTOR", "ada"),
        ]))
        .unwrap();

        assert_eq!(config.database.url.as_str(), "ws://localhost:8000/");
        assert_eq!(config.database.namespace, "prod");
        let credentials = config.database.credentials.expect("credentials should be read");
        assert_eq!(credentials.username, "dashboard");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/skillery"));
        assert_eq!(config.dashboard.cache_ttl(), Duration::from_secs(90 * 60));
        assert_eq!(config.dashboard.mode, Mode::Record);
        assert_eq!(config.dashboard.instructor.as_deref(), Some("ada"));
    }

    #[test]
    fn missing_url_is_an_error() {
        assert!(from_iter(vars(&[("CACHE_TTL", "1h")])).is_err());
    }

    #[test]
    fn malformed_ttl_is_an_error() {
        let result = from_iter(vars(&[("SURREAL_URL", "mem://"), ("CACHE_TTL", "soon")]));
        assert!(result.is_err());
    }
}
