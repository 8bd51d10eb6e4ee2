use anyhow::{bail, Context, Result};
use std::fmt;
use std::time::Duration;

/// Connection details for the modem's web management interface.
#[derive(Clone)]
pub struct ModemConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
}

/// Target bucket and credentials for the InfluxDB v2 write API.
#[derive(Clone)]
pub struct InfluxConfig {
    pub uri: String,
    pub token: String,
    pub bucket: String,
    pub org: String,
    /// Value of the `location` tag on every point.
    pub location: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub poll_interval_seconds: u64,
    pub modem: ModemConfig,
    pub influx: InfluxConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_secs() -> u64 {
    60
}

fn default_location() -> String {
    "pk5001z".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup. Every required
    /// variable must be present and non-blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => bail!("required env variable not set or blank: {key}"),
            }
        };

        let modem = ModemConfig {
            uri: required("MODEM_URI")?,
            username: required("MODEM_USERNAME")?,
            password: required("MODEM_PASSWORD")?,
        };
        let influx = InfluxConfig {
            uri: required("INFLUXDB_URI")?,
            token: required("INFLUXDB_TOKEN")?,
            bucket: required("INFLUXDB_BUCKET_ID")?,
            org: required("INFLUXDB_ORG_ID")?,
            location: lookup("INFLUXDB_TAG").unwrap_or_else(default_location),
        };

        let log_level = lookup("LOG_LEVEL")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(default_log_level);
        let poll_interval_seconds = match lookup("POLL_INTERVAL_SECONDS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid POLL_INTERVAL_SECONDS '{raw}'"))?;
                if secs == 0 {
                    bail!("POLL_INTERVAL_SECONDS must be greater than zero");
                }
                secs
            }
            None => default_poll_interval_secs(),
        };

        Ok(Self {
            log_level,
            poll_interval_seconds,
            modem,
            influx,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }
}

impl fmt::Debug for ModemConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModemConfig")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("uri", &self.uri)
            .field("token", &"<redacted>")
            .field("bucket", &self.bucket)
            .field("org", &self.org)
            .field("location", &self.location)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("MODEM_URI", "http://192.168.0.1"),
            ("MODEM_USERNAME", "admin"),
            ("MODEM_PASSWORD", "hunter2"),
            ("INFLUXDB_URI", "http://influx:8086"),
            ("INFLUXDB_TOKEN", "secret-token"),
            ("INFLUXDB_BUCKET_ID", "bucket1"),
            ("INFLUXDB_ORG_ID", "org1"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig> {
        AppConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn loads_required_values_and_defaults() {
        let config = load(&base_env()).expect("load config");
        assert_eq!(config.modem.uri, "http://192.168.0.1");
        assert_eq!(config.modem.username, "admin");
        assert_eq!(config.modem.password, "hunter2");
        assert_eq!(config.influx.uri, "http://influx:8086");
        assert_eq!(config.influx.token, "secret-token");
        assert_eq!(config.influx.bucket, "bucket1");
        assert_eq!(config.influx.org, "org1");
        assert_eq!(config.influx.location, "pk5001z");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn optional_values_override_defaults() {
        let mut env = base_env();
        env.insert("INFLUXDB_TAG", "siteA");
        env.insert("LOG_LEVEL", "debug");
        env.insert("POLL_INTERVAL_SECONDS", "15");
        let config = load(&env).expect("load config");
        assert_eq!(config.influx.location, "siteA");
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.poll_interval_seconds, 15);
    }

    #[test]
    fn missing_required_variable_is_named() {
        for key in [
            "MODEM_URI",
            "MODEM_USERNAME",
            "MODEM_PASSWORD",
            "INFLUXDB_URI",
            "INFLUXDB_TOKEN",
            "INFLUXDB_BUCKET_ID",
            "INFLUXDB_ORG_ID",
        ] {
            let mut env = base_env();
            env.remove(key);
            let err = load(&env).unwrap_err();
            assert!(err.to_string().contains(key), "error for {key}: {err}");
        }
    }

    #[test]
    fn blank_required_variable_is_rejected() {
        let mut env = base_env();
        env.insert("INFLUXDB_TOKEN", "   ");
        let err = load(&env).unwrap_err();
        assert_eq!(
            err.to_string(),
            "required env variable not set or blank: INFLUXDB_TOKEN"
        );
    }

    #[test]
    fn rejects_bad_poll_interval() {
        let mut env = base_env();
        env.insert("POLL_INTERVAL_SECONDS", "soon");
        assert!(load(&env).is_err());
        env.insert("POLL_INTERVAL_SECONDS", "0");
        assert!(load(&env).is_err());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = load(&base_env()).expect("load config");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("<redacted>"));
    }
}
