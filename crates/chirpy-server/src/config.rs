use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Duration;

/// Placeholder secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

pub struct Config {
    pub jwt_secret: String,
    pub polka_key: String,
    pub db_path: PathBuf,
    pub addr: SocketAddr,
    pub fileserver_root: PathBuf,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("CHIRPY_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CHIRPY_JWT_SECRET is unset or still a placeholder");
        }

        let polka_key = get("CHIRPY_POLKA_KEY").unwrap_or_default();
        if polka_key.is_empty() {
            bail!("CHIRPY_POLKA_KEY is unset");
        }

        let host = get("CHIRPY_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("CHIRPY_PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .context("CHIRPY_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", host, port))?;

        Ok(Self {
            jwt_secret,
            polka_key,
            db_path: get("CHIRPY_DB_PATH")
                .unwrap_or_else(|| "database.json".into())
                .into(),
            addr,
            fileserver_root: get("CHIRPY_FILESERVER_ROOT")
                .unwrap_or_else(|| ".".into())
                .into(),
            access_ttl: seconds(&get, "CHIRPY_ACCESS_TTL_SECS", 60 * 60)?,
            refresh_ttl: seconds(&get, "CHIRPY_REFRESH_TTL_SECS", 60 * 24 * 60 * 60)?,
        })
    }
}

fn seconds(get: &impl Fn(&str) -> Option<String>, key: &str, default: i64) -> Result<Duration> {
    let secs = match get(key) {
        Some(raw) => raw
            .parse::<i64>()
            .with_context(|| format!("{} must be a whole number of seconds", key))?,
        None => default,
    };
    if secs <= 0 {
        bail!("{} must be positive", key);
    }
    Ok(Duration::seconds(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let config = Config::from_lookup(lookup(&[
            ("CHIRPY_JWT_SECRET", "s3cret"),
            ("CHIRPY_POLKA_KEY", "key"),
        ]))
        .unwrap();

        assert_eq!(config.addr.port(), 8080);
        assert_eq!(config.db_path, PathBuf::from("database.json"));
        assert_eq!(config.access_ttl, Duration::hours(1));
        assert_eq!(config.refresh_ttl, Duration::days(60));
    }

    #[test]
    fn placeholder_or_missing_secret_is_refused() {
        assert!(Config::from_lookup(lookup(&[("CHIRPY_POLKA_KEY", "key")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[
                ("CHIRPY_JWT_SECRET", "dev-secret-change-me"),
                ("CHIRPY_POLKA_KEY", "key"),
            ]))
            .is_err()
        );
        assert!(Config::from_lookup(lookup(&[("CHIRPY_JWT_SECRET", "s3cret")])).is_err());
    }

    #[test]
    fn bad_numbers_are_reported() {
        let base = [("CHIRPY_JWT_SECRET", "s3cret"), ("CHIRPY_POLKA_KEY", "key")];

        let mut bad_port = base.to_vec();
        bad_port.push(("CHIRPY_PORT", "eighty"));
        assert!(Config::from_lookup(lookup(&bad_port)).is_err());

        let mut zero_ttl = base.to_vec();
        zero_ttl.push(("CHIRPY_ACCESS_TTL_SECS", "0"));
        assert!(Config::from_lookup(lookup(&zero_ttl)).is_err());
    }
}
