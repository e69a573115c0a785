use serde::Deserialize;
use std::time::Duration;

/// Deadlines the transport puts on each kind of user operation.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub struct TimeoutPolicy {
    pub create_user: Duration,
    pub update_user: Duration,
    pub get_users: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            create_user: Duration::from_millis(100),
            update_user: Duration::from_millis(100),
            get_users: Duration::from_millis(200),
        }
    }
}

impl TimeoutPolicy {
    /// Signup may turn into either an insert or an update.
    pub fn upsert_user(&self) -> Duration {
        self.create_user.max(self.update_user)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub host: String,
    pub port: u16,
    pub timeouts: TimeoutPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let millis = |key: &str, default: Duration| {
            lookup(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let defaults = TimeoutPolicy::default();
        let database = DatabaseConfig {
            url: lookup("DATABASE_URL").ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?,
            max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(10),
            acquire_timeout: millis("DB_ACQUIRE_TIMEOUT_MS", Duration::from_secs(3)),
        };
        let timeouts = TimeoutPolicy {
            create_user: millis("TIMEOUT_CREATE_USER_MS", defaults.create_user),
            update_user: millis("TIMEOUT_UPDATE_USER_MS", defaults.update_user),
            get_users: millis("TIMEOUT_GET_USERS_MS", defaults.get_users),
        };

        Ok(Self {
            database,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: lookup("APP_PORT")
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(8080),
            timeouts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")])).unwrap();
        assert_eq!(cfg.database.url, "postgres://x");
        assert_eq!(cfg.database.max_connections, 10);
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeouts, TimeoutPolicy::default());
        assert_eq!(cfg.timeouts.upsert_user(), Duration::from_millis(100));
    }

    #[test]
    fn overrides_and_unparsable_values() {
        let cfg = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://x"),
            ("TIMEOUT_UPDATE_USER_MS", "250"),
            ("TIMEOUT_GET_USERS_MS", "soon"),
            ("APP_PORT", "9000"),
        ]))
        .unwrap();
        assert_eq!(cfg.timeouts.update_user, Duration::from_millis(250));
        assert_eq!(cfg.timeouts.upsert_user(), Duration::from_millis(250));
        assert_eq!(cfg.timeouts.get_users, Duration::from_millis(200));
        assert_eq!(cfg.port, 9000);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }
}
