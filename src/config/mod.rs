use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// 会话有效期上限：一年
pub const MAX_SESSION_TTL_MINUTES: u64 = 60 * 24 * 365;
/// 防抖时长上限：一天
pub const MAX_ACTIVITY_DEBOUNCE_SECS: u64 = 60 * 60 * 24;

/// 会话存储后端
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    File,
    Redis,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub session_ttl_minutes: u64,
    pub activity_debounce_secs: u64,
    pub store: StoreKind,
    pub session_dir: PathBuf,
    pub redis_url: Option<String>,
    pub login_path: String,
    pub home_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: "http://127.0.0.1:5000".to_string(),
            session_ttl_minutes: 30,
            activity_debounce_secs: 60,
            store: StoreKind::File,
            session_dir: PathBuf::from(".attendance-session"),
            redis_url: None,
            login_path: "/login".to_string(),
            home_path: "/".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Config::default();

        let session_ttl_minutes = match env::var("SESSION_TTL") {
            Ok(raw) => parse_with_suffix("SESSION_TTL", &raw, 'm', MAX_SESSION_TTL_MINUTES)?,
            Err(_) => defaults.session_ttl_minutes,
        };
        let activity_debounce_secs = match env::var("ACTIVITY_DEBOUNCE") {
            Ok(raw) => parse_with_suffix("ACTIVITY_DEBOUNCE", &raw, 's', MAX_ACTIVITY_DEBOUNCE_SECS)?,
            Err(_) => defaults.activity_debounce_secs,
        };
        let store = match env::var("SESSION_STORE") {
            Ok(raw) => parse_store_kind(&raw)?,
            Err(_) => defaults.store,
        };
        let redis_url = env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty());
        if store == StoreKind::Redis && redis_url.is_none() {
            return Err(ConfigError::Missing("REDIS_URL"));
        }

        Ok(Config {
            api_base_url: env::var("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            session_ttl_minutes,
            activity_debounce_secs,
            store,
            session_dir: env::var("SESSION_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_dir),
            redis_url,
            login_path: env::var("LOGIN_PATH").unwrap_or(defaults.login_path),
            home_path: env::var("HOME_PATH").unwrap_or(defaults.home_path),
        })
    }

    /// 字段可被直接赋值，超过上限时按上限处理
    pub fn session_ttl(&self) -> chrono::Duration {
        let minutes = self.session_ttl_minutes.min(MAX_SESSION_TTL_MINUTES);
        i64::try_from(minutes)
            .ok()
            .and_then(chrono::Duration::try_minutes)
            .unwrap_or_else(|| chrono::Duration::days(365))
    }

    pub fn activity_debounce(&self) -> Duration {
        Duration::from_secs(self.activity_debounce_secs.min(MAX_ACTIVITY_DEBOUNCE_SECS))
    }
}

// "30m" 和 "30" 都接受，取值范围 1..=max
fn parse_with_suffix(
    key: &'static str,
    raw: &str,
    suffix: char,
    max: u64,
) -> Result<u64, ConfigError> {
    let value = raw
        .trim()
        .trim_end_matches(suffix)
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid {
            key,
            value: raw.to_string(),
        })?;
    if value == 0 || value > max {
        return Err(ConfigError::Invalid {
            key,
            value: raw.to_string(),
        });
    }
    Ok(value)
}

fn parse_store_kind(raw: &str) -> Result<StoreKind, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(StoreKind::Memory),
        "file" => Ok(StoreKind::File),
        "redis" => Ok(StoreKind::Redis),
        _ => Err(ConfigError::Invalid {
            key: "SESSION_STORE",
            value: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_optional() {
        assert_eq!(parse_with_suffix("SESSION_TTL", "30m", 'm', 60).unwrap(), 30);
        assert_eq!(parse_with_suffix("SESSION_TTL", " 45 ", 'm', 60).unwrap(), 45);
        assert_eq!(parse_with_suffix("ACTIVITY_DEBOUNCE", "60s", 's', 60).unwrap(), 60);
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        assert!(matches!(
            parse_with_suffix("SESSION_TTL", "0m", 'm', MAX_SESSION_TTL_MINUTES),
            Err(ConfigError::Invalid { key: "SESSION_TTL", .. })
        ));
        assert!(parse_with_suffix("SESSION_TTL", "half an hour", 'm', MAX_SESSION_TTL_MINUTES).is_err());
    }

    #[test]
    fn out_of_range_durations_are_rejected() {
        assert!(matches!(
            parse_with_suffix("SESSION_TTL", "200000000000000m", 'm', MAX_SESSION_TTL_MINUTES),
            Err(ConfigError::Invalid { key: "SESSION_TTL", .. })
        ));
        assert!(parse_with_suffix("SESSION_TTL", "18446744073709551615", 'm', MAX_SESSION_TTL_MINUTES).is_err());
        assert!(parse_with_suffix("ACTIVITY_DEBOUNCE", "86401s", 's', MAX_ACTIVITY_DEBOUNCE_SECS).is_err());
        assert_eq!(
            parse_with_suffix("SESSION_TTL", "525600m", 'm', MAX_SESSION_TTL_MINUTES).unwrap(),
            MAX_SESSION_TTL_MINUTES
        );
    }

    #[test]
    fn oversized_fields_are_clamped() {
        let config = Config {
            session_ttl_minutes: u64::MAX,
            activity_debounce_secs: u64::MAX,
            ..Config::default()
        };
        assert_eq!(config.session_ttl(), chrono::Duration::days(365));
        assert_eq!(config.activity_debounce(), Duration::from_secs(60 * 60 * 24));

        let config = Config {
            session_ttl_minutes: 10_000_000_000_000,
            ..Config::default()
        };
        assert!(config.session_ttl() > chrono::Duration::zero());
    }

    #[test]
    fn store_kind_is_case_insensitive() {
        assert_eq!(parse_store_kind("Redis").unwrap(), StoreKind::Redis);
        assert_eq!(parse_store_kind("memory").unwrap(), StoreKind::Memory);
        assert!(parse_store_kind("sqlite").is_err());
    }

    #[test]
    fn defaults_match_thirty_minute_session() {
        let config = Config::default();
        assert_eq!(config.session_ttl(), chrono::Duration::minutes(30));
        assert_eq!(config.activity_debounce(), Duration::from_secs(60));
        assert_eq!(config.login_path, "/login");
        assert_eq!(config.home_path, "/");
    }
}
