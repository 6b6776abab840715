use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{domain::ChatId, errors::Error, practicum::DEFAULT_ENDPOINT, Result};

pub const DEFAULT_RETRY_TIME: Duration = Duration::from_secs(600);
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_LOG_FILE: &str = "homework.log";

const REQUIRED_VARS: [&str; 3] = ["PRACTICUM_TOKEN", "TELEGRAM_TOKEN", "TELEGRAM_CHAT_ID"];

/// Typed configuration, read once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    // Credentials
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: ChatId,

    // Polling
    pub endpoint: String,
    pub retry_time: Duration,
    pub http_timeout: Duration,

    // Logging
    pub log_file: PathBuf,
    pub alerts_enabled: bool,
}

impl Config {
    /// Load from the process environment, after merging a `.env` file from
    /// the working directory if there is one.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. All three credentials are required.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let [practicum_token, telegram_token, raw_chat_id] = REQUIRED_VARS.map(|k| get(k));
        let missing = REQUIRED_VARS
            .iter()
            .zip([&practicum_token, &telegram_token, &raw_chat_id])
            .filter(|(_, v)| v.is_none())
            .map(|(k, _)| *k)
            .collect::<Vec<_>>();
        let (Some(practicum_token), Some(telegram_token), Some(raw_chat_id)) =
            (practicum_token, telegram_token, raw_chat_id)
        else {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let telegram_chat_id = raw_chat_id
            .trim()
            .parse::<i64>()
            .map(ChatId)
            .map_err(|_| {
                Error::Config(format!(
                    "TELEGRAM_CHAT_ID must be an integer, got {raw_chat_id:?}"
                ))
            })?;

        let endpoint = get("PRACTICUM_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        let retry_time = parse_u64(get("RETRY_TIME"))
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_TIME);
        let http_timeout = parse_u64(get("HTTP_TIMEOUT_SECS"))
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT);

        let log_file = get("HWB_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));
        let alerts_enabled = parse_bool(get("HWB_ALERTS")).unwrap_or(true);

        Ok(Self {
            practicum_token,
            telegram_token,
            telegram_chat_id,
            endpoint,
            retry_time,
            http_timeout,
            log_file,
            alerts_enabled,
        })
    }
}

/// Log file path, resolvable before the full config so logging can start
/// even when credentials are missing.
pub fn log_file_from_env() -> PathBuf {
    load_dotenv_if_present(Path::new(".env"));
    env::var("HWB_LOG_FILE")
        .ok()
        .and_then(non_empty)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let line = line.strip_prefix("export ").unwrap_or(line);
        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(v: Option<String>) -> Option<bool> {
    v.map(|s| {
        matches!(
            s.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse::<u64>().ok())
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
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
        move |k: &str| map.get(k).cloned()
    }

    const CREDS: [(&str, &str); 3] = [
        ("PRACTICUM_TOKEN", "p"),
        ("TELEGRAM_TOKEN", "t"),
        ("TELEGRAM_CHAT_ID", "-100123"),
    ];

    #[test]
    fn defaults_with_credentials_only() {
        let cfg = Config::from_lookup(lookup(&CREDS)).unwrap();
        assert_eq!(cfg.telegram_chat_id, ChatId(-100123));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.retry_time, DEFAULT_RETRY_TIME);
        assert_eq!(cfg.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert_eq!(cfg.log_file, PathBuf::from("homework.log"));
        assert!(cfg.alerts_enabled);
    }

    #[test]
    fn missing_credentials_are_listed() {
        let err = Config::from_lookup(lookup(&[("TELEGRAM_TOKEN", "t"), ("PRACTICUM_TOKEN", " ")]))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("PRACTICUM_TOKEN"));
        assert!(msg.contains("TELEGRAM_CHAT_ID"));
        assert!(!msg.contains("TELEGRAM_TOKEN,"));
    }

    #[test]
    fn credentials_are_read_once() {
        let seen = std::cell::RefCell::new(Vec::new());
        let inner = lookup(&CREDS);
        Config::from_lookup(|k: &str| {
            seen.borrow_mut().push(k.to_string());
            inner(k)
        })
        .unwrap();

        let seen = seen.into_inner();
        for key in REQUIRED_VARS {
            assert_eq!(seen.iter().filter(|k| *k == key).count(), 1, "{key}");
        }
    }

    #[test]
    fn non_numeric_chat_id_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "p"),
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "@channel"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn overrides_are_applied() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([
            ("RETRY_TIME", "30"),
            ("HTTP_TIMEOUT_SECS", "0"),
            ("HWB_ALERTS", "off"),
            ("PRACTICUM_ENDPOINT", "http://localhost:8080/"),
        ]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.retry_time, Duration::from_secs(30));
        assert_eq!(cfg.http_timeout, DEFAULT_HTTP_TIMEOUT);
        assert!(!cfg.alerts_enabled);
        assert_eq!(cfg.endpoint, "http://localhost:8080/");
    }

    #[test]
    fn dotenv_parsing() {
        let parsed = parse_dotenv(
            "# comment\nexport PRACTICUM_TOKEN=\"abc\"\n\nTELEGRAM_CHAT_ID = '42'\nbroken\n=x\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("PRACTICUM_TOKEN".to_string(), "abc".to_string()),
                ("TELEGRAM_CHAT_ID".to_string(), "42".to_string()),
            ]
        );
    }
}
