use std::{env, fmt, fs, path::Path, time::Duration};

use crate::{
    domain::{ChatTarget, HomeworkStatus, Timestamp},
    errors::Error,
    Result,
};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_RETRY_SECS: u64 = 600;

const PRACTICUM_TOKEN: &str = "PRACTICUM_TOKEN";
const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
const TELEGRAM_TOKEN_LEGACY: &str = "TOKEN";
const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Human-readable verdict attached to each review status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdicts {
    pub approved: String,
    pub reviewing: String,
    pub rejected: String,
}

impl Verdicts {
    pub fn verdict(&self, status: HomeworkStatus) -> &str {
        match status {
            HomeworkStatus::Approved => &self.approved,
            HomeworkStatus::Reviewing => &self.reviewing,
            HomeworkStatus::Rejected => &self.rejected,
        }
    }
}

impl Default for Verdicts {
    fn default() -> Self {
        Self {
            approved: "Работа проверена: ревьюеру всё понравилось. Ура!".to_string(),
            reviewing: "Работа взята на проверку ревьюером.".to_string(),
            rejected: "Работа проверена: у ревьюера есть замечания.".to_string(),
        }
    }
}

/// Typed, immutable configuration built once at startup.
#[derive(Clone)]
pub struct Config {
    // Credentials
    pub practicum_token: String,
    pub telegram_bot_token: String,
    pub telegram_chat_id: ChatTarget,

    // Review API
    pub endpoint: String,
    pub from_date: Option<Timestamp>,

    // Poll loop
    pub retry_interval: Duration,
    pub relay_errors: bool,
    pub notify_unchanged: bool,

    pub verdicts: Verdicts,
}

impl Config {
    /// Load from the process environment, after reading `.env` if present.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    ///
    /// Every missing credential is logged before the error is returned, so the
    /// operator sees all of them in one run.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let practicum_token = get(PRACTICUM_TOKEN);
        let telegram_bot_token = get(TELEGRAM_TOKEN).or_else(|| get(TELEGRAM_TOKEN_LEGACY));
        let telegram_chat_id = get(TELEGRAM_CHAT_ID);

        let mut missing = Vec::new();
        if practicum_token.is_none() {
            missing.push(PRACTICUM_TOKEN);
        }
        if telegram_bot_token.is_none() {
            missing.push(TELEGRAM_TOKEN);
        }
        if telegram_chat_id.is_none() {
            missing.push(TELEGRAM_CHAT_ID);
        }
        for name in &missing {
            tracing::error!("missing required environment variable: {name}");
        }

        let (Some(practicum_token), Some(telegram_bot_token), Some(telegram_chat_id)) =
            (practicum_token, telegram_bot_token, telegram_chat_id)
        else {
            return Err(Error::Config(format!(
                "missing required environment variables: {}",
                missing.join(", ")
            )));
        };

        let telegram_chat_id = telegram_chat_id
            .parse::<ChatTarget>()
            .unwrap_or_else(|never| match never {});

        let endpoint = get("HOMEWORK_ENDPOINT").unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let from_date = match get("FROM_DATE") {
            Some(raw) => Some(Timestamp(raw.trim().parse::<i64>().map_err(|_| {
                Error::Config(format!("FROM_DATE must be an integer timestamp, got {raw:?}"))
            })?)),
            None => None,
        };

        let retry_secs = match get("RETRY_TIME") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::Config(format!("RETRY_TIME must be a number of seconds, got {raw:?}"))
            })?,
            None => DEFAULT_RETRY_SECS,
        };
        if retry_secs == 0 {
            return Err(Error::Config("RETRY_TIME must be greater than zero".to_string()));
        }

        let relay_errors = parse_bool(get("RELAY_ERRORS")).unwrap_or(true);
        let notify_unchanged = parse_bool(get("NOTIFY_UNCHANGED")).unwrap_or(false);

        Ok(Self {
            practicum_token,
            telegram_bot_token,
            telegram_chat_id,
            endpoint,
            from_date,
            retry_interval: Duration::from_secs(retry_secs),
            relay_errors,
            notify_unchanged,
            verdicts: Verdicts::default(),
        })
    }
}

// Tokens stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("practicum_token", &"<redacted>")
            .field("telegram_bot_token", &"<redacted>")
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("from_date", &self.from_date)
            .field("retry_interval", &self.retry_interval)
            .field("relay_errors", &self.relay_errors)
            .field("notify_unchanged", &self.notify_unchanged)
            .finish()
    }
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

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::errors::ErrorKind;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDS: [(&str, &str); 3] = [
        ("PRACTICUM_TOKEN", "p-token"),
        ("TELEGRAM_TOKEN", "t-token"),
        ("TELEGRAM_CHAT_ID", "42"),
    ];

    #[test]
    fn loads_defaults_with_credentials_only() {
        let cfg = Config::from_lookup(lookup(&CREDS)).unwrap();
        assert_eq!(cfg.practicum_token, "p-token");
        assert_eq!(cfg.telegram_bot_token, "t-token");
        assert_eq!(cfg.telegram_chat_id, ChatTarget::Id(42));
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.retry_interval, Duration::from_secs(600));
        assert_eq!(cfg.from_date, None);
        assert!(cfg.relay_errors);
        assert!(!cfg.notify_unchanged);
        assert_eq!(cfg.verdicts, Verdicts::default());
    }

    #[test]
    fn each_missing_credential_fails_startup() {
        for skip in 0..CREDS.len() {
            let pairs: Vec<_> = CREDS
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != skip)
                .map(|(_, p)| *p)
                .collect();
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EnvMisconfigured);
            assert!(err.message().contains(CREDS[skip].0), "{err}");
        }
    }

    #[test]
    fn blank_credential_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "   "),
            ("TELEGRAM_TOKEN", "t"),
            ("TELEGRAM_CHAT_ID", "1"),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EnvMisconfigured);
    }

    #[test]
    fn legacy_bot_token_name_is_accepted() {
        let cfg = Config::from_lookup(lookup(&[
            ("PRACTICUM_TOKEN", "p"),
            ("TOKEN", "legacy"),
            ("TELEGRAM_CHAT_ID", "@reviews"),
        ]))
        .unwrap();
        assert_eq!(cfg.telegram_bot_token, "legacy");
        assert_eq!(
            cfg.telegram_chat_id,
            ChatTarget::Username("@reviews".to_string())
        );
    }

    #[test]
    fn optional_settings_override_defaults() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([
            ("HOMEWORK_ENDPOINT", "http://localhost:9000/hw"),
            ("RETRY_TIME", "30"),
            ("FROM_DATE", "0"),
            ("RELAY_ERRORS", "off"),
            ("NOTIFY_UNCHANGED", "yes"),
        ]);
        let cfg = Config::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.endpoint, "http://localhost:9000/hw");
        assert_eq!(cfg.retry_interval, Duration::from_secs(30));
        assert_eq!(cfg.from_date, Some(Timestamp(0)));
        assert!(!cfg.relay_errors);
        assert!(cfg.notify_unchanged);
    }

    #[test]
    fn invalid_numbers_are_config_errors() {
        for (key, val) in [("RETRY_TIME", "soon"), ("RETRY_TIME", "0"), ("FROM_DATE", "yesterday")] {
            let mut pairs = CREDS.to_vec();
            pairs.push((key, val));
            let err = Config::from_lookup(lookup(&pairs)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EnvMisconfigured, "{key}={val}");
        }
    }

    #[test]
    fn debug_output_redacts_tokens() {
        let cfg = Config::from_lookup(lookup(&CREDS)).unwrap();
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("p-token"));
        assert!(!dbg.contains("t-token"));
    }

    #[test]
    fn dotenv_parser_handles_comments_quotes_and_export() {
        let parsed = parse_dotenv(
            "# comment\n\nPRACTICUM_TOKEN=\"abc\"\nexport TOKEN='xyz'\nBROKEN\n=novalue\n",
        );
        assert_eq!(
            parsed,
            vec![
                ("PRACTICUM_TOKEN".to_string(), "abc".to_string()),
                ("TOKEN".to_string(), "xyz".to_string()),
            ]
        );
    }
}
