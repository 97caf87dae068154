use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

const DEFAULT_BULLETIN_URL: &str = "https://www.gobiernodecanarias.org/boc/";
const DEFAULT_KEYWORDS: &str = "administrativo, auxiliar administrativo";
const DEFAULT_MEMORY_FILE: &str = "seen_announcements.json";
const DEFAULT_POLL_INTERVAL_SECONDS: u64 = 24 * 3600;

// Twilio sandbox number
const DEFAULT_FROM_WHATSAPP: &str = "whatsapp:+14155238886";

const USER_AGENT: &str = "Mozilla/5.0 (compatible; BocMonitorBot/1.0)";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Immutable runtime configuration, built once at startup.
///
/// Components receive this value instead of reading the environment
/// themselves, so a missing credential fails the process before the
/// first pass instead of on the first send.
#[derive(Debug, Clone)]
pub struct Config {
    pub keywords: Vec<String>,
    pub bulletin_url: String,
    /// Scheme and host of the bulletin URL, used to absolutize hrefs.
    pub base_url: String,
    pub memory_path: PathBuf,
    pub poll_interval: Duration,
    pub run_once: bool,
    pub heartbeat_on_empty: bool,
    pub dedup_within_pass: bool,
    pub persist_always: bool,
    pub user_agent: String,
    pub http_timeout: Duration,
    pub twilio: TwilioConfig,
}

#[derive(Debug, Clone)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    pub from_whatsapp: String,
    pub to_whatsapp: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let twilio = TwilioConfig {
            account_sid: require_env("TWILIO_ACCOUNT_SID")?,
            auth_token: require_env("TWILIO_AUTH_TOKEN")?,
            from_whatsapp: env_or("FROM_WHATSAPP", DEFAULT_FROM_WHATSAPP),
            to_whatsapp: require_env("TO_WHATSAPP")?,
        };

        let bulletin_url = env_or("BULLETIN_URL", DEFAULT_BULLETIN_URL);
        let base_url = site_root(&bulletin_url)?;

        let keywords = parse_keywords(&env_or("KEYWORDS", DEFAULT_KEYWORDS));
        if keywords.is_empty() {
            bail!("KEYWORDS must contain at least one keyword");
        }

        Ok(Config {
            keywords,
            bulletin_url,
            base_url,
            memory_path: PathBuf::from(env_or("MEMORY_FILE", DEFAULT_MEMORY_FILE)),
            poll_interval: Duration::from_secs(parse_env(
                "POLL_INTERVAL_SECONDS",
                DEFAULT_POLL_INTERVAL_SECONDS,
            )?),
            run_once: parse_bool_env("RUN_ONCE", false)?,
            heartbeat_on_empty: parse_bool_env("HEARTBEAT_ON_EMPTY", false)?,
            dedup_within_pass: parse_bool_env("DEDUP_WITHIN_PASS", false)?,
            persist_always: parse_bool_env("PERSIST_ALWAYS", true)?,
            user_agent: USER_AGENT.to_string(),
            http_timeout: HTTP_TIMEOUT,
            twilio,
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            keywords: parse_keywords(DEFAULT_KEYWORDS),
            bulletin_url: DEFAULT_BULLETIN_URL.to_string(),
            base_url: site_root(DEFAULT_BULLETIN_URL).unwrap(),
            memory_path: PathBuf::from(DEFAULT_MEMORY_FILE),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECONDS),
            run_once: true,
            heartbeat_on_empty: false,
            dedup_within_pass: false,
            persist_always: true,
            user_agent: USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(2),
            twilio: TwilioConfig {
                account_sid: "ACtest".to_string(),
                auth_token: "token".to_string(),
                from_whatsapp: DEFAULT_FROM_WHATSAPP.to_string(),
                to_whatsapp: "whatsapp:+34600000000".to_string(),
            },
        }
    }
}

/// Scheme and host of a page URL, e.g. `https://www.gobiernodecanarias.org`.
pub(crate) fn site_root(page_url: &str) -> Result<String> {
    let parsed = Url::parse(page_url).with_context(|| format!("invalid bulletin URL: {page_url}"))?;
    let host = parsed
        .host_str()
        .with_context(|| format!("bulletin URL has no host: {page_url}"))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}

fn require_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => bail!("missing required environment variable {name}"),
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a number of seconds, got {value:?}")),
        Err(_) => Ok(default),
    }
}

fn parse_bool_env(name: &str, default: bool) -> Result<bool> {
    match env::var(name) {
        Ok(value) => match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            other => bail!("{name} must be a boolean, got {other:?}"),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_site_root_strips_path() {
        assert_eq!(
            site_root("https://www.gobiernodecanarias.org/boc/").unwrap(),
            "https://www.gobiernodecanarias.org"
        );
    }

    #[test]
    fn test_site_root_keeps_port() {
        assert_eq!(
            site_root("http://127.0.0.1:8080/boc/").unwrap(),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_site_root_rejects_garbage() {
        assert!(site_root("not a url").is_err());
    }

    #[test]
    fn test_parse_keywords_lowercases_and_trims() {
        assert_eq!(
            parse_keywords("Administrativo, Auxiliar Administrativo ,,"),
            vec!["administrativo".to_string(), "auxiliar administrativo".to_string()]
        );
    }
}
