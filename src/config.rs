// src/config.rs
use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, anyhow, bail};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Which hosted LLM API the backend forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAi),
            other => Err(anyhow!("unknown LLM_PROVIDER '{other}' (expected 'gemini' or 'openai')")),
        }
    }
}

impl ProviderKind {
    pub fn default_fast_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::OpenAi => "gpt-4o-mini",
        }
    }

    pub fn default_pro_model(self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-pro",
            Self::OpenAi => "gpt-4o",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub fast_model: String,
    pub pro_model: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub llm: LlmConfig,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub history_limit: usize,
    pub static_dir: PathBuf,
    pub admin_api_key: Option<String>,
}

impl Config {
    /// Build the configuration from process environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let mut bind_addr: SocketAddr = get("BIND_ADDR")
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .context("BIND_ADDR must be a socket address like 0.0.0.0:8000")?;
        if let Some(port) = get("PORT") {
            bind_addr.set_port(parse_number("PORT", &port)?);
        }

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => raw.parse()?,
            None => ProviderKind::Gemini,
        };
        let (key_var, url_var) = match provider {
            ProviderKind::Gemini => ("GEMINI_API_KEY", "GEMINI_BASE_URL"),
            ProviderKind::OpenAi => ("OPENAI_API_KEY", "OPENAI_BASE_URL"),
        };

        let llm = LlmConfig {
            provider,
            api_key: get(key_var),
            base_url: get(url_var),
            fast_model: get("LLM_FAST_MODEL").unwrap_or_else(|| provider.default_fast_model().to_string()),
            pro_model: get("LLM_PRO_MODEL").unwrap_or_else(|| provider.default_pro_model().to_string()),
            timeout: secs(&get, "LLM_TIMEOUT_SECS", 60)?,
        };

        let history_limit = match get("HISTORY_LIMIT") {
            Some(raw) => parse_number("HISTORY_LIMIT", &raw)?,
            None => 10,
        };
        if history_limit < 2 {
            bail!("HISTORY_LIMIT must be at least 2 to hold one exchange");
        }

        Ok(Self {
            bind_addr,
            llm,
            session_ttl: secs(&get, "SESSION_TTL_SECS", 3600)?,
            sweep_interval: secs(&get, "SESSION_SWEEP_SECS", 300)?,
            history_limit,
            static_dir: get("STATIC_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("public")),
            admin_api_key: get("ADMIN_API_KEY"),
        })
    }
}

fn secs<G>(get: &G, key: &str, default: u64) -> anyhow::Result<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    let value = match get(key) {
        Some(raw) => parse_number(key, &raw)?,
        None => default,
    };
    if value == 0 {
        bail!("{key} must be greater than 0");
    }
    Ok(Duration::from_secs(value))
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> anyhow::Result<T> {
    raw.parse()
        .map_err(|_| anyhow!("{key} must be a non-negative integer, got '{raw}'"))
}
