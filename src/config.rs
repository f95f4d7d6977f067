use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::store::DEFAULT_MAX_ROWS;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; SEO-Analyzer/1.0)";

/// Runtime settings, read from `SEO_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub workers: usize,
    pub user_agent: String,
    pub fetch_timeout: Duration,
    pub max_concurrent_fetches: usize,
    /// Stored analyses younger than this are served without refetching.
    pub cache_ttl: Duration,
    /// Upper bound on analyses kept in memory.
    pub store_max_rows: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".into(),
            workers: 2,
            user_agent: DEFAULT_USER_AGENT.into(),
            fetch_timeout: Duration::from_secs(10),
            max_concurrent_fetches: 8,
            cache_ttl: Duration::from_secs(60 * 60),
            store_max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            bind: lookup("SEO_BIND").unwrap_or(d.bind),
            workers: parse(&lookup, "SEO_WORKERS")?.unwrap_or(d.workers),
            user_agent: lookup("SEO_USER_AGENT").unwrap_or(d.user_agent),
            fetch_timeout: parse(&lookup, "SEO_FETCH_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(d.fetch_timeout),
            max_concurrent_fetches: parse(&lookup, "SEO_MAX_CONCURRENT_FETCHES")?
                .unwrap_or(d.max_concurrent_fetches),
            cache_ttl: parse(&lookup, "SEO_CACHE_TTL_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(d.cache_ttl),
            store_max_rows: parse(&lookup, "SEO_STORE_MAX_ROWS")?.unwrap_or(d.store_max_rows),
        })
    }
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| raw.trim().parse::<T>().with_context(|| format!("{key}={raw:?} is not valid")))
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn from(pairs: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let cfg = from(&[]).unwrap();
        assert_eq!(cfg.bind, "127.0.0.1:5000");
        assert_eq!(cfg.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(cfg.fetch_timeout, Duration::from_secs(10));
        assert_eq!(cfg.cache_ttl, Duration::from_secs(3600));
        assert_eq!(cfg.store_max_rows, DEFAULT_MAX_ROWS);
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = from(&[
            ("SEO_BIND", "0.0.0.0:8080"),
            ("SEO_WORKERS", "4"),
            ("SEO_CACHE_TTL_SECS", " 60 "),
            ("SEO_STORE_MAX_ROWS", "250"),
        ])
        .unwrap();
        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(60));
        assert_eq!(cfg.store_max_rows, 250);
    }

    #[test]
    fn bad_number_is_an_error() {
        let err = from(&[("SEO_FETCH_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("SEO_FETCH_TIMEOUT_SECS"));
    }
}
