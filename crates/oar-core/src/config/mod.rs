//! Client configuration.
//!
//! Provides a `ClientConfig` struct resolved from the environment (and any
//! `.env` file the binary loads) that tells the sync layer where the Supabase
//! project lives and where the local database is kept.

use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::util::{has_http_scheme, non_blank};

const SUPABASE_URL_VARS: &[&str] = &["OAR_SUPABASE_URL", "EXPO_PUBLIC_SUPABASE_URL"];
const SUPABASE_ANON_KEY_VARS: &[&str] =
    &["OAR_SUPABASE_ANON_KEY", "EXPO_PUBLIC_SUPABASE_ANON_KEY"];
const ACCESS_TOKEN_VARS: &[&str] = &["OAR_ACCESS_TOKEN"];
const REACHABILITY_URL_VARS: &[&str] = &["OAR_REACHABILITY_URL"];
const DB_PATH_VARS: &[&str] = &["OAR_DB_PATH"];

/// Health endpoint probed when no explicit reachability URL is configured
const DEFAULT_HEALTH_PATH: &str = "/auth/v1/health";

/// Runtime client configuration.
///
/// User access tokens are only ever taken from the environment; `Debug`
/// output redacts them along with the anon key.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ClientConfig {
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub access_token: Option<String>,
    pub reachability_url: Option<String>,
    pub db_path: Option<PathBuf>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        formatter
            .debug_struct("ClientConfig")
            .field("supabase_url", &self.supabase_url)
            .field("supabase_anon_key", &redact(&self.supabase_anon_key))
            .field("access_token", &redact(&self.access_token))
            .field("reachability_url", &self.reachability_url)
            .field("db_path", &self.db_path)
            .finish()
    }
}

impl ClientConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    ///
    /// The first non-empty variable of each alias group wins.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let first = |names: &[&str]| {
            names
                .iter()
                .find_map(|&name| lookup(name).as_deref().and_then(non_blank))
        };

        let config = Self {
            supabase_url: first(SUPABASE_URL_VARS)
                .map(|url| normalize_http_url(&url, "supabase_url"))
                .transpose()?,
            supabase_anon_key: first(SUPABASE_ANON_KEY_VARS),
            access_token: first(ACCESS_TOKEN_VARS),
            reachability_url: first(REACHABILITY_URL_VARS)
                .map(|url| normalize_http_url(&url, "reachability_url"))
                .transpose()?,
            db_path: first(DB_PATH_VARS).map(PathBuf::from),
        };
        Ok(config)
    }

    /// Whether enough is configured to talk to the remote store
    pub const fn has_remote(&self) -> bool {
        self.supabase_url.is_some() && self.supabase_anon_key.is_some()
    }

    /// Fail unless the remote store can be reached with this configuration.
    pub fn require_remote(&self) -> Result<()> {
        if self.supabase_url.is_none() {
            return Err(Error::Config(format!(
                "Supabase URL is not configured (set {})",
                SUPABASE_URL_VARS.join(" or ")
            )));
        }
        if self.supabase_anon_key.is_none() {
            return Err(Error::Config(format!(
                "Supabase anon key is not configured (set {})",
                SUPABASE_ANON_KEY_VARS.join(" or ")
            )));
        }
        Ok(())
    }

    /// URL the connectivity probe should hit.
    ///
    /// Prefers `reachability_url`; otherwise derives the Supabase auth health
    /// endpoint from `supabase_url`.
    pub fn reachability_probe_url(&self) -> Option<String> {
        if let Some(url) = &self.reachability_url {
            return Some(url.clone());
        }
        self.supabase_url
            .as_deref()
            .map(|base| format!("{base}{DEFAULT_HEALTH_PATH}"))
    }
}

fn normalize_http_url(raw: &str, field: &str) -> Result<String> {
    let value = raw.trim();
    if has_http_scheme(value) {
        Ok(value.trim_end_matches('/').to_string())
    } else {
        Err(Error::Config(format!(
            "config field '{field}' must include http:// or https://"
        )))
    }
}
