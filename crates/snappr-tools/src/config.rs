//! Process configuration, resolved once from the environment at start-up.

use crate::error::{Result, SnapprError};
use std::fmt;
use std::time::Duration;
use tracing::warn;
use url::Url;

pub const API_KEY_VAR: &str = "SNAPPR_API_KEY";
pub const BASE_URL_VAR: &str = "SNAPPR_BASE_URL";
/// Legacy sandbox toggle. Superseded by [`BASE_URL_VAR`]; only produces a warning.
pub const USE_SANDBOX_VAR: &str = "SNAPPR_USE_SANDBOX";

pub const PRODUCTION_BASE_URL: &str = "https://api.snappr.com/";
pub const SANDBOX_BASE_URL: &str = "https://sandbox.snappr.com/";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Values shipped in docs and templates that must never reach the Snappr API.
const PLACEHOLDER_API_KEYS: &[&str] = &[
    "your_api_key_here",
    "your-api-key-here",
    "your_api_key",
    "your-api-key",
    "your_snappr_api_key",
    "your-snappr-api-key",
    "api_key_here",
    "changeme",
    "change_me",
    "replace_me",
    "replace-me",
    "todo",
    "xxx",
];

/// A Snappr API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Validate a raw API key.
    ///
    /// # Errors
    ///
    /// Returns [`SnapprError::Config`] if the key is blank or a known placeholder value.
    pub fn parse(raw: &str) -> Result<Self> {
        let key = raw.trim();
        if key.is_empty() {
            return Err(SnapprError::Config(format!("{API_KEY_VAR} is empty")));
        }
        if is_placeholder(key) {
            return Err(SnapprError::Config(format!(
                "{API_KEY_VAR} is still set to the placeholder value '{key}'; set it to your Snappr API key"
            )));
        }
        Ok(Self(key.to_string()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted, {} chars>)", self.0.len())
    }
}

fn is_placeholder(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    if PLACEHOLDER_API_KEYS.contains(&lowered.as_str()) {
        return true;
    }
    // Template markers such as `<your_api_key>` or `${SNAPPR_API_KEY}`.
    (lowered.starts_with('<') && lowered.ends_with('>'))
        || (lowered.starts_with("${") && lowered.ends_with('}'))
}

/// Immutable configuration shared by the HTTP client and every tool handler.
#[derive(Debug, Clone)]
pub struct SnapprConfig {
    api_key: ApiKey,
    base_url: Url,
    timeout: Option<Duration>,
}

impl SnapprConfig {
    #[must_use]
    pub fn new(api_key: ApiKey, base_url: Url) -> Self {
        Self {
            api_key,
            base_url,
            timeout: Some(DEFAULT_TIMEOUT),
        }
    }

    /// Resolve configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`SnapprConfig::from_lookup`].
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve configuration from an arbitrary variable lookup (used by tests).
    ///
    /// # Errors
    ///
    /// Returns [`SnapprError::Config`] if the API key is missing, blank or a placeholder, or if
    /// the base URL override is not an absolute `http(s)` URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let raw_key = lookup(API_KEY_VAR).ok_or_else(|| {
            SnapprError::Config(format!(
                "{API_KEY_VAR} environment variable is required (export {API_KEY_VAR}=<your key>)"
            ))
        })?;
        let api_key = ApiKey::parse(&raw_key)?;

        if let Some(sandbox) = lookup(USE_SANDBOX_VAR) {
            warn!(
                value = %sandbox,
                "{USE_SANDBOX_VAR} is no longer supported and is ignored; set {BASE_URL_VAR}={SANDBOX_BASE_URL} to target the sandbox"
            );
        }

        let base_url = match lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_base_url(&raw)?,
            None => parse_base_url(PRODUCTION_BASE_URL)?,
        };

        Ok(Self::new(api_key, base_url))
    }

    /// Override the per-request timeout. `None` disables it.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Parse a base URL, normalizing it so that relative endpoint paths join *below* it.
///
/// # Errors
///
/// Returns [`SnapprError::Config`] for unparsable URLs or non-`http(s)` schemes.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let mut url = Url::parse(raw)
        .map_err(|e| SnapprError::Config(format!("Invalid {BASE_URL_VAR} '{raw}': {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SnapprError::Config(format!(
            "Invalid {BASE_URL_VAR} '{raw}': unsupported scheme '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(SnapprError::Config(format!(
            "Invalid {BASE_URL_VAR} '{raw}': missing host"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
