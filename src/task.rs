//! Validated, immutable task configuration

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ZendeskError, ZendeskResult};
use crate::target::Target;

/// Supported authentication methods
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    #[default]
    Basic,
    Token,
    Oauth,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::Basic => "basic",
            AuthMethod::Token => "token",
            AuthMethod::Oauth => "oauth",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = ZendeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(AuthMethod::Basic),
            "token" => Ok(AuthMethod::Token),
            "oauth" => Ok(AuthMethod::Oauth),
            _ => Err(ZendeskError::Config(format!(
                "Unknown auth_method ({}). Should pick one from 'basic', 'token' or 'oauth'.",
                s
            ))),
        }
    }
}

/// Credentials resolved for one auth method
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { username: String, password: String },
    Token { username: String, token: String },
    Oauth { access_token: String },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Basic { username, .. } => {
                f.debug_struct("Basic").field("username", username).finish_non_exhaustive()
            }
            Credentials::Token { username, .. } => {
                f.debug_struct("Token").field("username", username).finish_non_exhaustive()
            }
            Credentials::Oauth { .. } => f.debug_struct("Oauth").finish_non_exhaustive(),
        }
    }
}

impl Credentials {
    /// Pick the credentials the method needs, failing when any are missing
    pub fn resolve(
        method: AuthMethod,
        username: Option<&str>,
        password: Option<&str>,
        token: Option<&str>,
        access_token: Option<&str>,
    ) -> ZendeskResult<Self> {
        // blank counts as missing, but kept values are sent verbatim
        let present = |v: Option<&str>| v.filter(|s| !s.trim().is_empty()).map(str::to_string);

        let resolved = match method {
            AuthMethod::Basic => present(username)
                .zip(present(password))
                .map(|(username, password)| Credentials::Basic { username, password }),
            AuthMethod::Token => present(username)
                .zip(present(token))
                .map(|(username, token)| Credentials::Token { username, token }),
            AuthMethod::Oauth => present(access_token).map(|access_token| Credentials::Oauth { access_token }),
        };

        resolved.ok_or_else(|| {
            ZendeskError::Config(format!("Missing required credentials for {}", method.as_str()))
        })
    }

    pub fn method(&self) -> AuthMethod {
        match self {
            Credentials::Basic { .. } => AuthMethod::Basic,
            Credentials::Token { .. } => AuthMethod::Token,
            Credentials::Oauth { .. } => AuthMethod::Oauth,
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization_header(&self) -> String {
        match self {
            Credentials::Basic { username, password } => {
                format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
            }
            Credentials::Token { username, token } => {
                format!("Basic {}", STANDARD.encode(format!("{}/token:{}", username, token)))
            }
            Credentials::Oauth { access_token } => format!("Bearer {}", access_token),
        }
    }
}

/// Retry and backoff settings for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryPolicy {
    pub retry_limit: u32,
    pub initial_wait_sec: u64,
    pub max_wait_sec: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retry_limit: 5,
            initial_wait_sec: 4,
            max_wait_sec: 60,
        }
    }
}

impl RetryPolicy {
    /// Wait before retry number `attempt` (1-based): doubles each time, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32);
        let wait = self.initial_wait_sec.saturating_mul(1u64 << exponent);
        Duration::from_secs(wait.min(self.max_wait_sec))
    }
}

/// Everything needed to build and issue requests for one target
#[derive(Debug, Clone)]
pub struct PluginTask {
    pub login_url: String,
    pub target: Target,
    pub start_time: Option<DateTime<Utc>>,
    pub includes: Vec<String>,
    pub credentials: Credentials,
    pub retry: RetryPolicy,
    pub connection_timeout: Duration,
}

impl PluginTask {
    pub fn new(login_url: &str, target: Target, credentials: Credentials) -> ZendeskResult<Self> {
        Ok(Self {
            login_url: normalize_login_url(login_url)?,
            target,
            start_time: None,
            includes: Vec::new(),
            credentials,
            retry: RetryPolicy::default(),
            connection_timeout: Duration::from_secs(300),
        })
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn with_includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = includes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Start time in epoch seconds, 0 when unset
    pub fn start_epoch_second(&self) -> i64 {
        self.start_time.map(|dt| dt.timestamp()).unwrap_or(0)
    }
}

/// Validate a login URL and strip trailing slashes
pub fn normalize_login_url(login_url: &str) -> ZendeskResult<String> {
    let trimmed = login_url.trim().trim_end_matches('/');
    if !regex_is_match!(r"^https?://[^/\s?#]+(/[^\s?#]*)?$", trimmed) {
        return Err(ZendeskError::Config(format!(
            "login_url: '{}' must look like https://<subdomain>.zendesk.com",
            login_url
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic() -> Credentials {
        Credentials::Basic {
            username: "agent@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    #[test]
    fn test_auth_method_from_str() {
        assert_eq!("TOKEN".parse::<AuthMethod>().unwrap(), AuthMethod::Token);
        let err = "kerberos".parse::<AuthMethod>().unwrap_err();
        assert!(err.to_string().contains("Unknown auth_method (kerberos)"));
    }

    #[test]
    fn test_resolve_basic() {
        let creds = Credentials::resolve(AuthMethod::Basic, Some("u"), Some("p"), None, None).unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "u".to_string(),
                password: "p".to_string()
            }
        );
    }

    #[test]
    fn test_resolve_missing_password() {
        let err = Credentials::resolve(AuthMethod::Basic, Some("u"), None, Some("t"), None).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.to_string(), "Configuration error: Missing required credentials for basic");
    }

    #[test]
    fn test_resolve_token_ignores_blank() {
        let err = Credentials::resolve(AuthMethod::Token, Some("u"), None, Some("  "), None).unwrap_err();
        assert!(err.to_string().contains("for token"));
    }

    #[test]
    fn test_resolve_keeps_surrounding_whitespace() {
        let creds = Credentials::resolve(AuthMethod::Basic, Some("u"), Some("secret "), None, None).unwrap();
        assert_eq!(
            creds,
            Credentials::Basic {
                username: "u".to_string(),
                password: "secret ".to_string()
            }
        );
        // "u:secret "
        assert_eq!(creds.authorization_header(), "Basic dTpzZWNyZXQg");
    }

    #[test]
    fn test_resolve_oauth() {
        let creds = Credentials::resolve(AuthMethod::Oauth, None, None, None, Some("abc")).unwrap();
        assert_eq!(creds.method(), AuthMethod::Oauth);
    }

    #[test]
    fn test_authorization_headers() {
        // "u:p"
        assert_eq!(
            Credentials::Basic {
                username: "u".to_string(),
                password: "p".to_string()
            }
            .authorization_header(),
            "Basic dTpw"
        );
        // "u/token:t"
        assert_eq!(
            Credentials::Token {
                username: "u".to_string(),
                token: "t".to_string()
            }
            .authorization_header(),
            "Basic dS90b2tlbjp0"
        );
        assert_eq!(
            Credentials::Oauth {
                access_token: "abc".to_string()
            }
            .authorization_header(),
            "Bearer abc"
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", basic());
        assert!(rendered.contains("agent@example.com"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            retry_limit: 5,
            initial_wait_sec: 4,
            max_wait_sec: 20,
        };
        assert_eq!(policy.backoff(1), Duration::from_secs(4));
        assert_eq!(policy.backoff(2), Duration::from_secs(8));
        assert_eq!(policy.backoff(3), Duration::from_secs(16));
        assert_eq!(policy.backoff(4), Duration::from_secs(20));
        assert_eq!(policy.backoff(100), Duration::from_secs(20));
    }

    #[test]
    fn test_normalize_login_url() {
        assert_eq!(
            normalize_login_url("https://acme.zendesk.com/").unwrap(),
            "https://acme.zendesk.com"
        );
        assert_eq!(
            normalize_login_url("http://127.0.0.1:8080").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert!(normalize_login_url("acme.zendesk.com").is_err());
        assert!(normalize_login_url("https://acme.zendesk.com?x=1").is_err());
    }

    #[test]
    fn test_start_epoch_defaults_to_zero() {
        let task = PluginTask::new("https://acme.zendesk.com", Target::Tickets, basic()).unwrap();
        assert_eq!(task.start_epoch_second(), 0);

        let start = crate::dates::parse_iso("2019-01-01T00:00:00Z").unwrap();
        let task = task.with_start_time(start);
        assert_eq!(task.start_epoch_second(), 1546300800);
    }
}
