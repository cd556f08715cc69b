//! HTTP client for the Zendesk REST API
//!
//! Handles authentication, status classification, and retries with
//! exponential backoff. Rate-limited responses wait for `Retry-After`.

use log::{debug, info, warn};
use std::thread;
use std::time::Duration;
use ureq::Agent;

use crate::error::{ZendeskError, ZendeskResult};
use crate::task::PluginTask;

/// Largest response body read into memory. Incremental export pages hold up
/// to 1000 records plus sideloads, well past ureq's 10 MiB default.
pub const MAX_RESPONSE_BYTES: u64 = 512 * 1024 * 1024;

/// Issues GET requests on behalf of a task
pub trait RestClient {
    /// GET `url` and return the response body
    fn do_get(&self, url: &str, task: &PluginTask) -> ZendeskResult<String>;

    /// Like [`RestClient::do_get`], but a 404 yields `None`
    fn do_get_optional(&self, url: &str, task: &PluginTask) -> ZendeskResult<Option<String>> {
        match self.do_get(url, task) {
            Ok(body) => Ok(Some(body)),
            Err(ZendeskError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Probe `url` to confirm the task's credentials are accepted
    fn check_user_credentials(&self, url: &str, task: &PluginTask) -> ZendeskResult<()>;
}

/// What to do with a response, decided from its status
#[derive(Debug)]
enum StatusAction {
    Success(String),
    Fail(ZendeskError),
    Retry {
        error: ZendeskError,
        wait: Option<Duration>,
    },
}

fn classify(status: u16, body: String, retry_after: Option<Duration>) -> StatusAction {
    match status {
        200 => StatusAction::Success(body),
        400 | 401 | 403 => StatusAction::Fail(ZendeskError::Config(format!("[{}] {}", status, body))),
        404 => StatusAction::Fail(ZendeskError::Http { status, body }),
        409 => StatusAction::Retry {
            error: ZendeskError::Transient {
                status,
                message: "conflict".to_string(),
            },
            wait: None,
        },
        429 => StatusAction::Retry {
            error: ZendeskError::Transient {
                status,
                message: "rate limited".to_string(),
            },
            wait: retry_after,
        },
        500 | 502 | 503 | 504 => StatusAction::Retry {
            error: ZendeskError::Transient { status, message: body },
            wait: retry_after,
        },
        _ => StatusAction::Fail(ZendeskError::Http {
            status,
            body: format!("Server returns unknown status code: {}", body),
        }),
    }
}

fn is_retryable_transport(err: &ureq::Error) -> bool {
    matches!(
        err,
        ureq::Error::Io(_) | ureq::Error::Timeout(_) | ureq::Error::ConnectionFailed
    )
}

/// Parse a `Retry-After` header given in seconds
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// `ureq`-backed client
pub struct ZendeskRestClient {
    agent: Agent,
}

impl ZendeskRestClient {
    pub fn new(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();

        Self { agent }
    }

    /// One attempt: status, parsed `Retry-After`, and body
    fn send(&self, url: &str, task: &PluginTask) -> Result<(u16, Option<Duration>, String), ureq::Error> {
        let mut response = self
            .agent
            .get(url)
            .header("Authorization", &task.credentials.authorization_header())
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_retry_after);
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_RESPONSE_BYTES)
            .read_to_string()?;

        Ok((status, retry_after, body))
    }

    fn get_with_retry(&self, url: &str, task: &PluginTask) -> ZendeskResult<String> {
        let policy = task.retry;
        let mut retries = 0;

        loop {
            debug!("Fetching {} (attempt {})", url, retries + 1);

            let action = match self.send(url, task) {
                Ok((status, retry_after, body)) => {
                    debug!("Received status {} from {}", status, url);
                    classify(status, body, retry_after)
                }
                Err(e) if is_retryable_transport(&e) => StatusAction::Retry {
                    error: ZendeskError::Transport(e),
                    wait: None,
                },
                Err(e) => StatusAction::Fail(ZendeskError::Transport(e)),
            };

            match action {
                StatusAction::Success(body) => return Ok(body),
                StatusAction::Fail(err) => return Err(err),
                StatusAction::Retry { error, wait } => {
                    if retries >= policy.retry_limit {
                        warn!("Giving up on {} after {} retries: {}", url, retries, error);
                        return Err(error);
                    }
                    retries += 1;
                    let wait = wait.unwrap_or_else(|| policy.backoff(retries));
                    warn!(
                        "{}; retry {}/{} in {}s",
                        error,
                        retries,
                        policy.retry_limit,
                        wait.as_secs()
                    );
                    thread::sleep(wait);
                }
            }
        }
    }
}

impl RestClient for ZendeskRestClient {
    fn do_get(&self, url: &str, task: &PluginTask) -> ZendeskResult<String> {
        self.get_with_retry(url, task)
    }

    fn check_user_credentials(&self, url: &str, task: &PluginTask) -> ZendeskResult<()> {
        self.get_with_retry(url, task)?;
        info!(
            "Credentials accepted for {} ({})",
            task.login_url,
            task.credentials.method().as_str()
        );
        Ok(())
    }
}
