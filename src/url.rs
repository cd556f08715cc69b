//! Request URL construction for Zendesk Support targets
//!
//! Incremental-capable targets go through `/api/v2/incremental/<target>.json`
//! and are windowed by `start_time`; the rest are listed through
//! `/api/v2/<target>.json` with offset pagination.
//!
//! The ticket metrics API cannot be exported directly, so `ticket_metrics`
//! is fetched as `tickets` with `include=metric_sets`.

use lazy_regex::regex_is_match;

use crate::error::{ZendeskError, ZendeskResult};
use crate::target::Target;
use crate::task::PluginTask;

pub const API: &str = "/api/v2";
pub const API_INCREMENTAL: &str = "/api/v2/incremental";

/// Records requested per page in listing mode
pub const PER_PAGE: u32 = 100;

const METRIC_SETS: &str = "metric_sets";

/// Ordered query parameters; repeated keys are kept
#[derive(Debug, Default)]
struct Query(Vec<(&'static str, String)>);

impl Query {
    fn push(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.push((key, value.into()));
    }

    /// Extend the last `include` parameter, or start one
    fn extend_include(&mut self, names: &str) {
        if let Some((_, value)) = self.0.iter_mut().rev().find(|(key, _)| *key == "include") {
            value.push(',');
            value.push_str(names);
            return;
        }
        self.push("include", names);
    }

    fn render(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&")
    }
}

/// Build the URL for one page of the task's target
pub fn build_path(task: &PluginTask, page: u32, is_preview: bool) -> String {
    let target = task.target;
    let endpoint = endpoint_target(target);
    let incremental = endpoint.supports_incremental();
    let with_metric_sets = target == Target::TicketMetrics;
    let mut query = Query::default();

    if is_preview {
        if with_metric_sets {
            query.push("include", METRIC_SETS);
        }
        if incremental {
            query.push("start_time", "0");
        } else {
            query.push("per_page", "1");
        }
    } else {
        if incremental {
            query.push("start_time", task.start_epoch_second().to_string());
        } else {
            query.push("sort_by", "id");
            query.push("per_page", PER_PAGE.to_string());
            query.push("page", page.to_string());
        }
        if with_metric_sets {
            query.push("include", METRIC_SETS);
        }
    }

    let includes = joined_includes(&task.includes);
    if !includes.is_empty() && target.supports_include() {
        if !is_preview && with_metric_sets {
            query.extend_include(&includes);
        } else {
            query.push("include", includes);
        }
    }

    format!(
        "{}{}/{}.json?{}",
        task.login_url,
        if incremental { API_INCREMENTAL } else { API },
        endpoint,
        query.render()
    )
}

/// URL of the lightweight credential probe
pub fn credential_check_path(login_url: &str) -> String {
    format!("{}{}/users/me.json", login_url.trim_end_matches('/'), API)
}

/// URL of a per-record subresource, e.g. `/api/v2/tickets/<id>/comments.json`
pub fn subresource_path(login_url: &str, base: Target, id: u64, name: &str) -> ZendeskResult<String> {
    if !regex_is_match!(r"^[a-z][a-z0-9_]*$", name) {
        return Err(ZendeskError::Config(format!("subresource: '{}' is not a valid resource name", name)));
    }
    Ok(format!(
        "{}{}/{}/{}/{}.json",
        login_url.trim_end_matches('/'),
        API,
        endpoint_target(base),
        id,
        name
    ))
}

fn endpoint_target(target: Target) -> Target {
    match target {
        Target::TicketMetrics => Target::Tickets,
        other => other,
    }
}

fn joined_includes(includes: &[String]) -> String {
    includes
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
