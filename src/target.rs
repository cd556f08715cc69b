//! Zendesk resource targets and their API capabilities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ZendeskError;

/// A Zendesk resource category requested from the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Tickets,
    Users,
    Organizations,
    TicketEvents,
    TicketMetrics,
    TicketFields,
    TicketForms,
}

impl Target {
    pub const ALL: [Target; 7] = [
        Target::Tickets,
        Target::Users,
        Target::Organizations,
        Target::TicketEvents,
        Target::TicketMetrics,
        Target::TicketFields,
        Target::TicketForms,
    ];

    /// Name used in API paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Tickets => "tickets",
            Target::Users => "users",
            Target::Organizations => "organizations",
            Target::TicketEvents => "ticket_events",
            Target::TicketMetrics => "ticket_metrics",
            Target::TicketFields => "ticket_fields",
            Target::TicketForms => "ticket_forms",
        }
    }

    /// Whether the target is served by the incremental export API
    pub fn supports_incremental(&self) -> bool {
        !matches!(self, Target::TicketFields | Target::TicketForms)
    }

    /// Whether the target accepts `include=` sideloads
    pub fn supports_include(&self) -> bool {
        matches!(
            self,
            Target::Tickets | Target::Users | Target::Organizations | Target::TicketMetrics
        )
    }

    /// Key of the records array in a response document.
    ///
    /// Ticket metrics are fetched through the tickets endpoint, so their
    /// records arrive in the sideloaded `metric_sets` array.
    pub fn records_key(&self) -> &'static str {
        match self {
            Target::TicketMetrics => "metric_sets",
            other => other.as_str(),
        }
    }

    fn supported_names() -> String {
        Target::ALL.iter().map(Target::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ZendeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Target::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                ZendeskError::Config(format!(
                    "target: '{}' is not supported. Supported targets are {}.",
                    s,
                    Target::supported_names()
                ))
            })
    }
}
