use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;

use crate::config::Overrides;

/// Output format for commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

impl OutputFormat {
    /// Resolve the effective output format.
    /// If user specified a format, use it.
    /// Otherwise: TTY → Text, non-TTY (pipe) → Json
    pub fn resolve(user_choice: Option<OutputFormat>) -> OutputFormat {
        match user_choice {
            Some(fmt) => fmt,
            None => {
                if std::io::stdout().is_terminal() {
                    OutputFormat::Text
                } else {
                    OutputFormat::Json
                }
            }
        }
    }
}

#[derive(Parser)]
#[command(
    name = "zendesk-input",
    about = "Pull data from the Zendesk Support REST API",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/zendesk-input/logs/zendesk-input.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to zendesk.yaml config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Log at debug level")]
    pub verbose: bool,

    /// Override the configured target
    #[arg(long, global = true)]
    pub target: Option<String>,

    /// Override the configured start time (ISO-8601)
    #[arg(long, global = true)]
    pub start_time: Option<String>,

    /// Override the configured include list (repeatable)
    #[arg(long = "include", global = true)]
    pub includes: Vec<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            target: self.target.clone(),
            start_time: self.start_time.clone(),
            includes: self.includes.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the request URL for a page
    Url {
        /// Page number (listing targets only)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Build the cheap preview URL instead
        #[arg(long)]
        preview: bool,
    },

    /// Fetch one page from the API
    Fetch {
        /// Page number (listing targets only)
        #[arg(long, default_value = "1")]
        page: u32,

        /// Fetch the preview URL instead
        #[arg(long)]
        preview: bool,

        /// Request this URL as-is (e.g. a next_page link)
        #[arg(long)]
        path: Option<String>,

        /// Print records one JSON object per line
        #[arg(long)]
        records: bool,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Fetch a subresource of one record (e.g. a ticket's comments)
    Subresource {
        /// Record id of the configured target
        id: u64,

        /// Subresource name, e.g. comments, audits, identities
        name: String,

        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Check that the configured credentials are accepted
    Check,

    /// List supported targets
    Targets {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output format (default: text for TTY, json for pipes)
        #[arg(long, short = 'o', value_enum)]
        format: Option<OutputFormat>,
    },
}
