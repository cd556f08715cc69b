use colored::*;
use eyre::Result;

use crate::cli::{ConfigAction, OutputFormat};
use crate::config::Config;

pub fn run(action: ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show { format } => show(OutputFormat::resolve(format), &config.redacted()),
    }
}

fn show(format: OutputFormat, config: &Config) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(config)?);
        }
        OutputFormat::Text => {
            let unset = || "(unset)".dimmed().to_string();
            let show_opt = |v: &Option<String>| v.clone().unwrap_or_else(unset);

            println!("{}", "Zendesk Input Configuration".bold());
            println!();

            println!("{}:", "connection".cyan());
            println!("  login_url: {}", show_opt(&config.login_url));
            println!("  auth_method: {}", config.auth_method);
            println!("  username: {}", show_opt(&config.username));
            println!("  password: {}", show_opt(&config.password));
            println!("  token: {}", show_opt(&config.token));
            println!("  access_token: {}", show_opt(&config.access_token));
            println!("  connection_timeout_sec: {}", config.connection_timeout_sec);
            println!();

            println!("{}:", "request".cyan());
            println!("  target: {}", show_opt(&config.target));
            println!("  start_time: {}", show_opt(&config.start_time));
            if config.includes.is_empty() {
                println!("  includes: {}", unset());
            } else {
                println!("  includes: {}", config.includes.join(", "));
            }
            println!();

            println!("{}:", "retry".cyan());
            println!("  retry_limit: {}", config.retry_limit);
            println!("  retry_initial_wait_sec: {}", config.retry_initial_wait_sec);
            println!("  max_retry_wait_sec: {}", config.max_retry_wait_sec);
            println!();

            println!("log_level: {}", config.log_level.as_filter());
        }
    }

    Ok(())
}
