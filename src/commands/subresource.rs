//! Fetch the subresource records of a single record

use colored::*;
use eyre::{Context, Result};
use log::info;

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::service::ZendeskSupportApiService;

pub fn run(id: u64, name: &str, format: OutputFormat, config: &Config) -> Result<()> {
    let task = config.to_task().context("Invalid task configuration")?;
    let target = task.target;
    let service = ZendeskSupportApiService::new(task);

    let records = service
        .get_subresource(target, id, name)
        .context(format!("Failed to fetch {} of {} {}", name, target, id))?;
    info!("Fetched {} {} records for {} {}", records.len(), name, target, id);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&records)?),
        OutputFormat::Text => {
            println!("{} {} {} ({})", name.bold(), target.to_string().cyan(), id, records.len());
            for record in &records {
                println!("  {}", serde_json::to_string(record)?);
            }
        }
    }

    Ok(())
}
