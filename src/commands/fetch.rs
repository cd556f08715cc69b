//! Fetch a single page and print it

use colored::*;
use eyre::{Context, Result};
use log::{info, warn};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::response::ResponsePage;
use crate::service::ZendeskSupportApiService;

pub struct FetchOptions {
    pub page: u32,
    pub preview: bool,
    pub path: Option<String>,
    pub records: bool,
    pub format: OutputFormat,
}

pub fn run(opts: FetchOptions, config: &Config) -> Result<()> {
    let task = config.to_task().context("Invalid task configuration")?;
    let target = task.target;
    let service = ZendeskSupportApiService::new(task);

    let path = opts.path.as_deref().unwrap_or("");
    let document = match service.get_data(path, opts.page, opts.preview) {
        Ok(document) => document,
        Err(err) => {
            if err.is_data() {
                warn!("Response for {} was not a JSON object", target);
            }
            return Err(err).context(format!("Failed to fetch {}", target));
        }
    };
    let page = ResponsePage::from_document(target, &document);
    info!("Fetched {} {} records", page.records.len(), target);

    if opts.records {
        for record in &page.records {
            println!("{}", serde_json::to_string(record)?);
        }
        return Ok(());
    }

    match opts.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&document)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&document)?),
        OutputFormat::Text => {
            println!("{} {}", "Target:".bold(), target.to_string().cyan());
            println!("  records: {}", page.records.len());
            if let Some(count) = page.count {
                println!("  count: {}", count);
            }
            if let Some(end_time) = page.end_time {
                println!("  end_time: {}", end_time);
            }
            match &page.next_page {
                Some(next) => println!("  next_page: {}", next),
                None => println!("  next_page: {}", "none".dimmed()),
            }
        }
    }

    Ok(())
}
