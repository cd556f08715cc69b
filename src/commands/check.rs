//! Credential check against the users/me endpoint

use colored::*;
use eyre::{Context, Result};

use crate::config::Config;
use crate::service::ZendeskSupportApiService;
use crate::url::credential_check_path;

pub fn run(config: &Config) -> Result<()> {
    let task = config.to_task().context("Invalid task configuration")?;
    let probe = credential_check_path(&task.login_url);
    let method = task.credentials.method();
    let service = ZendeskSupportApiService::new(task);

    if let Err(err) = service.validate_credential(&probe) {
        if err.is_config() {
            eprintln!("{} Zendesk rejected the {} credentials", "✗".red(), method.as_str());
        }
        return Err(err).context(format!("Credential check failed for {}", probe));
    }

    println!(
        "{} Credentials accepted ({} auth) at {}",
        "✓".green(),
        method.as_str().cyan(),
        service.task().login_url
    );
    Ok(())
}
