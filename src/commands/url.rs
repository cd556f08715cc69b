use eyre::{Context, Result};

use crate::config::Config;
use crate::url::build_path;

pub fn run(page: u32, preview: bool, config: &Config) -> Result<()> {
    let task = config.to_task().context("Invalid task configuration")?;
    println!("{}", build_path(&task, page, preview));
    Ok(())
}
