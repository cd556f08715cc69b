use colored::*;
use eyre::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::target::Target;

#[derive(Serialize)]
struct TargetInfo {
    name: &'static str,
    incremental: bool,
    include: bool,
    records_key: &'static str,
}

impl From<Target> for TargetInfo {
    fn from(target: Target) -> Self {
        Self {
            name: target.as_str(),
            incremental: target.supports_incremental(),
            include: target.supports_include(),
            records_key: target.records_key(),
        }
    }
}

pub fn run(format: OutputFormat) -> Result<()> {
    let infos: Vec<TargetInfo> = Target::ALL.into_iter().map(TargetInfo::from).collect();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&infos)?),
        OutputFormat::Text => {
            println!("{}", "Supported targets".bold());
            println!();
            for info in &infos {
                let mode = if info.incremental {
                    "incremental".green()
                } else {
                    "paginated".yellow()
                };
                let include = if info.include { " +include" } else { "" };
                println!("  {:<16} {}{}", info.name.cyan(), mode, include);
            }
        }
    }

    Ok(())
}
