use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::cli::Output;
use crate::config::GatekeepConfig;

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the merged configuration
    Show {
        #[arg(long, value_enum, default_value_t = ConfigFormat::Toml)]
        format: ConfigFormat,
    },
    /// Check that the configuration loads and validates
    Validate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

pub fn execute(args: ConfigArgs, config: &GatekeepConfig, output: &Output) -> Result<i32> {
    match args.action {
        ConfigAction::Show { format } => {
            let rendered = match format {
                ConfigFormat::Toml => {
                    toml::to_string_pretty(config).context("Failed to render configuration")?
                }
                ConfigFormat::Json => serde_json::to_string_pretty(config)
                    .context("Failed to render configuration")?,
            };
            println!("{rendered}");
        }
        // Loading already validated it
        ConfigAction::Validate => output.success("Configuration is valid"),
    }

    Ok(0)
}
