use clap::{Args, Subcommand, ValueEnum};

use crate::config::{mask_token, Config};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!("Config file: {} (not found)", config.config_path.display());
                        }
                        println!();

                        println!("url: {}", config.url.value.as_deref().unwrap_or("(not set)"));
                        println!("  source: {}", config.url.source);
                        println!();

                        let token = config
                            .token
                            .value
                            .as_deref()
                            .map(mask_token)
                            .unwrap_or_else(|| "(not set)".to_string());
                        println!("token: {}", token);
                        println!("  source: {}", config.token.source);
                    }
                }
                Ok(())
            }
        }
    }
}
