//! Create the config file and fetch everything for the first time.

use std::path::Path;

use clap::Args;

use cyber_elx_core::{ContentService, HttpContentService};

use super::download::download;
use super::{refresh_dev_docs, runtime, CommandError};
use crate::config::{normalize_url, Config, Settings};
use crate::prompt;

/// Initialize configuration and download pages
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Website URL, e.g. https://my-website.net
    #[arg(long)]
    url: Option<String>,

    /// Authentication token
    #[arg(long)]
    token: Option<String>,
}

impl InitCommand {
    pub fn run(&self, config_path: &Path, workdir: &Path) -> Result<(), CommandError> {
        if config_path.exists() {
            println!("Config file already exists. Delete it first if you want to reinitialize.");
            return Ok(());
        }

        let settings = Settings {
            url: self.url()?,
            token: self.token()?,
        };
        Config::write(config_path, &settings)?;
        println!("✓ Config file created: {}", config_path.display());

        refresh_dev_docs(workdir)?;

        let rt = runtime()?;
        rt.block_on(first_download(workdir, &settings))
    }

    fn url(&self) -> Result<String, CommandError> {
        if let Some(url) = &self.url {
            return normalize_url(url).map_err(CommandError::InvalidInput);
        }
        loop {
            let input = prompt::read_line("Enter your website URL (e.g., https://my-website.net):")?;
            match normalize_url(&input) {
                Ok(url) => return Ok(url),
                Err(msg) => println!("{}", msg),
            }
        }
    }

    fn token(&self) -> Result<String, CommandError> {
        if let Some(token) = &self.token {
            return validate_token(token).map_err(CommandError::InvalidInput);
        }
        loop {
            let input = prompt::read_line("Enter your authentication token:")?;
            match validate_token(&input) {
                Ok(token) => return Ok(token),
                Err(msg) => println!("{}", msg),
            }
        }
    }
}

fn validate_token(input: &str) -> Result<String, &'static str> {
    let token = input.trim();
    if token.is_empty() {
        return Err("Token is required");
    }
    Ok(token.to_string())
}

async fn first_download(workdir: &Path, settings: &Settings) -> Result<(), CommandError> {
    println!("Testing connection...");
    if let Err(message) = check_connection(settings).await {
        println!("✗ Connection failed: {}", message);
        println!("Config file was created. Fix the credentials and run \"cyber-elx download\".");
        return Ok(());
    }
    println!("✓ Connection successful!");

    println!("Downloading pages...");
    download(workdir, settings, true).await?;

    println!("\n✓ Initialization complete!");
    println!(
        "Edit files in sections/ and templates/ folders, then run \"cyber-elx upload\" to publish."
    );
    Ok(())
}

async fn check_connection(settings: &Settings) -> Result<(), String> {
    let service = HttpContentService::new(&settings.url, &settings.token);
    match service.fetch_pages().await {
        Ok(response) if response.success => Ok(()),
        Ok(response) => Err(response
            .message
            .unwrap_or_else(|| "Unknown error".to_string())),
        Err(e) => Err(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_token() {
        assert_eq!(validate_token("  abc \n"), Ok("abc".to_string()));
        assert_eq!(validate_token("   "), Err("Token is required"));
    }

    #[test]
    fn test_flag_url_is_normalized() {
        let cmd = InitCommand {
            url: Some("https://my-website.net/".to_string()),
            token: Some("t".to_string()),
        };
        assert_eq!(cmd.url().unwrap(), "https://my-website.net");
        assert_eq!(cmd.token().unwrap(), "t");
    }

    #[test]
    fn test_existing_config_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = Config::default_path(dir.path());
        std::fs::write(&path, "url: [unclosed").unwrap();

        let cmd = InitCommand {
            url: Some("https://my-website.net".to_string()),
            token: Some("t".to_string()),
        };
        cmd.run(&path, dir.path()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "url: [unclosed");
        assert!(!dir.path().join("DEV_DOC").exists());
    }

    #[test]
    fn test_flag_url_without_scheme_is_rejected() {
        let cmd = InitCommand {
            url: Some("my-website.net".to_string()),
            token: None,
        };
        assert_eq!(
            cmd.url().unwrap_err().to_string(),
            "URL must start with http:// or https://"
        );
    }
}
