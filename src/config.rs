use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Name of the config file inside the working directory.
pub const CONFIG_FILE: &str = "cyber-elx.yaml";

pub const URL_ENV: &str = "ELX_URL";
pub const TOKEN_ENV: &str = "ELX_TOKEN";

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Website base URL, without trailing slash
    pub url: ConfigValue<Option<String>>,
    /// Authentication token sent with every request
    #[serde(serialize_with = "serialize_masked")]
    pub token: ConfigValue<Option<String>>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Where the config file is expected
    #[serde(skip)]
    pub config_path: PathBuf,
}

/// Connection settings of a validated config.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub url: String,
    pub token: String,
}

/// On-disk layout of the config file
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Config {
    /// Default config file path for a working directory
    pub fn default_path(workdir: &Path) -> PathBuf {
        workdir.join(CONFIG_FILE)
    }

    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>, workdir: &Path) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, workdir, |name| std::env::var(name).ok())
    }

    fn load_with_env(
        config_path: Option<PathBuf>,
        workdir: &Path,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut url = ConfigValue::new(None, ConfigSource::Default);
        let mut token = ConfigValue::new(None, ConfigSource::Default);
        let mut config_file = None;

        let path = config_path.unwrap_or_else(|| Self::default_path(workdir));
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = if contents.trim().is_empty() {
                ConfigFile::default()
            } else {
                serde_yaml::from_str(&contents)
                    .map_err(|e| ConfigError::ParseError(path.clone(), e))?
            };

            config_file = Some(path.clone());

            if let Some(value) = file_config.url.filter(|v| !v.is_empty()) {
                url = ConfigValue::new(Some(value), ConfigSource::File);
            }
            if let Some(value) = file_config.token.filter(|v| !v.is_empty()) {
                token = ConfigValue::new(Some(value), ConfigSource::File);
            }
        }

        // Apply environment variable overrides
        if let Some(value) = env(URL_ENV).filter(|v| !v.is_empty()) {
            url = ConfigValue::new(Some(value), ConfigSource::Environment);
        }
        if let Some(value) = env(TOKEN_ENV).filter(|v| !v.is_empty()) {
            token = ConfigValue::new(Some(value), ConfigSource::Environment);
        }

        Ok(Self {
            url,
            token,
            config_file,
            config_path: path,
        })
    }

    /// Checks that the connection settings are complete.
    pub fn validate(&self) -> Result<Settings, ConfigError> {
        let configured = self.config_file.is_some()
            || self.url.source == ConfigSource::Environment
            || self.token.source == ConfigSource::Environment;
        if !configured {
            return Err(ConfigError::NotFound);
        }

        let url = self.url.value.clone().ok_or(ConfigError::MissingField("url"))?;
        let token = self
            .token
            .value
            .clone()
            .ok_or(ConfigError::MissingField("token"))?;
        Ok(Settings {
            url: url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Writes a new config file.
    pub fn write(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
        let file = ConfigFile {
            url: Some(settings.url.clone()),
            token: Some(settings.token.clone()),
        };
        let yaml = serde_yaml::to_string(&file).map_err(ConfigError::SerializeError)?;
        let contents = format!(
            "# cyber-elx configuration\n# url: website address without trailing slash\n# token: authentication token from the admin panel\n{}",
            yaml
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(parent.to_path_buf(), e))?;
        }
        std::fs::write(path, contents).map_err(|e| ConfigError::WriteError(path.to_path_buf(), e))
    }
}

/// Checks a website URL typed by the user and strips one trailing slash.
pub fn normalize_url(input: &str) -> Result<String, &'static str> {
    let input = input.trim();
    if input.is_empty() {
        return Err("URL is required");
    }
    if !input.starts_with("http://") && !input.starts_with("https://") {
        return Err("URL must start with http:// or https://");
    }
    Ok(input.strip_suffix('/').unwrap_or(input).to_string())
}

/// Shows only the start of a token.
pub fn mask_token(token: &str) -> String {
    let visible: String = token.chars().take(4).collect();
    if token.chars().count() <= 8 {
        "****".to_string()
    } else {
        format!("{}****", visible)
    }
}

fn serialize_masked<S: Serializer>(
    token: &ConfigValue<Option<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    ConfigValue::new(
        token.value.as_deref().map(mask_token),
        token.source.clone(),
    )
    .serialize(serializer)
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    WriteError(PathBuf, std::io::Error),
    SerializeError(serde_yaml::Error),
    NotFound,
    MissingField(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::WriteError(path, e) => {
                write!(f, "Failed to write config file '{}': {}", path.display(), e)
            }
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::NotFound => {
                write!(f, "Config file not found. Run \"cyber-elx init\" first.")
            }
            ConfigError::MissingField(field) => {
                write!(f, "Missing \"{}\" in config file.", field)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
