use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;

use crate::{generator::GeneratorKind, holdoff::DEFAULT_HOLDOFF, totp::DEFAULT_PERIOD};

/// File looked up in the home directory when no path is given.
pub const DEFAULT_CONFIG_FILE_NAME: &str = ".otp-secrets.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not find the secrets file at: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Could not read the secrets file at: {}", .0.display())]
    Read(PathBuf, #[source] std::io::Error),
    #[error("Problem parsing YAML{}", describe_yaml_error(.0))]
    Parse(#[source] serde_yaml::Error),
    #[error("The holdoff must be below {} seconds, found {0}", DEFAULT_PERIOD)]
    InvalidHoldoff(u64),
}

fn describe_yaml_error(error: &serde_yaml::Error) -> String {
    match error.location() {
        Some(mark) => format!("\nError position: ({}:{})", mark.line(), mark.column()),
        None => format!(": {error}"),
    }
}

fn default_holdoff() -> u64 {
    DEFAULT_HOLDOFF
}

fn default_use_clipboard() -> bool {
    true
}

/// Contents of the secrets file.
///
/// ```yaml
/// otpsecrets:
///   label-one: <secret>
///   another-code: <secret>
/// holdoff: 5
/// use_clipboard: true
/// generator: builtin
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(rename = "otpsecrets")]
    secrets: BTreeMap<String, String>,
    #[serde(default = "default_holdoff")]
    holdoff: u64,
    #[serde(default = "default_use_clipboard")]
    use_clipboard: bool,
    #[serde(default)]
    generator: GeneratorKind,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        let config = Self::parse(&contents)?;

        tracing::debug!(
            path = %path.display(),
            labels = config.secrets.len(),
            holdoff = config.holdoff,
            use_clipboard = config.use_clipboard,
            generator = ?config.generator,
            "loaded secrets file"
        );

        Ok(config)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents).map_err(ConfigError::Parse)?;

        if config.holdoff >= DEFAULT_PERIOD {
            return Err(ConfigError::InvalidHoldoff(config.holdoff));
        }

        Ok(config)
    }

    /// Label to secret mapping, ordered by label.
    pub fn secrets(&self) -> &BTreeMap<String, String> {
        &self.secrets
    }

    pub fn holdoff(&self) -> u64 {
        self.holdoff
    }

    pub fn use_clipboard(&self) -> bool {
        self.use_clipboard
    }

    pub fn generator(&self) -> GeneratorKind {
        self.generator
    }
}

/// `~/.otp-secrets.yaml`, or a path relative to the working directory when
/// the home directory is unknown.
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(DEFAULT_CONFIG_FILE_NAME)
}
