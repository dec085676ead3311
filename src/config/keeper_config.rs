use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use compio::fs;
use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::LexicalPathExt;

const CONFIG_FILE_NAME: &str = "gitkeeper.yaml";
const DEFAULT_DEBOUNCE_MS: u64 = 200;
const DEFAULT_EXCLUDE: &[&str] = &[".git"];

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Project settings read from `gitkeeper.yaml` in the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeeperConfig {
    /// Path component names whose events are ignored
    pub exclude: Vec<String>,
    /// Quiet period that closes a watch batch
    pub debounce: Duration,
    /// Shell command run after every batch
    pub refresh: Option<String>,
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDE.iter().map(|name| name.to_string()).collect(),
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            refresh: None,
        }
    }
}

impl KeeperConfig {
    pub async fn read(root: &Path) -> Result<Self, KeeperConfigError> {
        Self::from_path(get_config_file_path(root)).await
    }

    /// Loads the config at `path`, falling back to defaults when the file does
    /// not exist.
    pub async fn from_path(path: PathBuf) -> Result<Self, KeeperConfigError> {
        debug!("Reading config file: {}", path.lexical_absolute().display());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No {} found, using defaults", CONFIG_FILE_NAME);
                return Ok(Self::default());
            }
            Err(e) => return Err(e).context(ReadSnafu { file_path: path }),
        };

        debug!("Successfully read config file: {} bytes", bytes.len());
        let contents = String::from_utf8(bytes).context(EncodingSnafu { file_path: path })?;
        contents.as_str().try_into()
    }

    fn parse_exclude(value: &Yaml) -> Result<Vec<String>, KeeperConfigError> {
        value
            .as_sequence()
            .ok_or(KeeperConfigError::ExcludeNotSequence)?
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(KeeperConfigError::ExcludeNotSequence)
            })
            .collect()
    }

    fn parse_debounce(value: &Yaml) -> Result<Duration, KeeperConfigError> {
        match value {
            Yaml::Value(Scalar::Integer(ms)) if *ms >= 0 => Ok(Duration::from_millis(*ms as u64)),
            _ => Err(KeeperConfigError::InvalidDebounce),
        }
    }

    fn parse_refresh(value: &Yaml) -> Result<Option<String>, KeeperConfigError> {
        match value {
            Yaml::Value(Scalar::Null) => Ok(None),
            _ => value
                .as_str()
                .map(|command| Some(command.to_string()))
                .ok_or(KeeperConfigError::RefreshNotString),
        }
    }

    fn get<'a, 'input>(
        top_level: &'a LinkedHashMap<Yaml<'input>, Yaml<'input>>,
        key: &'static str,
    ) -> Option<&'a Yaml<'input>> {
        top_level.get(&Yaml::Value(Scalar::String(Cow::Borrowed(key))))
    }
}

impl TryFrom<&str> for KeeperConfig {
    type Error = KeeperConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let documents = Yaml::load_from_str(contents).context(ParseSnafu)?;
        // An empty file is an empty config
        let Some(document) = documents.first() else {
            return Ok(Self::default());
        };

        let top_level = document
            .as_mapping()
            .ok_or(KeeperConfigError::TopLevelNotMap)?;

        let mut config = Self::default();
        if let Some(exclude) = Self::get(top_level, "exclude") {
            config.exclude = Self::parse_exclude(exclude)?;
        }
        if let Some(debounce) = Self::get(top_level, "debounce_ms") {
            config.debounce = Self::parse_debounce(debounce)?;
        }
        if let Some(refresh) = Self::get(top_level, "refresh") {
            config.refresh = Self::parse_refresh(refresh)?;
        }

        Ok(config)
    }
}

#[derive(Debug, Snafu)]
pub enum KeeperConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path.display()))]
    ReadError {
        file_path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Config file is not valid UTF-8: {}", file_path.display()))]
    EncodingError {
        file_path: PathBuf,
        source: std::string::FromUtf8Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("'exclude' should be a list of directory names"))]
    ExcludeNotSequence,
    #[snafu(display("'debounce_ms' should be a non-negative integer"))]
    InvalidDebounce,
    #[snafu(display("'refresh' should be a shell command string"))]
    RefreshNotString,
}
