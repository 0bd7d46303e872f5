#![forbid(unsafe_code)]

//! Startup configuration: CLI flag > environment > YAML file > default.

use cc_storage::HttpSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_PORT: u16 = 7340;
pub(crate) const DEFAULT_DATA_DIR: &str = "public";
pub(crate) const DEFAULT_STORAGE_DIR: &str = ".curriculum_city";

const ENV_CONFIG: &str = "CURRICULUM_CITY_CONFIG";
const ENV_DATA_DIR: &str = "CURRICULUM_CITY_DATA_DIR";
const ENV_DATA_URL: &str = "CURRICULUM_CITY_DATA_URL";
const ENV_STORAGE_DIR: &str = "CURRICULUM_CITY_STORAGE_DIR";
const ENV_PORT: &str = "CURRICULUM_CITY_PORT";

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum DataLocation {
    Dir(PathBuf),
    Http(HttpSource),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ViewerConfig {
    pub(crate) data: DataLocation,
    pub(crate) storage_dir: PathBuf,
    pub(crate) port: u16,
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    #[error("{0}: missing value")]
    MissingValue(String),

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("{origin}: invalid port {value:?}")]
    InvalidPort { origin: &'static str, value: String },

    #[error("{origin}: invalid data url {value:?} (expected http://host[:port][/base])")]
    InvalidDataUrl { origin: &'static str, value: String },

    #[error("config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One configuration layer; `None` means "not set here".
#[derive(Debug, Default, PartialEq, Eq)]
struct Layer {
    data_dir: Option<PathBuf>,
    data_url: Option<String>,
    storage_dir: Option<PathBuf>,
    port: Option<String>,
    config: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    data_dir: Option<PathBuf>,
    data_url: Option<String>,
    storage_dir: Option<PathBuf>,
    port: Option<u16>,
}

impl Layer {
    fn from_args(args: &[String]) -> Result<Self, ConfigError> {
        let mut layer = Layer::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
                _ => (arg.as_str(), None),
            };
            let slot = match flag {
                "--config" | "--data-dir" | "--data-url" | "--storage-dir" | "--port" => flag,
                _ => return Err(ConfigError::UnknownArgument(arg.clone())),
            };
            let value = match inline {
                Some(value) => value,
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingValue(slot.to_string()))?,
            };
            if value.trim().is_empty() {
                return Err(ConfigError::MissingValue(slot.to_string()));
            }
            match slot {
                "--config" => layer.config = Some(PathBuf::from(value)),
                "--data-dir" => layer.data_dir = Some(PathBuf::from(value)),
                "--data-url" => layer.data_url = Some(value),
                "--storage-dir" => layer.storage_dir = Some(PathBuf::from(value)),
                _ => layer.port = Some(value),
            }
        }
        Ok(layer)
    }

    fn from_env(env: &dyn Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| env(key).filter(|value| !value.trim().is_empty());
        Layer {
            data_dir: var(ENV_DATA_DIR).map(PathBuf::from),
            data_url: var(ENV_DATA_URL),
            storage_dir: var(ENV_STORAGE_DIR).map(PathBuf::from),
            port: var(ENV_PORT),
            config: var(ENV_CONFIG).map(PathBuf::from),
        }
    }

    fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Layer::default());
        }
        let file: FileConfig = serde_yaml::from_str(text)?;
        Ok(Layer {
            data_dir: file.data_dir,
            data_url: file.data_url,
            storage_dir: file.storage_dir,
            port: file.port.map(|port| port.to_string()),
            config: None,
        })
    }

    fn sets_data(&self) -> bool {
        self.data_dir.is_some() || self.data_url.is_some()
    }
}

impl ViewerConfig {
    /// `args` excludes the program name. `env` is injected so tests stay hermetic.
    pub(crate) fn resolve(
        args: &[String],
        env: &dyn Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let cli = Layer::from_args(args)?;
        let env = Layer::from_env(env);
        let file = match cli.config.as_deref().or(env.config.as_deref()) {
            Some(path) => Layer::from_yaml_file(path)?,
            None => Layer::default(),
        };
        let layers: [(&'static str, &Layer); 3] =
            [("cli", &cli), ("env", &env), ("config", &file)];

        // The first layer that names a data location decides it; a URL beats a
        // directory within that layer.
        let data = match layers.iter().copied().find(|(_, layer)| layer.sets_data()) {
            Some((origin, layer)) => match (&layer.data_url, &layer.data_dir) {
                (Some(url), _) => DataLocation::Http(HttpSource::parse_url(url).ok_or_else(
                    || ConfigError::InvalidDataUrl {
                        origin,
                        value: url.clone(),
                    },
                )?),
                (None, Some(dir)) => DataLocation::Dir(dir.clone()),
                (None, None) => DataLocation::Dir(PathBuf::from(DEFAULT_DATA_DIR)),
            },
            None => DataLocation::Dir(PathBuf::from(DEFAULT_DATA_DIR)),
        };

        let storage_dir = layers
            .iter()
            .copied()
            .find_map(|(_, layer)| layer.storage_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let port = match layers
            .iter()
            .copied()
            .find_map(|(origin, layer)| layer.port.as_deref().map(|port| (origin, port)))
        {
            Some((origin, raw)) => {
                raw.trim()
                    .parse::<u16>()
                    .map_err(|_| ConfigError::InvalidPort {
                        origin,
                        value: raw.to_string(),
                    })?
            }
            None => DEFAULT_PORT,
        };

        Ok(Self {
            data,
            storage_dir,
            port,
        })
    }

    pub(crate) fn data_label(&self) -> String {
        match &self.data {
            DataLocation::Dir(dir) => dir.display().to_string(),
            DataLocation::Http(source) => {
                use cc_storage::DocumentSource as _;
                source.describe()
            }
        }
    }
}
