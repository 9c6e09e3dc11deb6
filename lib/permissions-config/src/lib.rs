mod env_overrides;
pub mod log;
pub mod sdl;

use config::{Config, File, FileFormat, FileSourceFile};
use envconfig::Envconfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;

use crate::{
    env_overrides::{EnvVarOverrides, EnvVarOverridesError},
    log::LoggingConfig,
    sdl::SdlConfig,
};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PermissionsToolConfig {
    #[serde(default)]
    pub log: LoggingConfig,

    #[serde(default)]
    pub sdl: SdlConfig,

    /// Name of the remote schema the permissions belong to, used in
    /// generated metadata requests.
    ///
    /// Can also be set via the `RSP_REMOTE_SCHEMA` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_schema: Option<String>,
}

impl PermissionsToolConfig {
    pub fn remote_schema_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.remote_schema.as_deref().unwrap_or(fallback)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PermissionsConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to apply configuration overrides: {0}")]
    EnvVarOverridesError(#[from] EnvVarOverridesError),
    #[error("Failed to load the environment variables: {0}")]
    EnvVarLoadError(#[from] envconfig::Error),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "rsp.config.yaml",
    "rsp.config.yml",
    "rsp.config.json",
    "rsp.config.json5",
];

pub fn load_config(
    override_config_path: Option<String>,
) -> Result<PermissionsToolConfig, PermissionsConfigError> {
    let env_overrides = EnvVarOverrides::init_from_env()?;
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<std::path::PathBuf>()
            .map_err(PermissionsConfigError::ConfigPathParseError)?;
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    config = env_overrides.apply_overrides(config)?;

    Ok(config.build()?.try_deserialize::<PermissionsToolConfig>()?)
}

pub fn parse_yaml_config(
    config_raw: String,
) -> Result<PermissionsToolConfig, PermissionsConfigError> {
    Config::builder()
        .add_source(File::from_str(&config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<PermissionsToolConfig>()
        .map_err(PermissionsConfigError::ConfigLoadError)
}
