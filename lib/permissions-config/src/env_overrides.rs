use config::{builder::BuilderState, ConfigBuilder, ConfigError};
use envconfig::Envconfig;
use tracing::debug;

use crate::log::{LogFormat, LogLevel};

#[derive(Envconfig)]
pub struct EnvVarOverrides {
    // Logger overrides
    #[envconfig(from = "LOG_LEVEL")]
    pub log_level: Option<LogLevel>,
    #[envconfig(from = "LOG_FORMAT")]
    pub log_format: Option<LogFormat>,
    #[envconfig(from = "LOG_FILTER")]
    pub log_filter: Option<String>,

    #[envconfig(from = "RSP_REMOTE_SCHEMA")]
    pub remote_schema: Option<String>,

    #[envconfig(from = "RSP_INCLUDE_PRESET_PRELUDE")]
    pub include_preset_prelude: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvVarOverridesError {
    #[error("Failed to override configuration: {0}")]
    FailedToOverrideConfig(#[from] ConfigError),
    #[error("RSP_REMOTE_SCHEMA must not be empty")]
    EmptyRemoteSchema,
}

impl EnvVarOverrides {
    pub fn apply_overrides<T: BuilderState>(
        mut self,
        mut config: ConfigBuilder<T>,
    ) -> Result<ConfigBuilder<T>, EnvVarOverridesError> {
        if let Some(log_level) = self.log_level.take() {
            debug!("[config-override] 'log.level' = {:?}", log_level);
            config = config.set_override("log.level", log_level.as_str())?;
        }
        if let Some(log_format) = self.log_format.take() {
            debug!("[config-override] 'log.format' = {:?}", log_format);
            config = config.set_override("log.format", log_format.as_str())?;
        }
        if let Some(log_filter) = self.log_filter.take() {
            debug!("[config-override] 'log.filter' = {:?}", log_filter);
            config = config.set_override("log.filter", log_filter)?;
        }

        if let Some(remote_schema) = self.remote_schema.take() {
            if remote_schema.trim().is_empty() {
                return Err(EnvVarOverridesError::EmptyRemoteSchema);
            }

            debug!("[config-override] 'remote_schema' = {}", remote_schema);
            config = config.set_override("remote_schema", remote_schema)?;
        }

        if let Some(include) = self.include_preset_prelude.take() {
            debug!("[config-override] 'sdl.include_preset_prelude' = {}", include);
            config = config.set_override("sdl.include_preset_prelude", include)?;
        }

        Ok(config)
    }
}
