use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SdlConfig {
    /// Prepend the `@preset` directive and `PresetValue` scalar declarations
    /// to printed SDL, so that strict SDL validators accept it.
    ///
    /// Can also be set via the `RSP_INCLUDE_PRESET_PRELUDE` environment variable.
    #[serde(default = "default_true")]
    pub include_preset_prelude: bool,

    /// Report presets that no longer match the remote schema.
    #[serde(default = "default_true")]
    pub report_dropped_presets: bool,
}

impl Default for SdlConfig {
    fn default() -> Self {
        Self {
            include_preset_prelude: true,
            report_dropped_presets: true,
        }
    }
}

fn default_true() -> bool {
    true
}
