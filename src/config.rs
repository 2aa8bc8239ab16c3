//! Layered configuration.
//!
//! Resolution order (highest priority last):
//! 1. Compiled defaults
//! 2. TOML file: the `--config` path, else `brain-graph.toml` in the working directory
//! 3. Environment variables: `BRAIN_GRAPH_*`, with `__` separating nested keys
//!
//! ```toml
//! [layout]
//! link_distance = 80.0
//! seed = 42
//!
//! [viewer]
//! reheat_on_filter_change = false
//! ```

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::layout::LayoutConfig;

pub const DEFAULT_CONFIG_FILE: &str = "brain-graph.toml";
pub const ENV_PREFIX: &str = "BRAIN_GRAPH_";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutConfig,
    pub viewer: ViewerConfig,
}

/// Window and interaction settings of the desktop viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: f32,
    pub window_height: f32,
    /// Reheat the layout whenever the visible kinds change.
    pub reheat_on_filter_change: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1440.0,
            window_height: 920.0,
            reheat_on_filter_change: true,
        }
    }
}

impl AppConfig {
    /// Resolves the configuration. An explicit `path` must exist; the default
    /// file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path
            && !path.exists()
        {
            return Err(ConfigError::Missing(path.to_path_buf()));
        }
        let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        Self::from_figment(Self::figment(file))
    }

    fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: AppConfig = figment.extract()?;
        config.layout.validate()?;
        Ok(config)
    }
}
