use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Zone block depth (cells) used for previews and evaluation.
    #[serde(default = "ToolConfig::default_block_depth")]
    pub block_depth: i32,
    #[serde(default = "ToolConfig::default_auto_open")]
    pub auto_open_panel_for_road_tools: bool,
    #[serde(default = "ToolConfig::default_safe_prefab_max_attempts")]
    pub safe_prefab_max_attempts: u32,
    #[serde(default = "ToolConfig::default_cleanup_batch_size")]
    pub cleanup_batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct InputConfig {
    /// Optional external bindings file; entries in `bindings` win over it.
    #[serde(default)]
    pub bindings_path: Option<String>,
    #[serde(default)]
    pub bindings: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "LoggingConfig::default_filter")]
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ZoneToolsConfig {
    #[serde(default)]
    pub tool: ToolConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default)]
pub struct ZoneToolsConfigOverrides {
    pub block_depth: Option<i32>,
    pub auto_open_panel_for_road_tools: Option<bool>,
    pub debug: Option<bool>,
}

impl ToolConfig {
    const fn default_block_depth() -> i32 {
        6
    }

    const fn default_auto_open() -> bool {
        true
    }

    const fn default_safe_prefab_max_attempts() -> u32 {
        8
    }

    const fn default_cleanup_batch_size() -> usize {
        64
    }
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            block_depth: Self::default_block_depth(),
            auto_open_panel_for_road_tools: Self::default_auto_open(),
            safe_prefab_max_attempts: Self::default_safe_prefab_max_attempts(),
            cleanup_batch_size: Self::default_cleanup_batch_size(),
        }
    }
}

impl LoggingConfig {
    fn default_filter() -> String {
        "info".to_string()
    }

    /// Filter directive handed to the subscriber; `debug` widens this crate only.
    pub fn directive(&self) -> String {
        if self.debug {
            format!("{},zone_tools=debug", self.filter)
        } else {
            self.filter.clone()
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { debug: false, filter: Self::default_filter() }
    }
}

impl ZoneToolsConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!("Config load error: {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &ZoneToolsConfigOverrides) {
        if let Some(depth) = overrides.block_depth {
            self.tool.block_depth = depth;
        }
        if let Some(auto_open) = overrides.auto_open_panel_for_road_tools {
            self.tool.auto_open_panel_for_road_tools = auto_open;
        }
        if let Some(debug) = overrides.debug {
            self.logging.debug = debug;
        }
    }
}

impl ZoneToolsConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.block_depth.is_none() && self.auto_open_panel_for_road_tools.is_none() && self.debug.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.block_depth.is_some() {
            fields.push("block_depth");
        }
        if self.auto_open_panel_for_road_tools.is_some() {
            fields.push("auto_open");
        }
        if self.debug.is_some() {
            fields.push("debug");
        }
        fields
    }
}
