use crate::layout::Bounds;
use crate::optimizer::GroupLimits;
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("maxGroups must be a positive integer, got {0}")]
    MaxGroups(i64),
    #[error("groupSize must be a positive integer, got {0}")]
    GroupSize(i64),
    #[error("layout {axis} must be a positive finite number, got {value}")]
    Bounds { axis: &'static str, value: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Number of distinct group ids the optimizer may use.
    pub max_groups: i64,
    /// Members allowed per group.
    pub group_size: i64,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_groups: 10,
            group_size: 8,
            seed: None,
        }
    }
}

impl OptimizerConfig {
    pub fn limits(&self) -> Result<GroupLimits, ConfigError> {
        GroupLimits::new(self.max_groups, self.group_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let bounds = Bounds::default();
        Self {
            width: bounds.width,
            height: bounds.height,
        }
    }
}

impl LayoutConfig {
    pub fn bounds(&self) -> Result<Bounds, ConfigError> {
        check_extent("width", self.width)?;
        check_extent("height", self.height)?;
        Ok(Bounds {
            width: self.width,
            height: self.height,
        })
    }
}

fn check_extent(axis: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Bounds { axis, value })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub background: String,
    pub corner_radius: f32,
    pub show_groups: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            background: "#FFFFFF".to_string(),
            corner_radius: 6.0,
            show_groups: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub optimizer: OptimizerConfig,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

/// Limits and bounds checked once, before any optimizer run.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedConfig {
    pub limits: GroupLimits,
    pub bounds: Bounds,
}

impl Config {
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        Ok(ValidatedConfig {
            limits: self.optimizer.limits()?,
            bounds: self.layout.bounds()?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    max_groups: Option<i64>,
    group_size: Option<i64>,
    seed: Option<u64>,
    width: Option<f32>,
    height: Option<f32>,
    background: Option<String>,
    corner_radius: Option<f32>,
    show_groups: Option<bool>,
    theme_variables: Option<ThemeVariables>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    line_color: Option<String>,
    unassigned_fill: Option<String>,
    unassigned_border: Option<String>,
    selected_fill: Option<String>,
    selected_border: Option<String>,
    background: Option<String>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Applies a JSON config document on top of the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => log::warn!("unknown theme {other:?}, keeping the default"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.unassigned_fill {
            config.theme.unassigned_fill = v;
        }
        if let Some(v) = vars.unassigned_border {
            config.theme.unassigned_border = v;
        }
        if let Some(v) = vars.selected_fill {
            config.theme.selected_fill = v;
        }
        if let Some(v) = vars.selected_border {
            config.theme.selected_border = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
    }

    if let Some(v) = parsed.max_groups {
        config.optimizer.max_groups = v;
    }
    if let Some(v) = parsed.group_size {
        config.optimizer.group_size = v;
    }
    if parsed.seed.is_some() {
        config.optimizer.seed = parsed.seed;
    }
    if let Some(v) = parsed.width {
        config.layout.width = v;
    }
    if let Some(v) = parsed.height {
        config.layout.height = v;
    }

    config.render.background = config.theme.background.clone();
    if let Some(v) = parsed.background {
        config.render.background = v;
    }
    if let Some(v) = parsed.corner_radius {
        config.render.corner_radius = v;
    }
    if let Some(v) = parsed.show_groups {
        config.render.show_groups = v;
    }

    Ok(config)
}
