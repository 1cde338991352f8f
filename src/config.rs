//! Floor-plan configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::consts::{
    DEFAULT_NAMESPACE, FOCUS_ANIMATION_MS, FOCUS_DIM_OPACITY, FOCUS_PADDING_PX, FULL_OPACITY, SAVE_DEBOUNCE_MS,
    TRANSIENT_OPACITY_THRESHOLD,
};
use crate::focus::FocusConfig;
use crate::persistence::PersistenceConfig;

pub const DEFAULT_STORAGE_DIR: &str = ".floorplan";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("FLOORPLAN_NAMESPACE must not be empty")]
    EmptyNamespace,

    #[error("FLOORPLAN_SAVE_DEBOUNCE_MS must be greater than zero")]
    ZeroDebounce,

    #[error("opacity thresholds out of order: need 0 <= dim ({dim}) < transient ({transient}) <= 100")]
    OpacityOrder { dim: f64, transient: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FloorPlanConfig {
    pub namespace: String,
    pub save_debounce_ms: u64,
    pub transient_opacity: f64,
    pub focus_dim_opacity: f64,
    pub focus_padding: f64,
    pub focus_duration_ms: u64,
    pub storage_dir: PathBuf,
    /// Read-only viewer: metadata edits are ignored.
    pub view_mode: bool,
}

impl Default for FloorPlanConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            save_debounce_ms: SAVE_DEBOUNCE_MS,
            transient_opacity: TRANSIENT_OPACITY_THRESHOLD,
            focus_dim_opacity: FOCUS_DIM_OPACITY,
            focus_padding: FOCUS_PADDING_PX,
            focus_duration_ms: FOCUS_ANIMATION_MS,
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            view_mode: false,
        }
    }
}

impl FloorPlanConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional (defaults in parentheses):
    /// - `FLOORPLAN_NAMESPACE` (`reserveo`)
    /// - `FLOORPLAN_SAVE_DEBOUNCE_MS` (800)
    /// - `FLOORPLAN_TRANSIENT_OPACITY` (30)
    /// - `FLOORPLAN_FOCUS_DIM_OPACITY` (15)
    /// - `FLOORPLAN_FOCUS_PADDING` (100)
    /// - `FLOORPLAN_FOCUS_DURATION_MS` (400)
    /// - `FLOORPLAN_STORAGE_DIR` (`.floorplan`)
    /// - `FLOORPLAN_VIEW_MODE` (`false`)
    ///
    /// Unparseable numbers fall back to their default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Same as [`FloorPlanConfig::from_env`] with variables read through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            namespace: lookup("FLOORPLAN_NAMESPACE").unwrap_or(defaults.namespace),
            save_debounce_ms: parse_or(&lookup, "FLOORPLAN_SAVE_DEBOUNCE_MS", defaults.save_debounce_ms),
            transient_opacity: parse_or(&lookup, "FLOORPLAN_TRANSIENT_OPACITY", defaults.transient_opacity),
            focus_dim_opacity: parse_or(&lookup, "FLOORPLAN_FOCUS_DIM_OPACITY", defaults.focus_dim_opacity),
            focus_padding: parse_or(&lookup, "FLOORPLAN_FOCUS_PADDING", defaults.focus_padding),
            focus_duration_ms: parse_or(&lookup, "FLOORPLAN_FOCUS_DURATION_MS", defaults.focus_duration_ms),
            storage_dir: lookup("FLOORPLAN_STORAGE_DIR").map_or(defaults.storage_dir, PathBuf::from),
            view_mode: parse_or(&lookup, "FLOORPLAN_VIEW_MODE", defaults.view_mode),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        if self.save_debounce_ms == 0 {
            return Err(ConfigError::ZeroDebounce);
        }
        let (dim, transient) = (self.focus_dim_opacity, self.transient_opacity);
        if !(0.0..transient).contains(&dim) || transient > FULL_OPACITY {
            return Err(ConfigError::OpacityOrder { dim, transient });
        }
        Ok(())
    }

    #[must_use]
    pub fn persistence(&self) -> PersistenceConfig {
        PersistenceConfig {
            namespace: self.namespace.clone(),
            debounce: Duration::from_millis(self.save_debounce_ms),
            transient_opacity: self.transient_opacity,
        }
    }

    #[must_use]
    pub fn focus(&self) -> FocusConfig {
        FocusConfig {
            dim_opacity: self.focus_dim_opacity,
            padding: self.focus_padding,
            duration_ms: self.focus_duration_ms,
        }
    }
}

/// Parse an environment variable, falling back to `default` when it is unset
/// or malformed.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    parse_or(&env_lookup, key, default)
}

fn env_lookup(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or(default),
        None => default,
    }
}
