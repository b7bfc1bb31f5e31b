//! Shared settings for edit-mesh tools
//!
//! This crate is the single source of truth for tool options that hosts
//! (native Bevy, headless batch runs, tests) pass to the rip operator.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default for filling the ripped gap with faces
pub const DEFAULT_USE_FILL: bool = false;

/// Default inset applied to both ends of an edge before measuring its
/// screen distance, so edges sharing a vertex do not tie.
pub const DEFAULT_EDGE_INSET: f32 = 0.00001;

/// Default length (in pixels) of the cursor nudge used to decide which side
/// of an edge the cursor is on
pub const DEFAULT_SIDE_NUDGE: f32 = 0.01;

/// Errors raised while loading settings
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Setting `{name}` must be finite and non-negative, got {value}")]
    OutOfRange { name: &'static str, value: f32 },
}

/// Options for the rip operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct RipSettings {
    /// Rebuild faces across the opened gap
    pub use_fill: bool,
    /// Screen-space edge inset in pixels
    pub edge_inset: f32,
    /// Screen-space side test nudge in pixels
    pub side_nudge: f32,
}

impl Default for RipSettings {
    fn default() -> Self {
        Self {
            use_fill: DEFAULT_USE_FILL,
            edge_inset: DEFAULT_EDGE_INSET,
            side_nudge: DEFAULT_SIDE_NUDGE,
        }
    }
}

impl RipSettings {
    /// Default settings with fill enabled
    pub fn with_fill() -> Self {
        Self {
            use_fill: true,
            ..Self::default()
        }
    }

    /// Parse settings from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.check()?;
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn check(&self) -> Result<(), ConfigError> {
        for (name, value) in [("edge_inset", self.edge_inset), ("side_nudge", self.side_nudge)] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::OutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = RipSettings::default();
        assert!(!settings.use_fill);
        assert_eq!(settings.edge_inset, DEFAULT_EDGE_INSET);
        assert_eq!(settings.side_nudge, DEFAULT_SIDE_NUDGE);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = RipSettings::from_json_str(r#"{ "use_fill": true }"#).unwrap();
        assert_eq!(settings, RipSettings::with_fill());
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = RipSettings::with_fill();
        settings.side_nudge = 0.5;
        let json = settings.to_json_string().unwrap();
        assert_eq!(RipSettings::from_json_str(&json).unwrap(), settings);
    }

    #[test]
    fn test_rejects_negative_inset() {
        let result = RipSettings::from_json_str(r#"{ "edge_inset": -1.0 }"#);
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange { name: "edge_inset", .. })
        ));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            RipSettings::from_json_str("{ use_fill"),
            Err(ConfigError::Json(_))
        ));
    }
}
