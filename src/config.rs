use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_MIN_POINT_DISTANCE_PX: f32 = 3.0;
pub const DEFAULT_INACTIVITY_TIMEOUT_MS: u64 = 600;
pub const DEFAULT_MIN_POINTS: usize = 8;
pub const DEFAULT_RESAMPLE_POINTS: usize = 48;
pub const MIN_RESAMPLE_POINTS: usize = 32;
pub const MAX_RESAMPLE_POINTS: usize = 64;
// Mean per-step DTW distance in unit-square space past which a match means nothing.
pub const DEFAULT_MAX_ACCEPTABLE_DISTANCE: f32 = 0.45;
pub const DEFAULT_ACCEPT_CONFIDENCE: f32 = 0.3;
pub const DEFAULT_DISPLAY_CONFIDENCE: f32 = 0.5;
pub const DEFAULT_FIRE_CONFIDENCE: f32 = 0.25;
pub const DEFAULT_MIN_DISPLACEMENT_PX: f32 = 20.0;
pub const DEFAULT_FALLBACK_CONFIDENCE: f32 = 0.7;

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("arrow_right", "next"),
    ("arrow_left", "prev"),
    ("circle", "search"),
    ("right", "next"),
    ("left", "prev"),
];

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    pub capture: CaptureConfig,
    pub recognition: RecognitionConfig,
    pub thresholds: ThresholdConfig,
    pub fallback: FallbackConfig,
    pub aliases: AliasConfig,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CaptureConfig {
    pub min_point_distance_px: f32,
    pub inactivity_timeout_ms: u64,
    pub min_points: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_point_distance_px: DEFAULT_MIN_POINT_DISTANCE_PX,
            inactivity_timeout_ms: DEFAULT_INACTIVITY_TIMEOUT_MS,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RecognitionConfig {
    pub resample_points: usize,
    pub max_acceptable_distance: f32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            resample_points: DEFAULT_RESAMPLE_POINTS,
            max_acceptable_distance: DEFAULT_MAX_ACCEPTABLE_DISTANCE,
        }
    }
}

/// Three independent confidence floors.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Minimum template confidence before the direction fallback takes over.
    pub accept: f32,
    /// Minimum confidence for showing a label to a person.
    pub display: f32,
    /// Minimum confidence for firing a bound action.
    pub fire: f32,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            accept: DEFAULT_ACCEPT_CONFIDENCE,
            display: DEFAULT_DISPLAY_CONFIDENCE,
            fire: DEFAULT_FIRE_CONFIDENCE,
        }
    }
}

impl ThresholdConfig {
    pub fn accepts(&self, confidence: f32) -> bool {
        confidence >= self.accept
    }

    pub fn displays(&self, confidence: f32) -> bool {
        confidence > 0.0 && confidence >= self.display
    }

    pub fn fires(&self, confidence: f32) -> bool {
        confidence > 0.0 && confidence >= self.fire
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FallbackConfig {
    pub min_displacement_px: f32,
    pub confidence: f32,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            min_displacement_px: DEFAULT_MIN_DISPLACEMENT_PX,
            confidence: DEFAULT_FALLBACK_CONFIDENCE,
        }
    }
}

/// Recognizer label to application action name. A `[aliases]` table in TOML
/// replaces the defaults as a whole.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AliasConfig(pub BTreeMap<String, String>);

impl Default for AliasConfig {
    fn default() -> Self {
        Self(
            DEFAULT_ALIASES
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        )
    }
}

impl GestureConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let capture = &self.capture;
        if !(capture.min_point_distance_px.is_finite() && capture.min_point_distance_px >= 0.0) {
            return invalid("capture.min_point_distance_px must be a finite value >= 0");
        }
        if capture.inactivity_timeout_ms == 0 {
            return invalid("capture.inactivity_timeout_ms must be > 0");
        }
        if capture.min_points < 2 {
            return invalid("capture.min_points must be >= 2");
        }

        let recognition = &self.recognition;
        if !(MIN_RESAMPLE_POINTS..=MAX_RESAMPLE_POINTS).contains(&recognition.resample_points) {
            return Err(ConfigError::Invalid(format!(
                "recognition.resample_points must be within {MIN_RESAMPLE_POINTS}..={MAX_RESAMPLE_POINTS}"
            )));
        }
        if !(recognition.max_acceptable_distance.is_finite()
            && recognition.max_acceptable_distance > 0.0)
        {
            return invalid("recognition.max_acceptable_distance must be > 0");
        }

        for (name, value) in [
            ("thresholds.accept", self.thresholds.accept),
            ("thresholds.display", self.thresholds.display),
            ("thresholds.fire", self.thresholds.fire),
            ("fallback.confidence", self.fallback.confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{name} must be within 0..=1")));
            }
        }

        if !(self.fallback.min_displacement_px.is_finite()
            && self.fallback.min_displacement_px >= 0.0)
        {
            return invalid("fallback.min_displacement_px must be a finite value >= 0");
        }

        if let Some((from, _)) = self
            .aliases
            .0
            .iter()
            .find(|(from, to)| from.is_empty() || to.is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "aliases entry `{from}` must map a non-empty label to a non-empty action"
            )));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(message.to_string()))
}
