//! Tuning for the construction disaster event.
//!
//! Every field has a serde default so partial config files stay valid.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DAMAGE_FRACTION_MAX, DAMAGE_FRACTION_MIN, DIFFICULTY_CHALLENGING, DIFFICULTY_NORMAL,
    DIFFICULTY_RELAXING, EXPLODE_CHANCE_MAX, EXPLOSION_RADIUS_MAX, EXPLOSION_RADIUS_MIN,
    EXPLOSION_STRENGTH_MAX, EXPLOSION_STRENGTH_MIN,
};

/// Errors raised when disaster configuration invariants are violated.
#[derive(Debug, Error)]
pub enum DisasterConfigError {
    #[error("{field} minimum {min:.2} exceeds maximum {max:.2}")]
    RangeInverted {
        field: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{field} must be at least {min:.2} (got {value:.2})")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("{field} must be between {min:.2} and {max:.2} (got {value:.2})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("{field} must be finite")]
    NonFinite { field: &'static str },
    #[error("difficulty multiplier must be positive and finite (got {value})")]
    InvalidDifficulty { value: f32 },
    #[error("malformed disaster config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Inclusive uniform sampling range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRange {
    pub min: f32,
    pub max: f32,
}

impl SampleRange {
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draw a value uniformly from `[min, max]`. A degenerate range yields `min`.
    pub fn sample<R>(&self, rng: &mut R) -> f32
    where
        R: Rng + ?Sized,
    {
        if self.max <= self.min {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.min * factor, self.max * factor)
    }

    fn validate(&self, field: &'static str, floor: f32) -> Result<(), DisasterConfigError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(DisasterConfigError::NonFinite { field });
        }
        if self.min < floor {
            return Err(DisasterConfigError::MinViolation {
                field,
                min: floor,
                value: self.min,
            });
        }
        if self.min > self.max {
            return Err(DisasterConfigError::RangeInverted {
                field,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// What the host does with the subscription once the event reports it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndPolicy {
    /// The subscription survives the end of the event; later completions resolve again.
    #[default]
    KeepListening,
    /// The host deactivates the event after each resolution.
    Deactivate,
}

/// Balance knobs for the construction disaster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisasterConfig {
    /// Fraction of max health dealt as electrical damage, before difficulty.
    #[serde(default = "DisasterConfig::default_damage_fraction")]
    pub damage_fraction: SampleRange,
    /// Explosion chance reached when the halved difficulty is 1.0 or more.
    #[serde(default = "DisasterConfig::default_max_explode_chance")]
    pub max_explode_chance: f32,
    #[serde(default = "DisasterConfig::default_explosion_radius")]
    pub explosion_radius: SampleRange,
    #[serde(default = "DisasterConfig::default_explosion_strength")]
    pub explosion_strength: SampleRange,
    #[serde(default)]
    pub end_policy: EndPolicy,
}

impl Default for DisasterConfig {
    fn default() -> Self {
        Self {
            damage_fraction: Self::default_damage_fraction(),
            max_explode_chance: Self::default_max_explode_chance(),
            explosion_radius: Self::default_explosion_radius(),
            explosion_strength: Self::default_explosion_strength(),
            end_policy: EndPolicy::default(),
        }
    }
}

impl DisasterConfig {
    const fn default_damage_fraction() -> SampleRange {
        SampleRange::new(DAMAGE_FRACTION_MIN, DAMAGE_FRACTION_MAX)
    }

    const fn default_max_explode_chance() -> f32 {
        EXPLODE_CHANCE_MAX
    }

    const fn default_explosion_radius() -> SampleRange {
        SampleRange::new(EXPLOSION_RADIUS_MIN, EXPLOSION_RADIUS_MAX)
    }

    const fn default_explosion_strength() -> SampleRange {
        SampleRange::new(EXPLOSION_STRENGTH_MIN, EXPLOSION_STRENGTH_MAX)
    }

    /// Parse a JSON config and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(raw: &str) -> Result<Self, DisasterConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns an error when a range is inverted, negative, or a chance leaves `[0, 1]`.
    pub fn validate(&self) -> Result<(), DisasterConfigError> {
        self.damage_fraction.validate("damage_fraction", 0.0)?;
        if self.damage_fraction.max > 1.0 {
            return Err(DisasterConfigError::RangeViolation {
                field: "damage_fraction.max",
                min: 0.0,
                max: 1.0,
                value: self.damage_fraction.max,
            });
        }
        if !self.max_explode_chance.is_finite() {
            return Err(DisasterConfigError::NonFinite {
                field: "max_explode_chance",
            });
        }
        if !(0.0..=1.0).contains(&self.max_explode_chance) {
            return Err(DisasterConfigError::RangeViolation {
                field: "max_explode_chance",
                min: 0.0,
                max: 1.0,
                value: self.max_explode_chance,
            });
        }
        self.explosion_radius.validate("explosion_radius", 0.0)?;
        self.explosion_strength.validate("explosion_strength", 0.0)?;
        Ok(())
    }
}

/// Named difficulty levels exposed by the host's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyPreset {
    Relaxing,
    Normal,
    Challenging,
}

impl DifficultyPreset {
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Relaxing => DIFFICULTY_RELAXING,
            Self::Normal => DIFFICULTY_NORMAL,
            Self::Challenging => DIFFICULTY_CHALLENGING,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Relaxing => "relaxing",
            Self::Normal => "normal",
            Self::Challenging => "challenging",
        }
    }
}

/// Story event difficulty multiplier, always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Difficulty(f32);

impl Difficulty {
    /// Wrap a raw multiplier.
    ///
    /// # Errors
    ///
    /// Returns an error for zero, negative, or non-finite values.
    pub fn new(value: f32) -> Result<Self, DisasterConfigError> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(DisasterConfigError::InvalidDifficulty { value })
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> f32 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DIFFICULTY_NORMAL)
    }
}

impl TryFrom<f32> for Difficulty {
    type Error = DisasterConfigError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Difficulty> for f32 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.0
    }
}

impl From<DifficultyPreset> for Difficulty {
    fn from(preset: DifficultyPreset) -> Self {
        Self(preset.multiplier())
    }
}
