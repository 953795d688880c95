//! Centralized tuning constants for the construction disaster event.
//!
//! These are the defaults `DisasterConfig` falls back to when a field is
//! missing from a config file.

// Identity ------------------------------------------------------------------
pub const CONSTRUCTION_DISASTER_ID: &str = "ConstructionDisaster";
pub(crate) const RNG_FORK_DOMAIN: &str = "construction-disaster";

// Presentation keys ---------------------------------------------------------
pub(crate) const LOG_CONSTRUCT_FAIL_TITLE: &str = "ev.construct.fail.title";
pub(crate) const LOG_CONSTRUCT_FAIL_DESC: &str = "ev.construct.fail.desc";

// Damage --------------------------------------------------------------------
pub(crate) const DAMAGE_FRACTION_MIN: f32 = 0.10;
pub(crate) const DAMAGE_FRACTION_MAX: f32 = 0.30;

// Explosion -----------------------------------------------------------------
pub(crate) const EXPLODE_CHANCE_MAX: f32 = 0.4;
/// Difficulty is halved before interpolating, so the ceiling is hit at 2.0.
pub(crate) const EXPLODE_DIFFICULTY_SCALE: f32 = 0.5;
pub(crate) const EXPLOSION_RADIUS_MIN: f32 = 1.0;
pub(crate) const EXPLOSION_RADIUS_MAX: f32 = 3.0;
pub(crate) const EXPLOSION_STRENGTH_MIN: f32 = 50.0;
pub(crate) const EXPLOSION_STRENGTH_MAX: f32 = 100.0;

// Difficulty ----------------------------------------------------------------
pub(crate) const DIFFICULTY_RELAXING: f32 = 0.5;
pub(crate) const DIFFICULTY_NORMAL: f32 = 1.0;
pub(crate) const DIFFICULTY_CHALLENGING: f32 = 2.0;
