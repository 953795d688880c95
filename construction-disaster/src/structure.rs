//! Structure capabilities the host exposes to story events.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::HostError;

/// Stable identifier of a placed structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grid position of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Cause attached to damage so the host can pick effects and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Electricity,
    Explosion,
    Fire,
}

/// Optional capabilities a structure may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    EnergyNode,
    Damageable,
    Flammable,
}

impl Capability {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::EnergyNode => "energy_node",
            Self::Damageable => "damageable",
            Self::Flammable => "flammable",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Health pool of a structure.
pub trait Damageable {
    fn max_health(&self) -> f32;

    fn health(&self) -> f32;

    /// Apply damage; clamping at zero is the host's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if the host damage model refuses the hit.
    fn take_damage(&mut self, amount: f32, kind: DamageType) -> Result<(), HostError>;
}

/// Fire state of a structure.
pub trait Flammable {
    fn is_on_fire(&self) -> bool;

    /// Ignite the structure.
    ///
    /// # Errors
    ///
    /// Returns an error if the host fire system cannot ignite it.
    fn set_on_fire(&mut self) -> Result<(), HostError>;
}

/// A placed building as seen by story events. Events observe it; the host owns it.
pub trait Structure {
    fn id(&self) -> TileId;

    /// Display name key of the structure's definition.
    fn display_name(&self) -> &str;

    fn position(&self) -> Position;

    /// Whether the structure participates in the power grid.
    fn has_energy_node(&self) -> bool;

    fn damageable(&mut self) -> Option<&mut dyn Damageable>;

    fn flammable(&mut self) -> Option<&mut dyn Flammable>;
}
