//! Concrete structure used by the in-memory host.

use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::structure::{DamageType, Damageable, Flammable, Position, Structure, TileId};

/// One damage call received by a tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageRecord {
    pub amount: f32,
    pub kind: DamageType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
    #[serde(default)]
    pub hits: Vec<DamageRecord>,
    /// Fault injection: every damage call fails.
    #[serde(default)]
    pub refuse_damage: bool,
}

impl Health {
    #[must_use]
    pub const fn full(max: f32) -> Self {
        Self {
            current: max,
            max,
            hits: Vec::new(),
            refuse_damage: false,
        }
    }

    /// Sum of all damage received.
    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.hits.iter().map(|hit| hit.amount).sum()
    }
}

impl Damageable for Health {
    fn max_health(&self) -> f32 {
        self.max
    }

    fn health(&self) -> f32 {
        self.current
    }

    fn take_damage(&mut self, amount: f32, kind: DamageType) -> Result<(), HostError> {
        if self.refuse_damage {
            return Err(HostError::Unavailable("damage model"));
        }
        self.current = (self.current - amount).max(0.0);
        self.hits.push(DamageRecord { amount, kind });
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireState {
    pub on_fire: bool,
    pub ignitions: u32,
    /// Fault injection: every ignite call fails.
    #[serde(default)]
    pub refuse_ignition: bool,
}

impl Flammable for FireState {
    fn is_on_fire(&self) -> bool {
        self.on_fire
    }

    fn set_on_fire(&mut self) -> Result<(), HostError> {
        if self.refuse_ignition {
            return Err(HostError::Rejected("fire system refused ignition".to_string()));
        }
        self.on_fire = true;
        self.ignitions = self.ignitions.saturating_add(1);
        Ok(())
    }
}

/// A placed building with optional capabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Definition name key, e.g. `tile.battery`.
    pub name: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub energy_node: bool,
    #[serde(default)]
    pub health: Option<Health>,
    #[serde(default)]
    pub fire: Option<FireState>,
}

impl Tile {
    /// Grid-connected tile with health and flammability.
    #[must_use]
    pub fn powered(id: u64, name: impl Into<String>, max_health: f32) -> Self {
        Self {
            id: TileId(id),
            name: name.into(),
            position: Position::default(),
            energy_node: true,
            health: Some(Health::full(max_health)),
            fire: Some(FireState::default()),
        }
    }

    /// Same as [`Tile::powered`] but outside the power grid.
    #[must_use]
    pub fn unpowered(id: u64, name: impl Into<String>, max_health: f32) -> Self {
        Self {
            energy_node: false,
            ..Self::powered(id, name, max_health)
        }
    }

    #[must_use]
    pub const fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn without_health(mut self) -> Self {
        self.health = None;
        self
    }

    #[must_use]
    pub fn without_fire(mut self) -> Self {
        self.fire = None;
        self
    }

    #[must_use]
    pub fn refusing_damage(mut self) -> Self {
        if let Some(health) = self.health.as_mut() {
            health.refuse_damage = true;
        }
        self
    }

    #[must_use]
    pub fn refusing_ignition(mut self) -> Self {
        if let Some(fire) = self.fire.as_mut() {
            fire.refuse_ignition = true;
        }
        self
    }

    #[must_use]
    pub fn is_on_fire(&self) -> bool {
        self.fire.as_ref().is_some_and(|fire| fire.on_fire)
    }

    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.health.as_ref().map_or(0.0, Health::total_damage)
    }
}

impl Structure for Tile {
    fn id(&self) -> TileId {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Position {
        self.position
    }

    fn has_energy_node(&self) -> bool {
        self.energy_node
    }

    fn damageable(&mut self) -> Option<&mut dyn Damageable> {
        self.health
            .as_mut()
            .map(|health| health as &mut dyn Damageable)
    }

    fn flammable(&mut self) -> Option<&mut dyn Flammable> {
        self.fire.as_mut().map(|fire| fire as &mut dyn Flammable)
    }
}
