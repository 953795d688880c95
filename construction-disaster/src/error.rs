//! Error types shared by the rule and the host seams.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::structure::{Capability, TileId};

/// Failure reported by a host collaborator (damage model, fire system, command queue).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("host rejected the request: {0}")]
    Rejected(String),
    #[error("host subsystem unavailable: {0}")]
    Unavailable(&'static str),
}

/// Step of the resolution in which a host call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStage {
    Damage,
    Ignite,
    Explosion,
}

/// Errors raised while resolving a disaster; always logged and swallowed by the rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("tile {tile} has no {capability} capability")]
    MissingCapability { tile: TileId, capability: Capability },
    #[error("{stage:?} failed on tile {tile}: {source}")]
    Host {
        tile: TileId,
        stage: ResolutionStage,
        #[source]
        source: HostError,
    },
}

impl ResolutionError {
    #[must_use]
    pub const fn tile(&self) -> TileId {
        match self {
            Self::MissingCapability { tile, .. } | Self::Host { tile, .. } => *tile,
        }
    }
}
