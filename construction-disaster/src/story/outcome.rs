//! Result of handling one construction-completed signal.

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;
use crate::story::entry::LogHandle;
use crate::structure::TileId;

/// The destructive follow-up of an electrical fault; exactly one per resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisasterEffect {
    Fire,
    Explosion { radius: f32, strength: f32 },
}

impl DisasterEffect {
    #[must_use]
    pub const fn is_explosion(&self) -> bool {
        matches!(self, Self::Explosion { .. })
    }
}

/// What a completed resolution did. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub tile: TileId,
    /// Share of max health dealt, difficulty already applied.
    pub damage_fraction: f32,
    pub damage: f32,
    pub effect: DisasterEffect,
    pub log_entry: LogHandle,
}

/// How a story event handled one signal.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The structure is not part of the power grid.
    Skipped { tile: TileId },
    Resolved(ResolutionOutcome),
    /// A host call failed after the failure was announced; logged and swallowed.
    Aborted {
        damage_fraction: f32,
        log_entry: LogHandle,
        error: ResolutionError,
    },
}

impl Resolution {
    #[must_use]
    pub const fn outcome(&self) -> Option<&ResolutionOutcome> {
        match self {
            Self::Resolved(outcome) => Some(outcome),
            Self::Skipped { .. } | Self::Aborted { .. } => None,
        }
    }

    #[must_use]
    pub const fn effect(&self) -> Option<DisasterEffect> {
        match self {
            Self::Resolved(outcome) => Some(outcome.effect),
            Self::Skipped { .. } | Self::Aborted { .. } => None,
        }
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    #[must_use]
    pub const fn is_aborted(&self) -> bool {
        matches!(self, Self::Aborted { .. })
    }

    /// Log entry written while handling the signal, if any.
    #[must_use]
    pub const fn log_entry(&self) -> Option<LogHandle> {
        match self {
            Self::Resolved(outcome) => Some(outcome.log_entry),
            Self::Aborted { log_entry, .. } => Some(*log_entry),
            Self::Skipped { .. } => None,
        }
    }
}
