//! Coordinator lifecycle states and outcomes.

use std::sync::Arc;

use thiserror::Error;

use crate::domain::ConfigObject;
use crate::loader::LoadError;

use super::CollaboratorError;

/// Message rendered when embedding is refused.
pub const EMBEDDING_DISALLOWED_MESSAGE: &str = "This page is for preview only and cannot be embedded.";

/// Lifecycle of one coordinator.
///
/// `Uninitialized → Resolving → Loading → {ValidatingAndApplying → Ready} | Failed`,
/// and any state moves to `Disposed` on `dispose()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Uninitialized,
    Resolving,
    Loading,
    ValidatingAndApplying,
    Ready,
    Failed,
    Disposed,
}

impl Phase {
    /// True once the pipeline can make no further progress.
    pub fn is_settled(&self) -> bool {
        matches!(self, Phase::Ready | Phase::Failed | Phase::Disposed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Resolving => "resolving",
            Phase::Loading => "loading",
            Phase::ValidatingAndApplying => "validating",
            Phase::Ready => "ready",
            Phase::Failed => "failed",
            Phase::Disposed => "disposed",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failures of the initialization pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InitError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error("{}", EMBEDDING_DISALLOWED_MESSAGE)]
    EmbeddingDisallowed,
    #[error("Collaborator failed: {0}")]
    Collaborator(#[from] CollaboratorError),
}

/// Terminal state of the resolution pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome {
    Ready(Arc<ConfigObject>),
    Failed(InitError),
}

impl ResolutionOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, ResolutionOutcome::Ready(_))
    }

    /// The failure, if the pipeline failed.
    pub fn error(&self) -> Option<&InitError> {
        match self {
            ResolutionOutcome::Ready(_) => None,
            ResolutionOutcome::Failed(err) => Some(err),
        }
    }
}

/// Whether the viewer may run inside a foreign page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedPolicy {
    pub allow_embed: bool,
}

impl Default for EmbedPolicy {
    fn default() -> Self {
        Self { allow_embed: true }
    }
}
