//! Interfaces of the components built from a resolved configuration.
//!
//! Construction is two-phase: a [`ViewerTarget`] mounts a viewer and returns
//! its handle, the coordinator awaits [`Viewer::ready`], and only then mounts
//! the options UI through an [`OptionsTarget`] with a shared handle to that
//! viewer.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::domain::Params;

/// A collaborator failed to build or to become ready.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CollaboratorError(pub String);

impl CollaboratorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A mounted viewer.
#[async_trait]
pub trait Viewer: Send + Sync {
    /// Completes once, after the viewer's own initialization.
    async fn ready(&self) -> Result<(), CollaboratorError>;

    /// Release the viewer.
    fn dispose(&self);
}

/// A mounted options UI.
pub trait OptionsView: Send + Sync {
    /// Release the options UI.
    fn dispose(&self);
}

/// Where the viewer gets mounted.
pub trait ViewerTarget: Send + Sync {
    /// Build a viewer for `model`. `model` is `null` when the config has none.
    fn mount(&self, model: &Value, params: &Params) -> Result<Arc<dyn Viewer>, CollaboratorError>;
}

/// Where the options UI gets mounted.
pub trait OptionsTarget: Send + Sync {
    /// Build the options UI for `options`, bound to an already ready viewer.
    fn mount(
        &self,
        options: &Value,
        viewer: Arc<dyn Viewer>,
    ) -> Result<Box<dyn OptionsView>, CollaboratorError>;
}

/// Shows a fatal message on the host surface.
pub trait FatalErrorRenderer: Send + Sync {
    fn render_fatal(&self, message: &str);
}
