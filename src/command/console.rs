//! Collaborators that print what they receive instead of rendering it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use viewer_configurator::coordinator::{
    CollaboratorError, FatalErrorRenderer, OptionsTarget, OptionsView, Viewer, ViewerTarget,
};
use viewer_configurator::domain::Params;

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub struct ConsoleViewer;

#[async_trait]
impl Viewer for ConsoleViewer {
    async fn ready(&self) -> Result<(), CollaboratorError> {
        debug!("Console viewer ready");
        Ok(())
    }

    fn dispose(&self) {
        debug!("Console viewer disposed");
    }
}

pub struct ConsoleOptionsView;

impl OptionsView for ConsoleOptionsView {
    fn dispose(&self) {
        debug!("Console options view disposed");
    }
}

pub struct ConsoleViewerTarget;

impl ViewerTarget for ConsoleViewerTarget {
    fn mount(&self, model: &Value, params: &Params) -> Result<Arc<dyn Viewer>, CollaboratorError> {
        println!("Viewer:");
        println!("  model: {}", pretty(model));
        if params.is_empty() {
            println!("  params: (none)");
        } else {
            println!("  params:");
            for (key, value) in params {
                println!("    {} = {}", key, value);
            }
        }
        Ok(Arc::new(ConsoleViewer))
    }
}

pub struct ConsoleOptionsTarget;

impl OptionsTarget for ConsoleOptionsTarget {
    fn mount(
        &self,
        options: &Value,
        _viewer: Arc<dyn Viewer>,
    ) -> Result<Box<dyn OptionsView>, CollaboratorError> {
        println!("Options:");
        for line in pretty(options).lines() {
            println!("  {}", line);
        }
        Ok(Box::new(ConsoleOptionsView))
    }
}

pub struct StderrRenderer;

impl FatalErrorRenderer for StderrRenderer {
    fn render_fatal(&self, message: &str) {
        eprintln!("⛔ {}", message);
    }
}
