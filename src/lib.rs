//! Configuration resolution and validation for an embeddable viewer widget.
//!
//! A configuration can come from four competing sources (an explicit object,
//! the host page's query string, a default URL, a default object). The
//! [`InitializationCoordinator`] picks one, loads it, checks it against the
//! bundled schema and hands it to the viewer and options collaborators.

pub mod coordinator;
pub mod domain;
pub mod loader;
pub mod schema;
pub mod source;

#[cfg(test)]
mod test_support;

pub use coordinator::{
    CoordinatorContext, EmbedPolicy, InitError, InitializationCoordinator, Phase,
    ResolutionOutcome,
};
pub use domain::{ConfigObject, ConfigReference, Params};
pub use loader::{ConfigLoader, ConfigTransport, HttpTransport, LoadError};
pub use schema::{SchemaValidator, ValidationResult};
pub use source::HostEnvironment;
