use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use url::Url;

use viewer_configurator::coordinator::{
    CoordinatorContext, EmbedPolicy, InitializationCoordinator, ResolutionOutcome,
};
use viewer_configurator::schema::SchemaValidator;
use viewer_configurator::source::HostEnvironment;

use super::console::{ConsoleOptionsTarget, ConsoleViewerTarget, StderrRenderer};
use crate::cli::{self, ResolveArgs};

fn parse_url(raw: &str, what: &str) -> Result<Url> {
    Url::parse(raw).with_context(|| format!("Invalid {}: {}", what, raw))
}

/// Build the host environment from process variables, then apply flags.
fn host_environment(args: &ResolveArgs) -> Result<HostEnvironment> {
    let mut host = HostEnvironment::from_env();

    if let Some(query) = &args.query {
        host = host.with_query_string(query.clone());
    }
    if let Some(raw) = &args.default_url {
        host = host.with_default_url(parse_url(raw, "default config URL")?);
    }
    if let Some(path) = &args.default_config {
        host = host.with_default_object(cli::read_config_file(path)?);
    }
    if let Some(raw) = &args.base_url {
        host = host.with_base_url(parse_url(raw, "base URL")?);
    }
    if args.embedded {
        host = host.embedded(true);
    }

    Ok(host)
}

pub async fn run_resolve(args: ResolveArgs) -> Result<()> {
    // A broken bundled schema is fatal before anything else happens.
    let validator = Arc::new(SchemaValidator::bundled()?);

    let explicit = args.config.as_deref().map(cli::read_config_file).transpose()?;
    let host = host_environment(&args)?;
    let context = CoordinatorContext::new(host, validator)
        .with_embed_policy(EmbedPolicy {
            allow_embed: !args.deny_embed,
        })
        .with_fatal_renderer(Arc::new(StderrRenderer));

    let coordinator = InitializationCoordinator::construct(
        Arc::new(ConsoleViewerTarget),
        Arc::new(ConsoleOptionsTarget),
        explicit,
        context,
    );

    let outcome = coordinator.settled().await;
    debug!("Phases: {:?}", coordinator.transitions());

    if let Some(validation) = coordinator.validation() {
        if !validation.is_valid() {
            println!("\n⚠️  Config does not match the schema:");
            for error in validation.errors() {
                println!("   - {}", error);
            }
        }
    }

    let result = match outcome {
        Some(ResolutionOutcome::Ready(_)) => {
            println!("\n✅ Configuration ready");
            Ok(())
        }
        Some(ResolutionOutcome::Failed(err)) => Err(anyhow::Error::new(err)),
        None => Err(anyhow::anyhow!("Coordinator disposed before resolution finished")),
    };

    coordinator.dispose();
    result
}
