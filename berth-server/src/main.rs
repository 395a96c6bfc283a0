pub mod browser;
pub mod error;
pub mod health;
pub mod hosted;
pub mod logger;
pub mod resolver;
pub mod routes;

#[cfg(test)]
mod tests;

pub use crate::routes::build_router;

use crate::error::Result as ServerErrorResult;
use crate::hosted::AxumService;
use crate::resolver::{Registry, Resolver, TypeMapRegistry};

use std::error::Error;

use axum::Router;
use berth_config::Config;
use berth_control::LifecycleCoordinator;
use log::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load .env, then build and validate configuration from the environment
    dotenvy::dotenv().ok();
    let config = Config::from_env();
    config.validate()?;

    // Initialize logger (before any other logging)
    logger::initialize(
        config.logging.level,
        config.logging.file.as_ref().map(std::path::PathBuf::from),
        config.logging.colored,
    )?;

    info!("Starting berth-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // The dependency container is whatever the embedding host brings; this
    // binary brings none and hands both collaborators over directly.
    let registry = TypeMapRegistry::default();
    serve(
        &registry,
        Resolver::Direct(config),
        Resolver::Direct(Router::new()),
    )
    .await?;

    Ok(())
}

/// Resolve the configuration and the application router from the container,
/// then run the lifecycle until something stops the instance.
///
/// `app` is the embedding host's own routes; the runner merges them with its
/// built-in health endpoints.
pub async fn serve(
    registry: &dyn Registry,
    config: Resolver<Config>,
    app: Resolver<Router>,
) -> ServerErrorResult<()> {
    let config = config.resolve(registry)?;
    let app = app.resolve(registry)?;

    let coordinator = LifecycleCoordinator::new(config.server.clone())
        .with_browser_launcher(Box::new(browser::CommandBrowserLauncher));

    if config.server.stop_only {
        // Replace-me mode: signal the running instance instead of starting.
        let quiet = coordinator.stop_existing().await?;
        if quiet {
            info!("Instance at {} has shut down", config.server.control_addr());
        } else {
            warn!(
                "Instance at {} still reachable after {}ms",
                config.server.control_addr(),
                config.server.shutdown_timeout_ms
            );
        }
        return Ok(());
    }

    let state = health::AppState {
        status: coordinator.subscribe_status(),
    };
    let service = AxumService::new(config.server.bind_addr(), build_router(state).merge(app));

    let running = coordinator.start(&service).await?;
    running.wait_for_stop().await;

    info!("Shutdown complete");
    Ok(())
}
