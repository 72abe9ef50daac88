//! Soul Mirror gateway. Reads `.env`, `config/mirror.toml` and the environment, then serves
//! the process/profile/tools/status API.

use mirror_core::{InMemoryProfile, MirrorConfig, Orchestrator, SelectionService, ToolRegistry};
use mirror_gateway::{build_app, logging, AppState, VERSION};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();

    let cfg = MirrorConfig::load()?;
    logging::init_logging(&cfg);

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(_) => tracing::debug!("no .env file, using process environment"),
    }

    let registry = Arc::new(ToolRegistry::with_builtin_tools());
    let selection = Arc::new(SelectionService::from_config(&cfg));
    let orchestrator = Orchestrator::new(registry.clone(), Arc::new(InMemoryProfile::new()), selection)
        .with_environment(cfg.environment.clone());

    tracing::info!(
        version = VERSION,
        environment = %cfg.environment,
        tools = registry.len(),
        llm_available = cfg.has_llm_credential(),
        "soul mirror gateway starting"
    );

    let app = build_app(AppState::new(orchestrator));
    let addr = cfg.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
