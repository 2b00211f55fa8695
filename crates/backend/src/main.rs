pub mod api;
pub mod dashboards;
pub mod routes;
pub mod shared;
pub mod system;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use tokio::net::TcpListener;

    use dashboards::d402_top_customers::ReportSettings;
    use shared::state::AppState;

    system::tracing::initialize()?;

    let config = shared::config::load_config()?;
    let provider = shared::llm::build_provider(&config)?;
    let state = AppState::new(provider, ReportSettings::from_config(&config));

    tracing::info!(
        "Report {} ({}) via tool {}, default limit {}, timeout {}s",
        config.report.id,
        config.report.name,
        config.report.tool,
        config.report.default_limit,
        config.llm.timeout_secs
    );

    let app = routes::build_app(state);

    let addr = config.socket_addr()?;

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server running on port {}", addr.port());
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Set PORT or server.port in config.toml.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(system::shutdown::shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
