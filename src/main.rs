use std::error::Error;
use std::net::SocketAddr;
use todo_keeper::{
    api::{self, AppState, Store},
    compute_statistics,
    settings::Settings,
    SaveFile, TodoManager,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::load()?;

    // ── Boot the collection ────────────────────────────────────
    let save_file = SaveFile::open(&settings.save_file)?;
    let store: Store = Box::new(save_file);
    let manager = TodoManager::open(store);

    let stats = compute_statistics(manager.tasks());
    info!(
        total = stats.total,
        completed = stats.completed,
        overdue = stats.overdue,
        save_file = %settings.save_file,
        "collection loaded"
    );

    let state = AppState::shared(manager);

    // ── Router ─────────────────────────────────────────────────
    let static_files = ServeDir::new(&settings.static_dir).append_index_html_on_directories(true);
    let app = api::router(state)
        .fallback_service(static_files)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // ── Start ──────────────────────────────────────────────────
    let addr: SocketAddr = settings.address().parse()?;
    info!("Server running on http://{addr}");
    info!("  Todos: http://{addr}/api/todos");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
