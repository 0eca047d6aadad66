use std::sync::Arc;

use clap::Parser;
use goaltrack_backend_lib::{config::Settings, router, store::FlatFileStore, AppState};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "goaltrack-backend", about = "GoalTrack REST backend")]
struct Args {
    /// Path to the configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Refuse to start without a usable configuration (JWT_SECRET in
    // particular is mandatory).
    let settings = match Settings::load_from(&args.config) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        },
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let store = FlatFileStore::new(&settings.data_dir)?;
    let bind_addr = settings.bind_addr;

    let state = Arc::new(AppState::new(store, settings));
    let app = router::create_router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
