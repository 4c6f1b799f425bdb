use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catfarm::api;
use catfarm::config::Settings;

#[derive(Parser)]
#[command(name = "catfarm")]
#[command(about = "REST API for the cats on the farm")]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API (default)
    Serve,
    /// Create the database schema and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "catfarm=debug,catfarm_core=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&cli.settings).await?,
        Commands::Migrate => {
            let db = cli.settings.open_database()?;
            db.migrate()?;
            tracing::info!("Database schema is up to date");
        }
    }

    Ok(())
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let db = settings.open_database()?;
    db.migrate()?;

    let app = api::create_router(db);

    let addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Cat farm listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
