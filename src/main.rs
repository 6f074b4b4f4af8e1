use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use battle_bracket::{
    api::{self, AppState},
    config::ServerConfig,
    db,
    service::{StateStore, TournamentService},
    timer::MatchTimer,
};

#[derive(Parser)]
#[command(name = "battle-bracket")]
#[command(about = "Single-elimination bracket server for robot battle events")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the control panel API server
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port for HTTP API
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Print the saved tournament as JSON
    Show,
    /// Delete the saved tournament
    Reset,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "battle_bracket=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn open_database(config: &ServerConfig) -> anyhow::Result<db::Database> {
    let db = match &config.db_path {
        Some(path) => db::Database::open(path.clone())?,
        None => db::Database::open_default()?,
    };
    db.migrate()?;
    Ok(db)
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = open_database(&config)?;
    let timer = Arc::new(MatchTimer::from_secs(config.match_seconds));
    let service = TournamentService::open(Arc::new(db), timer.clone())?;

    let app = api::create_router(AppState { service, timer }, &config);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Battle bracket server listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = ServerConfig::from_env();

    match cli.command {
        Some(Commands::Serve { host, port }) => {
            serve(config.with_address(host, port)).await?;
        }
        Some(Commands::Show) => {
            let db = open_database(&config)?;
            match db.load()? {
                Some(tournament) => {
                    println!("{}", serde_json::to_string_pretty(&tournament.snapshot())?);
                }
                None => println!("No saved tournament"),
            }
        }
        Some(Commands::Reset) => {
            let db = open_database(&config)?;
            db.clear()?;
            println!("Saved tournament deleted");
        }
        None => {
            // Default: start server
            serve(config).await?;
        }
    }

    Ok(())
}
