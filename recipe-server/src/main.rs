mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;
mod server;

use clap::{Parser, Subcommand};
use infrastructure::config::AppConfig;
use infrastructure::database::{create_pool, run_migrations};
use infrastructure::logging::init_logging;
use server::{Services, start_rest_server};
use tracing::info;

#[derive(Parser, Debug)]
#[command(about = "Recipe API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve,
    /// Create an administrative account and exit.
    CreateSuperuser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let services = Services::postgres(pool, &config);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => start_rest_server(config, services).await,
        Command::CreateSuperuser { email, password } => {
            let user = services.auth.create_superuser(&email, &password).await?;
            info!(user_id = %user.id, email = %user.email, "superuser created");
            Ok(())
        }
    }
}
