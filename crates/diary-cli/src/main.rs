use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "diary", version, about = "Diary service CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the diary HTTP API.
    Serve,
    /// Apply pending database migrations and exit.
    Migrate,
    /// Issue a bearer token for local testing.
    Token {
        #[arg(long)]
        user_id: i64,
        #[arg(long, default_value_t = 3600, env = "JWT_TTL_SECONDS")]
        ttl_seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => {
            let config = diary_api::load_config()?;
            diary_api::run(config).await?;
        }
        Commands::Migrate => {
            diary_core::logging::init("diary-cli");
            let database_url = diary_core::config::required_env("DATABASE_URL")?;
            let pool = diary_core::db::connect(&database_url).await?;
            diary_core::migrations::run(&pool).await?;
            tracing::info!("migrations applied");
        }
        Commands::Token {
            user_id,
            ttl_seconds,
        } => {
            let mut jwt_config = diary_core::auth::jwt_config_from_env()?;
            jwt_config.ttl_seconds = ttl_seconds;
            let (token, _) = diary_core::auth::issue_token(&user_id.to_string(), &jwt_config)?;
            println!("{token}");
        }
    }

    Ok(())
}
