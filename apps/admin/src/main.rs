mod app;

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use parish_core::models::{User, UserType};
use parish_core::phone::to_international;
use parish_http::{init_logging, LoggingConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parish-admin")]
#[command(about = "Parish administration server and operator commands")]
#[command(version)]
struct Cli {
    /// YAML configuration file. Without it `PARISH_*` variables are read.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Create the database schema
    Migrate,

    /// Create an office administrator account
    CreateAdmin {
        username: String,

        /// Phone number, local or +255 format
        #[arg(long)]
        phone: String,

        #[arg(long)]
        password: String,
    },

    /// Print the SMS gateway credit balance
    SmsBalance,

    /// Send one text to several numbers
    SmsBroadcast {
        /// Recipient phone number (repeatable)
        #[arg(long = "to", required = true)]
        to: Vec<String>,

        message: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = app::load_config(cli.config.as_deref())?;

    init_logging(
        LoggingConfig::for_app(&config).with_service(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
    )
    .map_err(|err| anyhow!(err))?;

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            let state = app::build_state(config).await?;
            app::serve(state).await?;
        }
        Commands::Migrate => {
            if !config.has_database() {
                bail!("No database configured; set DATABASE_URL");
            }
            app::open_stores(&config).await?;
            println!("Database schema is up to date");
        }
        Commands::CreateAdmin {
            username,
            phone,
            password,
        } => {
            let stores = app::open_stores(&config).await?;
            let hasher = app::password_hasher(&config)?;
            let user = User::new(
                username,
                to_international(&phone),
                UserType::Admin,
                hasher.hash_password(&password)?,
            );
            let user = stores.users.insert_user(user).await?;
            println!("Administrator {} created", user.username);
        }
        Commands::SmsBalance => {
            let provider = app::sms_provider(&config, |key| std::env::var(key).ok())?;
            println!("{}", provider.balance().await?);
        }
        Commands::SmsBroadcast { to, message } => {
            let numbers: Vec<String> = to.iter().map(|n| to_international(n)).collect();
            let state = app::build_state(config).await?;
            for (number, outcome) in state.sms.broadcast(&numbers, &message).await {
                match outcome.request_id() {
                    Some(request_id) => println!("{}: sent ({})", number, request_id),
                    None => println!("{}: {:?}", number, outcome),
                }
            }
        }
    }

    Ok(())
}
