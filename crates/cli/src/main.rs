use anyhow::Context;
use bookshelf_db::Store;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Bookshelf REST service
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Print the effective settings as JSON
    Config,
    /// Check that the configured document store answers
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry);
            tracing::info!(env = ?settings.environment, "bookshelf serve");
            bookshelf_app::run(settings).await
        }
        Command::Config => {
            let rendered = serde_json::to_string_pretty(&settings)
                .context("failed to render settings")?;
            println!("{}", rendered);
            Ok(())
        }
        Command::Ping => {
            bookshelf_telemetry::init(&settings.telemetry);
            let store = Store::connect(&settings.database)
                .await
                .context("failed to create document store client")?;
            let outcome = store.ping().await.context("document store did not answer");
            store.shutdown().await;
            outcome?;
            println!("{:?} store at {} is reachable", store.backend(), settings.database.name);
            Ok(())
        }
    }
}
