use anyhow::Context;
use clap::{Parser, Subcommand};
use passin_kernel::settings::Settings;

/// pass.in event registration backend
#[derive(Debug, Parser)]
#[command(name = "passin", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Migrate, then insert the demo event and its attendees
    Seed,
    /// Print the slug generated for a title
    Slug {
        /// Title to convert
        text: String,
    },
}

impl Cli {
    fn into_command(self) -> Command {
        self.command.unwrap_or(Command::Serve { port: None })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = Cli::parse().into_command();

    if let Command::Slug { text } = &command {
        println!("{}", passin_app::utils::generate_slug(text));
        return Ok(());
    }

    let mut settings = Settings::load().context("failed to load pass.in settings")?;
    passin_telemetry::init(&settings.telemetry)?;

    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            passin_app::bootstrap::run(settings).await
        }
        Command::Migrate => {
            let applied = passin_app::bootstrap::migrate(&settings).await?;
            tracing::info!(applied, "migrate finished");
            Ok(())
        }
        Command::Seed => seed(&settings).await,
        Command::Slug { .. } => Ok(()),
    }
}

async fn seed(settings: &Settings) -> anyhow::Result<()> {
    let store = passin_db::connect(&settings.database).await?;
    let registry = passin_app::bootstrap::build_registry(store.clone(), settings)?;

    let result = async {
        passin_app::bootstrap::apply_migrations(&store, &registry).await?;
        passin_app::seed::seed(&store).await
    }
    .await;
    store.close().await;

    let inserted = result?;
    tracing::info!(inserted, "seed finished");
    Ok(())
}
