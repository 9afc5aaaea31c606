use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use resort_booking::config::ClientConfig;
use resort_booking::handlers;
use resort_booking::handlers::prompt::StdinConfirm;
use resort_booking::handlers::reservations::ReservationArgs;
use resort_booking::models::{Format, RecordId};
use resort_booking::services::client::ReservationClient;
use resort_booking::services::confirm::{AlwaysConfirm, Confirm};
use resort_booking::services::transport::http::HttpTransport;
use resort_booking::services::transport::Endpoints;

#[derive(Parser)]
#[command(name = "resort-booking", about = "Client for the resort reservation API")]
struct Cli {
    /// Server root, e.g. http://localhost:5000
    #[arg(long)]
    base_url: Option<String>,

    /// Reservations path on the server, e.g. /api/reservations
    #[arg(long)]
    path: Option<String>,

    /// Wire format for requests and responses
    #[arg(long, global = true, value_enum)]
    format: Option<Format>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List reservations, newest first
    List {
        /// Matches guest name, email or resort
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Show one reservation
    View { id: String },
    /// Create a reservation
    Create(ReservationArgs),
    /// Load a reservation, apply the given fields and save it
    Edit {
        id: String,
        #[command(flatten)]
        fields: ReservationArgs,
    },
    /// Delete a reservation
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Check that the server is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env();
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    if let Some(path) = cli.path {
        config.base_path = path;
    }
    let format = cli.format.unwrap_or(config.format);

    tracing::debug!(base_url = %config.base_url, base_path = %config.base_path, %format, "client configured");

    let confirm: Box<dyn Confirm> = match &cli.command {
        Command::Delete { yes: true, .. } => Box::new(AlwaysConfirm),
        _ => Box::new(StdinConfirm),
    };
    let transport = HttpTransport::new(&config.base_url, config.timeout())?;
    let client = ReservationClient::new(
        Box::new(transport),
        confirm,
        Endpoints::new(&config.base_path),
    )
    .with_display_format(format);

    match cli.command {
        Command::List { query } => handlers::reservations::list(&client, query.as_deref(), format).await,
        Command::View { id } => handlers::reservations::view(&client, &RecordId::new(id), format).await,
        Command::Create(fields) => handlers::reservations::create(&client, &fields, format).await,
        Command::Edit { id, fields } => {
            handlers::reservations::edit(&client, &RecordId::new(id), &fields, format).await
        }
        Command::Delete { id, .. } => handlers::reservations::delete(&client, &RecordId::new(id)).await,
        Command::Health => handlers::health::health(&client).await,
    }
}
