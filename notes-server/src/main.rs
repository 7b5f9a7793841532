use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use notes_api::EntryId;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod data;
mod error;
mod handlers;


pub use data::DataFile;
pub use error::Error;

const DEFAULT_DATA_FILE: &str = "user-text.json";

#[derive(structopt::StructOpt)]
struct Opt {
    /// Path of the JSON data file, defaults to $NOTES_DATA_FILE or user-text.json
    #[structopt(short, long, parse(from_os_str))]
    data_file: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Option<Command>,
}

#[derive(structopt::StructOpt)]
enum Command {
    /// Serve the notes API (default)
    Serve {
        #[structopt(short, long, default_value = "127.0.0.1:5050")]
        listen: SocketAddr,
    },

    /// Delete an entry, and its replies unless --no-cascade is given
    Delete {
        id: EntryId,

        #[structopt(long)]
        no_cascade: bool,
    },

    /// Delete all entries created before an RFC 3339 timestamp
    DeleteBefore {
        timestamp: String,

        #[structopt(long)]
        no_cascade: bool,
    },
}

fn data_file_path(opt: Option<PathBuf>) -> PathBuf {
    opt.or_else(|| std::env::var_os("NOTES_DATA_FILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

pub fn app(data: DataFile) -> Router {
    Router::new()
        .route("/get-data", get(handlers::get_data))
        .route("/submit", post(handlers::submit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(data)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let opt = <Opt as structopt::StructOpt>::from_args();
    let data = DataFile::open(data_file_path(opt.data_file))
        .await
        .context("opening data file")?;

    match opt.cmd.unwrap_or(Command::Serve {
        listen: SocketAddr::from(([127, 0, 0, 1], 5050)),
    }) {
        Command::Serve { listen } => {
            tracing::info!("listening on {}", listen);
            axum::Server::bind(&listen)
                .serve(app(data).into_make_service())
                .await
                .context("serving axum webserver")?;
        }
        Command::Delete { id, no_cascade } => {
            let removed = data
                .delete(&id, !no_cascade)
                .await
                .with_context(|| format!("deleting entry {id}"))?;
            println!("Deleted {} entries", removed.len());
        }
        Command::DeleteBefore {
            timestamp,
            no_cascade,
        } => {
            let cutoff = chrono::DateTime::parse_from_rfc3339(&timestamp)
                .with_context(|| format!("parsing {timestamp:?} as an RFC 3339 timestamp"))?
                .with_timezone(&chrono::Utc);
            let removed = data
                .delete_before(cutoff, !no_cascade)
                .await
                .with_context(|| format!("deleting entries before {cutoff}"))?;
            println!("Deleted {} entries before {cutoff}", removed.len());
        }
    }

    Ok(())
}
