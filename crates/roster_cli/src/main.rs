//! Command-line driver for the roster boundary.
//!
//! # Responsibility
//! - Turn one command line into one routed request.
//! - Print the response envelope as JSON on stdout.

use clap::Parser;
use roster_api::{Request, ResponseEnvelope, RosterConfig, Router};
use std::path::PathBuf;
use std::process::ExitCode;

/// Sends one request to the roster backend and prints the response envelope.
#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Institution, course and student roster")]
struct Cli {
    /// Request method: GET, POST, PATCH or DELETE
    method: String,

    /// Route path, e.g. /addNewInstitution
    path: String,

    /// Request parameters as key=value pairs
    #[arg(value_parser = parse_param)]
    params: Vec<(String, String)>,

    /// Session id; sort orders alternate across runs sharing it and the database
    #[arg(short, long)]
    session: Option<String>,

    /// Database file (overrides ROSTER_DB_PATH)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

impl Cli {
    fn into_request(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            params: self.params.into_iter().collect(),
            session_id: self.session,
        }
    }
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("parameter name is empty in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = RosterConfig::from_env();
    if let Some(db) = cli.db.clone() {
        config.db_path = db;
    }
    if let Err(err) = config.init_logging() {
        eprintln!("roster: logging disabled: {err}");
    }

    let compact = cli.compact;
    let router = Router::from_config(&config);
    let envelope = router.handle(&cli.into_request());

    match render(&envelope, compact) {
        Ok(text) => println!("{text}"),
        Err(err) => {
            eprintln!("roster: failed to render response: {err}");
            return ExitCode::FAILURE;
        }
    }

    if envelope.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn render(envelope: &ResponseEnvelope, compact: bool) -> Result<String, serde_json::Error> {
    if compact {
        serde_json::to_string(envelope)
    } else {
        envelope.to_json_pretty()
    }
}
