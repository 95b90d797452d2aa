use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use tracing::Level;

use sentinel::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT_MS};
use sentinel::editor::{ShelterEditor, SubmitError};
use sentinel::gateway::{GatewayError, HttpGateway, ShelterApi};
use sentinel::notice::Notifier;
use sentinel::shelter::ShelterDraft;
use sentinel::validation::{self, ValidationErrors};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("could not read draft from {path}: {source}")]
    ReadDraft { path: String, source: io::Error },
    #[error("invalid draft JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("draft failed validation: {0}")]
    Invalid(ValidationErrors),
    #[error("a submission is already in progress")]
    Busy,
    #[error("shelter {0} not found")]
    NotFound(u64),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl From<SubmitError<GatewayError>> for CliError {
    fn from(err: SubmitError<GatewayError>) -> Self {
        match err {
            SubmitError::Busy => Self::Busy,
            SubmitError::Invalid(errors) => Self::Invalid(errors),
            SubmitError::Rejected(e) => e.into(),
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sentinel", about = "Community shelter registry client")]
struct Cli {
    /// Backend base URL. Defaults to the URL fixed at build time.
    #[arg(long, env = "SENTINEL_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "SENTINEL_TIMEOUT_MS", default_value_t = DEFAULT_REQUEST_TIMEOUT_MS)]
    timeout_ms: u64,

    /// Log at debug level.
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every shelter.
    List,
    /// Show one shelter.
    Show { id: u64 },
    /// Create a shelter from a draft file.
    Create {
        #[arg(long, default_value = "-", help = "Draft JSON file, or - for stdin")]
        file: String,
    },
    /// Replace a shelter with a draft file.
    Update {
        id: u64,
        #[arg(long, default_value = "-", help = "Draft JSON file, or - for stdin")]
        file: String,
    },
    /// Delete a shelter.
    Delete { id: u64 },
    /// Validate a draft file without contacting the backend.
    Validate {
        #[arg(long, default_value = "-", help = "Draft JSON file, or - for stdin")]
        file: String,
    },
    /// Reformat postal-code input the way the editor does.
    FormatCep { input: String },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let config = cli
        .base_url
        .as_deref()
        .map_or_else(ClientConfig::default, ClientConfig::new)
        .with_timeout(Duration::from_millis(cli.timeout_ms));

    match cli.command {
        Command::Validate { file } => run_validate(&file),
        Command::FormatCep { input } => print_json(&json!({ "cep": validation::format_cep(&input) })),
        command => {
            let gateway = HttpGateway::new(config)?;
            tracing::debug!(base_url = gateway.base_url(), "gateway ready");
            run_remote(&gateway, command).await
        }
    }
}

async fn run_remote(api: &dyn ShelterApi, command: Command) -> Result<(), CliError> {
    match command {
        Command::List => print_json(&api.list().await?),
        Command::Show { id } => match api.get(id).await {
            Ok(shelter) => print_json(&shelter),
            Err(e) if e.is_not_found() => Err(CliError::NotFound(id)),
            Err(e) => Err(e.into()),
        },
        Command::Create { file } => {
            let mut editor = ShelterEditor::with_initial(read_draft(&file)?);
            let created = editor.submit(&Notifier::log_only(), |draft| async move { api.create(&draft).await }).await;
            let created = created.inspect_err(report_invalid)?;
            tracing::info!(id = created.id, "shelter created");
            print_json(&created)
        }
        Command::Update { id, file } => {
            let mut editor = ShelterEditor::with_initial(read_draft(&file)?);
            let updated = editor.submit(&Notifier::log_only(), |draft| async move { api.update(id, &draft).await }).await;
            let updated = updated.inspect_err(report_invalid)?;
            tracing::info!(id, "shelter updated");
            print_json(&updated)
        }
        Command::Delete { id } => {
            api.delete(id).await.map_err(|e| if e.is_not_found() { CliError::NotFound(id) } else { e.into() })?;
            tracing::info!(id, "shelter deleted");
            print_json(&json!({ "deleted": id }))
        }
        Command::Validate { .. } | Command::FormatCep { .. } => Ok(()),
    }
}

fn run_validate(file: &str) -> Result<(), CliError> {
    let draft = read_draft(file)?;
    match validation::validate_shelter(&draft) {
        Ok(()) => print_json(&json!({ "valid": true })),
        Err(errors) => {
            print_json(&json!({ "valid": false, "errors": errors.to_map() }))?;
            Err(CliError::Invalid(errors))
        }
    }
}

fn report_invalid(err: &SubmitError<GatewayError>) {
    if let SubmitError::Invalid(errors) = err {
        let _ = print_json(&json!({ "valid": false, "errors": errors.to_map() }));
    }
}

fn read_draft(file: &str) -> Result<ShelterDraft, CliError> {
    let mut raw = String::new();
    let read = if file == "-" {
        io::stdin().read_to_string(&mut raw).map(|_| ())
    } else {
        std::fs::read_to_string(PathBuf::from(file)).map(|text| raw = text)
    };
    read.map_err(|source| CliError::ReadDraft { path: file.to_owned(), source })?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
