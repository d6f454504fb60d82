//! JobDesk admin command line.
//!
//! Validates and submits user and job posting records the same way the
//! dashboard forms do, and reads or deletes records on the admin API.
//!
//! Usage:
//!   jobdesk-admin validate --kind user record.json
//!   jobdesk-admin submit --kind job_posting --attach images=office.png posting.json
//!
//! API settings come from `JOBDESK_API_URL`, `JOBDESK_ACCESS_TOKEN` and
//! `JOBDESK_TIMEOUT_SECS` (a `.env` file is read first); flags override them.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobdesk_admin::{AttachArg, load_record, prepare_form, submit_form, validate_record};
use jobdesk_client::{AdminApiClient, ApiConfig};
use jobdesk_forms::{FormMode, PreviewRegistry, SubmitOutcome};
use jobdesk_model::{EntityKind, SchemaRegistry};
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "jobdesk-admin")]
#[command(about = "Validate and submit JobDesk admin records")]
struct Args {
    /// Admin API base URL (overrides JOBDESK_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Bearer token (overrides JOBDESK_ACCESS_TOKEN)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a JSON record against its form rules without sending it
    Validate {
        #[arg(short, long)]
        kind: EntityKind,
        file: PathBuf,
    },
    /// Validate a JSON record and create or update it on the API
    Submit {
        #[arg(short, long)]
        kind: EntityKind,
        /// Update the record named by the file's `id` instead of creating one
        #[arg(long)]
        edit: bool,
        /// Stage a file for a field, e.g. `images=office.png`
        #[arg(long = "attach", value_name = "FIELD=PATH")]
        attachments: Vec<AttachArg>,
        file: PathBuf,
    },
    /// List every record of a kind
    List {
        #[arg(short, long)]
        kind: EntityKind,
    },
    /// Print one record
    Get {
        #[arg(short, long)]
        kind: EntityKind,
        id: String,
    },
    /// Delete one record
    Delete {
        #[arg(short, long)]
        kind: EntityKind,
        id: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let registry = SchemaRegistry::builtin();
    match args.command {
        Command::Validate { kind, file } => {
            let record = load_record(&file)?;
            let report = validate_record(&registry, kind, &record)?;
            println!("{report}");
            Ok(exit_status(report.is_valid()))
        }
        Command::Submit {
            kind,
            edit,
            attachments,
            file,
        } => {
            let client = connect(args.api_url, args.token)?;
            let mode = if edit { FormMode::Edit } else { FormMode::Create };
            let previews = Arc::new(PreviewRegistry::new());
            let mut form = prepare_form(
                &registry,
                kind,
                mode,
                load_record(&file)?,
                &attachments,
                previews.clone(),
            )?;

            let (outcome, next_page) = submit_form(Arc::new(client), &mut form).await?;
            drop(form);
            if let Err(leak) = previews.check_leaks() {
                warn!("{}", leak);
            }

            match outcome {
                SubmitOutcome::Succeeded(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    if let Some(route) = next_page {
                        debug!("Dashboard would open {}", route.path());
                    }
                    Ok(ExitCode::SUCCESS)
                }
                SubmitOutcome::Invalid(result) => {
                    for (path, message) in result.errors.iter() {
                        eprintln!("{path}: {message}");
                    }
                    Ok(ExitCode::FAILURE)
                }
                SubmitOutcome::Failed(e) => {
                    debug!("Submission failed: {}", e);
                    Ok(ExitCode::FAILURE)
                }
                SubmitOutcome::InProgress => Ok(ExitCode::FAILURE),
            }
        }
        Command::List { kind } => {
            let client = connect(args.api_url, args.token)?;
            let records = client
                .list(kind)
                .await
                .with_context(|| format!("Failed to list {kind} records"))?;
            println!("{}", serde_json::to_string_pretty(&records)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Get { kind, id } => {
            let client = connect(args.api_url, args.token)?;
            let record = client
                .fetch(kind, &id)
                .await
                .with_context(|| format!("Failed to fetch {kind} {id}"))?;
            match record {
                Some(record) => {
                    println!("{}", serde_json::to_string_pretty(&record)?);
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("{kind} {id} not found");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Command::Delete { kind, id } => {
            let client = connect(args.api_url, args.token)?;
            client
                .delete(kind, &id)
                .await
                .with_context(|| format!("Failed to delete {kind} {id}"))?;
            println!("Deleted {kind} {id}");
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Builds the API client from the environment, letting flags override it.
fn connect(api_url: Option<String>, token: Option<String>) -> Result<AdminApiClient> {
    let mut config = ApiConfig::from_env().context("Invalid API settings in environment")?;
    if let Some(url) = api_url {
        config.base_url = url;
    }
    if let Some(token) = token {
        config.access_token = Some(token);
    }
    debug!("Using {:?}", config);
    AdminApiClient::new(config).context("Failed to create API client")
}

fn exit_status(valid: bool) -> ExitCode {
    if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
