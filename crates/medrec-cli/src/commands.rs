use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use medrec_sdk::{
    AuthMethod, ClientConfig, DiffRequest, DiffWorkflow, EntryTarget, MedrecClient,
    RestoreRequest, RestoreWorkflow, VersionApi, VersionHistory,
};
use medrec_server::{MedrecServer, ServerConfig};
use medrec_types::NewEntry;
use serde::Serialize;

use crate::cli::*;
use crate::render;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let client = || connect(&cli.server, cli.token.clone());
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Patients(args) => cmd_patients(&client()?, args, format).await,
        Command::History(args) => cmd_history(client()?, args, format).await,
        Command::Show(args) => cmd_show(&client()?, args, format).await,
        Command::Diff(args) => cmd_diff(client()?, args, format).await,
        Command::Restore(args) => cmd_restore(client()?, args, format).await,
        Command::Edit(args) => cmd_edit(&client()?, args, format).await,
        Command::Record(args) => cmd_record(&client()?, args, format).await,
        Command::Latest(args) => cmd_latest(&client()?, args, format).await,
    }
}

fn connect(server: &str, token: Option<String>) -> anyhow::Result<MedrecClient> {
    let auth = token.map_or(AuthMethod::Anonymous, AuthMethod::Bearer);
    tracing::debug!(server, authenticated = auth.is_authenticated(), "connecting");
    let client = MedrecClient::new(ClientConfig::new(server).with_auth(auth))?;
    Ok(client)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn target(args: EntryArgs) -> EntryTarget {
    EntryTarget::new(args.patient, args.entry)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = ServerConfig::load(args.config.as_deref())
        .context("failed to load server configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(seed) = args.seed {
        config.seed_path = Some(seed);
    }

    let server = MedrecServer::new(config)?;
    println!(
        "{} medrec server on {}",
        "✓".green().bold(),
        server.config().bind_addr.to_string().bold()
    );
    server.serve().await?;
    Ok(())
}

async fn cmd_patients(
    client: &MedrecClient,
    args: PatientsArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match args.patient {
        Some(id) => {
            let patient = client.get_patient(id).await?;
            match format {
                OutputFormat::Json => print_json(&patient),
                OutputFormat::Text => {
                    print!("{}", render::patient(&patient));
                    Ok(())
                }
            }
        }
        None => {
            let patients = client.list_patients().await?;
            match format {
                OutputFormat::Json => print_json(&patients),
                OutputFormat::Text => {
                    print!("{}", render::patients(&patients));
                    Ok(())
                }
            }
        }
    }
}

async fn cmd_history(
    client: MedrecClient,
    args: EntryArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let history = VersionHistory::new(Arc::new(client), Some(target(args)));
    history.refresh().await;
    let state = history.snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }

    match format {
        OutputFormat::Json => print_json(&state.versions),
        OutputFormat::Text => {
            print!("{}", render::history(&state.versions));
            Ok(())
        }
    }
}

async fn cmd_show(client: &MedrecClient, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let version = client
        .get_version(args.entry.patient, args.entry.entry, args.version)
        .await?;
    match format {
        OutputFormat::Json => print_json(&version),
        OutputFormat::Text => {
            print!("{}", render::version(&version));
            Ok(())
        }
    }
}

async fn cmd_diff(client: MedrecClient, args: DiffArgs, format: OutputFormat) -> anyhow::Result<()> {
    let workflow = DiffWorkflow::new(Arc::new(client));
    workflow
        .fetch_diff(DiffRequest {
            patient: args.entry.patient,
            entry: args.entry.entry,
            version_a: args.from,
            version_b: args.to,
            base: args.base,
        })
        .await;
    let state = workflow.snapshot();
    if let Some(error) = state.error {
        bail!(error);
    }
    let result = state.result().unwrap_or_default();

    match format {
        OutputFormat::Json => print_json(&result),
        OutputFormat::Text => {
            println!("{} {} -> {}", "diff".bold(), args.from, args.to);
            print!("{}", render::diff(&result.diff));
            print!("{}", render::conflicts(&result.conflicts));
            Ok(())
        }
    }
}

async fn cmd_restore(
    client: MedrecClient,
    args: RestoreArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let workflow = RestoreWorkflow::new(Arc::new(client));
    let request = RestoreRequest {
        editor_id: args.editor,
        change_reason: args.reason,
    };
    let restored = workflow
        .restore_version(target(args.entry), args.version, request)
        .await;
    let Some(entry) = restored else {
        let error = workflow.snapshot().error.unwrap_or_else(|| "restore failed".into());
        bail!(error);
    };

    match format {
        OutputFormat::Json => print_json(&entry),
        OutputFormat::Text => {
            println!(
                "{} Restored entry {} from version {}",
                "✓".green().bold(),
                entry.id.to_string().bold(),
                args.version.to_string().yellow()
            );
            Ok(())
        }
    }
}

async fn cmd_edit(client: &MedrecClient, args: EditArgs, format: OutputFormat) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let content: NewEntry = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid entry", args.file.display()))?;

    let (entry, version) = client
        .edit_entry(
            args.entry.patient,
            args.entry.entry,
            &content,
            &args.editor,
            args.reason.as_deref(),
        )
        .await?;
    match format {
        OutputFormat::Json => print_json(&version),
        OutputFormat::Text => {
            println!(
                "{} Updated entry {}, recorded version {}",
                "✓".green().bold(),
                entry.id.to_string().bold(),
                version.id.to_string().yellow()
            );
            Ok(())
        }
    }
}

async fn cmd_record(client: &MedrecClient, args: RecordArgs, format: OutputFormat) -> anyhow::Result<()> {
    let version = client
        .create_version(
            args.entry.patient,
            args.entry.entry,
            &args.editor,
            args.reason.as_deref(),
        )
        .await?;
    match format {
        OutputFormat::Json => print_json(&version),
        OutputFormat::Text => {
            println!(
                "{} Recorded version {}",
                "✓".green().bold(),
                version.id.to_string().yellow()
            );
            Ok(())
        }
    }
}

async fn cmd_latest(client: &MedrecClient, args: EntryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let latest = client.get_latest_version(args.patient, args.entry).await?;
    match (format, latest) {
        (OutputFormat::Json, latest) => print_json(&latest),
        (OutputFormat::Text, Some(version)) => {
            print!("{}", render::version(&version));
            Ok(())
        }
        (OutputFormat::Text, None) => {
            println!("No versions recorded.");
            Ok(())
        }
    }
}
