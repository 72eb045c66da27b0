use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use medrec_types::{EntryId, PatientId, VersionId, VersionRef};

#[derive(Parser)]
#[command(
    name = "medrec",
    about = "Patient records with entry version history",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Base URL of the medrec server
    #[arg(
        long,
        global = true,
        env = "MEDREC_SERVER",
        default_value = "http://127.0.0.1:3001"
    )]
    pub server: String,

    /// Bearer token sent with every request
    #[arg(long, global = true, env = "MEDREC_TOKEN")]
    pub token: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the medrec API server
    Serve(ServeArgs),
    /// List patients, or show one patient with entries
    Patients(PatientsArgs),
    /// Show the version history of an entry
    History(EntryArgs),
    /// Show one version including its entry snapshot
    Show(ShowArgs),
    /// Show changes between two versions of an entry
    Diff(DiffArgs),
    /// Make a recorded version the live entry
    Restore(RestoreArgs),
    /// Replace an entry's content from a JSON file and record the edit
    Edit(EditArgs),
    /// Record the live entry as a new version
    Record(RecordArgs),
    /// Show the newest version of an entry
    Latest(EntryArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// JSON seed file with patients and diagnoses
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

#[derive(Args)]
pub struct PatientsArgs {
    pub patient: Option<PatientId>,
}

#[derive(Args, Clone, Copy)]
pub struct EntryArgs {
    pub patient: PatientId,
    pub entry: EntryId,
}

#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub entry: EntryArgs,
    pub version: VersionId,
}

#[derive(Args)]
pub struct DiffArgs {
    #[command(flatten)]
    pub entry: EntryArgs,
    /// Version to compare from (`current` for the live entry)
    pub from: VersionRef,
    /// Version to compare with
    #[arg(default_value = "current")]
    pub to: VersionRef,
    /// Common ancestor for conflict detection
    #[arg(long)]
    pub base: Option<VersionRef>,
}

#[derive(Args)]
pub struct RestoreArgs {
    #[command(flatten)]
    pub entry: EntryArgs,
    pub version: VersionId,
    /// Editor recorded on the new version (defaults to the caller)
    #[arg(long)]
    pub editor: Option<String>,
    #[arg(short = 'm', long)]
    pub reason: Option<String>,
}

#[derive(Args)]
pub struct EditArgs {
    #[command(flatten)]
    pub entry: EntryArgs,
    /// JSON file holding the new entry content
    pub file: PathBuf,
    #[arg(long)]
    pub editor: String,
    #[arg(short = 'm', long)]
    pub reason: Option<String>,
}

#[derive(Args)]
pub struct RecordArgs {
    #[command(flatten)]
    pub entry: EntryArgs,
    #[arg(long)]
    pub editor: String,
    #[arg(short = 'm', long)]
    pub reason: Option<String>,
}
