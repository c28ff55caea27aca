//! assetgate - QA gate for 3D art assets.
//!
//! Validates submitted props, characters, and vehicles: mesh topology, UV
//! layout, textures, PBR materials, rigging, and scene hygiene, with bounded
//! auto-remediation and a JSON report sidecar per asset.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use assetgate_cli::commands;

/// assetgate - 3D asset QA pipeline
#[derive(Parser)]
#[command(name = "assetgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the QA pipeline over a scene snapshot and write a report sidecar
    Check {
        /// Path to the scene snapshot JSON
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Directory to recursively scan for *.snapshot.json files
        #[arg(long, conflicts_with = "snapshot")]
        input_dir: Option<PathBuf>,

        /// Original asset file; runs intake validation first when given
        #[arg(short, long)]
        asset: Option<PathBuf>,

        /// Asset category
        #[arg(short, long, default_value = "env_prop")]
        category: String,

        /// Submission source
        #[arg(long, default_value = "local")]
        source: String,

        /// Submitter name
        #[arg(long, default_value = "unknown")]
        submitter: String,

        /// Policy JSON file (category defaults when absent)
        #[arg(short, long)]
        policy: Option<PathBuf>,

        /// Directory for report sidecars (defaults to the snapshot's)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Print the report as JSON instead of the human summary
        #[arg(long)]
        json: bool,
    },

    /// Validate a submitted file before any scene extraction
    Intake {
        /// Path to the asset file
        asset: PathBuf,

        /// Submission source
        #[arg(long)]
        source: String,

        /// Submitter name
        #[arg(long)]
        submitter: String,

        /// Asset category
        #[arg(long, default_value = "env_prop")]
        category: String,

        /// Per-category size limit in MB
        #[arg(long, default_value_t = 500)]
        max_mb: u64,

        /// Absolute size limit in MB
        #[arg(long, default_value_t = 1024)]
        hard_max_mb: u64,

        /// Print the intake stage as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a scene snapshot from an asset via headless Blender
    Snapshot {
        /// Path to the asset file
        asset: PathBuf,

        /// Python extraction script run inside Blender
        #[arg(long)]
        script: PathBuf,

        /// Blender executable (discovered when absent)
        #[arg(long)]
        blender: Option<PathBuf>,

        /// Output snapshot path (defaults next to the asset)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Timeout in seconds
        #[arg(long, default_value_t = 300)]
        timeout: u64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            snapshot,
            input_dir,
            asset,
            category,
            source,
            submitter,
            policy,
            output_dir,
            json,
        } => commands::check::run(&commands::check::CheckOptions {
            snapshot,
            input_dir,
            asset,
            category,
            source,
            submitter,
            policy,
            output_dir,
            json,
        }),
        Commands::Intake {
            asset,
            source,
            submitter,
            category,
            max_mb,
            hard_max_mb,
            json,
        } => commands::intake::run(
            &asset,
            &source,
            &submitter,
            &category,
            max_mb,
            hard_max_mb,
            json,
        ),
        Commands::Snapshot {
            asset,
            script,
            blender,
            out,
            timeout,
        } => commands::snapshot::run(
            &asset,
            &script,
            blender.as_deref(),
            out.as_deref(),
            timeout,
        ),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
