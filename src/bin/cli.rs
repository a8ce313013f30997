// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshcore CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use meshcore::cli::{Reporter, Runner};
use meshcore::config::MeshConfig;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "meshcore")]
#[command(about = "Meshcore - triangle mesh repair, topology and mass properties", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./meshcore.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print topology and mass properties
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Clean up a mesh and write it back out
    Repair {
        /// Input mesh file
        input: PathBuf,

        /// Output file; format follows the extension
        #[arg(short, long)]
        output: PathBuf,

        /// Make winding consistent and outward
        #[arg(long)]
        fix_normals: bool,

        /// Fill triangular and quadrilateral holes
        #[arg(long)]
        fill_holes: bool,
    },

    /// Write each connected body to its own file
    Split {
        /// Input mesh file
        input: PathBuf,

        /// Directory for the bodies
        #[arg(long)]
        out_dir: PathBuf,

        /// Keep open bodies too
        #[arg(long)]
        all: bool,
    },

    /// Compute the convex hull
    Hull {
        /// Input mesh file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the identifier digest of each mesh
    Identify {
        /// Input mesh files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },

    /// Find duplicate meshes in a directory tree
    Dedup {
        /// Directory to scan
        dir: PathBuf,
    },

    /// Show version information
    Version,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "meshcore=debug" } else { "meshcore=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<MeshConfig> {
    match path {
        Some(path) => {
            let mut config = MeshConfig::from_file(path)?;
            config.apply_env()?;
            Ok(config)
        }
        None => MeshConfig::load(),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let runner = Runner::new(config).with_progress(cli.verbose);

    match cli.command {
        Commands::Info { input, json } => {
            let (stats, duration) = runner.info(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                Reporter::report_info(&input.display().to_string(), &stats, duration);
            }
        }
        Commands::Repair {
            input,
            output,
            fix_normals,
            fill_holes,
        } => {
            let report = runner.repair(&input, &output, fix_normals, fill_holes)?;
            Reporter::report_process(&input.display().to_string(), &report);
            Reporter::success(&format!("Wrote {}", output.display()));
        }
        Commands::Split { input, out_dir, all } => {
            let written = runner.split(&input, &out_dir, all)?;
            if written.is_empty() {
                Reporter::report_warning("No bodies to write; pass --all to keep open bodies");
            }
            for path in &written {
                println!("{}", path.display());
            }
        }
        Commands::Hull { input, output } => {
            let hull = runner.hull(&input, &output)?;
            Reporter::success(&format!(
                "Hull with {} vertices, {} faces, volume {:.6} -> {}",
                hull.vertex_count(),
                hull.face_count(),
                hull.volume(),
                output.display()
            ));
        }
        Commands::Identify { inputs } => {
            for input in &inputs {
                let identifier = runner.identify(input)?;
                Reporter::report_identifier(&input.display().to_string(), &identifier);
            }
        }
        Commands::Dedup { dir } => {
            let result = runner.dedup(&dir)?;
            for (path, reason) in &result.failures {
                Reporter::report_warning(&format!("{}: {}", path.display(), reason));
            }
            let groups: Vec<Vec<&Path>> = result
                .groups
                .iter()
                .map(|g| g.iter().map(PathBuf::as_path).collect())
                .collect();
            Reporter::report_duplicates(&groups);
        }
        Commands::Version => {
            println!("Meshcore v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
