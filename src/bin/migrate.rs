//! Record Migration CLI
//!
//! Upgrades stored records to the current DataVersion.
//!
//! Usage:
//!   record-migrate convert zombie.json --type Entity --from 99
//!   record-migrate batch ./world/records --out ./migrated
//!   record-migrate types
//!   record-migrate versions

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use record_schemas::{bootstrap, builtin_versions, json, MigrateConfig, VersionCatalog, VersionKey};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "record-migrate")]
#[command(about = "Migrate stored records between DataVersions")]
struct Cli {
    /// Config file (defaults to migrate.toml lookup)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Override the version records are migrated to
    #[arg(long, global = true)]
    current_version: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single record (JSON) and print the result
    Convert {
        /// Record file, or "-" for stdin
        #[arg(default_value = "-")]
        input: String,

        /// Schema type of the record
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Version the record was written at ("1451" or "1451.3")
        #[arg(short, long)]
        from: VersionKey,

        /// Target version (default: configured current version)
        #[arg(long)]
        to: Option<VersionKey>,

        /// Compact output
        #[arg(long)]
        compact: bool,
    },

    /// Migrate every document under a directory
    Batch {
        /// Root directory
        root: PathBuf,

        /// Write results here instead of in place
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Stop at the first failing document
        #[arg(long)]
        fail_fast: bool,

        /// Write the JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List registered schema types
    Types {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List known versions and those with built-in rules
    Versions,

    /// Show or create configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default configuration to a file
    Init {
        #[arg(default_value = "migrate.toml")]
        path: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = MigrateConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    if let Some(version) = cli.current_version {
        config.engine.current_version = version;
    }

    match cli.command {
        Commands::Convert {
            input,
            type_name,
            from,
            to,
            compact,
        } => {
            let text = if input == "-" {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                text
            } else {
                std::fs::read_to_string(&input).with_context(|| format!("reading {input}"))?
            };

            let migrator = bootstrap(&config.engine)?;
            let handle = migrator.registry().lookup(&type_name)?;
            let record = json::from_str(&text)?;
            let to = to.unwrap_or_else(|| migrator.current());
            let migrated = migrator.registry().migrate(handle, record, from, to)?;

            let pretty = !compact && config.io.output_format.is_pretty();
            println!("{}", json::to_string(&migrated, pretty)?);
        }

        Commands::Batch {
            root,
            out,
            fail_fast,
            report,
        } => {
            if !root.is_dir() {
                bail!("{} is not a directory", root.display());
            }
            config.batch.fail_fast |= fail_fast;

            let migrator = bootstrap(&config.engine)?;
            let summary = record_schemas::batch::migrate_dir(&migrator, &root, out.as_deref(), &config)?;

            println!("Scanned:  {}", summary.scanned);
            println!("Migrated: {}", summary.migrated);
            println!("Current:  {}", summary.current);
            println!("Failed:   {}", summary.failures.len());
            for failure in &summary.failures {
                println!("  {}: {}", failure.path.display(), failure.error);
            }

            if let Some(path) = report {
                std::fs::write(&path, serde_json::to_string_pretty(&summary)?)
                    .with_context(|| format!("writing report to {}", path.display()))?;
            }
            if !summary.is_success() {
                std::process::exit(2);
            }
        }

        Commands::Types { json } => {
            let migrator = bootstrap(&config.engine)?;
            let types = migrator.registry().types();
            if json {
                println!("{}", serde_json::to_string_pretty(&types)?);
            } else {
                println!("{:<18} {:<11} {:>6}  latest converter", "TYPE", "KIND", "RULES");
                for info in types {
                    let latest = info
                        .latest_converter
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("{:<18} {:<11} {:>6}  {}", info.name, info.kind.as_str(), info.rules, latest);
                }
            }
        }

        Commands::Versions => {
            let catalog = VersionCatalog::standard();
            println!("Current: {}", catalog.name_of(config.engine.current_version));
            println!("\nBuilt-in rules:");
            for version in builtin_versions() {
                println!("  {}", catalog.describe(VersionKey::of(version)));
            }
            println!("\nDeclared converter checkpoints: {}", catalog.declared().count());
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                println!("{}", toml::to_string_pretty(&config)?);
            }
            ConfigAction::Init { path } => {
                if path.exists() {
                    bail!("{} already exists", path.display());
                }
                MigrateConfig::default().save(&path)?;
                println!("Wrote {}", path.display());
            }
        },
    }

    Ok(())
}
