use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use mir2graph::db::{schema, Db};
use mir2graph::{graph, populate, store, Config};

#[derive(Parser, Debug)]
#[command(name = "mir2graph")]
#[command(about = "Load the miR2Disease database into SQLite and export it as a property graph")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema (idempotent)
    Init,
    /// Drop the database schema
    Drop,
    /// Download, parse and load the feed
    Populate {
        /// Read the feed from a local file instead of cache/remote
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// Re-download the feed even if a cached copy exists
        #[arg(short, long)]
        force: bool,
    },
    /// Print entity and relationship counts
    Summarize,
    /// Export the association graph
    Export {
        /// Output format
        #[arg(long, value_enum, default_value = "dot")]
        format: ExportFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ExportFormat {
    Dot,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"))
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let db = Db::new(config.db_path());

    match cli.command {
        Command::Init => {
            db.with_connection(|conn| schema::create_all(conn)).await?;
            log::info!("schema ready at {}", config.db_path().display());
        }
        Command::Drop => {
            db.with_connection(|conn| schema::drop_all(conn)).await?;
            log::info!("schema dropped at {}", config.db_path().display());
        }
        Command::Populate { source, force } => {
            db.with_connection(|conn| schema::create_all(conn)).await?;
            let summary = populate::populate(&db, &config, source, force).await?;
            if summary.skipped_rows > 0 {
                log::warn!(
                    "{} rows were skipped, see the log above for their indices",
                    summary.skipped_rows
                );
            }
        }
        Command::Summarize => {
            db.with_connection(|conn| schema::create_all(conn)).await?;
            let mirnas = store::count_mirnas(&db).await?;
            let diseases = store::count_diseases(&db).await?;
            let relationships = store::count_relationships(&db).await?;
            println!("miRNAs:        {mirnas}");
            println!("Diseases:      {diseases}");
            println!("Relationships: {relationships}");
        }
        Command::Export { format, output } => {
            let association_graph = graph::export(&db).await?;
            let rendered = match format {
                ExportFormat::Dot => graph::to_dot(&association_graph),
                ExportFormat::Json => {
                    serde_json::to_string_pretty(&graph::to_json(&association_graph))?
                }
            };
            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    log::info!("graph written to {}", path.display());
                }
                None => println!("{rendered}"),
            }
        }
    }

    Ok(())
}
