use clap::{Parser, Subcommand};
use hn_model::{NodeModel, TableVisitor};
use hn_project::{FORMAT_VERSION, ProjectError, ProjectResult, read_model, write_model};
use hn_table::{Table, TableRow};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hn-cli")]
#[command(about = "HydroNet CLI - Hydrological network model tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a model on disk
    Validate {
        /// Path to the model YAML file
        config_path: PathBuf,
    },
    /// Summarize a model: time window, nodes, edges, tables
    Info {
        /// Path to the model YAML file
        config_path: PathBuf,
    },
    /// Rewrite a project at the latest format version
    Migrate {
        /// Path to the model YAML file
        config_path: PathBuf,
    },
}

fn main() -> ProjectResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Info { config_path } => cmd_info(&config_path),
        Commands::Migrate { config_path } => cmd_migrate(&config_path),
    }
}

fn cmd_validate(config_path: &Path) -> ProjectResult<()> {
    println!("Validating model: {}", config_path.display());
    // Reading runs the full validation pass.
    read_model(config_path)?;
    println!("✓ Model is valid");
    Ok(())
}

/// Collects the name and row count of every table that is set.
struct TableCounts {
    lines: Vec<(&'static str, usize)>,
}

impl TableVisitor for TableCounts {
    type Error = ProjectError;

    fn visit<R: TableRow>(&mut self, table: &Table<R>) -> Result<(), Self::Error> {
        if table.is_set() {
            self.lines.push((R::schema().name, table.len()));
        }
        Ok(())
    }
}

fn cmd_info(config_path: &Path) -> ProjectResult<()> {
    let model = read_model(config_path)?;

    println!("Model: {}", config_path.display());
    println!("  Time window: {} - {}", model.starttime, model.endtime);
    println!("  CRS: {}", model.crs);
    println!("  Nodes: {}", model.network_node_ids().len());
    println!("  Edges: {}", model.edge.table.len());

    if let Some(extent) = model.node_table().extent() {
        println!(
            "  Extent: ({}, {}) - ({}, {})",
            extent.min_x, extent.min_y, extent.max_x, extent.max_y
        );
    }

    println!("\nNode types:");
    for node_model in model.node_models() {
        if !node_model.node().is_empty() {
            println!(
                "  {} ({} nodes)",
                node_model.node_type(),
                node_model.node().len()
            );
        }
    }

    let mut counts = TableCounts { lines: Vec::new() };
    model.visit_tables(&mut counts)?;

    println!("\nTables:");
    for (name, rows) in counts.lines {
        println!("  {} ({} rows)", name, rows);
    }

    Ok(())
}

fn cmd_migrate(config_path: &Path) -> ProjectResult<()> {
    println!("Migrating project: {}", config_path.display());
    // Reading applies the migration chain in memory.
    let model = read_model(config_path)?;

    let dir = config_path.parent().unwrap_or(Path::new("."));
    let name = config_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");
    write_model(&model, dir, name)?;

    println!("✓ Project is at format version {}", FORMAT_VERSION);
    Ok(())
}
