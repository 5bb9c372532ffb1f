use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use copomap_engine::{
    BatchController, EngineTelemetry, MappingEngine, OutcomeCatalogue, SyllabusJob,
    ThresholdConfig,
};
use serde_json::json;
use shared_logging::{JsonLogger, LogLevel, LogRecord};
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "copomap", version, about = "CO-PO mapping matrix generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Maps one syllabus file to a CO-PO matrix CSV.
    Map(MapArgs),
    /// Maps every .txt syllabus in a directory concurrently.
    Batch(BatchArgs),
    /// Prints the active program outcome catalogue.
    Catalogue {
        /// Catalogue JSON file; defaults to the built-in engineering set.
        #[arg(long)]
        catalogue: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
struct MapArgs {
    /// Syllabus text file (UTF-8).
    syllabus: PathBuf,
    /// Similarity threshold; scores below it map to level 0.
    #[arg(long, default_value_t = 0.8)]
    threshold: f32,
    /// Catalogue JSON file; defaults to the built-in engineering set.
    #[arg(long)]
    catalogue: Option<PathBuf>,
    /// Write the CSV here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Also print raw pairwise scores and preprocessed terms.
    #[arg(long)]
    scores: bool,
    /// Append structured JSONL events to this file.
    #[arg(long)]
    log: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory holding .txt syllabus files.
    dir: PathBuf,
    /// Similarity threshold; scores below it map to level 0.
    #[arg(long, default_value_t = 0.8)]
    threshold: f32,
    /// Catalogue JSON file; defaults to the built-in engineering set.
    #[arg(long)]
    catalogue: Option<PathBuf>,
    /// Output directory for the CSV files; defaults to the input directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Append structured JSONL events to this file.
    #[arg(long)]
    log: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Map(args) => handle_map(args),
        Commands::Batch(args) => handle_batch(args),
        Commands::Catalogue { catalogue } => {
            let catalogue = load_catalogue(catalogue.as_deref())?;
            println!("Catalogue: {}", catalogue.name());
            for po in catalogue.outcomes() {
                let k_level = po
                    .k_level
                    .map_or_else(String::new, |k| format!(" [K{k}]"));
                println!("{}{}: {}", po.label(), k_level, po.statement);
            }
            Ok(())
        }
    }
}

fn handle_map(args: MapArgs) -> Result<()> {
    anyhow::ensure!(args.syllabus.exists(), "syllabus file not found");
    let catalogue = load_catalogue(args.catalogue.as_deref())?;
    let engine = build_engine(catalogue, args.log.as_deref())?;

    let text = fs::read_to_string(&args.syllabus)
        .with_context(|| format!("reading syllabus {:?}", args.syllabus))?;
    let outcomes = engine.extract(&text);
    log_event(
        args.log.as_deref(),
        LogLevel::Info,
        "map.started",
        json!({ "syllabus": args.syllabus, "outcomes": outcomes.len() }),
    )?;
    if outcomes.is_empty() {
        println!(
            "no course outcomes recognized in {:?}; nothing to map",
            args.syllabus
        );
        return Ok(());
    }

    let run = engine.build_matrix(&outcomes, &ThresholdConfig::new(args.threshold))?;
    let csv = engine.to_table(&run).to_csv();

    println!("Course outcomes:");
    for outcome in &run.outcomes {
        let k_level = outcome
            .k_level
            .map_or_else(String::new, |k| format!(" [K{k}]"));
        println!("{}{}: {}", outcome.label(), k_level, outcome.raw);
    }

    if args.scores {
        println!("\nRaw similarity scores:");
        println!("{}", serde_json::to_string_pretty(&run.debug.pair_scores)?);
        println!("Preprocessed terms:");
        for (label, terms) in &run.debug.preprocessed_terms {
            println!("{label}: {}", terms.join(", "));
        }
    }

    match &args.output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &csv).with_context(|| format!("writing matrix {path:?}"))?;
            println!("\nmatrix written to {path:?}");
        }
        None => {
            println!("\nCO-PO mapping matrix:");
            print!("{csv}");
        }
    }
    log_event(
        args.log.as_deref(),
        LogLevel::Info,
        "map.completed",
        json!({ "rows": run.matrix.rows(), "cols": run.matrix.cols(), "threshold": run.debug.threshold }),
    )
}

fn handle_batch(args: BatchArgs) -> Result<()> {
    anyhow::ensure!(args.dir.is_dir(), "syllabus directory not found");
    let catalogue = load_catalogue(args.catalogue.as_deref())?;
    let engine = build_engine(catalogue, args.log.as_deref())?;

    let mut jobs = Vec::new();
    let mut paths: Vec<PathBuf> = fs::read_dir(&args.dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
        .collect();
    paths.sort();
    for path in &paths {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading syllabus {path:?}"))?;
        let name = path
            .file_stem()
            .map_or_else(|| "syllabus".to_string(), |s| s.to_string_lossy().into_owned());
        jobs.push(SyllabusJob { name, text });
    }
    anyhow::ensure!(!jobs.is_empty(), "no .txt files in {:?}", args.dir);

    let controller = BatchController::new(engine.clone());
    let runtime = Runtime::new()?;
    let outputs =
        runtime.block_on(controller.process_batch(jobs, ThresholdConfig::new(args.threshold)))?;

    let out_dir = args.out_dir.clone().unwrap_or_else(|| args.dir.clone());
    fs::create_dir_all(&out_dir)?;
    for output in &outputs {
        if output.run.outcomes.is_empty() {
            println!("{}: no course outcomes recognized, skipped", output.name);
            continue;
        }
        let path = out_dir.join(format!("co_po_matrix_{}.csv", output.name));
        fs::write(&path, engine.to_table(&output.run).to_csv())
            .with_context(|| format!("writing matrix {path:?}"))?;
        println!(
            "{}: {} COs mapped, matrix written to {path:?}",
            output.name,
            output.run.matrix.rows()
        );
    }
    log_event(
        args.log.as_deref(),
        LogLevel::Info,
        "batch.completed",
        json!({ "jobs": outputs.len(), "out_dir": out_dir }),
    )
}

fn load_catalogue(path: Option<&Path>) -> Result<OutcomeCatalogue> {
    let catalogue = match path {
        Some(path) => OutcomeCatalogue::from_file(path)?,
        None => OutcomeCatalogue::engineering_default(),
    };
    Ok(catalogue)
}

fn build_engine(catalogue: OutcomeCatalogue, log: Option<&Path>) -> Result<MappingEngine> {
    let mut engine = MappingEngine::new(catalogue);
    if let Some(path) = log {
        engine = engine.with_telemetry(EngineTelemetry::new(path)?);
    }
    Ok(engine)
}

fn log_event(
    log: Option<&Path>,
    level: LogLevel,
    message: &str,
    payload: serde_json::Value,
) -> Result<()> {
    if let Some(path) = log {
        let logger = JsonLogger::new(path)?;
        logger.log(&LogRecord::new("cli", level, message).with_fields(payload))?;
    }
    Ok(())
}
