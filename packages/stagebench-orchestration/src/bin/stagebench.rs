//! Stagebench CLI
//!
//! Runs the staged pipeline against an external engine executable.
//!
//! # Usage
//!
//! ```bash
//! # Tokens of a file
//! cargo run --bin stagebench -- run --stage lexer --engine ./engine main.c
//!
//! # Whole pipeline with program input, as JSON
//! cargo run --bin stagebench -- full --input "3 4" --engine ./engine --json main.c
//!
//! # Stage graph
//! cargo run --bin stagebench -- plan
//! ```

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use stagebench_orchestration::{
    init_logging, Classifier, CommandEngine, EngineSlot, PipelineOrchestrator, PipelineRun,
    Session, StageGraph, StagebenchConfig, TextBuffer,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "stagebench")]
#[command(about = "Stagebench - staged compiler pipeline driver", long_about = None)]
struct Cli {
    /// YAML configuration file (v1 schema)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct RunArgs {
    /// Engine executable (overrides config and STAGEBENCH_ENGINE)
    #[arg(short, long)]
    engine: Option<PathBuf>,

    /// Print the whole run as JSON instead of the active surface
    #[arg(long)]
    json: bool,

    /// C source file
    source: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one stage and everything it depends on
    Run {
        /// Stage name (lexer, ast, ir, optimized_ir, codegen)
        #[arg(short, long)]
        stage: String,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Run all five stages
    Full {
        /// Input handed to the compiled program
        #[arg(short, long, default_value = "")]
        input: String,

        #[command(flatten)]
        args: RunArgs,
    },

    /// Print the stage graph and each stage's closure
    Plan,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => StagebenchConfig::from_yaml(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => StagebenchConfig::default(),
    }
    .with_env_overrides();
    init_logging(&config.log_filter);

    match cli.command {
        Commands::Run { stage, args } => {
            let mut session = open_session(&config, &args).await?;
            let run = session.trigger(&stage)?;
            print_run(&session, &run, args.json)?;
        }
        Commands::Full { input, args } => {
            let mut session = open_session(&config, &args).await?;
            let run = session.trigger_full(&input)?;
            print_run(&session, &run, args.json)?;
        }
        Commands::Plan => print_plan()?,
    }

    Ok(())
}

async fn open_session(
    config: &StagebenchConfig,
    args: &RunArgs,
) -> anyhow::Result<Session<TextBuffer>> {
    let Some(program) = args.engine.clone().or_else(|| config.engine.program.clone()) else {
        bail!("no engine program: pass --engine or set STAGEBENCH_ENGINE");
    };

    let source = tokio::fs::read_to_string(&args.source)
        .await
        .with_context(|| format!("reading {}", args.source.display()))?;

    let slot = EngineSlot::pending();
    slot.load(|| CommandEngine::load(program)).await?;

    let orchestrator = PipelineOrchestrator::new(slot)?
        .with_classifier(Classifier::from_config(&config.classification));
    Ok(Session::new(TextBuffer::new(source), orchestrator)
        .with_assistant_config(config.assistant.clone()))
}

fn print_run(session: &Session<TextBuffer>, run: &PipelineRun, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", run.to_json()?);
        return Ok(());
    }

    if let Some(active) = session.surfaces().active() {
        println!("{}", session.surfaces().content(active));
    }
    if !run.all_succeeded() {
        info!("Run {} finished with failed stages", run.id);
    }
    Ok(())
}

fn print_plan() -> anyhow::Result<()> {
    let graph = StageGraph::standard()?;
    println!("{}", graph.execution_plan());
    println!();
    for &stage in graph.execution_order() {
        let closure = graph.closure(stage)?;
        println!(
            "{:<12} <- [{}]",
            graph.label(stage)?,
            closure
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(())
}
