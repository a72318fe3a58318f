use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use sluice::banner::{BannerInfo, print_banner};
use sluice::config::{RunnerKind, Settings};
use sluice::logging;
use sluice::orchestrator::{Orchestrator, Params};
use sluice::report::print_report;
use sluice::server::{self, AppState};
use sluice::units::boundary::{self, UnitInvocation, parse_sentences};
use sluice::units::{UnitName, UnitParams};

#[derive(Parser)]
#[command(
    name = "sluice",
    version,
    about = "Route a plain-language request through a chain of text-processing units."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Plan and run a single request, then print the results
    Run(RunArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
    /// Run one processing unit over stdin or a file (the unit entrypoint)
    Unit(UnitArgs),
}

/// Options shared by everything that plans and runs units.
#[derive(Args)]
struct PipelineArgs {
    /// Never call the LLM; pick units by keyword only
    #[arg(long, default_value_t = false)]
    no_llm: bool,

    /// LLM model name (overrides LLM_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// How units are started
    #[arg(long, value_enum, default_value_t = RunnerKind::Docker)]
    runner: RunnerKind,

    /// Image prefix for the docker runner (overrides SLUICE_IMAGE_PREFIX)
    #[arg(long)]
    image_prefix: Option<String>,

    /// Per-unit timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,
}

impl PipelineArgs {
    fn settings(&self) -> Settings {
        let mut settings = Settings::from_env();
        settings.use_llm = !self.no_llm;
        if let Some(model) = &self.model {
            settings.llm.model = model.clone();
        }
        settings.runner = self.runner;
        if let Some(prefix) = &self.image_prefix {
            settings.image_prefix = prefix.clone();
        }
        settings.unit_timeout = Duration::from_secs(self.timeout);
        settings
    }
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// Input text
    #[arg(short = 't', long = "input-text")]
    text: Option<String>,

    /// Path to an input file
    #[arg(short = 'f', long = "input-file")]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    /// What to do, in plain language
    #[arg(short, long)]
    request: String,

    #[command(flatten)]
    input: InputArgs,

    /// Write the full output here
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Run the units in parallel when the plan has more than one
    #[arg(short, long, default_value_t = false)]
    parallel: bool,

    /// Sentences to keep when summarizing
    #[arg(short, long)]
    sentences: Option<usize>,

    /// Print the result as JSON instead of a report
    #[arg(long, default_value_t = false)]
    json: bool,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:5000")]
    listen: SocketAddr,

    #[command(flatten)]
    pipeline: PipelineArgs,
}

#[derive(Args)]
struct UnitArgs {
    /// Unit to run
    unit: UnitName,

    /// Input file (stdin when absent)
    input: Option<PathBuf>,

    /// Output file (stdout when absent)
    output: Option<PathBuf>,

    /// Sentences to keep, for text-summarization
    #[arg(value_name = "SENTENCES")]
    sentences_arg: Option<String>,

    /// Sentences to keep, for text-summarization
    #[arg(long, conflicts_with = "sentences_arg")]
    sentences: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Unit(args) => {
            logging::init("warn");
            run_unit(args)
        }
        Command::Run(args) => {
            logging::init("info");
            run_request(args).await
        }
        Command::Serve(args) => {
            logging::init("info");
            serve(args).await
        }
    }
}

fn run_unit(args: UnitArgs) -> anyhow::Result<()> {
    let sentences = args
        .sentences
        .filter(|&n| n > 0)
        .or_else(|| parse_sentences(args.sentences_arg.as_deref()));

    boundary::run(&UnitInvocation {
        unit: args.unit,
        input: args.input,
        output: args.output,
        params: UnitParams { sentences },
    })
}

async fn run_request(args: RunArgs) -> anyhow::Result<()> {
    let text = match (&args.input.text, &args.input.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("could not read input file {}", path.display()))?,
        (None, None) => anyhow::bail!("no input text provided"),
    };

    let settings = args.pipeline.settings();
    let orchestrator =
        Orchestrator::from_settings(&settings).context("failed to set up unit runners")?;

    let overrides = Params {
        sentences: args.sentences.filter(|&n| n > 0),
        parallel: args.parallel,
    };
    let execution = orchestrator
        .process(&args.request, &text, overrides)
        .await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&execution)?);
    } else {
        print_report(&execution);
    }

    if let Some(path) = &args.output_file {
        tokio::fs::write(path, &execution.output)
            .await
            .with_context(|| format!("could not write output file {}", path.display()))?;
        if !args.json {
            println!("\nOutput saved to {}", path.display());
        }
    }

    Ok(())
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let settings = args.pipeline.settings();
    let orchestrator =
        Orchestrator::from_settings(&settings).context("failed to set up unit runners")?;

    let planner = if orchestrator.decider().uses_planner() {
        settings.llm.model.clone()
    } else {
        "keywords".to_string()
    };
    let runner = settings.runner.as_str();
    let units: Vec<&str> = orchestrator
        .decider()
        .catalog()
        .iter()
        .map(|(unit, _)| unit.as_str())
        .collect();

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("could not bind {}", args.listen))?;

    print_banner(&BannerInfo {
        listen: listener.local_addr()?,
        planner: &planner,
        runner,
        units: &units,
    });

    server::serve(
        listener,
        AppState {
            orchestrator: Arc::new(orchestrator),
        },
    )
    .await
}
