//! The `specgen` command line.

#[macro_use]
extern crate tracing;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use specgen::config::{
    ConfigError, ConfigFile, Credentials, DEFAULT_AGENT, DEFAULT_CONFIG_PATH,
};
use specgen::problems::{Problem, catalogue};
use specgen::workflow::{
    ConfigSessionFactory, ProblemReport, SessionFactory, Task, run_problem,
};
use tracing_subscriber::EnvFilter;

const BAR_CHAR: &str = "▎";

/// Writes formal specifications and spec-guided tests for BigCodeBench
/// problems with a tool-calling model.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// The agent configuration document.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Use this model for every agent.
    #[arg(long)]
    model: Option<String>,
    /// Maximum number of model requests per run.
    #[arg(long)]
    max_turns: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a formal specification for every problem.
    Specs,
    /// Append spec-guided tests for every problem.
    Tests,
    /// Generate specifications, then append tests.
    All,
    /// Run a single prompt through an agent.
    Run {
        /// The agent to run.
        #[arg(long, default_value = DEFAULT_AGENT)]
        agent: String,
        /// The prompt.
        prompt: String,
    },
}

impl Command {
    fn tasks(&self) -> &'static [Task] {
        match self {
            Command::Specs => &[Task::GenerateSpec],
            Command::Tests => &[Task::AppendTests],
            Command::All => &[Task::GenerateSpec, Task::AppendTests],
            Command::Run { .. } => &[],
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".bright_red().bold());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), ConfigError> {
    let file = ConfigFile::load(&cli.config)?;
    let mut factory = ConfigSessionFactory::new(file, Credentials::from_env());
    if let Some(model) = cli.model {
        factory = factory.with_model_override(model);
    }
    if let Some(max_turns) = cli.max_turns {
        factory = factory.with_max_turns(max_turns);
    }

    if let Command::Run { agent, prompt } = &cli.command {
        return run_prompt(&factory, agent, prompt).await;
    }

    let base_dir = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let problems = catalogue(base_dir);
    let mut reports = Vec::new();
    for &task in cli.command.tasks() {
        for problem in &problems {
            reports.push(run_with_spinner(&factory, task, problem).await?);
        }
    }
    print_summary(&reports);
    Ok(())
}

async fn run_prompt(
    factory: &ConfigSessionFactory,
    agent: &str,
    prompt: &str,
) -> Result<(), ConfigError> {
    let session = factory.create_session(agent)?;
    let progress_bar = spinner(format!("🤔 {agent} is thinking..."));
    let result = session.run(prompt).await;
    progress_bar.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("{}🤖 {}", BAR_CHAR.bright_cyan(), answer.bright_white())
        }
        Err(err) => {
            println!("{}{}", BAR_CHAR.bright_red(), err.to_string().red())
        }
    }
    Ok(())
}

async fn run_with_spinner(
    factory: &ConfigSessionFactory,
    task: Task,
    problem: &Problem,
) -> Result<ProblemReport, ConfigError> {
    let progress_bar =
        spinner(format!("📝 problem {}: generating {task}...", problem.id));
    let report = run_problem(factory, task, problem).await;
    progress_bar.finish_and_clear();
    report
}

fn spinner(message: String) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|err| {
            debug!("falling back to the default spinner: {err}");
            ProgressStyle::default_spinner()
        })
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(style);
    progress_bar.set_message(message);
    progress_bar.enable_steady_tick(Duration::from_millis(100));
    progress_bar
}

fn print_summary(reports: &[ProblemReport]) {
    println!();
    for report in reports {
        let label = format!("problem {} {}", report.problem_id, report.task);
        match &report.result {
            Ok(_) => println!(
                "{}{} {} → {}",
                BAR_CHAR.bright_green(),
                "✔".green(),
                label.bright_white(),
                report.output_file.display()
            ),
            Err(err) => println!(
                "{}{} {}: {}",
                BAR_CHAR.bright_red(),
                "✘".red(),
                label.bright_white(),
                err.to_string().red()
            ),
        }
    }
}
