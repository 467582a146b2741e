//! CLI command definitions, routing, and tracing setup.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use deckgen_core::{
    AnswerSource, BatchProgress, BatchSummary, ChatClient, FetchOptions, LineAnswers,
    PitchDeckOptions, RecordOutcome, run_pitch_deck, run_sales_reports,
    run_student_presentations,
};
use deckgen_shared::{AppConfig, JobSettings, init_config, load_config, load_config_from};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// deckgen — turn records and websites into presentations.
#[derive(Parser)]
#[command(
    name = "deckgen",
    version,
    about = "Generate presentations from student records, sales data, and company websites.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file to use instead of ~/.deckgen/deckgen.toml.
    #[arg(long, global = true, env = "DECKGEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// One progress presentation per row of the student CSV.
    Students {
        /// Student CSV (defaults to students.csv).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (defaults to presentations/).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// One sales report per company in the sales CSV.
    Sales {
        /// Sales CSV (defaults to sales_data.csv).
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (defaults to reports/).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Interactive pitch deck from a company website.
    PitchDeck {
        /// Company website; prompted for when omitted.
        #[arg(short, long)]
        url: Option<String>,

        /// Output directory (defaults to pitch-decks/).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "deckgen=info",
        1 => "deckgen=debug",
        _ => "deckgen=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Students { input, out } => {
            cmd_students(&load(config_path)?, input, out).await
        }
        Command::Sales { input, out } => cmd_sales(&load(config_path)?, input, out).await,
        Command::PitchDeck { url, out } => {
            cmd_pitch_deck(&load(config_path)?, url, out).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path),
        },
    }
}

/// Load `--config` if given, else the default file (or defaults).
fn load(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    };
    Ok(config)
}

/// Apply `--input` / `--out` over the config section.
fn job_settings(
    mut job: JobSettings,
    input: Option<PathBuf>,
    out: Option<PathBuf>,
) -> JobSettings {
    if let Some(input) = input {
        job.input = input;
    }
    if let Some(out) = out {
        job.output_dir = out;
    }
    job
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_students(
    config: &AppConfig,
    input: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<()> {
    let job = job_settings(JobSettings::from(&config.students), input, out);
    info!(input = %job.input.display(), "generating student presentations");

    let reporter = CliProgress::new();
    let summary = run_student_presentations(&job, &config.service, &reporter).await?;

    print_summary("Student presentations", &job, &summary);
    Ok(())
}

async fn cmd_sales(config: &AppConfig, input: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let job = job_settings(JobSettings::from(&config.sales), input, out);
    info!(input = %job.input.display(), "generating sales reports");

    let reporter = CliProgress::new();
    let summary = run_sales_reports(&job, &config.service, &reporter).await?;

    print_summary("Sales reports", &job, &summary);
    Ok(())
}

async fn cmd_pitch_deck(
    config: &AppConfig,
    url: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    // Validate API key before doing anything
    let chat = ChatClient::from_config(&config.openai)?;

    let url = match url {
        Some(url) => url,
        None => read_line("Enter the company website URL: ")?,
    };
    let url = url.trim();
    if url.is_empty() {
        println!("No URL provided. Exiting.");
        return Ok(());
    }

    let options = PitchDeckOptions {
        url: url.to_string(),
        service: config.service.clone(),
        job: job_settings(JobSettings::from(&config.pitch), None, out),
        fetch: FetchOptions {
            timeout_secs: config.pitch.fetch_timeout_secs,
        },
    };
    info!(url, "generating pitch deck");

    let reporter = CliProgress::new();
    let mut answers = TerminalAnswers {
        spinner: reporter.spinner.clone(),
    };
    let summary = run_pitch_deck(&chat, &options, &mut answers, &reporter).await?;

    print_summary("Pitch deck", &options.job, &summary);
    for link in summary.outcomes.iter().filter_map(|o| o.edit_url.as_deref()) {
        println!("  Edit:   {link}");
        println!();
    }
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin()
        .read_line(&mut line)
        .map_err(|e| eyre!("failed to read from stdin: {e}"))?;
    Ok(line)
}

fn print_summary(title: &str, job: &JobSettings, summary: &BatchSummary) {
    println!();
    println!("  {title} complete.");
    println!("  Saved:  {}", summary.saved());
    println!("  Failed: {}", summary.failed());
    println!("  Output: {}", job.output_dir.display());
    println!("  Time:   {:.1}s", summary.elapsed.as_secs_f64());
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl BatchProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn record_started(&self, identity: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Generating [{current}/{total}] {identity}"));
    }

    fn record_finished(&self, outcome: &RecordOutcome) {
        match (&outcome.saved_to, &outcome.error) {
            (Some(path), _) => self
                .spinner
                .println(format!("  ✓ {} → {}", outcome.identity, path.display())),
            (None, error) => self.spinner.println(format!(
                "  ✗ {}: {}",
                outcome.identity,
                error.as_deref().unwrap_or("unknown error")
            )),
        }
    }

    fn done(&self, _summary: &BatchSummary) {
        self.spinner.finish_and_clear();
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        // A fatal error skips `done`.
        if !self.spinner.is_finished() {
            self.spinner.finish_and_clear();
        }
    }
}

/// Reads answers from the terminal with the spinner hidden.
struct TerminalAnswers {
    spinner: ProgressBar,
}

impl AnswerSource for TerminalAnswers {
    fn show_questions(&mut self, questions: &[String]) -> deckgen_shared::Result<()> {
        self.spinner.suspend(|| {
            LineAnswers::new(std::io::empty(), std::io::stdout()).show_questions(questions)
        })
    }

    fn answer(&mut self, number: usize, question: &str) -> deckgen_shared::Result<String> {
        self.spinner.suspend(|| {
            let stdin = std::io::stdin();
            LineAnswers::new(stdin.lock(), std::io::stdout()).answer(number, question)
        })
    }
}
