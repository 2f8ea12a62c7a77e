use std::io::{self, Write};
use std::sync::Mutex;

use clap::{Parser, Subcommand};

use mai::config::Config;
use mai::{
    mlog, Assistant, HttpTransport, ModelCatalog, RenderStyle, Result, RetryPolicy, Surface,
    Transport, WorkflowOutcome,
};

/// mai - model recommendations and customer testimonials from short prompts
#[derive(Parser, Debug)]
#[command(name = "mai")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    MAI_API_KEY     API key (falls back to GEMINI_API_KEY, then ~/.mai/mai.toml)\n    MAI_DEBUG=1     Enable debug logging (alternative to --debug)\n    MAI_DEBUG=trace Also log request and response bodies")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.mai/mai.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Recommend the best mAI model for a task
    Recommend {
        /// The task description in natural language
        task: String,
    },

    /// Turn raw feedback into a customer testimonial
    Testimonial {
        /// Raw customer feedback
        feedback: String,

        /// Professional role the testimonial is written from
        #[arg(long, short = 'p')]
        persona: String,
    },

    /// Run a recommendation and a testimonial concurrently
    Both {
        task: String,
        feedback: String,
        #[arg(long, short = 'p')]
        persona: String,
    },

    /// List the mAI model catalog
    Catalog,

    /// Show the effective configuration
    Config,
}

/// Prints progress to stderr and keeps the final text for stdout.
struct TerminalSurface {
    label: &'static str,
    input: String,
    option: String,
    result: Mutex<String>,
    error_visible: Mutex<bool>,
}

impl TerminalSurface {
    fn new(label: &'static str, input: &str, option: &str) -> Self {
        Self {
            label,
            input: input.to_string(),
            option: option.to_string(),
            result: Mutex::new(String::new()),
            error_visible: Mutex::new(false),
        }
    }

    fn print_result(&self) {
        let result = self.result.lock().map(|r| r.clone()).unwrap_or_default();
        let failed = self.error_visible.lock().map(|v| *v).unwrap_or(false);
        if failed {
            eprintln!("\x1b[31m[{}] {}\x1b[0m", self.label, result);
            if let Some(path) = mai::log::path() {
                eprintln!("  (details in {})", path.display());
            }
        } else {
            println!("[{}] {}", self.label, result);
        }
    }
}

impl Surface for TerminalSurface {
    fn trimmed_input(&self) -> String {
        self.input.trim().to_string()
    }

    fn selected_option(&self) -> String {
        self.option.clone()
    }

    fn set_busy(&self, busy: bool) {
        if busy {
            eprintln!("\x1b[90m[{}] working...\x1b[0m", self.label);
        }
        let _ = io::stderr().flush();
    }

    fn set_result_text(&self, text: &str) {
        if let Ok(mut result) = self.result.lock() {
            *result = text.to_string();
        }
    }

    fn set_error_visible(&self, visible: bool) {
        if let Ok(mut flag) = self.error_visible.lock() {
            *flag = visible;
        }
    }

    fn render_style(&self) -> RenderStyle {
        RenderStyle::Terminal
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    mai::log::init_with_debug(cli.debug);
    mlog!("mai starting: {:?}", cli.command);

    let ok = match cli.command {
        Command::Catalog => {
            run_catalog();
            true
        }
        Command::Config => run_config()?,
        Command::Recommend { task } => run_recommend(task)?,
        Command::Testimonial { feedback, persona } => run_testimonial(feedback, persona)?,
        Command::Both {
            task,
            feedback,
            persona,
        } => run_both(task, feedback, persona)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn build_assistant() -> Result<Assistant<HttpTransport>> {
    let config = Config::load()?;
    let transport = HttpTransport::from_config(&config)?;
    Ok(Assistant::with_policy(
        transport,
        RetryPolicy::with_max_attempts(config.effective_max_attempts()),
    ))
}

fn run_recommend(task: String) -> Result<bool> {
    let assistant = build_assistant()?;
    let surface = TerminalSurface::new("recommend", &task, "");
    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(assistant.recommend_model(&surface));
    surface.print_result();
    Ok(outcome.is_completed())
}

fn run_testimonial(feedback: String, persona: String) -> Result<bool> {
    let assistant = build_assistant()?;
    let surface = TerminalSurface::new("testimonial", &feedback, &persona);
    let rt = tokio::runtime::Runtime::new()?;
    let outcome = rt.block_on(assistant.synthesize_testimonial(&surface));
    surface.print_result();
    Ok(outcome.is_completed())
}

fn run_both(task: String, feedback: String, persona: String) -> Result<bool> {
    let assistant = build_assistant()?;
    let recommend = TerminalSurface::new("recommend", &task, "");
    let testimonial = TerminalSurface::new("testimonial", &feedback, &persona);
    let rt = tokio::runtime::Runtime::new()?;
    let (a, b) = rt.block_on(run_concurrently(&assistant, &recommend, &testimonial));
    recommend.print_result();
    testimonial.print_result();
    Ok(a.is_completed() && b.is_completed())
}

/// Drive both workflows on one task; neither waits for the other's backoff.
async fn run_concurrently<T: Transport>(
    assistant: &Assistant<T>,
    recommend: &dyn Surface,
    testimonial: &dyn Surface,
) -> (WorkflowOutcome, WorkflowOutcome) {
    futures::future::join(
        assistant.recommend_model(recommend),
        assistant.synthesize_testimonial(testimonial),
    )
    .await
}

fn run_catalog() {
    let catalog = ModelCatalog::builtin();
    let width = catalog
        .entries()
        .iter()
        .map(|e| e.identifier.len())
        .max()
        .unwrap_or(0);
    for entry in catalog.entries() {
        println!("  {:width$}  {}", entry.identifier, entry.description, width = width);
    }
}

fn run_config() -> Result<bool> {
    let config = Config::load()?;
    println!("  Config file:   {}", Config::config_path()?.display());
    println!("  API key:       {}", config.masked_api_key());
    println!("  Model:         {}", config.effective_model());
    println!("  Endpoint:      {}", config.effective_endpoint());
    println!("  Max attempts:  {}", config.effective_max_attempts());
    println!("  Timeout:       {:?}", config.request_timeout());
    Ok(config.effective_api_key().is_ok())
}
