use std::io::Read;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use persuasion_lens::server::{self, ServerConfig};
use persuasion_lens::{Analyzer, Lexicon, LexiconSentiment, ServerError};

#[derive(Parser)]
#[command(
    name = "persuasion-lens",
    about = "Score text for persuasive intent and emotional manipulation",
    version
)]
struct Cli {
    /// JSON lexicon replacing the built-in trigger words
    #[arg(long, global = true, env = "PERSUASION_LENS_LEXICON")]
    lexicon: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "PERSUASION_LENS_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true, env = "PERSUASION_LENS_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze files and print JSON (reads stdin if none provided)
    Analyze { files: Vec<PathBuf> },

    /// Serve the web form and the /analyze endpoint
    Serve {
        #[arg(short, long, env = "PERSUASION_LENS_LISTEN", default_value = "127.0.0.1:5000")]
        listen: String,

        /// Maximum request body size in bytes
        #[arg(long, default_value_t = 64 * 1024)]
        max_body_bytes: usize,
    },
}

fn init_tracing(level: &str, json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    // Logs go to stderr so `analyze` output stays clean JSON.
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_analyzer(path: Option<&PathBuf>) -> Result<Analyzer, ServerError> {
    let lexicon = match path {
        Some(p) => {
            let lexicon = Lexicon::from_path(p)?;
            tracing::info!(path = %p.display(), "loaded lexicon");
            lexicon
        }
        None => Lexicon::builtin(),
    };
    Ok(Analyzer::new(lexicon, LexiconSentiment))
}

fn print_analysis(analyzer: &Analyzer, label: &str, text: &str) -> bool {
    match analyzer.analyze(text) {
        Ok(result) => match serde_json::to_string_pretty(&result) {
            Ok(json) => {
                println!("{json}");
                true
            }
            Err(e) => {
                eprintln!("Error serializing {label}: {e}");
                false
            }
        },
        Err(e) => {
            eprintln!("Error analyzing {label}: {e}");
            false
        }
    }
}

fn run_analyze(analyzer: &Analyzer, files: &[PathBuf]) -> ExitCode {
    if files.is_empty() {
        let mut input = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut input) {
            eprintln!("Error reading stdin: {e}");
            return ExitCode::FAILURE;
        }
        return if print_analysis(analyzer, "stdin", &input) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    for path in files {
        let text = match std::fs::read_to_string(path) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Error reading {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        };
        if !print_analysis(analyzer, &path.display().to_string(), &text) {
            return ExitCode::FAILURE;
        }
    }
    ExitCode::SUCCESS
}

async fn run_serve(analyzer: Analyzer, listen: &str, max_body_bytes: usize) -> Result<(), ServerError> {
    let listen_addr: SocketAddr = listen
        .parse()
        .map_err(|e| ServerError::Config(format!("Invalid listen address: {e}")))?;
    server::serve(
        analyzer,
        ServerConfig {
            listen_addr,
            max_body_bytes,
        },
    )
    .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let analyzer = match load_analyzer(cli.lexicon.as_ref()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Analyze { files } => run_analyze(&analyzer, &files),
        Command::Serve {
            listen,
            max_body_bytes,
        } => match run_serve(analyzer, &listen, max_body_bytes).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}
