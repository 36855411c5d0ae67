//! intervue CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "intervue",
    version,
    about = "Timed, keyword-scored technical interviews"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example question set
    Init,

    /// Validate question set files
    Validate {
        /// Path to a .toml/.csv question set or a directory of them
        #[arg(long)]
        question_set: PathBuf,
    },

    /// Publish a question set and print its access codes
    Create {
        /// Path to a .toml or .csv question set
        #[arg(long)]
        question_set: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score a single answer against a keyword list
    Score {
        /// Keywords separated by ';'
        #[arg(long)]
        keywords: String,

        /// Maximum score for the question
        #[arg(long, default_value = "10")]
        max_score: f64,

        /// Answer text
        #[arg(long, conflicts_with = "answer_file", required_unless_present = "answer_file")]
        answer: Option<String>,

        /// Read the answer from a file
        #[arg(long)]
        answer_file: Option<PathBuf>,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take an interview in the terminal
    Take {
        /// Interview code
        #[arg(long)]
        code: String,

        /// Candidate name
        #[arg(long)]
        name: String,

        /// Candidate email
        #[arg(long)]
        email: String,

        /// Candidate phone
        #[arg(long)]
        phone: String,

        /// Seconds per question (overrides config)
        #[arg(long)]
        time_limit: Option<u32>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show results for a question set
    Dashboard {
        /// Dashboard code
        #[arg(long)]
        code: String,

        /// Output format: text, json, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Output file (json/html)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("intervue=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { question_set } => commands::validate::execute(question_set),
        Commands::Create {
            question_set,
            config,
        } => commands::create::execute(question_set, config).await,
        Commands::Score {
            keywords,
            max_score,
            answer,
            answer_file,
            json,
        } => commands::score::execute(keywords, max_score, answer, answer_file, json),
        Commands::Take {
            code,
            name,
            email,
            phone,
            time_limit,
            config,
        } => commands::take::execute(code, name, email, phone, time_limit, config).await,
        Commands::Dashboard {
            code,
            format,
            output,
            config,
        } => commands::dashboard::execute(code, format, output, config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
