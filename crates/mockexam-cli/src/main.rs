//! mockexam CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mockexam",
    version,
    about = "Blueprint-weighted mock exam generator and scorer"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an exam from a template and a question pool
    Generate {
        /// Built-in template id or path to a template .toml
        #[arg(long)]
        template: String,

        /// Question pool JSON
        #[arg(long)]
        pool: PathBuf,

        /// Seed for reproducible selection
        #[arg(long, conflicts_with = "session")]
        seed: Option<String>,

        /// Derive the seed from a session identifier
        #[arg(long)]
        session: Option<String>,

        /// Write the exam JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Score answers against a generated exam
    Score {
        /// Generated exam JSON
        #[arg(long)]
        exam: PathBuf,

        /// Answer map JSON
        #[arg(long)]
        answers: PathBuf,

        /// Passing score (default: the template's)
        #[arg(long)]
        passing_score: Option<f64>,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Save the report JSON (to the configured output directory if no path is given)
        #[arg(long, num_args = 0..=1)]
        save: Option<Option<PathBuf>>,

        /// Write an HTML report
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// Compare two saved reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Accuracy change, in percentage points, that counts as significant
        #[arg(long, default_value = "5.0")]
        threshold: f64,

        /// Exit code 1 if any area regressed
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate template files and, optionally, a question pool
    Validate {
        /// Path to a template file or directory
        #[arg(long)]
        template: PathBuf,

        /// Question pool JSON to check against the template(s)
        #[arg(long)]
        pool: Option<PathBuf>,
    },

    /// List built-in and configured templates
    ListTemplates {
        /// Filter to one certification (e.g. CPA)
        #[arg(long)]
        certification: Option<String>,
    },

    /// Create starter config, template, and question pool
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mockexam=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Generate {
            template,
            pool,
            seed,
            session,
            output,
        } => commands::generate::execute(template, pool, seed, session, output, config),
        Commands::Score {
            exam,
            answers,
            passing_score,
            format,
            save,
            html,
        } => commands::score::execute(exam, answers, passing_score, format, save, html, config),
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate { template, pool } => commands::validate::execute(template, pool),
        Commands::ListTemplates { certification } => {
            commands::list_templates::execute(certification, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
