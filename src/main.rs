use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use matchtree::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};

#[derive(ClapParser)]
#[command(name = "matchtree")]
#[command(about = "matchtree - evaluate document filters ($and, $or, $elemMatch, ...) on JSON")]
#[command(version)]
struct Cli {
    /// Log level for tracing output
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a filter and print the documents that match it
    Check {
        /// The filter document, as JSON
        filter: String,

        /// JSON input: a document or an array of documents (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Pretty-print the output
        #[arg(short, long)]
        pretty: bool,

        /// Only validate the filter, don't evaluate it
        #[arg(long)]
        syntax_only: bool,
    },

    /// Print the canonical form and the expression tree of a filter
    Explain {
        /// The filter document, as JSON
        filter: String,

        /// Pretty-print the canonical form
        #[arg(short, long)]
        pretty: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'matchtree docs' to list categories)
        category: String,
    },
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    let result = match cli.command {
        Commands::Check {
            filter,
            input,
            pretty,
            syntax_only,
        } => run_check(filter, input, pretty, syntax_only),
        Commands::Explain { filter, pretty } => run_explain(&filter, pretty),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing subscriber. `RUST_LOG` overrides `--log-level`.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run_check(
    filter: String,
    input: Option<String>,
    pretty: bool,
    syntax_only: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        filter,
        input,
        pretty,
        syntax_only,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid => println!("Filter is valid"),
        CheckResult::Matches { matched, examined } => {
            tracing::info!(matched = matched.len(), examined, "check finished");
            for doc in &matched {
                let json = if pretty {
                    serde_json::to_string_pretty(doc)?
                } else {
                    serde_json::to_string(doc)?
                };
                println!("{}", json);
            }
        }
    }
    Ok(())
}

fn run_explain(filter: &str, pretty: bool) -> Result<(), CliError> {
    let explanation = cli::explain(filter, pretty)?;
    println!("{}", explanation.canonical);
    print!("{}", explanation.tree);
    Ok(())
}
