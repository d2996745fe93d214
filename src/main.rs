use std::io::{self, Read};
use std::path::PathBuf;

use clap::{ArgAction, Parser as ClapParser, Subcommand};
use log::LevelFilter;
use quill_lang::cli::{self, CheckOptions, CheckResult, CliError, TreeFormat};
use quill_lang::config::CompilerConfig;

#[derive(ClapParser)]
#[command(name = "quill")]
#[command(about = "Quill - tokenize hypertext story markup and compile its expressions")]
#[command(version)]
struct Cli {
    /// TOML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile every expression in a document, or a single expression
    Compile {
        /// Document file (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Compile this expression instead of a document
        #[arg(short, long)]
        expr: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the token tree of a document
    Tree {
        /// Document file (reads stdin if not provided)
        file: Option<PathBuf>,

        /// Indented outline instead of JSON
        #[arg(long)]
        outline: bool,

        /// Pretty-print the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Show the nodes containing a byte offset, deepest first
    At {
        offset: usize,

        /// Document file (reads stdin if not provided)
        file: Option<PathBuf>,
    },

    /// Compile an expression and evaluate it over constants
    Eval {
        expr: String,

        /// Also print the generated code
        #[arg(long)]
        show_code: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = match &cli.config {
        Some(path) => CompilerConfig::load(path)?,
        None => CompilerConfig::default(),
    };

    match cli.command {
        Commands::Compile { file, expr, json } => run_compile(file, expr, json, config),
        Commands::Tree {
            file,
            outline,
            pretty,
        } => {
            config.pretty |= pretty;
            let source = read_source(file)?;
            let format = if outline {
                TreeFormat::Outline
            } else {
                TreeFormat::Json
            };
            print!("{}", cli::execute_tree(&source, &config, format)?);
            if !outline {
                println!();
            }
            Ok(())
        }
        Commands::At { offset, file } => {
            let source = read_source(file)?;
            for entry in cli::execute_at(&source, &config, offset)? {
                match entry.name {
                    Some(name) => println!("{} {}..{} ({})", entry.kind, entry.start, entry.end, name),
                    None => println!("{} {}..{}", entry.kind, entry.start, entry.end),
                }
            }
            Ok(())
        }
        Commands::Eval { expr, show_code } => {
            let (code, value) = cli::execute_eval(&expr, &config)?;
            if show_code {
                println!("{}", code);
            }
            println!("{}", value);
            Ok(())
        }
    }
}

fn run_compile(
    file: Option<PathBuf>,
    expr: Option<String>,
    json: bool,
    config: CompilerConfig,
) -> Result<(), CliError> {
    let pretty = config.pretty;
    let options = match expr {
        Some(source) => CheckOptions {
            source,
            expression: true,
            config,
        },
        None => CheckOptions {
            source: read_source(file)?,
            expression: false,
            config,
        },
    };

    match cli::execute_check(&options)? {
        CheckResult::Expression(code) => println!("{}", code),
        CheckResult::Document(found) if json => {
            let text = if pretty {
                serde_json::to_string_pretty(&found)
            } else {
                serde_json::to_string(&found)
            }?;
            println!("{}", text);
        }
        CheckResult::Document(found) => {
            for item in found {
                println!("{}..{} {}", item.start, item.end, item.source);
                println!("    {}", item.code);
            }
        }
    }
    Ok(())
}

fn read_source(file: Option<PathBuf>) -> Result<String, CliError> {
    match file {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None if !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
        None => Err(CliError::NoInput),
    }
}
