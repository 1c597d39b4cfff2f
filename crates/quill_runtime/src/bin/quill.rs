//! Quill CLI entry point.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use quill_engine::InterpreterConfig;
use quill_foundation::Diagnostic;
use quill_language::{Parser, scan};
use quill_runtime::serialize::load_from_file;
use quill_runtime::{Outcome, Player, Session};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "QUILL_LOG";

/// CLI configuration parsed from arguments.
#[derive(Default)]
struct CliConfig {
    file: Option<PathBuf>,
    show_help: bool,
    show_version: bool,
    verbose: bool,
    parse_only: bool,
    seed: Option<u64>,
    max_steps: Option<usize>,
    resume: Option<PathBuf>,
    trace: bool,
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError: {e}\x1b[0m");
            ExitCode::FAILURE
        }
    }
}

fn parse_args(args: Vec<String>) -> Result<CliConfig, Box<dyn std::error::Error>> {
    let mut config = CliConfig::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.show_help = true,
            "-V" | "--version" => config.show_version = true,
            "-v" | "--verbose" => config.verbose = true,
            "-p" | "--parse-only" => config.parse_only = true,
            "--trace" => config.trace = true,
            "--seed" => {
                let value = option_value(&args, &mut i, "--seed")?;
                config.seed = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --seed value: {value}"))?,
                );
            }
            "--max-steps" => {
                let value = option_value(&args, &mut i, "--max-steps")?;
                config.max_steps = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid --max-steps value: {value}"))?,
                );
            }
            "--resume" => {
                let value = option_value(&args, &mut i, "--resume")?;
                config.resume = Some(PathBuf::from(value));
            }
            arg if arg.starts_with('-') => {
                return Err(format!("unknown option: {arg}").into());
            }
            path => {
                if config.file.is_some() {
                    return Err("only one script file may be given".into());
                }
                config.file = Some(PathBuf::from(path));
            }
        }
        i += 1;
    }

    Ok(config)
}

fn option_value<'a>(args: &'a [String], i: &mut usize, name: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{name} requires a value"))
}

fn init_logging(trace: bool) {
    let default = if trace { "quill=trace" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(kind: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("{kind} at line {}: {}", diagnostic.line, diagnostic.message);
    }
}

fn run(args: Vec<String>) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = parse_args(args)?;

    if config.show_help {
        print_help();
        return Ok(ExitCode::SUCCESS);
    }

    if config.show_version {
        println!("quill {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    init_logging(config.trace);

    let Some(file) = &config.file else {
        return Err("no script file given (see --help)".into());
    };
    let source = fs::read_to_string(file)
        .map_err(|e| format!("Error reading file {}: {e}", file.display()))?;

    let (tokens, lexical) = scan(&source);
    if !lexical.is_empty() {
        report("ScannerError", &lexical);
        return Ok(ExitCode::FAILURE);
    }

    if config.verbose {
        println!("Tokens:");
        for token in &tokens {
            println!("{token}");
        }
    }

    let (program, syntax) = Parser::new(tokens).parse();
    if !syntax.is_empty() {
        report("ParseError", &syntax);
        return Ok(ExitCode::FAILURE);
    }

    println!("File parsed successfully.");

    if config.verbose {
        println!("Program:");
        print!("{program}");
    }

    if config.parse_only {
        println!("Parse only mode, exiting after parsing.");
        return Ok(ExitCode::SUCCESS);
    }

    let mut interpreter_config = InterpreterConfig::new();
    if let Some(seed) = config.seed {
        interpreter_config = interpreter_config.with_seed(seed);
    }
    if let Some(limit) = config.max_steps {
        interpreter_config = interpreter_config.with_max_silent_steps(limit);
    }

    let session = match &config.resume {
        Some(path) => Session::resume(program, load_from_file(path)?, interpreter_config)?,
        None => Session::new(program, interpreter_config),
    };

    match Player::new(session)?.run()? {
        Outcome::Ended | Outcome::Quit => Ok(ExitCode::SUCCESS),
        Outcome::Failed(err) => {
            match err.line {
                Some(line) => eprintln!("Runtime Error at line {line}: {}", err.message()),
                None => eprintln!("Runtime Error: {}", err.message()),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        "\x1b[1mQuill\x1b[0m - Branching dialogue scripts

\x1b[1mUSAGE:\x1b[0m
    quill [OPTIONS] FILE

\x1b[1mARGUMENTS:\x1b[0m
    FILE               Script to run

\x1b[1mOPTIONS:\x1b[0m
    -h, --help         Print help information
    -V, --version      Print version information
    -v, --verbose      Print tokens and the parsed program
    -p, --parse-only   Check the script and exit
    --seed N           Seed RANDOM for a reproducible run
    --max-steps N      Statements allowed between two outputs
    --resume PATH      Continue a session saved with :save

\x1b[1mDEBUG OPTIONS:\x1b[0m
    --trace            Log interpreter events to stderr

\x1b[1mENVIRONMENT:\x1b[0m
    {LOG_ENV}          Log filter, e.g. quill_engine=debug

\x1b[1mPLAYER COMMANDS:\x1b[0m
    :save PATH         Save the session
    :vars              Show variables
    :quit              Leave
    Ctrl+D             Leave"
    );
}
