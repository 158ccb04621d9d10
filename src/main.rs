//! Binary entry point for the pyfront CLI.
//!
//! Every command prints one JSON document to stdout; logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Dump the token stream of a file
//! pyfront tokens src/app.py
//!
//! # Print the syntax tree, parsing the file as a single expression
//! pyfront parse --mode expression expr.py
//!
//! # Report syntax errors under a directory
//! pyfront check src/ tests/
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use pyfront::cli::{run_check, run_parse, run_tokens};
use pyfront::config::Config;
use pyfront::error::{OutputErrorCode, PyfrontError};
use pyfront::output::{emit_response, emit_response_compact, ErrorResponse};
use pyfront_parser::{InputMode, ParseOptions, PythonVersion};

// ============================================================================
// CLI Structure
// ============================================================================

/// Python tokenizer, parser and syntax checker.
///
/// All output is JSON. Exit status is 0 on success, 5 when the input has a
/// syntax error, and another non-zero code for other failures.
#[derive(Parser, Debug)]
#[command(name = "pyfront", version, about = "Python tokenizer, parser and syntax checker")]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Config file (default: nearest pyfront.toml or .pyfront/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Target Python version, `permissive` or `MAJOR.MINOR`.
    #[arg(long, global = true)]
    python_version: Option<PythonVersion>,

    /// Do not capture `# type:` comments.
    #[arg(long, global = true)]
    no_type_comments: bool,

    /// Report the first failure without rerunning the diagnostic rules.
    #[arg(long, global = true)]
    no_invalid_rules: bool,

    /// Treat `async`/`await` as names outside `async def` bodies.
    #[arg(long, global = true)]
    async_hacks: bool,

    /// Print single-line JSON.
    #[arg(long, global = true)]
    compact: bool,

    /// Log level for tracing output.
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Format of log lines on stderr.
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,
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

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the token stream of a file.
    Tokens {
        /// Python source file.
        file: PathBuf,
    },
    /// Print the syntax tree of a file.
    Parse {
        /// Python source file.
        file: PathBuf,
        /// Start rule: module, expression or interactive.
        #[arg(long, default_value = "module")]
        mode: InputMode,
    },
    /// Parse files and directories, reporting the first syntax error of each
    /// file that fails.
    Check {
        /// Files or directories (default: current directory).
        paths: Vec<PathBuf>,
    },
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level, cli.global.log_format);

    match execute(&cli) {
        Ok(code) => code,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON like every other response.
            let _ = emit(&response, cli.global.compact);

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, format: LogFormat) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn emit<T: Serialize>(response: &T, compact: bool) -> Result<(), PyfrontError> {
    let mut stdout = io::stdout();
    let result = if compact {
        emit_response_compact(response, &mut stdout)
    } else {
        emit_response(response, &mut stdout)
    };
    result
        .and_then(|()| stdout.flush())
        .map_err(|e| PyfrontError::internal(format!("failed to write output: {}", e)))
}

/// Execute the CLI command.
fn execute(cli: &Cli) -> Result<ExitCode, PyfrontError> {
    let config = load_config(&cli.global)?;
    let options = parse_options(&cli.global, &config)?;
    match &cli.command {
        Command::Tokens { file } => {
            emit(&run_tokens(file, &options)?, cli.global.compact)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Parse { file, mode } => {
            emit(&run_parse(file, *mode, &options)?, cli.global.compact)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { paths } => {
            let paths = if paths.is_empty() {
                vec![PathBuf::from(".")]
            } else {
                paths.clone()
            };
            let response = run_check(&paths, &config, &options)?;
            emit(&response, cli.global.compact)?;
            if response.is_clean() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(OutputErrorCode::SyntaxError.code()))
            }
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// The explicit `--config` file, or the nearest one above the working
/// directory.
fn load_config(global: &GlobalArgs) -> Result<Config, PyfrontError> {
    if let Some(path) = &global.config {
        return Config::load(path);
    }
    let cwd = std::env::current_dir().map_err(|e| PyfrontError::io(Path::new("."), &e))?;
    let (config, _) = Config::discover(&cwd)?;
    Ok(config)
}

/// Config file settings with command-line overrides applied.
fn parse_options(global: &GlobalArgs, config: &Config) -> Result<ParseOptions, PyfrontError> {
    let mut options = config.parse.to_parse_options()?;
    if let Some(version) = global.python_version {
        options.version = version;
    }
    if global.no_type_comments {
        options.type_comments = false;
    }
    if global.no_invalid_rules {
        options.call_invalid_rules = false;
    }
    if global.async_hacks {
        options.async_hacks = true;
    }
    Ok(options)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod cli_parsing {
        use super::*;

        #[test]
        fn parse_mode_defaults_to_module() {
            let cli = Cli::try_parse_from(["pyfront", "parse", "a.py"]).unwrap();
            match cli.command {
                Command::Parse { file, mode } => {
                    assert_eq!(file, PathBuf::from("a.py"));
                    assert_eq!(mode, InputMode::Module);
                }
                _ => panic!("expected Parse"),
            }
        }

        #[test]
        fn parse_mode_aliases() {
            let cli = Cli::try_parse_from(["pyfront", "parse", "--mode", "eval", "a.py"]).unwrap();
            assert!(matches!(
                cli.command,
                Command::Parse {
                    mode: InputMode::Expression,
                    ..
                }
            ));
        }

        #[test]
        fn unknown_mode_is_rejected() {
            assert!(Cli::try_parse_from(["pyfront", "parse", "--mode", "nope", "a.py"]).is_err());
        }

        #[test]
        fn global_flags_after_subcommand() {
            let cli = Cli::try_parse_from([
                "pyfront",
                "check",
                "src",
                "--python-version",
                "3.8",
                "--no-type-comments",
                "--log-format",
                "json",
            ])
            .unwrap();
            assert_eq!(
                cli.global.python_version,
                Some(PythonVersion::V { major: 3, minor: 8 })
            );
            assert!(cli.global.no_type_comments);
            assert!(matches!(cli.global.log_format, LogFormat::Json));
            match cli.command {
                Command::Check { paths } => assert_eq!(paths, vec![PathBuf::from("src")]),
                _ => panic!("expected Check"),
            }
        }

        #[test]
        fn bad_python_version_is_rejected() {
            assert!(
                Cli::try_parse_from(["pyfront", "tokens", "a.py", "--python-version", "3"])
                    .is_err()
            );
        }

        #[test]
        fn check_paths_are_optional() {
            let cli = Cli::try_parse_from(["pyfront", "check"]).unwrap();
            assert!(matches!(cli.command, Command::Check { paths } if paths.is_empty()));
        }
    }

    mod overrides {
        use super::*;

        #[test]
        fn flags_override_config() {
            let cli = Cli::try_parse_from([
                "pyfront",
                "tokens",
                "a.py",
                "--python-version",
                "3.11",
                "--no-invalid-rules",
                "--async-hacks",
            ])
            .unwrap();
            let options = parse_options(&cli.global, &Config::default()).unwrap();
            assert_eq!(options.version, PythonVersion::V { major: 3, minor: 11 });
            assert!(!options.call_invalid_rules);
            assert!(options.async_hacks);
            assert!(options.type_comments);
        }

        #[test]
        fn config_applies_without_flags() {
            let cli = Cli::try_parse_from(["pyfront", "tokens", "a.py"]).unwrap();
            let mut config = Config::default();
            config.parse.type_comments = false;
            let options = parse_options(&cli.global, &config).unwrap();
            assert!(!options.type_comments);
            assert_eq!(options.version, PythonVersion::Permissive);
        }
    }
}
