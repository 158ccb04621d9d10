//! CLI command implementations.
//!
//! Each `run_*` function does the work of one subcommand and returns the
//! response to print; `main.rs` only parses flags, loads configuration and
//! emits the result. All functions return `Result<T, PyfrontError>` so the
//! caller can turn failures into a JSON error response with a stable exit
//! code.

use std::fs;
use std::path::Path;

use pyfront_parser::tokenizer::TokConfig;
use pyfront_parser::{parse_module_with_options, tokenize_with_config, InputMode, ParseOptions};
use tracing::{debug, info, info_span, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::PyfrontError;
use crate::output::{CheckResponse, FileDiagnostic, ParseResponse, TokenInfo, TokensResponse};

/// Read a source file as UTF-8.
pub fn read_source(path: &Path) -> Result<String, PyfrontError> {
    fs::read_to_string(path).map_err(|e| PyfrontError::io(path, &e))
}

/// `pyfront tokens <file>`: the full token stream, ENDMARKER included.
pub fn run_tokens(path: &Path, options: &ParseOptions) -> Result<TokensResponse, PyfrontError> {
    let file = path.display().to_string();
    let source = read_source(path)?;
    let source = source.strip_prefix('\u{feff}').unwrap_or(&source);
    let config = TokConfig {
        async_hacks: options.async_hacks,
        type_comments: options.type_comments,
    };
    let tokens = tokenize_with_config(source, &config)
        .map_err(|err| PyfrontError::syntax(&file, err))?;
    debug!(file = %file, tokens = tokens.len(), "tokenized");
    let tokens = tokens
        .iter()
        .map(|tok| TokenInfo::new(tok, source))
        .collect();
    Ok(TokensResponse::new(file, tokens))
}

/// `pyfront parse <file> [--mode]`: the syntax tree.
pub fn run_parse(
    path: &Path,
    mode: InputMode,
    options: &ParseOptions,
) -> Result<ParseResponse, PyfrontError> {
    if mode == InputMode::FString {
        return Err(PyfrontError::invalid_args(
            "fstring mode parses replacement fields inside a larger source and cannot be used on a file",
        ));
    }
    let file = path.display().to_string();
    let source = read_source(path)?;
    let options = options
        .clone()
        .with_mode(mode)
        .with_filename(file.as_str());
    let parsed =
        parse_module_with_options(&source, &options).map_err(|err| PyfrontError::syntax(&file, err))?;
    Ok(ParseResponse::new(
        file,
        mode,
        parsed.root,
        parsed.type_comments,
    ))
}

/// `pyfront check <paths>...`: parse every Python file under `paths` and
/// report the first syntax error of each file that fails.
///
/// A missing path is an error; unreadable files found while walking are
/// logged and skipped.
pub fn run_check(
    paths: &[impl AsRef<Path>],
    config: &Config,
    options: &ParseOptions,
) -> Result<CheckResponse, PyfrontError> {
    let _span = info_span!("check", roots = paths.len()).entered();
    let mut checked = 0;
    let mut diagnostics = Vec::new();

    for root in paths {
        let root = root.as_ref();
        if !root.exists() {
            return Err(PyfrontError::FileNotFound {
                path: root.display().to_string(),
                message: "no such file or directory".to_string(),
            });
        }
        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0
                    || !entry
                        .file_name()
                        .to_str()
                        .is_some_and(|name| config.is_excluded(name))
            });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            // Explicitly named files are checked whatever their extension.
            if entry.depth() > 0 && !config.is_checked_file(path) {
                continue;
            }
            let source = match read_source(path) {
                Ok(source) => source,
                Err(err) => {
                    warn!(error = %err, "skipping file");
                    continue;
                }
            };
            checked += 1;
            let file = path.display().to_string();
            let options = options.clone().with_filename(file.as_str());
            if let Err(err) = parse_module_with_options(&source, &options) {
                debug!(file = %file, message = %err.syntax_error().message, "syntax error");
                diagnostics.push(FileDiagnostic::new(file, err.syntax_error()));
            }
        }
    }

    info!(
        files = checked,
        errors = diagnostics.len(),
        "check complete"
    );
    Ok(CheckResponse::new(checked, diagnostics))
}
