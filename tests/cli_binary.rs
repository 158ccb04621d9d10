//! End-to-end tests of the `pyfront` binary.
//!
//! Each test writes a small workspace to a temp dir, runs the built binary
//! there, and checks the JSON on stdout and the exit code.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn pyfront(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pyfront"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run pyfront")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn workspace(files: &[(&str, &str)]) -> TempDir {
    let temp = TempDir::new().unwrap();
    for (name, content) in files {
        let path = temp.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
    temp
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn tokens_prints_the_stream() {
    let ws = workspace(&[("a.py", "x = 1\n")]);
    let output = pyfront(ws.path(), &["tokens", "a.py"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    let kinds: Vec<_> = json["tokens"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["kind"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        kinds,
        ["NAME", "EQUAL", "NUMBER", "NEWLINE", "ENDMARKER"]
    );
}

#[test]
fn parse_prints_the_tree() {
    let ws = workspace(&[("a.py", "def f(x): return x\n")]);
    let output = pyfront(ws.path(), &["parse", "a.py", "--compact"]);
    assert!(output.status.success());
    assert_eq!(output.stdout.iter().filter(|&&b| b == b'\n').count(), 1);
    let json = stdout_json(&output);
    assert_eq!(json["mode"], "module");
    assert_eq!(json["ast"]["node"], "Module");
}

#[test]
fn parse_error_exits_with_syntax_code() {
    let ws = workspace(&[("bad.py", "if x\n    pass\n")]);
    let output = pyfront(ws.path(), &["parse", "bad.py"]);
    assert_eq!(output.status.code(), Some(5));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 5);
    assert_eq!(json["error"]["location"]["file"], "bad.py");
    assert_eq!(json["error"]["location"]["line"], 1);
}

#[test]
fn missing_file_exits_with_resolution_code() {
    let ws = workspace(&[]);
    let output = pyfront(ws.path(), &["tokens", "nope.py"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_json(&output)["error"]["code"], 3);
}

#[test]
fn check_reports_each_bad_file() {
    let ws = workspace(&[
        ("pkg/ok.py", "import os\n"),
        ("pkg/bad.py", "x = (\n"),
        ("build/gen.py", "def (\n"),
        (
            "pyfront.toml",
            "[check]\nexclude = [\"build\"]\n",
        ),
    ]);
    let output = pyfront(ws.path(), &["check"]);
    assert_eq!(output.status.code(), Some(5));
    let json = stdout_json(&output);
    assert_eq!(json["files_checked"], 2);
    let diagnostics = json["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0]["location"]["file"]
        .as_str()
        .unwrap()
        .ends_with("bad.py"));
}

#[test]
fn check_clean_tree_succeeds() {
    let ws = workspace(&[("a.py", "pass\n"), ("b.pyi", "def f() -> int: ...\n")]);
    let output = pyfront(ws.path(), &["check", "."]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["files_checked"], 2);
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn version_from_config_file() {
    // Before 3.10 `match` is only a name, so the statement form fails.
    let source = "match x:\n    case 1:\n        pass\n";
    let ws = workspace(&[
        ("m.py", source),
        ("pyfront.toml", "[parse]\nversion = \"3.9\"\n"),
    ]);
    let output = pyfront(ws.path(), &["parse", "m.py"]);
    assert_eq!(output.status.code(), Some(5));

    let output = pyfront(ws.path(), &["parse", "m.py", "--python-version", "3.10"]);
    assert!(output.status.success());
}

#[test]
fn bad_config_is_reported() {
    let ws = workspace(&[("a.py", "pass\n"), ("pyfront.toml", "[parse]\nversion = 3\n")]);
    let output = pyfront(ws.path(), &["parse", "a.py"]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(stdout_json(&output)["error"]["code"], 3);
}
