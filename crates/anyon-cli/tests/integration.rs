//! Integration tests for CLI commands.

use std::io::Write;
use std::process::{Command, Stdio};

use tempfile::TempDir;

const POLICY_ENV: [&str; 7] = [
    "AC_NUMERIC_FMT",
    "AC_NUMERIC_PREC",
    "AC_TOL_ABS",
    "AC_TOL_REL",
    "AC_ROUND_HALF",
    "AC_ARRAY_REORDER",
    "AC_CLIP_SMALL",
];

const TORIC: &str = r#"{
    "name": "toric_code",
    "objects": ["1", "e", "m", "em"],
    "qdim": [1.0, 1.0, 1.0, 1.0],
    "global_dim": 2.0,
    "twist": [1.0, 1.0, 1.0, -1.0],
    "S": [[0.5, 0.5, 0.5, 0.5], [0.5, 0.5, -0.5, -0.5], [0.5, -0.5, 0.5, -0.5], [0.5, -0.5, -0.5, 0.5]],
    "T": [[1.0, 0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, -1.0]]
}"#;

const NOISY_TORIC: &str = r#"{
    "name": "toric_code",
    "objects": ["1", "e", "m", "em"],
    "qdim": [1.0, 1.0, 1.0, 1.0],
    "global_dim": 2.0000000000000004,
    "twist": [1.0, 1.0, 1.0, -1.0],
    "S": [[0.5000000000001, 0.4999999999999, 0.5000000000001, 0.4999999999999],
          [0.4999999999999, 0.5000000000001, -0.5000000000001, -0.5],
          [0.5, -0.5, 0.5, -0.5], [0.5, -0.5, -0.5, 0.5]],
    "T": [[1.0, -0.0, 0.0, 0.0], [0.0, 1.0, 0.0, 0.0], [0.0, 0.0, 1.0, 0.0], [0.0, 0.0, 0.0, -1.0]]
}"#;

const TORIC_CANONICAL: &str = concat!(
    r#"{"S":[[0.5,0.5,0.5,0.5],[0.5,0.5,-0.5,-0.5],[0.5,-0.5,0.5,-0.5],[0.5,-0.5,-0.5,0.5]],"#,
    r#""T":[[1.0,0.0,0.0,0.0],[0.0,1.0,0.0,0.0],[0.0,0.0,1.0,0.0],[0.0,0.0,0.0,-1.0]],"#,
    r#""global_dim":2.0,"name":"toric_code","objects":["1","e","m","em"],"#,
    r#""qdim":[1.0,1.0,1.0,1.0],"twist":[1.0,1.0,1.0,-1.0]}"#
);
const TORIC_DIGEST: &str = "sha256:7661c26871271c5290649b017c175895c853796f1821517a92740d3b146f9e55";

fn write_input(contents: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("payload.json");
    std::fs::write(&path, contents).unwrap();
    (temp_dir, path.to_string_lossy().to_string())
}

fn command(env: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_anyon"));
    for key in POLICY_ENV {
        cmd.env_remove(key);
    }
    cmd.env_remove("ANYON_LOG");
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    run_cli_with_env(args, &[])
}

fn run_cli_with_env(args: &[&str], env: &[(&str, &str)]) -> (bool, String, String) {
    let output = command(env)
        .args(args)
        .output()
        .expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.success(), stdout, stderr)
}

fn run_cli_with_stdin(args: &[&str], stdin: &str) -> (bool, String, String) {
    let mut child = command(&[])
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    (output.status.success(), stdout, stderr)
}

#[test]
fn test_show_policy_defaults() {
    let (success, stdout, _) = run_cli(&["num", "--show-policy"]);
    assert!(success);
    let expected = r#"{
  "array_reorder": false,
  "clip_small": true,
  "fmt": "auto",
  "mode": "float",
  "precision": 12,
  "round_half": "even",
  "tol_abs": 1e-10,
  "tol_rel": 1e-10
}"#;
    assert_eq!(stdout.trim_end(), expected);
}

#[test]
fn test_show_policy_env_then_flags() {
    let (success, stdout, _) = run_cli_with_env(
        &["num", "--show-policy", "--precision", "3", "--no-clip-small"],
        &[("AC_NUMERIC_FMT", "fixed"), ("AC_NUMERIC_PREC", "7"), ("AC_ARRAY_REORDER", "on")],
    );
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["fmt"], "fixed");
    assert_eq!(parsed["precision"], 3);
    assert_eq!(parsed["array_reorder"], true);
    assert_eq!(parsed["clip_small"], false);
}

#[test]
fn test_num_without_flag_prints_hint() {
    let (success, stdout, _) = run_cli(&["num"]);
    assert!(!success);
    assert!(stdout.contains("--show-policy"));
}

#[test]
fn test_invalid_policy_is_reported() {
    let (success, _, stderr) = run_cli(&["num", "--show-policy", "--precision", "0"]);
    assert!(!success);
    assert!(stderr.contains("Error:"));
    assert!(stderr.contains("precision"));

    let (success, _, stderr) =
        run_cli_with_env(&["num", "--show-policy"], &[("AC_TOL_ABS", "tiny")]);
    assert!(!success);
    assert!(stderr.contains("tol_abs"));
}

#[test]
fn test_canonicalize_file() {
    let (_temp_dir, path) = write_input(TORIC);
    let (success, stdout, _) = run_cli(&["canonicalize", &path]);
    assert!(success);
    assert_eq!(stdout.trim_end(), TORIC_CANONICAL);
}

#[test]
fn test_canonicalize_stdin() {
    let (success, stdout, _) = run_cli_with_stdin(&["canonicalize"], r#"{"b": -0.0, "a": "é"}"#);
    assert!(success);
    assert_eq!(stdout.trim_end(), r#"{"a":"é","b":0.0}"#);
}

#[test]
fn test_canonicalize_normalize_absorbs_noise() {
    let (_temp_dir, path) = write_input(NOISY_TORIC);
    let (success, stdout, _) = run_cli(&["canonicalize", &path]);
    assert!(success);
    assert_ne!(stdout.trim_end(), TORIC_CANONICAL);

    let (success, stdout, _) = run_cli(&["canonicalize", "--normalize", &path]);
    assert!(success);
    assert_eq!(stdout.trim_end(), TORIC_CANONICAL);
}

#[test]
fn test_canonicalize_reorder_arrays() {
    let (success, stdout, _) =
        run_cli_with_stdin(&["canonicalize", "--reorder-arrays"], r#"{"v": ["b", 2, null, 1.5]}"#);
    assert!(success);
    assert_eq!(stdout.trim_end(), r#"{"v":[null,2,1.5,"b"]}"#);
}

#[test]
fn test_canonicalize_rejects_bad_input() {
    let (_temp_dir, path) = write_input("{not json");
    let (success, _, stderr) = run_cli(&["canonicalize", &path]);
    assert!(!success);
    assert!(stderr.contains("Invalid JSON"));

    let (success, _, stderr) = run_cli_with_stdin(&["canonicalize"], "[1, 2]");
    assert!(!success);
    assert!(stderr.contains("top-level"));

    let (success, _, stderr) = run_cli(&["canonicalize", "/nonexistent/payload.json"]);
    assert!(!success);
    assert!(stderr.contains("Failed to read file"));
}

#[test]
fn test_hash_command() {
    let (_temp_dir, path) = write_input(TORIC);
    let (success, stdout, _) = run_cli(&["hash", &path]);
    assert!(success);
    assert_eq!(stdout.trim_end(), TORIC_DIGEST);

    let (success, stdout, _) = run_cli(&["hash", "--kind", "modular:data", &path]);
    assert!(success);
    assert_eq!(
        stdout.trim_end(),
        format!("modular-data:{}", TORIC_DIGEST)
    );
}

#[test]
fn test_hash_normalized_matches_clean_payload() {
    let (_temp_dir, path) = write_input(NOISY_TORIC);
    let (success, stdout, _) = run_cli(&["hash", &path]);
    assert!(success);
    assert_ne!(stdout.trim_end(), TORIC_DIGEST);

    let (success, stdout, _) = run_cli(&["hash", "--normalize", &path]);
    assert!(success);
    assert_eq!(stdout.trim_end(), TORIC_DIGEST);
}

#[test]
fn test_hash_attach_selected_fields() {
    let (_temp_dir, path) = write_input(TORIC);
    let (success, stdout, _) = run_cli(&["hash-attach", "--field", "S", &path]);
    assert!(success);

    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hashes = parsed["hashes"].as_object().unwrap();
    assert_eq!(hashes.len(), 1);
    assert_eq!(
        hashes["S"],
        "sha256:cd7fef46cef63d9876f1d81eabc25c2180d74836991285542a213d5318acfa3c"
    );
}

#[test]
fn test_hash_attach_default_fields() {
    let (success, stdout, _) = run_cli_with_stdin(&["hash-attach"], TORIC);
    assert!(success);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let hashes = parsed["hashes"].as_object().unwrap();
    let mut keys: Vec<&str> = hashes.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, ["S", "T", "global_dim", "objects", "qdim", "twist"]);
}

#[test]
fn test_version_and_info() {
    let (success, stdout, _) = run_cli(&["--version"]);
    assert!(success);
    assert!(stdout.starts_with("anyon "));

    let (success, stdout, _) = run_cli(&["--info"]);
    assert!(success);
    assert!(stdout.contains("system="));
}
