use serde_json::Value;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

struct TempDirGuard {
    path: PathBuf,
}

impl TempDirGuard {
    fn new(prefix: &str) -> Self {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        let path = std::env::temp_dir().join(format!(
            "tokensmith-cli-{prefix}-{}-{unique}",
            std::process::id()
        ));
        fs::create_dir_all(&path).expect("temp dir should be created");
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempDirGuard {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

fn run_tokensmith<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = env!("CARGO_BIN_EXE_tokensmith");
    Command::new(bin)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("tokensmith command should execute")
}

fn assert_success(output: &Output) {
    if !output.status.success() {
        panic!(
            "command failed with status {:?}\nstdout:\n{}\nstderr:\n{}",
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn assert_failure(output: &Output) {
    if output.status.success() {
        panic!(
            "command unexpectedly succeeded\nstdout:\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr),
        );
    }
}

fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn parse_json_stdout(output: &Output) -> Value {
    serde_json::from_slice::<Value>(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected valid JSON stdout, got error: {e}\nstdout:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

fn write_config(path: &Path) {
    fs::write(
        path,
        "[prefixes]\nprimitive = \"primitive\"\nsemantic = \"\"\ncomponent = \"component\"\n",
    )
    .expect("config should be written");
}

fn write_notification_input(dir: &Path) {
    fs::create_dir_all(dir).expect("input dir should be created");
    fs::write(
        dir.join("notification.json"),
        r##"{ "Notification": { "errorMain": { "$value": "#fba466" } } }"##,
    )
    .expect("input should be written");
}

fn build_args(input: &Path, config: &Path, out: &Path) -> Vec<OsString> {
    vec![
        OsString::from("build"),
        input.as_os_str().to_os_string(),
        OsString::from("--config"),
        config.as_os_str().to_os_string(),
        OsString::from("--out"),
        out.as_os_str().to_os_string(),
    ]
}

#[test]
fn build_json_writes_artifacts_and_report() {
    let tmp = TempDirGuard::new("build-json");
    let input = tmp.path().join("tokens");
    let config = tmp.path().join("tokensmith.toml");
    let out = tmp.path().join("dist");
    write_notification_input(&input);
    write_config(&config);

    let mut args = build_args(&input, &config, &out);
    args.push(OsString::from("--json"));
    let output = run_tokensmith(args);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["checkKind"], "tokensmith.build.v1");
    assert_eq!(payload["summary"]["synthesizedCount"], 1);
    assert_eq!(payload["files"][0]["format"], "w3c");

    let css = fs::read_to_string(out.join("colors.css")).expect("colors.css should exist");
    assert!(css.contains("--primitive-amber-00: #fba466;"));
    assert!(css.contains("--notification-error-main: var(--primitive-amber-00);"));
    assert!(out.join("colors.tokens.json").exists());
    assert!(out.join("token-report.json").exists());
    assert!(out.join("token-report.txt").exists());
}

#[test]
fn build_text_prints_summary() {
    let tmp = TempDirGuard::new("build-text");
    let input = tmp.path().join("tokens");
    let config = tmp.path().join("tokensmith.toml");
    let out = tmp.path().join("dist");
    write_notification_input(&input);
    write_config(&config);

    let output = run_tokensmith(build_args(&input, &config, &out));
    assert_success(&output);

    let text = stdout_text(&output);
    assert!(text.contains("tokensmith build"));
    assert!(text.contains("Tokens: 2 (1 primitive, 1 semantic)"));
    assert!(text.contains("Digest: "));
}

#[test]
fn build_rejects_config_without_prefixes() {
    let tmp = TempDirGuard::new("build-missing-prefixes");
    let input = tmp.path().join("tokens");
    let config = tmp.path().join("tokensmith.toml");
    let out = tmp.path().join("dist");
    write_notification_input(&input);
    fs::write(&config, "[colors]\nmatch_threshold = 12.0\n").expect("config should be written");

    let output = run_tokensmith(build_args(&input, &config, &out));
    assert_failure(&output);
    assert!(stderr_text(&output).contains("prefixes"));
    assert!(!out.exists());
}

#[test]
fn build_rejects_malformed_json_input() {
    let tmp = TempDirGuard::new("build-malformed");
    let input = tmp.path().join("tokens");
    let config = tmp.path().join("tokensmith.toml");
    let out = tmp.path().join("dist");
    fs::create_dir_all(&input).expect("input dir should be created");
    fs::write(input.join("broken.json"), "{ \"color\": ").expect("input should be written");
    write_config(&config);

    let output = run_tokensmith(build_args(&input, &config, &out));
    assert_failure(&output);
    assert!(stderr_text(&output).contains("broken.json"));
}

#[test]
fn build_rejects_negative_threshold_override() {
    let tmp = TempDirGuard::new("build-threshold");
    let input = tmp.path().join("tokens");
    let config = tmp.path().join("tokensmith.toml");
    let out = tmp.path().join("dist");
    write_notification_input(&input);
    write_config(&config);

    let mut args = build_args(&input, &config, &out);
    args.push(OsString::from("--threshold=-1"));
    let output = run_tokensmith(args);
    assert_failure(&output);
    assert!(stderr_text(&output).contains("match_threshold"));
}

#[test]
fn detect_json_reports_format_and_category() {
    let tmp = TempDirGuard::new("detect-json");
    let file = tmp.path().join("spacing.json");
    fs::write(&file, r#"{ "spacing": { "1": "4px", "2": "8px" } }"#)
        .expect("input should be written");

    let output = run_tokensmith([
        OsString::from("detect"),
        file.as_os_str().to_os_string(),
        OsString::from("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload["format"], "simple");
    assert_eq!(payload["category"], "spacing");
    assert!(payload["confidence"].is_number());
}

#[test]
fn classify_json_reports_rule_per_name() {
    let tmp = TempDirGuard::new("classify-json");
    let config = tmp.path().join("tokensmith.toml");
    write_config(&config);

    let output = run_tokensmith([
        OsString::from("classify"),
        OsString::from("blue-500"),
        OsString::from("errorMain"),
        OsString::from("--config"),
        config.as_os_str().to_os_string(),
        OsString::from("--json"),
    ]);
    assert_success(&output);

    let payload = parse_json_stdout(&output);
    assert_eq!(payload[0]["name"], "blue-500");
    assert_eq!(payload[0]["category"], "primitive");
    assert_eq!(payload[1]["name"], "error-main");
    assert_eq!(payload[1]["category"], "semantic");
}

#[test]
fn missing_config_file_fails() {
    let tmp = TempDirGuard::new("missing-config");
    let input = tmp.path().join("tokens");
    write_notification_input(&input);

    let output = run_tokensmith(build_args(
        &input,
        &tmp.path().join("absent.toml"),
        &tmp.path().join("dist"),
    ));
    assert_failure(&output);
    assert!(stderr_text(&output).starts_with("error: "));
}
