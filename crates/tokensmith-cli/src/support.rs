use serde::Serialize;
use std::fs;
use std::path::Path;
use tokensmith_kernel::{PipelineConfig, SourceDocument};
use tracing_subscriber::EnvFilter;

/// Log to stderr so `--json` output on stdout stays parseable.
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn exit_with(message: impl std::fmt::Display) -> ! {
    eprintln!("error: {message}");
    std::process::exit(1);
}

pub fn load_config_or_exit(path: &str) -> PipelineConfig {
    PipelineConfig::load(path).unwrap_or_else(|e| exit_with(e))
}

pub fn read_document_or_exit(path: &str) -> SourceDocument {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| exit_with(format!("failed to read {path}: {e}")));
    let name = Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    SourceDocument::parse(name, &text).unwrap_or_else(|e| exit_with(e))
}

pub fn print_json<T: Serialize>(payload: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(payload).expect("json serialization")
    );
}
