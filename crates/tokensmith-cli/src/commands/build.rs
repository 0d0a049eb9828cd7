use crate::support::{exit_with, load_config_or_exit, print_json};
use std::path::Path;
use tokensmith_kernel::build_directory;

pub struct Args {
    pub input: String,
    pub config: String,
    pub out: String,
    pub threshold: Option<f64>,
    pub max_depth: Option<usize>,
    pub json: bool,
}

pub fn run(args: Args) {
    let mut config = load_config_or_exit(&args.config);
    if let Some(threshold) = args.threshold {
        config
            .set_match_threshold(threshold)
            .unwrap_or_else(|e| exit_with(e));
    }
    if let Some(depth) = args.max_depth {
        config.set_max_depth(depth).unwrap_or_else(|e| exit_with(e));
    }
    tracing::debug!(
        config = %args.config,
        threshold = config.colors.match_threshold,
        max_depth = config.resolution.max_depth,
        "configuration loaded"
    );

    let output = build_directory(Path::new(&args.input), Path::new(&args.out), &config)
        .unwrap_or_else(|e| exit_with(e));
    let report = &output.report;

    if args.json {
        print_json(report);
        return;
    }

    let summary = &report.summary;
    println!("tokensmith build {} -> {}", args.input, args.out);
    println!("  Files: {}", summary.file_count);
    println!(
        "  Tokens: {} ({} primitive, {} semantic)",
        summary.token_count, summary.primitive_count, summary.semantic_count
    );
    println!("  Duplicates discarded: {}", summary.duplicate_count);
    println!(
        "  Colors: {} matched, {} synthesized",
        summary.matched_color_count, summary.synthesized_count
    );
    println!(
        "  References: {} unresolved, {} circular",
        summary.unresolved_count, summary.circular_count
    );
    println!("  Artifacts: {}", summary.artifact_count);
    if report.has_warnings() {
        println!(
            "  Warnings: {} [{}]",
            summary.warning_count,
            report.warning_classes.join(", ")
        );
    }
    println!("  Digest: {}", report.digest);
}
