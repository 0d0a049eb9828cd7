use crate::support::{print_json, read_document_or_exit};
use serde_json::json;
use tokensmith_kernel::detect_format;

pub fn run(file: String, json_output: bool) {
    let source = read_document_or_exit(&file);
    let detection = detect_format(&source.document, &source.name);

    if json_output {
        print_json(&json!({
            "file": file,
            "format": detection.format,
            "confidence": detection.confidence,
            "category": detection.category,
        }));
    } else {
        println!("tokensmith detect {file}");
        println!("  Format: {}", detection.format.as_str());
        println!("  Confidence: {:.2}", detection.confidence);
        if let Some(category) = detection.category {
            println!("  Category: {}", category.as_str());
        }
    }
}
