use crate::support::{load_config_or_exit, print_json};
use serde_json::json;
use tokensmith_kernel::{classify, kebab};

pub fn run(names: Vec<String>, config: String, json_output: bool) {
    let config = load_config_or_exit(&config);

    let rows: Vec<(String, tokensmith_kernel::Classification)> = names
        .iter()
        .map(|raw| {
            let name = kebab(raw);
            let classification = classify(&name, &config.classification);
            (name, classification)
        })
        .collect();

    if json_output {
        let payload: Vec<_> = rows
            .iter()
            .map(|(name, classification)| {
                json!({
                    "name": name,
                    "category": classification.category,
                    "rule": classification.rule,
                })
            })
            .collect();
        print_json(&payload);
    } else {
        for (name, classification) in &rows {
            println!(
                "{name}: {} ({})",
                classification.category.as_str(),
                classification.rule.as_str()
            );
        }
    }
}
