//! `classify` command: show how an option bag is split

use std::path::Path;
use std::process::ExitCode;

use crate::options::classify;

use super::args::parse_pairs;
use super::{command_vocabulary, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the classify command
pub fn run_classify(
    pairs: &[String],
    config: Option<&Path>,
    vocabulary: Option<&Path>,
) -> ExitCode {
    let bag = match parse_pairs(pairs) {
        Ok(bag) => bag,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let vocabulary = match command_vocabulary(config, vocabulary) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let classified = classify(&bag, &vocabulary);
    let output = serde_json::json!({
        "recognized": classified.recognized,
        "passthrough": classified.passthrough,
        "includeOwnBody": classified.flags.include_own_body,
    });

    match serde_json::to_string_pretty(&output) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
