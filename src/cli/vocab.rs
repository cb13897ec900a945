//! `vocab` command: list the option vocabulary

use std::path::Path;
use std::process::ExitCode;

use crate::vocabulary::VocabularyEntry;

use super::{command_vocabulary, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the vocab command
pub fn run_vocab(
    config: Option<&Path>,
    vocabulary: Option<&Path>,
    role: Option<&str>,
    json: bool,
) -> ExitCode {
    let vocabulary = match command_vocabulary(config, vocabulary) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let entries: Vec<&VocabularyEntry> =
        vocabulary.entries().filter(|e| role.map_or(true, |r| e.role.as_str() == r)).collect();

    if json {
        return match serde_json::to_string_pretty(&entries) {
            Ok(out) => {
                println!("{}", out);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    println!("vocabulary version {}", vocabulary.version());
    for entry in entries {
        println!("{:<26} {:<15} {}", entry.key, entry.role, entry.code.as_deref().unwrap_or("-"));
    }
    ExitCode::from(EXIT_SUCCESS)
}
