//! Configuration loading and discovery for `cld.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::CldConfig;
use crate::options::canonicalize;
use crate::vocabulary::{Vocabulary, VocabularyError};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for during discovery.
pub const CONFIG_FILE_NAME: &str = "cld.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse cld.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error(
        "Config validation failed:\n{}",
        .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n")
    )]
    Validation(Vec<String>),
    /// Referenced vocabulary table could not be loaded
    #[error("Failed to load vocabulary: {0}")]
    Vocabulary(#[from] VocabularyError),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override the cloud name
    pub cloud_name: Option<String>,
    /// Force https delivery
    pub secure: Option<bool>,
    /// Override the responsive breakpoint step
    pub step: Option<u32>,
    /// Use a different vocabulary table
    pub vocabulary: Option<PathBuf>,
}

/// Find cld.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for cld.toml
/// 2. Check XDG_CONFIG_HOME/cldctx/cld.toml (or ~/.config/cldctx/cld.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find cld.toml in XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("cldctx").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find cld.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a cld.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns a default
/// configuration.
///
/// A relative `vocabulary` path is resolved against the config file's
/// directory.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("site/cld.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<CldConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => {
            tracing::debug!("no cld.toml found, using defaults");
            Ok(default_config())
        }
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<CldConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: CldConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    if let (Some(vocab), Some(root)) = (config.vocabulary.as_ref(), project_root(path)) {
        config.vocabulary = Some(resolve_path(root, vocab));
    }

    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Configuration used when no cld.toml is found: no context options, the
/// built-in vocabulary and responsive resolution left to per-element options.
pub fn default_config() -> CldConfig {
    CldConfig::default()
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values. Context keys are
/// matched in any spelling, so `cloud_name = "x"` in the file is replaced by
/// `--cloud-name`.
pub fn merge_cli_overrides(config: &mut CldConfig, overrides: &CliOverrides) {
    if let Some(ref cloud_name) = overrides.cloud_name {
        set_context_option(config, "cloudName", Value::from(cloud_name.as_str()));
    }

    if let Some(secure) = overrides.secure {
        set_context_option(config, "secure", Value::from(secure));
    }

    if let Some(step) = overrides.step {
        config.responsive.step = Some(step);
    }

    if let Some(ref vocabulary) = overrides.vocabulary {
        config.vocabulary = Some(vocabulary.clone());
    }
}

fn set_context_option(config: &mut CldConfig, canonical: &str, value: Value) {
    config.context.retain(|key, _| canonicalize(key) != canonical);
    config.context.insert(canonical.to_string(), value);
}

/// Load the vocabulary a configuration refers to, or the built-in table.
pub fn load_vocabulary(config: &CldConfig) -> Result<Vocabulary, ConfigError> {
    match config.vocabulary {
        Some(ref path) => {
            let vocabulary = Vocabulary::load(path)?;
            tracing::debug!(
                path = %path.display(),
                entries = vocabulary.len(),
                "loaded vocabulary"
            );
            Ok(vocabulary)
        }
        None => Ok(Vocabulary::builtin().clone()),
    }
}

/// Get the project root directory from a config file path.
///
/// Returns the parent directory of the cld.toml file.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &Path, contents: &[u8]) -> PathBuf {
        let config_path = dir.join(CONFIG_FILE_NAME);
        File::create(&config_path)
            .expect("should create config file")
            .write_all(contents)
            .expect("should write config content");
        config_path
    }

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[context]\ncloud_name = \"demo\"");

        let found = find_config_from(temp.path().to_path_buf());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"[context]\ncloud_name = \"demo\"");

        let subdir = temp.path().join("pages").join("gallery");
        fs::create_dir_all(&subdir).expect("should create subdirectories");

        let found = find_config_from(subdir);
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_not_found() {
        let temp = TempDir::new().expect("should create temp dir");
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(
            temp.path(),
            br#"
vocabulary = "vocab.toml"

[context]
cloud_name = "demo"
secure = true

[responsive]
enabled = true
step = 50
"#,
        );

        let config = load_config(Some(&config_path)).expect("should load valid config");
        assert_eq!(config.context.get("cloud_name"), Some(&Value::from("demo")));
        assert_eq!(config.responsive.step, Some(50));
        assert_eq!(config.vocabulary, Some(temp.path().join("vocab.toml")));
    }

    #[test]
    fn test_load_config_missing_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path = write_config(temp.path(), b"this is not valid toml {{{");

        let result = load_config(Some(&config_path));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config_path =
            write_config(temp.path(), b"[responsive]\nstep = 0\nbreakpoints = [300, 100]");

        match load_config(Some(&config_path)) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_merge_cli_overrides_cloud_name_any_spelling() {
        let mut config = default_config();
        config.context.insert("cloud-name".to_string(), Value::from("file"));

        let overrides = CliOverrides { cloud_name: Some("cli".to_string()), ..Default::default() };
        merge_cli_overrides(&mut config, &overrides);

        assert_eq!(config.context.len(), 1);
        assert_eq!(config.context.get("cloudName"), Some(&Value::from("cli")));
    }

    #[test]
    fn test_merge_cli_overrides_multiple() {
        let mut config = default_config();
        let overrides = CliOverrides {
            secure: Some(true),
            step: Some(200),
            vocabulary: Some(PathBuf::from("/etc/vocab.toml")),
            ..Default::default()
        };

        merge_cli_overrides(&mut config, &overrides);
        assert_eq!(config.context.get("secure"), Some(&Value::from(true)));
        assert_eq!(config.responsive.step, Some(200));
        assert_eq!(config.vocabulary, Some(PathBuf::from("/etc/vocab.toml")));
    }

    #[test]
    fn test_load_vocabulary_default() {
        let vocab = load_vocabulary(&default_config()).expect("builtin vocabulary");
        assert_eq!(vocab.len(), Vocabulary::builtin().len());
    }

    #[test]
    fn test_load_vocabulary_from_file() {
        let temp = TempDir::new().expect("should create temp dir");
        let vocab_path = temp.path().join("vocab.toml");
        fs::write(&vocab_path, "version = \"1\"\n[[option]]\nkey = \"cloudName\"\nrole = \"url\"\n")
            .expect("should write vocabulary");

        let config = CldConfig { vocabulary: Some(vocab_path), ..Default::default() };
        let vocab = load_vocabulary(&config).expect("valid vocabulary");
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn test_load_vocabulary_error() {
        let temp = TempDir::new().expect("should create temp dir");
        let config =
            CldConfig { vocabulary: Some(temp.path().join("missing.toml")), ..Default::default() };
        assert!(matches!(load_vocabulary(&config), Err(ConfigError::Vocabulary(_))));
    }

    #[test]
    fn test_resolve_path_absolute() {
        let root = Path::new("/project");
        assert_eq!(resolve_path(root, Path::new("/other/path")), PathBuf::from("/other/path"));
    }

    #[test]
    fn test_resolve_path_relative() {
        let root = Path::new("/project");
        assert_eq!(
            resolve_path(root, Path::new("vocab.toml")),
            PathBuf::from("/project/vocab.toml")
        );
    }

    #[test]
    fn test_project_root() {
        assert_eq!(project_root(Path::new("/project/cld.toml")), Some(Path::new("/project")));
    }
}
