//! Versioned option vocabulary
//!
//! The vocabulary is a table of canonical option keys, each tagged with the
//! role it plays during resolution and, for transformation options, the short
//! code it serializes to. It is plain data: the crate embeds a default table
//! and callers may load their own from TOML.
//!
//! ```toml
//! version = "1"
//!
//! [[option]]
//! key = "width"
//! role = "transformation"
//! code = "w"
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::options::is_canonical;

/// Vocabulary table format version understood by this crate.
pub const SUPPORTED_VERSION: &str = "1";

const BUILTIN_TABLE: &str = include_str!("default.toml");

/// Errors raised while loading a vocabulary table.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VocabularyError {
    /// File I/O error
    #[error("Failed to read vocabulary: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse vocabulary: {0}")]
    Parse(#[from] toml::de::Error),
    /// Table declares a version this crate does not understand
    #[error("unsupported vocabulary version '{0}'")]
    UnsupportedVersion(String),
    /// Same key listed twice
    #[error("duplicate vocabulary key '{0}'")]
    DuplicateKey(String),
    /// Key is not in canonical lower-camel form
    #[error("vocabulary key '{0}' is not canonical")]
    NonCanonicalKey(String),
    /// Plain or function-encoded transformation option without a short code
    #[error("transformation option '{0}' has no short code")]
    MissingCode(String),
}

/// Result type alias for vocabulary operations.
pub type Result<T> = std::result::Result<T, VocabularyError>;

/// What the engine does with a recognized option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRole {
    /// Serialized into a transformation step token
    Transformation,
    /// Consumed when composing the URL prefix and public id section
    Url,
    /// Consumed by the responsive width resolver
    Responsive,
}

impl OptionRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transformation => "transformation",
            Self::Url => "url",
            Self::Responsive => "responsive",
        }
    }
}

impl std::fmt::Display for OptionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// How a transformation option's value becomes token text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// `code_value`
    #[default]
    Plain,
    /// Custom function descriptor, `fn_remote:<base64>` / `fn_wasm:<source>`
    Function,
    /// Pre-processing custom function, `fn_pre:remote:<base64>`
    PreFunction,
    /// Appended verbatim after the sorted tokens
    Raw,
}

/// One row of the vocabulary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Canonical lower-camel key
    pub key: String,
    pub role: OptionRole,
    /// URL short code (`w`, `c`, `f`...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Joiner for array values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(default)]
    pub encoding: Encoding,
}

impl VocabularyEntry {
    /// Separator used when the value is an array (`:` unless configured).
    pub fn separator(&self) -> &str {
        self.separator.as_deref().unwrap_or(":")
    }
}

#[derive(Debug, Deserialize)]
struct VocabularyFile {
    version: String,
    #[serde(rename = "option", default)]
    options: Vec<VocabularyEntry>,
}

/// Lookup table of canonical option keys.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    version: String,
    entries: Vec<VocabularyEntry>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// The embedded default table.
    pub fn builtin() -> &'static Vocabulary {
        static BUILTIN: OnceLock<Vocabulary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            Vocabulary::from_toml_str(BUILTIN_TABLE).expect("embedded vocabulary table is valid")
        })
    }

    /// Parse a vocabulary table from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: VocabularyFile = toml::from_str(contents)?;
        Self::from_entries(file.version, file.options)
    }

    /// Load a vocabulary table from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Build a vocabulary from entries, validating the table.
    pub fn from_entries(version: impl Into<String>, entries: Vec<VocabularyEntry>) -> Result<Self> {
        let version = version.into();
        if version != SUPPORTED_VERSION {
            return Err(VocabularyError::UnsupportedVersion(version));
        }

        let mut index = HashMap::with_capacity(entries.len());
        for (i, entry) in entries.iter().enumerate() {
            if !is_canonical(&entry.key) {
                return Err(VocabularyError::NonCanonicalKey(entry.key.clone()));
            }
            let needs_code =
                entry.role == OptionRole::Transformation && entry.encoding != Encoding::Raw;
            if needs_code && entry.code.as_deref().map_or(true, str::is_empty) {
                return Err(VocabularyError::MissingCode(entry.key.clone()));
            }
            if index.insert(entry.key.clone(), i).is_some() {
                return Err(VocabularyError::DuplicateKey(entry.key.clone()));
            }
        }

        Ok(Self { version, entries, index })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True if `key` (canonical form) is part of the vocabulary.
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&VocabularyEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn role(&self, key: &str) -> Option<OptionRole> {
        self.get(key).map(|e| e.role)
    }

    /// Entries in table order.
    pub fn entries(&self) -> impl Iterator<Item = &VocabularyEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
