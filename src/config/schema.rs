//! Configuration schema types for `cld.toml`
//!
//! Defines the structure and validation rules for the top-level scope a
//! project starts from.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::options::{classify, OptionBag, OptionMap, OptionValue};
use crate::scope::MergedContext;
use crate::vocabulary::Vocabulary;

/// Root configuration structure for `cld.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CldConfig {
    /// Replacement vocabulary table, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vocabulary: Option<PathBuf>,
    /// Top-level scope options, keys in any spelling
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Responsive width settings
    #[serde(default)]
    pub responsive: ResponsiveConfig,
}

/// Responsive width settings
///
/// Each field maps onto one responsive option and overrides the same option
/// in `[context]` when set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsiveConfig {
    /// `responsive`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// `responsiveUseBreakpoints`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_breakpoints: Option<bool>,
    /// `breakpoints`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Vec<u32>>,
    /// `breakpointStep`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<u32>,
}

/// Configuration validation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "responsive.step")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cld.toml: '{}' {}", self.field, self.message)
    }
}

impl CldConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.responsive.step == Some(0) {
            errors.push(ConfigValidationError {
                field: "responsive.step".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        if let Some(ref breakpoints) = self.responsive.breakpoints {
            if breakpoints.is_empty() {
                errors.push(ConfigValidationError {
                    field: "responsive.breakpoints".to_string(),
                    message: "must contain at least one width".to_string(),
                });
            } else if breakpoints[0] == 0 || breakpoints.windows(2).any(|w| w[0] >= w[1]) {
                errors.push(ConfigValidationError {
                    field: "responsive.breakpoints".to_string(),
                    message: "must be strictly ascending positive widths".to_string(),
                });
            }
        }

        if let Some(ref path) = self.vocabulary {
            if path.as_os_str().is_empty() {
                errors.push(ConfigValidationError {
                    field: "vocabulary".to_string(),
                    message: "must be a non-empty path".to_string(),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Options the `[responsive]` section contributes, under canonical keys.
    pub fn responsive_options(&self) -> OptionMap {
        let mut options = OptionMap::new();
        let r = &self.responsive;
        if let Some(enabled) = r.enabled {
            options.insert("responsive", enabled.into());
        }
        if let Some(use_breakpoints) = r.use_breakpoints {
            options.insert("responsiveUseBreakpoints", use_breakpoints.into());
        }
        if let Some(ref breakpoints) = r.breakpoints {
            options.insert("breakpoints", OptionValue::new(Value::from(breakpoints.clone())));
        }
        if let Some(step) = r.step {
            options.insert("breakpointStep", step.into());
        }
        options
    }

    /// The outermost scope described by this configuration.
    ///
    /// `[context]` keys outside the vocabulary have nowhere to go at the top
    /// level and are dropped with a warning.
    pub fn root_context(&self, vocabulary: &Vocabulary) -> MergedContext {
        let bag: OptionBag = self.context.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        let classified = classify(&bag, vocabulary);
        for key in classified.passthrough.keys() {
            tracing::warn!(key, "ignoring unrecognized context option in cld.toml");
        }

        MergedContext::from_scope(&classified.recognized).layer(&self.responsive_options())
    }
}
