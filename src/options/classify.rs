//! Option classification
//!
//! Splits a raw [`OptionBag`] into the options the engine understands and
//! the attributes it merely forwards to the rendering boundary.

use super::{canonicalize, OptionBag, OptionMap, PassthroughOptionSet, RecognizedOptionSet};
use crate::vocabulary::Vocabulary;

/// Canonical keys that only configure the scope they are declared on.
///
/// These are consumed by the classifier and never reach either output set.
pub const SCOPE_ONLY_KEYS: &[&str] = &["includeOwnBody"];

/// Scope-only flags extracted from a bag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeFlags {
    /// Render the scope's children without a wrapping element.
    pub include_own_body: bool,
}

/// Result of [`classify`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    /// Vocabulary options keyed by canonical key.
    pub recognized: RecognizedOptionSet,
    /// Everything else, keyed by the original spelling.
    pub passthrough: PassthroughOptionSet,
    /// Scope-only flags.
    pub flags: ScopeFlags,
}

/// Partition an option bag against a vocabulary.
///
/// Every key is canonicalized first. Scope-only keys are pulled into
/// [`ScopeFlags`]; keys whose canonical form is in the vocabulary land in
/// `recognized` under that canonical form; everything else is forwarded
/// under its original spelling.
///
/// When one logical option appears under several spellings, the last one in
/// bag order supplies the value. Classification never fails.
///
/// # Example
///
/// ```
/// use cldctx::options::{classify, OptionBag};
/// use cldctx::vocabulary::Vocabulary;
///
/// let bag = OptionBag::new()
///     .with("cloud_name", "demo")
///     .with("fetch-format", "auto")
///     .with("role", "tab");
/// let out = classify(&bag, Vocabulary::builtin());
///
/// assert!(out.recognized.contains_key("cloudName"));
/// assert!(out.recognized.contains_key("fetchFormat"));
/// assert!(out.passthrough.contains_key("role"));
/// ```
pub fn classify(bag: &OptionBag, vocabulary: &Vocabulary) -> Classified {
    let mut recognized = OptionMap::new();
    let mut passthrough = OptionMap::new();
    let mut flags = ScopeFlags::default();

    for (key, value) in bag.iter() {
        let canonical = canonicalize(key);

        if SCOPE_ONLY_KEYS.contains(&canonical.as_ref()) {
            if canonical == "includeOwnBody" {
                flags.include_own_body = value.is_truthy();
            }
            continue;
        }

        if vocabulary.contains(&canonical) {
            recognized.insert(canonical.into_owned(), value.clone());
        } else {
            passthrough.insert(key, value.clone());
        }
    }

    tracing::trace!(
        recognized = recognized.len(),
        passthrough = passthrough.len(),
        include_own_body = flags.include_own_body,
        "classified option bag"
    );

    Classified { recognized, passthrough, flags }
}
