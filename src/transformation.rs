//! Transformation chain construction
//!
//! A chain is an ordered list of [`TransformationStep`]s, one per URL path
//! segment. The first (implicit) step comes from the merged context; explicit
//! steps follow in declaration order.

use crate::options::{classify, OptionBag, OptionMap, OptionValue};
use crate::responsive::RequestedWidth;
use crate::scope::MergedContext;
use crate::vocabulary::{OptionRole, Vocabulary};

/// One chained transformation: canonical options in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformationStep {
    options: OptionMap,
}

impl TransformationStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.insert(key, value.into());
        self
    }

    /// Build an explicit step from a nested transformation declaration.
    ///
    /// Only transformation-role options are kept; anything else in the bag is
    /// ignored.
    pub fn from_bag(bag: &OptionBag, vocabulary: &Vocabulary) -> Self {
        let classified = classify(bag, vocabulary);
        let options = classified
            .recognized
            .iter()
            .filter(|(key, _)| vocabulary.role(key) == Some(OptionRole::Transformation))
            .map(|(key, value)| (key, value.clone()))
            .collect();
        Self { options }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for TransformationStep {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { options: iter.into_iter().collect() }
    }
}

/// Assemble the transformation chain for one element.
///
/// The implicit step holds the context's transformation-role options. A
/// `width` of `"auto"` in it is replaced by `responsive_width`, or dropped
/// when no width could be resolved. The implicit step is omitted when empty;
/// explicit steps are appended unchanged and in order.
pub fn build(
    merged: &MergedContext,
    explicit: &[TransformationStep],
    responsive_width: Option<u32>,
    vocabulary: &Vocabulary,
) -> Vec<TransformationStep> {
    let mut implicit = TransformationStep::new();
    for (key, value) in merged.iter() {
        if vocabulary.role(key) != Some(OptionRole::Transformation) {
            continue;
        }
        if key == "width" && RequestedWidth::from_value(value) == Some(RequestedWidth::Auto) {
            // Implicit auto width is always dropped when unresolved, even with
            // `responsive` off. Only explicit steps serialize `w_auto`.
            if let Some(width) = responsive_width {
                implicit.options.insert(key, width.into());
            }
            continue;
        }
        implicit.options.insert(key, value.clone());
    }

    let mut chain = Vec::with_capacity(explicit.len() + 1);
    if !implicit.is_empty() {
        chain.push(implicit);
    }
    chain.extend(explicit.iter().cloned());

    tracing::debug!(steps = chain.len(), responsive_width, "built transformation chain");
    chain
}
