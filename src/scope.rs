//! Nested configuration scopes
//!
//! Each nesting level contributes a [`Scope`] of recognized options. Folding
//! the chain outer to inner yields a [`MergedContext`] in which inner keys
//! win and keys an inner scope does not mention keep their outer value.
//!
//! Propagation is plain value passing: a nesting boundary receives its
//! parent's context, layers its own options on top, and hands the result to
//! its children. There is no process-wide registry.
//!
//! # Example
//!
//! ```
//! use cldctx::options::OptionMap;
//! use cldctx::scope::merge;
//!
//! let outer: OptionMap = [("cloudName", "demo"), ("crop", "fill")].into_iter().collect();
//! let inner: OptionMap = [("crop", "scale")].into_iter().collect();
//!
//! let merged = merge([&outer, &inner]);
//! assert_eq!(merged.get("crop").and_then(|v| v.as_str()), Some("scale"));
//! assert_eq!(merged.get("cloudName").and_then(|v| v.as_str()), Some("demo"));
//! ```

use crate::options::{
    classify, OptionBag, OptionMap, OptionValue, PassthroughOptionSet, RecognizedOptionSet,
};
use crate::vocabulary::Vocabulary;

/// Options contributed by one nesting level.
pub type Scope = RecognizedOptionSet;

/// Result of folding a scope chain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedContext {
    options: OptionMap,
}

impl MergedContext {
    /// Context with no options, used above the outermost scope.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Context consisting of a single scope.
    pub fn from_scope(scope: &Scope) -> Self {
        Self { options: scope.clone() }
    }

    /// Derive the context one level deeper, with `scope` layered on top.
    ///
    /// `self` is left untouched so sibling subtrees keep seeing it.
    pub fn layer(&self, scope: &Scope) -> Self {
        let mut options = self.options.clone();
        options.overlay(scope);
        Self { options }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.options.contains_key(key)
    }

    /// The merged options.
    pub fn options(&self) -> &OptionMap {
        &self.options
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

/// Fold scopes left to right; later scopes win ties.
pub fn merge<'a, I>(scopes: I) -> MergedContext
where
    I: IntoIterator<Item = &'a Scope>,
{
    scopes.into_iter().fold(MergedContext::empty(), |ctx, scope| ctx.layer(scope))
}

/// Caller-owned stack of scopes with cached merge prefixes.
///
/// `merged[i]` is the fold of `scopes[..=i]`. Replacing a scope only
/// recomputes the prefixes from that depth onward.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
    merged: Vec<MergedContext>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: Vec::new(), merged: Vec::new() }
    }

    /// Enter a nesting level. Returns the context visible inside it.
    pub fn push(&mut self, scope: Scope) -> &MergedContext {
        let next = match self.merged.last() {
            Some(ctx) => ctx.layer(&scope),
            None => MergedContext::from_scope(&scope),
        };
        let next_len = next.len();
        self.scopes.push(scope);
        self.merged.push(next);
        tracing::debug!(depth = self.scopes.len(), keys = next_len, "scope pushed");
        self.ambient_ref()
    }

    /// Leave the innermost nesting level.
    pub fn pop(&mut self) -> Option<Scope> {
        self.merged.pop();
        self.scopes.pop()
    }

    /// Replace the innermost scope's options and re-merge only that level.
    ///
    /// Returns `None` if the stack is empty.
    pub fn replace_innermost(&mut self, scope: Scope) -> Option<&MergedContext> {
        let depth = self.scopes.len().checked_sub(1)?;
        self.replace(depth, scope)
    }

    /// Replace the scope at `depth` (0 = outermost) and re-merge from there.
    ///
    /// Returns `None` if `depth` is out of range.
    pub fn replace(&mut self, depth: usize, scope: Scope) -> Option<&MergedContext> {
        let slot = self.scopes.get_mut(depth)?;
        *slot = scope;
        for i in depth..self.scopes.len() {
            let ctx = match i.checked_sub(1).and_then(|p| self.merged.get(p)) {
                Some(parent) => parent.layer(&self.scopes[i]),
                None => MergedContext::from_scope(&self.scopes[i]),
            };
            self.merged[i] = ctx;
        }
        tracing::debug!(depth, remerged = self.scopes.len() - depth, "scope replaced");
        Some(self.ambient_ref())
    }

    /// The context visible at the innermost level.
    pub fn ambient(&self) -> MergedContext {
        self.merged.last().cloned().unwrap_or_default()
    }

    fn ambient_ref(&self) -> &MergedContext {
        static EMPTY: MergedContext = MergedContext { options: OptionMap::EMPTY };
        self.merged.last().unwrap_or(&EMPTY)
    }

    /// Number of active nesting levels.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// One configuration boundary: the context container around a subtree.
///
/// Produced by [`ContextFrame::enter`], it carries the context republished
/// to descendants plus what the container element itself needs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextFrame {
    /// Context visible to descendants
    pub context: MergedContext,
    /// Attributes for the wrapping element
    pub attributes: PassthroughOptionSet,
    /// Render children directly instead of inside a wrapping element
    pub include_own_body: bool,
}

impl ContextFrame {
    /// Enter a boundary: classify `props` and layer the recognized part over
    /// `ambient`.
    ///
    /// Calling this again with new props (or a new ambient context) is how a
    /// configuration change is propagated; nothing is cached between calls.
    pub fn enter(ambient: &MergedContext, props: &OptionBag, vocabulary: &Vocabulary) -> Self {
        let classified = classify(props, vocabulary);
        Self {
            context: ambient.layer(&classified.recognized),
            attributes: classified.passthrough,
            include_own_body: classified.flags.include_own_body,
        }
    }
}
