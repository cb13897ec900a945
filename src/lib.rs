//! cldctx - Scoped media transformation options resolved into delivery URLs
//!
//! This library provides functionality to:
//! - Classify loosely-spelled option bags against a versioned vocabulary
//! - Merge nested configuration scopes, inner scopes winning
//! - Resolve responsive widths from container measurements and breakpoints
//! - Build transformation chains and compose delivery URLs

pub mod cli;
pub mod component;
pub mod config;
pub mod options;
pub mod responsive;
pub mod scope;
pub mod transformation;
pub mod url;
pub mod vocabulary;

pub use component::{Image, ResolvedImage};
pub use options::{classify, OptionBag, OptionMap, OptionValue};
pub use scope::{merge, ContextFrame, MergedContext, ScopeStack};
pub use transformation::TransformationStep;
pub use url::{compose, ResourceDescriptor};
pub use vocabulary::Vocabulary;
