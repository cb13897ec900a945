//! Integration tests for scope merging and classification

use cldctx::options::{classify, OptionBag, OptionMap};
use cldctx::scope::{merge, MergedContext, ScopeStack};
use cldctx::transformation::build;
use cldctx::vocabulary::Vocabulary;

fn scope(pairs: &[(&str, &str)]) -> OptionMap {
    pairs.iter().map(|(k, v)| (*k, *v)).collect()
}

fn text<'a>(ctx: &'a MergedContext, key: &str) -> Option<&'a str> {
    ctx.get(key).and_then(|v| v.as_str())
}

// ============================================================================
// Merge Precedence
// ============================================================================

#[test]
fn test_inner_scope_wins() {
    let outer = scope(&[("cloudName", "demo"), ("crop", "fill"), ("quality", "auto")]);
    let middle = scope(&[("crop", "scale")]);
    let inner = scope(&[("quality", "80")]);

    let merged = merge([&outer, &middle, &inner]);
    assert_eq!(text(&merged, "cloudName"), Some("demo"));
    assert_eq!(text(&merged, "crop"), Some("scale"));
    assert_eq!(text(&merged, "quality"), Some("80"));
}

#[test]
fn test_sibling_subtrees_are_independent() {
    let root = MergedContext::from_scope(&scope(&[("cloudName", "demo")]));
    let left = root.layer(&scope(&[("width", "100")]));
    let right = root.layer(&scope(&[("width", "200")]));

    assert_eq!(text(&left, "width"), Some("100"));
    assert_eq!(text(&right, "width"), Some("200"));
    assert!(!root.contains_key("width"));
}

#[test]
fn test_stack_tracks_nesting() {
    let mut stack = ScopeStack::new();
    stack.push(scope(&[("cloudName", "demo")]));
    stack.push(scope(&[("crop", "scale")]));
    stack.push(scope(&[("width", "100")]));

    let ambient = stack.ambient();
    let chain = build(&ambient, &[], None, Vocabulary::builtin());
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].len(), 2);

    stack.pop();
    stack.replace_innermost(scope(&[("crop", "fit")]));
    assert_eq!(text(&stack.ambient(), "crop"), Some("fit"));
    assert!(!stack.ambient().contains_key("width"));
}

// ============================================================================
// Classification Through Scopes
// ============================================================================

#[test]
fn test_aliases_merge_onto_one_key() {
    let vocab = Vocabulary::builtin();
    let outer = classify(&OptionBag::new().with("fetch_format", "png"), vocab).recognized;
    let inner = classify(&OptionBag::new().with("fetch-format", "auto"), vocab).recognized;

    let merged = merge([&outer, &inner]);
    assert_eq!(merged.len(), 1);
    assert_eq!(text(&merged, "fetchFormat"), Some("auto"));
}

#[test]
fn test_unknown_keys_do_not_enter_scopes() {
    let vocab = Vocabulary::builtin();
    let out = classify(&OptionBag::new().with("data-testid", "hero").with("crop", "fill"), vocab);
    let merged = merge([&out.recognized]);
    assert!(!merged.contains_key("data-testid"));
    assert!(out.passthrough.contains_key("data-testid"));
}
