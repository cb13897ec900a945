//! Responsive width resolution
//!
//! When an element asks for `width = "auto"`, its pixel width comes from the
//! measured size of its container, rounded up through a [`BreakpointPolicy`]
//! so that nearby container sizes share one URL.
//!
//! Measurement is the only impure step and is supplied by the caller through
//! [`ContainerMeasure`]. A [`WidthCache`] remembers the last width resolved
//! for each component so identical measurements do not trigger rebuilds.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;
use thiserror::Error;

use crate::options::OptionValue;
use crate::scope::MergedContext;

/// Rounding increment used when no explicit breakpoint list is configured.
pub const DEFAULT_BREAKPOINT_STEP: u32 = 100;

/// Caller contract violations in breakpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ResponsiveError {
    /// Explicit breakpoint list is empty
    #[error("breakpoint list is empty")]
    EmptyBreakpoints,
    /// Explicit breakpoint list is not strictly ascending or contains zero
    #[error("breakpoints must be strictly ascending positive widths, got {0:?}")]
    UnsortedBreakpoints(Vec<u32>),
    /// Rounding step of zero
    #[error("breakpoint step must be greater than zero")]
    ZeroStep,
    /// Breakpoint configuration value has the wrong shape
    #[error("invalid breakpoint value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Result type alias for responsive operations.
pub type Result<T> = std::result::Result<T, ResponsiveError>;

/// How a measured container width becomes a requested image width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakpointPolicy {
    /// Measured width rounded up to a whole pixel
    Exact,
    /// Measured width rounded up to a multiple of the step
    Step(u32),
    /// Smallest listed width at least as large as the measured width
    List(Vec<u32>),
}

impl Default for BreakpointPolicy {
    fn default() -> Self {
        Self::Step(DEFAULT_BREAKPOINT_STEP)
    }
}

impl BreakpointPolicy {
    /// Step policy; `step` must be non-zero.
    pub fn step(step: u32) -> Result<Self> {
        if step == 0 {
            return Err(ResponsiveError::ZeroStep);
        }
        Ok(Self::Step(step))
    }

    /// Explicit breakpoint policy; `widths` must be non-empty and strictly
    /// ascending.
    pub fn list(widths: Vec<u32>) -> Result<Self> {
        if widths.is_empty() {
            return Err(ResponsiveError::EmptyBreakpoints);
        }
        let ascending = widths.windows(2).all(|w| w[0] < w[1]);
        if !ascending || widths[0] == 0 {
            return Err(ResponsiveError::UnsortedBreakpoints(widths));
        }
        Ok(Self::List(widths))
    }

    /// Derive the policy from a merged context.
    ///
    /// Returns `Ok(None)` unless `responsive` is truthy. Keys read:
    ///
    /// - `responsiveUseBreakpoints`: `false` selects [`Exact`](Self::Exact),
    ///   an array is an explicit list, anything else enables breakpoints
    /// - `breakpoints`: explicit list used when breakpoints are enabled
    /// - `breakpointStep`: rounding step (default 100)
    pub fn from_context(context: &MergedContext) -> Result<Option<Self>> {
        if !context.get("responsive").is_some_and(OptionValue::is_truthy) {
            return Ok(None);
        }

        if let Some(use_breakpoints) = context.get("responsiveUseBreakpoints") {
            match use_breakpoints.as_json() {
                Value::Array(_) => {
                    let widths = widths_from_value("responsiveUseBreakpoints", use_breakpoints)?;
                    return Self::list(widths).map(Some);
                }
                _ if !use_breakpoints.is_truthy() => return Ok(Some(Self::Exact)),
                _ => {}
            }
        }

        if let Some(list) = context.get("breakpoints") {
            return Self::list(widths_from_value("breakpoints", list)?).map(Some);
        }

        match context.get("breakpointStep") {
            Some(step) => Self::step(width_from_value("breakpointStep", step)?).map(Some),
            None => Ok(Some(Self::default())),
        }
    }

    /// Map a measured container width onto a requested width.
    pub fn select(&self, measured: f64) -> u32 {
        match self {
            Self::Exact => clamp_width(measured.ceil()),
            Self::Step(step) => {
                let step = f64::from(*step);
                clamp_width((measured / step).ceil() * step)
            }
            Self::List(widths) => {
                let last = widths.last().copied().unwrap_or(0);
                widths.iter().copied().find(|&w| f64::from(w) >= measured).unwrap_or(last)
            }
        }
    }
}

fn clamp_width(value: f64) -> u32 {
    if value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}

fn width_from_value(key: &str, value: &Value) -> Result<u32> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| invalid_value(key, value))
}

fn widths_from_value(key: &str, value: &Value) -> Result<Vec<u32>> {
    match value {
        Value::Array(items) => items.iter().map(|v| width_from_value(key, v)).collect(),
        other => Err(invalid_value(key, other)),
    }
}

fn invalid_value(key: &str, value: &Value) -> ResponsiveError {
    ResponsiveError::InvalidValue { key: key.to_string(), value: value.to_string() }
}

/// Width requested by an element's `width` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedWidth {
    /// Derive from the container
    Auto,
    /// Concrete pixel width
    Pixels(u32),
}

impl RequestedWidth {
    /// Interpret a `width` option value.
    ///
    /// Returns `None` for values that are neither `"auto"` nor a whole pixel
    /// count (for example relative widths like `0.5`); those are serialized
    /// verbatim.
    pub fn from_value(value: &OptionValue) -> Option<Self> {
        match value.as_json() {
            Value::String(s) if s == "auto" => Some(Self::Auto),
            Value::String(s) => s.trim().parse::<u32>().ok().map(Self::Pixels),
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).map(Self::Pixels),
            _ => None,
        }
    }
}

/// Source of the current container width.
pub trait ContainerMeasure {
    /// Rendered container width in pixels, or `None` before the element is
    /// attached to a renderable surface.
    fn container_width(&self) -> Option<f64>;
}

impl<F> ContainerMeasure for F
where
    F: Fn() -> Option<f64>,
{
    fn container_width(&self) -> Option<f64> {
        self()
    }
}

/// Measurement source for elements that are never attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl ContainerMeasure for Detached {
    fn container_width(&self) -> Option<f64> {
        None
    }
}

/// Identity of one component instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Last measurement and resolved width per component.
///
/// The raw measurement is kept alongside the width so a changed
/// [`BreakpointPolicy`] can be re-applied without measuring again.
#[derive(Debug, Clone, Default)]
pub struct WidthCache {
    entries: HashMap<ComponentId, CachedWidth>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CachedWidth {
    measured: f64,
    width: u32,
}

impl WidthCache {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn get(&self, id: ComponentId) -> Option<u32> {
        self.entries.get(&id).map(|entry| entry.width)
    }

    /// Container width the cached entry was derived from.
    pub fn measured(&self, id: ComponentId) -> Option<f64> {
        self.entries.get(&id).map(|entry| entry.measured)
    }

    /// Store a measurement and its width; returns true if the width differs
    /// from the cached one.
    pub fn update(&mut self, id: ComponentId, measured: f64, width: u32) -> bool {
        let previous = self.entries.insert(id, CachedWidth { measured, width });
        previous.map(|entry| entry.width) != Some(width)
    }

    /// Re-apply `policy` to the cached measurement of `id`.
    ///
    /// Returns `None` when nothing has been measured for `id` yet.
    pub fn reselect(&mut self, id: ComponentId, policy: &BreakpointPolicy) -> Option<u32> {
        let entry = self.entries.get_mut(&id)?;
        let width = policy.select(entry.measured);
        if width != entry.width {
            tracing::debug!(
                component = id.raw(),
                from = entry.width,
                to = width,
                "breakpoint policy changed"
            );
            entry.width = width;
        }
        Some(width)
    }

    /// Forget a component (it was unmounted).
    pub fn forget(&mut self, id: ComponentId) -> Option<u32> {
        self.entries.remove(&id).map(|entry| entry.width)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Outcome of [`resolve_width`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthResolution {
    /// Concrete width requested; nothing was measured
    Fixed(u32),
    /// Width derived from a measurement
    Resolved {
        width: u32,
        /// False when the cache already held this width
        changed: bool,
    },
    /// Container could not be measured yet
    Unresolved,
}

impl WidthResolution {
    pub fn width(&self) -> Option<u32> {
        match self {
            Self::Fixed(w) | Self::Resolved { width: w, .. } => Some(*w),
            Self::Unresolved => None,
        }
    }

    /// True if downstream URL composition should run again.
    pub fn needs_rebuild(&self) -> bool {
        matches!(self, Self::Resolved { changed: true, .. })
    }
}

/// Resolve the width for component `id`.
///
/// Concrete widths are returned unchanged without measuring. `Auto` widths
/// measure the container and apply `policy`; a measurement that is missing,
/// non-finite or not positive leaves the width unresolved and the cache
/// untouched.
pub fn resolve_width(
    requested: RequestedWidth,
    measure: &dyn ContainerMeasure,
    policy: &BreakpointPolicy,
    cache: &mut WidthCache,
    id: ComponentId,
) -> WidthResolution {
    if let RequestedWidth::Pixels(width) = requested {
        return WidthResolution::Fixed(width);
    }

    let measured = match measure.container_width() {
        Some(w) if w.is_finite() && w > 0.0 => w,
        other => {
            tracing::debug!(component = id.raw(), measured = ?other, "container width unavailable");
            return WidthResolution::Unresolved;
        }
    };

    let width = policy.select(measured);
    let changed = cache.update(id, measured, width);
    tracing::debug!(component = id.raw(), measured, width, changed, "resolved responsive width");
    WidthResolution::Resolved { width, changed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::OptionMap;
    use serde_json::json;
    use std::cell::Cell;

    fn context(pairs: Vec<(&str, OptionValue)>) -> MergedContext {
        let map: OptionMap = pairs.into_iter().collect();
        MergedContext::from_scope(&map)
    }

    #[test]
    fn test_step_rounding() {
        let policy = BreakpointPolicy::default();
        assert_eq!(policy.select(225.0), 300);
        assert_eq!(policy.select(275.0), 300);
        assert_eq!(policy.select(300.0), 300);
        assert_eq!(policy.select(301.0), 400);
        assert_eq!(policy.select(1.0), 100);
    }

    #[test]
    fn test_custom_step() {
        let policy = BreakpointPolicy::step(50).expect("non-zero step");
        assert_eq!(policy.select(225.0), 250);
    }

    #[test]
    fn test_list_selection() {
        let policy = BreakpointPolicy::list(vec![100, 300, 400, 700]).expect("ascending");
        assert_eq!(policy.select(225.0), 300);
        assert_eq!(policy.select(275.0), 300);
        assert_eq!(policy.select(350.0), 400);
        assert_eq!(policy.select(50.0), 100);
        assert_eq!(policy.select(100.0), 100);
    }

    #[test]
    fn test_list_above_largest() {
        let policy = BreakpointPolicy::list(vec![100, 300]).expect("ascending");
        assert_eq!(policy.select(900.0), 300);
    }

    #[test]
    fn test_exact() {
        assert_eq!(BreakpointPolicy::Exact.select(224.2), 225);
    }

    #[test]
    fn test_invalid_lists() {
        assert_eq!(BreakpointPolicy::list(vec![]), Err(ResponsiveError::EmptyBreakpoints));
        assert_eq!(
            BreakpointPolicy::list(vec![300, 100]),
            Err(ResponsiveError::UnsortedBreakpoints(vec![300, 100]))
        );
        assert!(BreakpointPolicy::list(vec![100, 100]).is_err());
        assert!(BreakpointPolicy::list(vec![0, 100]).is_err());
        assert_eq!(BreakpointPolicy::step(0), Err(ResponsiveError::ZeroStep));
    }

    #[test]
    fn test_policy_from_context() {
        assert_eq!(BreakpointPolicy::from_context(&MergedContext::empty()), Ok(None));

        let ctx = context(vec![("responsive", true.into())]);
        assert_eq!(BreakpointPolicy::from_context(&ctx), Ok(Some(BreakpointPolicy::Step(100))));

        let ctx =
            context(vec![("responsive", true.into()), ("responsiveUseBreakpoints", false.into())]);
        assert_eq!(BreakpointPolicy::from_context(&ctx), Ok(Some(BreakpointPolicy::Exact)));

        let ctx = context(vec![
            ("responsive", true.into()),
            ("responsiveUseBreakpoints", OptionValue::new(json!([100, 300]))),
        ]);
        assert_eq!(
            BreakpointPolicy::from_context(&ctx),
            Ok(Some(BreakpointPolicy::List(vec![100, 300])))
        );

        let ctx = context(vec![
            ("responsive", true.into()),
            ("responsiveUseBreakpoints", true.into()),
            ("breakpoints", OptionValue::new(json!(["200", 400]))),
        ]);
        assert_eq!(
            BreakpointPolicy::from_context(&ctx),
            Ok(Some(BreakpointPolicy::List(vec![200, 400])))
        );

        let ctx = context(vec![("responsive", "true".into()), ("breakpointStep", 50u32.into())]);
        assert_eq!(BreakpointPolicy::from_context(&ctx), Ok(Some(BreakpointPolicy::Step(50))));
    }

    #[test]
    fn test_policy_from_context_rejects_bad_list() {
        let ctx = context(vec![
            ("responsive", true.into()),
            ("breakpoints", OptionValue::new(json!([400, 200]))),
        ]);
        assert!(matches!(
            BreakpointPolicy::from_context(&ctx),
            Err(ResponsiveError::UnsortedBreakpoints(_))
        ));

        let ctx = context(vec![("responsive", true.into()), ("breakpoints", "wide".into())]);
        assert!(matches!(
            BreakpointPolicy::from_context(&ctx),
            Err(ResponsiveError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_requested_width() {
        assert_eq!(RequestedWidth::from_value(&"auto".into()), Some(RequestedWidth::Auto));
        assert_eq!(RequestedWidth::from_value(&300u32.into()), Some(RequestedWidth::Pixels(300)));
        assert_eq!(RequestedWidth::from_value(&"100".into()), Some(RequestedWidth::Pixels(100)));
        assert_eq!(RequestedWidth::from_value(&0.5.into()), None);
        assert_eq!(RequestedWidth::from_value(&"iw_div_2".into()), None);
    }

    #[test]
    fn test_fixed_width_does_not_measure() {
        let calls = Cell::new(0);
        let measure = || {
            calls.set(calls.get() + 1);
            Some(500.0)
        };
        let mut cache = WidthCache::new();
        let out = resolve_width(
            RequestedWidth::Pixels(320),
            &measure,
            &BreakpointPolicy::default(),
            &mut cache,
            ComponentId::new(1),
        );
        assert_eq!(out, WidthResolution::Fixed(320));
        assert_eq!(calls.get(), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_auto_width_and_cache_stability() {
        let mut cache = WidthCache::new();
        let id = ComponentId::new(7);
        let policy = BreakpointPolicy::default();

        let first = resolve_width(RequestedWidth::Auto, &|| Some(225.0), &policy, &mut cache, id);
        assert_eq!(first, WidthResolution::Resolved { width: 300, changed: true });
        assert!(first.needs_rebuild());

        // 260 rounds to the same breakpoint
        let second = resolve_width(RequestedWidth::Auto, &|| Some(260.0), &policy, &mut cache, id);
        assert_eq!(second, WidthResolution::Resolved { width: 300, changed: false });
        assert!(!second.needs_rebuild());

        let third = resolve_width(RequestedWidth::Auto, &|| Some(350.0), &policy, &mut cache, id);
        assert_eq!(third, WidthResolution::Resolved { width: 400, changed: true });
        assert_eq!(cache.get(id), Some(400));
    }

    #[test]
    fn test_unattached_is_unresolved() {
        let mut cache = WidthCache::new();
        let id = ComponentId::new(3);
        let policy = BreakpointPolicy::default();
        let out = resolve_width(RequestedWidth::Auto, &Detached, &policy, &mut cache, id);
        assert_eq!(out, WidthResolution::Unresolved);
        assert_eq!(out.width(), None);
        assert!(cache.get(id).is_none());

        let zero = resolve_width(RequestedWidth::Auto, &|| Some(0.0), &policy, &mut cache, id);
        assert_eq!(zero, WidthResolution::Unresolved);
    }

    #[test]
    fn test_cache_is_per_component() {
        let mut cache = WidthCache::new();
        let policy = BreakpointPolicy::default();
        let (a, b) = (ComponentId::new(1), ComponentId::new(2));
        resolve_width(RequestedWidth::Auto, &|| Some(150.0), &policy, &mut cache, a);
        resolve_width(RequestedWidth::Auto, &|| Some(650.0), &policy, &mut cache, b);
        assert_eq!(cache.get(ComponentId::new(1)), Some(200));
        assert_eq!(cache.get(ComponentId::new(2)), Some(700));
        assert_eq!(cache.forget(ComponentId::new(1)), Some(200));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_reselect_applies_new_policy_to_cached_measurement() {
        let mut cache = WidthCache::new();
        let id = ComponentId::new(9);
        assert_eq!(cache.reselect(id, &BreakpointPolicy::default()), None);

        let stepped = BreakpointPolicy::default();
        resolve_width(RequestedWidth::Auto, &|| Some(225.0), &stepped, &mut cache, id);
        assert_eq!(cache.get(id), Some(300));
        assert_eq!(cache.measured(id), Some(225.0));

        let list = BreakpointPolicy::list(vec![1000, 2000]).expect("ascending");
        assert_eq!(cache.reselect(id, &list), Some(1000));
        assert_eq!(cache.get(id), Some(1000));
        assert_eq!(cache.reselect(id, &BreakpointPolicy::Exact), Some(225));
    }

    #[test]
    fn test_component_ids_are_unique() {
        assert_ne!(ComponentId::next(), ComponentId::next());
    }
}
