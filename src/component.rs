//! Image element pipeline
//!
//! An [`Image`] owns its props and any nested transformation declarations.
//! Resolving it against an ambient context runs the whole engine:
//! classification, scope layering, responsive width, chain building and URL
//! composition.

use crate::options::{classify, OptionBag, PassthroughOptionSet};
use crate::responsive::{
    resolve_width, BreakpointPolicy, ComponentId, ContainerMeasure, RequestedWidth, Result,
    WidthCache, WidthResolution,
};
use crate::scope::MergedContext;
use crate::transformation::{build, TransformationStep};
use crate::url::{compose, ResourceDescriptor};
use crate::vocabulary::Vocabulary;

/// An image element and its nested transformations.
#[derive(Debug, Clone)]
pub struct Image {
    id: ComponentId,
    props: OptionBag,
    transformations: Vec<OptionBag>,
}

/// What an [`Image`] renders to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImage {
    /// Delivery URL, absent when the public id or cloud name is missing
    pub url: Option<String>,
    /// Attributes forwarded to the rendered element
    pub attributes: PassthroughOptionSet,
    pub steps: Vec<TransformationStep>,
    /// Responsive width used for the implicit step, if one was resolved
    pub width: Option<u32>,
}

struct Prepared {
    context: MergedContext,
    attributes: PassthroughOptionSet,
    policy: Option<BreakpointPolicy>,
    auto_width: bool,
}

impl Image {
    /// Create an image with a freshly allocated id.
    pub fn new(props: OptionBag) -> Self {
        Self::with_id(ComponentId::next(), props)
    }

    pub fn with_id(id: ComponentId, props: OptionBag) -> Self {
        Self { id, props, transformations: Vec::new() }
    }

    pub fn id(&self) -> ComponentId {
        self.id
    }

    pub fn props(&self) -> &OptionBag {
        &self.props
    }

    /// Append a nested transformation declaration.
    pub fn with_transformation(mut self, step: OptionBag) -> Self {
        self.transformations.push(step);
        self
    }

    /// Replace the element's props. Nested transformations are kept.
    pub fn set_props(&mut self, props: OptionBag) {
        self.props = props;
    }

    /// Resolve against `ambient`.
    ///
    /// A measurement already cached for this element is reused with the
    /// current breakpoint policy; the container is only measured when the
    /// cache has nothing.
    pub fn resolve(
        &self,
        ambient: &MergedContext,
        measure: &dyn ContainerMeasure,
        cache: &mut WidthCache,
        vocabulary: &Vocabulary,
    ) -> Result<ResolvedImage> {
        let prepared = self.prepare(ambient, vocabulary)?;

        let width = match (&prepared.policy, prepared.auto_width) {
            (Some(policy), true) => match cache.reselect(self.id, policy) {
                Some(cached) => Some(cached),
                None => {
                    resolve_width(RequestedWidth::Auto, measure, policy, cache, self.id).width()
                }
            },
            _ => None,
        };

        Ok(self.assemble(prepared, width, vocabulary))
    }

    /// Re-measure after a container resize.
    ///
    /// Returns `Ok(None)` when the element is not responsive or the resolved
    /// width did not change, in which case the previous URL stays valid.
    pub fn on_resize(
        &self,
        ambient: &MergedContext,
        measure: &dyn ContainerMeasure,
        cache: &mut WidthCache,
        vocabulary: &Vocabulary,
    ) -> Result<Option<ResolvedImage>> {
        let prepared = self.prepare(ambient, vocabulary)?;
        let Some(policy) = prepared.policy.as_ref().filter(|_| prepared.auto_width) else {
            return Ok(None);
        };

        match resolve_width(RequestedWidth::Auto, measure, policy, cache, self.id) {
            resolution @ WidthResolution::Resolved { changed: true, .. } => {
                Ok(Some(self.assemble(prepared, resolution.width(), vocabulary)))
            }
            _ => Ok(None),
        }
    }

    fn prepare(&self, ambient: &MergedContext, vocabulary: &Vocabulary) -> Result<Prepared> {
        let classified = classify(&self.props, vocabulary);
        let context = ambient.layer(&classified.recognized);
        let policy = BreakpointPolicy::from_context(&context)?;
        let auto_width = context
            .get("width")
            .and_then(RequestedWidth::from_value)
            .is_some_and(|w| w == RequestedWidth::Auto);

        Ok(Prepared { context, attributes: classified.passthrough, policy, auto_width })
    }

    fn assemble(
        &self,
        prepared: Prepared,
        width: Option<u32>,
        vocabulary: &Vocabulary,
    ) -> ResolvedImage {
        let explicit: Vec<TransformationStep> = self
            .transformations
            .iter()
            .map(|bag| TransformationStep::from_bag(bag, vocabulary))
            .collect();
        let steps = build(&prepared.context, &explicit, width, vocabulary);
        let descriptor = ResourceDescriptor::from_context(&prepared.context);
        let url = compose(&descriptor, &steps, vocabulary);

        ResolvedImage { url, attributes: prepared.attributes, steps, width }
    }
}
