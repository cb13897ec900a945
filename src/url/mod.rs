//! Delivery URL composition
//!
//! Turns a [`ResourceDescriptor`] and a transformation chain into a URL:
//!
//! ```text
//! <scheme>://<host>[/<cloud>]/<resource_type>/<type>/[s--<sig>--/]
//!     <step>/.../[v<version>/]<public_id>[.<format>]
//! ```
//!
//! Composition is pure: identical inputs always produce identical bytes.

pub mod descriptor;
pub mod escape;
pub mod token;

pub use descriptor::ResourceDescriptor;
pub use escape::smart_escape;
pub use token::{render_step, render_value};

use crate::transformation::TransformationStep;
use crate::vocabulary::Vocabulary;

/// Host used when no private CDN or custom domain is configured.
pub const SHARED_CDN: &str = "res.cloudinary.com";

/// Compose the delivery URL.
///
/// Returns `None` when there is no public id or no cloud name.
///
/// # Example
///
/// ```
/// use cldctx::transformation::TransformationStep;
/// use cldctx::url::{compose, ResourceDescriptor};
/// use cldctx::vocabulary::Vocabulary;
///
/// let descriptor = ResourceDescriptor::new("demo", "sample");
/// let steps = [TransformationStep::new().with("crop", "scale").with("width", 300u32)];
/// let url = compose(&descriptor, &steps, Vocabulary::builtin());
/// assert_eq!(
///     url.as_deref(),
///     Some("http://res.cloudinary.com/demo/image/upload/c_scale,w_300/sample")
/// );
/// ```
pub fn compose(
    descriptor: &ResourceDescriptor,
    steps: &[TransformationStep],
    vocabulary: &Vocabulary,
) -> Option<String> {
    let public_id = descriptor.public_id.as_deref().filter(|id| !id.is_empty())?;
    let Some(cloud_name) = descriptor.cloud_name.as_deref().filter(|c| !c.is_empty()) else {
        tracing::warn!(public_id, "no cloud name configured, not composing a URL");
        return None;
    };

    let mut segments: Vec<String> = vec![host_prefix(descriptor, cloud_name)];
    segments.push(descriptor.resource_type.clone());
    segments.push(descriptor.delivery_type.clone());

    if let Some(signature) = descriptor.signature.as_deref() {
        if signature.starts_with("s--") {
            segments.push(signature.to_string());
        } else {
            segments.push(format!("s--{signature}--"));
        }
    }

    segments.extend(steps.iter().filter_map(|step| render_step(step, vocabulary)));

    if let Some(version) = version_segment(descriptor, public_id) {
        segments.push(version);
    }

    let mut source = smart_escape(public_id);
    if let Some(format) = descriptor.format.as_deref() {
        source.push('.');
        source.push_str(format);
    }
    segments.push(source);

    let url = segments.join("/");
    tracing::debug!(%url, steps = steps.len(), "composed delivery URL");
    Some(url)
}

/// Scheme, host and (for the shared domain) the cloud name path segment.
fn host_prefix(descriptor: &ResourceDescriptor, cloud_name: &str) -> String {
    let prefix = if descriptor.secure {
        let host = match descriptor.secure_distribution.as_deref() {
            Some(host) => host.to_string(),
            None if descriptor.private_cdn => format!("{cloud_name}-{SHARED_CDN}"),
            None => SHARED_CDN.to_string(),
        };
        format!("https://{host}")
    } else if let Some(cname) = descriptor.cname.as_deref() {
        format!("http://{cname}")
    } else if descriptor.private_cdn {
        format!("http://{cloud_name}-{SHARED_CDN}")
    } else {
        format!("http://{SHARED_CDN}")
    };

    if descriptor.private_cdn {
        prefix
    } else {
        format!("{prefix}/{cloud_name}")
    }
}

fn version_segment(descriptor: &ResourceDescriptor, public_id: &str) -> Option<String> {
    if let Some(version) = descriptor.version.as_deref() {
        let segment =
            if version.starts_with('v') { version.to_string() } else { format!("v{version}") };
        return Some(segment);
    }

    let nested = public_id.contains('/');
    let unversioned = !starts_with_version(public_id) && !escape::is_url(public_id);
    if descriptor.force_version && nested && unversioned {
        Some("v1".to_string())
    } else {
        None
    }
}

/// `v<digits>` as the first path segment.
fn starts_with_version(public_id: &str) -> bool {
    public_id
        .strip_prefix('v')
        .is_some_and(|rest| rest.chars().next().is_some_and(|c| c.is_ascii_digit()))
}
