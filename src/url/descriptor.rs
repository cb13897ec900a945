//! Resource identity and host selection

use crate::options::OptionValue;
use crate::scope::MergedContext;

/// Everything needed to address one resource, apart from its transformations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub cloud_name: Option<String>,
    /// `image`, `video`, `raw`...
    pub resource_type: String,
    /// Delivery type: `upload`, `fetch`, `private`...
    pub delivery_type: String,
    pub public_id: Option<String>,
    /// Extension appended to the public id
    pub format: Option<String>,
    pub version: Option<String>,
    /// Precomputed signature, rendered as `s--<signature>--`
    pub signature: Option<String>,
    pub secure: bool,
    /// Use the `<cloud>-res` host instead of a cloud path segment
    pub private_cdn: bool,
    /// Custom host for http delivery
    pub cname: Option<String>,
    /// Custom host for https delivery
    pub secure_distribution: Option<String>,
    /// Add `v1` to nested public ids that carry no version
    pub force_version: bool,
}

impl Default for ResourceDescriptor {
    fn default() -> Self {
        Self {
            cloud_name: None,
            resource_type: "image".to_string(),
            delivery_type: "upload".to_string(),
            public_id: None,
            format: None,
            version: None,
            signature: None,
            secure: false,
            private_cdn: false,
            cname: None,
            secure_distribution: None,
            force_version: true,
        }
    }
}

impl ResourceDescriptor {
    /// Descriptor for `public_id` in `cloud_name` with default settings.
    pub fn new(cloud_name: impl Into<String>, public_id: impl Into<String>) -> Self {
        Self {
            cloud_name: Some(cloud_name.into()),
            public_id: Some(public_id.into()),
            ..Self::default()
        }
    }

    /// Read the url-role options of a merged context.
    ///
    /// Missing keys keep their defaults. Empty strings count as missing.
    pub fn from_context(context: &MergedContext) -> Self {
        let text = |key: &str| {
            context.get(key).and_then(OptionValue::to_plain_string).filter(|s| !s.is_empty())
        };
        let flag =
            |key: &str, default: bool| context.get(key).map_or(default, OptionValue::is_truthy);

        let defaults = Self::default();
        Self {
            cloud_name: text("cloudName"),
            resource_type: text("resourceType").unwrap_or(defaults.resource_type),
            delivery_type: text("type").unwrap_or(defaults.delivery_type),
            public_id: text("publicId"),
            format: text("format"),
            version: text("version"),
            signature: text("signature"),
            secure: flag("secure", defaults.secure),
            private_cdn: flag("privateCdn", defaults.private_cdn),
            cname: text("cname"),
            secure_distribution: text("secureDistribution"),
            force_version: flag("forceVersion", defaults.force_version),
        }
    }

    pub fn with_public_id(mut self, public_id: impl Into<String>) -> Self {
        self.public_id = Some(public_id.into());
        self
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn with_delivery_type(mut self, delivery_type: impl Into<String>) -> Self {
        self.delivery_type = delivery_type.into();
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn private_cdn(mut self, private_cdn: bool) -> Self {
        self.private_cdn = private_cdn;
        self
    }

    pub fn with_cname(mut self, cname: impl Into<String>) -> Self {
        self.cname = Some(cname.into());
        self
    }

    pub fn with_secure_distribution(mut self, host: impl Into<String>) -> Self {
        self.secure_distribution = Some(host.into());
        self
    }

    pub fn force_version(mut self, force: bool) -> Self {
        self.force_version = force;
        self
    }
}
