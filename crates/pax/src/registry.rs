//! Static table of PaX features and the attribute pair behind each one.

use crate::error::PaxError;
use crate::matcher::{AttributeIndex, AttributeMatch};
use fxhash::FxHashSet;
use std::borrow::Cow;
use std::fmt;

/// Which of a feature's two attributes a name refers to.
///
/// Doubles as the requested state of a `set` mutation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum Polarity {
    Disable,
    Enable,
}

impl Polarity {
    pub const ALL: [Self; 2] = [Self::Disable, Self::Enable];

    /// Slot of this polarity in per-feature `[disable, enable]` pairs.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Disable => 0,
            Self::Enable => 1,
        }
    }
}

/// One registry entry: a feature name and its disable/enable attribute names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureDescriptor {
    name: Cow<'static, str>,
    disable_attr: Cow<'static, str>,
    enable_attr: Cow<'static, str>,
}

impl FeatureDescriptor {
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        disable_attr: impl Into<Cow<'static, str>>,
        enable_attr: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self { name: name.into(), disable_attr: disable_attr.into(), enable_attr: enable_attr.into() }
    }

    const fn pax(name: &'static str, disable_attr: &'static str, enable_attr: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            disable_attr: Cow::Borrowed(disable_attr),
            enable_attr: Cow::Borrowed(enable_attr),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn disable_attr(&self) -> &str {
        &self.disable_attr
    }

    #[must_use]
    pub fn enable_attr(&self) -> &str {
        &self.enable_attr
    }

    #[must_use]
    pub fn attribute(&self, polarity: Polarity) -> &str {
        match polarity {
            Polarity::Disable => &self.disable_attr,
            Polarity::Enable => &self.enable_attr,
        }
    }
}

impl fmt::Display for FeatureDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} / {})", self.name, self.disable_attr, self.enable_attr)
    }
}

const HARDENED_BSD: [FeatureDescriptor; 6] = [
    FeatureDescriptor::pax("aslr", "hbsd.pax.noaslr", "hbsd.pax.aslr"),
    FeatureDescriptor::pax("segvguard", "hbsd.pax.nosegvguard", "hbsd.pax.segvguard"),
    FeatureDescriptor::pax("pageexec", "hbsd.pax.nopageexec", "hbsd.pax.pageexec"),
    FeatureDescriptor::pax("mprotect", "hbsd.pax.nomprotect", "hbsd.pax.mprotect"),
    FeatureDescriptor::pax("shlibrandom", "hbsd.pax.noshlibrandom", "hbsd.pax.shlibrandom"),
    FeatureDescriptor::pax(
        "disallow_map32bit",
        "hbsd.pax.nodisallow_map32bit",
        "hbsd.pax.disallow_map32bit",
    ),
];

/// Ordered, immutable set of feature descriptors.
///
/// Order only determines report order. Every attribute name is unique across the
/// whole registry, so a raw attribute maps to at most one (feature, polarity) pair.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    descriptors: Vec<FeatureDescriptor>,
    index: AttributeIndex,
}

impl FeatureRegistry {
    /// Builds a registry from arbitrary descriptors.
    ///
    /// # Errors
    /// Returns [`PaxError::InvalidRegistry`] if a name is empty, two features share
    /// a name, or an attribute name appears more than once.
    pub fn new(descriptors: impl IntoIterator<Item = FeatureDescriptor>) -> Result<Self, PaxError> {
        let descriptors: Vec<FeatureDescriptor> = descriptors.into_iter().collect();

        let mut features = FxHashSet::default();
        let mut attributes = FxHashSet::default();
        for descriptor in &descriptors {
            if descriptor.name.is_empty() {
                return Err(invalid("EMPTY", "Feature names cannot be empty"));
            }
            if !features.insert(descriptor.name()) {
                return Err(invalid(descriptor.name(), "Duplicate feature name"));
            }
            for polarity in Polarity::ALL {
                let attr = descriptor.attribute(polarity);
                if attr.is_empty() {
                    return Err(invalid(descriptor.name(), "Attribute names cannot be empty"));
                }
                if !attributes.insert(attr) {
                    return Err(invalid(attr, "Attribute name is used more than once"));
                }
            }
        }

        Ok(Self::from_validated(descriptors))
    }

    /// The six HardenedBSD PaX features.
    #[must_use]
    pub fn hardened_bsd() -> Self {
        Self::from_validated(HARDENED_BSD.to_vec())
    }

    fn from_validated(descriptors: Vec<FeatureDescriptor>) -> Self {
        let index = AttributeIndex::build(&descriptors);
        Self { descriptors, index }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FeatureDescriptor> {
        self.descriptors.iter().find(|d| d.name() == name)
    }

    /// # Errors
    /// Returns [`PaxError::UnknownFeature`] if `name` is not registered.
    pub fn lookup_by_name(&self, name: &str) -> Result<&FeatureDescriptor, PaxError> {
        self.get(name).ok_or_else(|| PaxError::UnknownFeature {
            message: name.to_owned().into(),
            context: Some(format!("Known features: {}", self.names().join(", ")).into()),
        })
    }

    #[must_use]
    pub fn all(&self) -> &[FeatureDescriptor] {
        &self.descriptors
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureDescriptor> {
        self.descriptors.iter()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(FeatureDescriptor::name).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Finds the feature and polarity a raw attribute name belongs to.
    ///
    /// Exact, case-sensitive byte comparison; unrelated names yield `None`.
    #[must_use]
    pub fn match_attribute(&self, raw_name: &[u8]) -> Option<AttributeMatch<'_>> {
        self.index.lookup(raw_name).map(|(position, polarity)| AttributeMatch {
            position,
            descriptor: &self.descriptors[position],
            polarity,
        })
    }
}

impl Default for FeatureRegistry {
    fn default() -> Self {
        Self::hardened_bsd()
    }
}

fn invalid(subject: &str, reason: &'static str) -> PaxError {
    PaxError::InvalidRegistry { message: subject.to_owned().into(), context: Some(reason.into()) }
}
