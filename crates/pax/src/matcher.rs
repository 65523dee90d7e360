use crate::registry::{FeatureDescriptor, Polarity};
use fxhash::FxHashMap;

/// A raw attribute name resolved to its feature and polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMatch<'r> {
    /// Registry position of the descriptor.
    pub position: usize,
    pub descriptor: &'r FeatureDescriptor,
    pub polarity: Polarity,
}

/// Attribute name to (registry position, polarity), built once per registry.
#[derive(Debug, Clone, Default)]
pub(crate) struct AttributeIndex {
    by_name: FxHashMap<Box<[u8]>, (usize, Polarity)>,
}

impl AttributeIndex {
    pub(crate) fn build(descriptors: &[FeatureDescriptor]) -> Self {
        let mut by_name = FxHashMap::default();
        for (position, descriptor) in descriptors.iter().enumerate() {
            for polarity in Polarity::ALL {
                let name = descriptor.attribute(polarity).as_bytes();
                by_name.insert(Box::from(name), (position, polarity));
            }
        }
        Self { by_name }
    }

    pub(crate) fn lookup(&self, raw_name: &[u8]) -> Option<(usize, Polarity)> {
        self.by_name.get(raw_name).copied()
    }
}
