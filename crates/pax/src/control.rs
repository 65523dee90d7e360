//! Per-file feature queries and mutations over an [`AttributeStore`].

use crate::decoder::decode;
use crate::error::{PaxError, PaxErrorExt};
use crate::options::ControlOptions;
use crate::reconcile::{FeatureStatus, RawAttributeState, ResolvedState, parse_value, reconcile};
use crate::registry::{FeatureDescriptor, FeatureRegistry, Polarity};
use hbsd_extattr::{AttributeStore, StoreError};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// Reconciled state of one feature on one file, with the raw values it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureState<'r> {
    pub descriptor: &'r FeatureDescriptor,
    pub disable: RawAttributeState,
    pub enable: RawAttributeState,
    pub resolved: ResolvedState,
}

impl FeatureState<'_> {
    #[must_use]
    pub fn feature(&self) -> &str {
        self.descriptor.name()
    }

    #[must_use]
    pub const fn raw(&self, polarity: Polarity) -> RawAttributeState {
        match polarity {
            Polarity::Disable => self.disable,
            Polarity::Enable => self.enable,
        }
    }

    #[must_use]
    pub const fn status(&self) -> FeatureStatus {
        FeatureStatus::Resolved(self.resolved)
    }
}

impl fmt::Display for FeatureState<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.feature(), self.resolved)
    }
}

/// Reads, reconciles and mutates PaX feature attributes.
///
/// Every call goes to the store; nothing is cached between calls.
#[derive(Debug)]
pub struct FeatureControl<S> {
    store: S,
    registry: FeatureRegistry,
    options: ControlOptions,
}

impl<S: AttributeStore> FeatureControl<S> {
    /// Uses the HardenedBSD feature table.
    pub fn new(store: S, options: ControlOptions) -> Self {
        Self::with_registry(store, FeatureRegistry::hardened_bsd(), options)
    }

    pub const fn with_registry(store: S, registry: FeatureRegistry, options: ControlOptions) -> Self {
        Self { store, registry, options }
    }

    pub const fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    pub const fn options(&self) -> &ControlOptions {
        &self.options
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Reports every feature with at least one of its attributes stored on `file`,
    /// in registry order.
    ///
    /// # Errors
    /// Store failures, a malformed listing, or a malformed attribute value.
    pub fn list(&self, file: &Path) -> Result<Vec<FeatureState<'_>>, PaxError> {
        debug!(file = %file.display(), "list attrs");
        let buffer = self
            .store
            .list(file)
            .map_err(|err| PaxError::from_store(err, "Failed to list attributes"))?;
        let listing = decode(&buffer).context(file.display().to_string())?;

        let mut listed = vec![[false; 2]; self.registry.len()];
        for name in listing.iter() {
            match self.registry.match_attribute(name) {
                Some(hit) => {
                    debug!(
                        feature = hit.descriptor.name(),
                        polarity = %hit.polarity,
                        "found attribute {}",
                        hit.descriptor.attribute(hit.polarity)
                    );
                    listed[hit.position][hit.polarity.index()] = true;
                },
                None => trace!(name = %String::from_utf8_lossy(name), "ignoring attribute"),
            }
        }

        let mut states = Vec::new();
        for (descriptor, present) in self.registry.iter().zip(listed) {
            if present == [false; 2] {
                continue;
            }
            let [disable, enable] = Polarity::ALL.map(|polarity| {
                if present[polarity.index()] {
                    self.read_attribute(file, descriptor.attribute(polarity))
                } else {
                    Ok(RawAttributeState::ABSENT)
                }
            });
            if let Some(state) = Self::resolve(descriptor, disable?, enable?) {
                states.push(state);
            }
        }
        Ok(states)
    }

    /// Reads both attributes of `feature` directly, without listing.
    ///
    /// Returns `None` when neither attribute is stored.
    ///
    /// # Errors
    /// [`PaxError::UnknownFeature`], store failures, or a malformed value.
    pub fn inspect(&self, file: &Path, feature: &str) -> Result<Option<FeatureState<'_>>, PaxError> {
        let descriptor = self.registry.lookup_by_name(feature)?;
        let disable = self.read_attribute(file, descriptor.disable_attr())?;
        let enable = self.read_attribute(file, descriptor.enable_attr())?;
        Ok(Self::resolve(descriptor, disable, enable))
    }

    /// # Errors
    /// Same as [`FeatureControl::inspect`].
    pub fn status(&self, file: &Path, feature: &str) -> Result<FeatureStatus, PaxError> {
        Ok(self.inspect(file, feature)?.map_or(FeatureStatus::Unset, |state| state.status()))
    }

    /// Writes the attribute pair for `state`: the enable attribute gets `1` for
    /// [`Polarity::Enable`], the disable attribute gets the complement.
    ///
    /// Both writes are attempted even if the first one fails; the first failure is
    /// returned. A half-applied pair later reads back as a conflict.
    ///
    /// # Errors
    /// [`PaxError::UnknownFeature`] before anything is written, otherwise store
    /// failures.
    pub fn set_state(&self, file: &Path, feature: &str, state: Polarity) -> Result<(), PaxError> {
        let descriptor = self.registry.lookup_by_name(feature)?;
        info!("{state} {} on {}", descriptor.name(), file.display());

        let enable = u8::from(state == Polarity::Enable);
        let disabled = self.write_attribute(file, descriptor.disable_attr(), 1 - enable);
        let enabled = self.write_attribute(file, descriptor.enable_attr(), enable);
        disabled.and(enabled)?;

        self.finish_mutation(file)
    }

    /// Deletes both attributes of `feature`. Missing attributes are not an error.
    ///
    /// # Errors
    /// [`PaxError::UnknownFeature`] or the first store failure.
    pub fn reset(&self, file: &Path, feature: &str) -> Result<(), PaxError> {
        let descriptor = self.registry.lookup_by_name(feature)?;
        self.reset_descriptor(file, descriptor)?;
        self.finish_mutation(file)
    }

    /// Resets every registered feature on `file`.
    ///
    /// Stops at the first failure unless `keep_going` is set, in which case every
    /// feature is attempted and the first failure is returned afterwards.
    ///
    /// # Errors
    /// The first store failure.
    pub fn reset_all(&self, file: &Path) -> Result<(), PaxError> {
        let mut first_error = None;
        for descriptor in self.registry.iter() {
            if let Err(err) = self.reset_descriptor(file, descriptor) {
                if !self.options.keep_going {
                    return Err(err);
                }
                warn!(
                    feature = descriptor.name(),
                    file = %file.display(),
                    error = %err,
                    "reset failed, continuing"
                );
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => self.finish_mutation(file),
        }
    }

    fn reset_descriptor(&self, file: &Path, descriptor: &FeatureDescriptor) -> Result<(), PaxError> {
        info!("reset {} on {}", descriptor.name(), file.display());
        let disabled = self.delete_attribute(file, descriptor.disable_attr());
        let enabled = self.delete_attribute(file, descriptor.enable_attr());
        disabled.and(enabled)
    }

    fn finish_mutation(&self, file: &Path) -> Result<(), PaxError> {
        if !self.options.immutable {
            return Ok(());
        }
        info!("mark {} immutable", file.display());
        self.store
            .set_immutable(file)
            .map_err(|err| PaxError::from_store(err, "Failed to mark file immutable"))
    }

    fn resolve<'r>(
        descriptor: &'r FeatureDescriptor,
        disable: RawAttributeState,
        enable: RawAttributeState,
    ) -> Option<FeatureState<'r>> {
        // Both gone means the pair was removed after listing: report it as unset.
        if !disable.is_present() && !enable.is_present() {
            return None;
        }
        let resolved = reconcile(disable.is_set(), enable.is_set());
        trace!(feature = descriptor.name(), %disable, %enable, %resolved, "reconciled");
        Some(FeatureState { descriptor, disable, enable, resolved })
    }

    fn read_attribute(&self, file: &Path, attribute: &str) -> Result<RawAttributeState, PaxError> {
        match self.store.get(file, attribute) {
            Ok(raw) => {
                let value = parse_value(attribute, &raw).context(file.display().to_string())?;
                Ok(RawAttributeState::present(value))
            },
            Err(StoreError::AttributeNotFound { .. }) => Ok(RawAttributeState::ABSENT),
            Err(err) => Err(PaxError::from_store(err, format!("Failed to read {attribute}"))),
        }
    }

    fn write_attribute(&self, file: &Path, attribute: &str, value: u8) -> Result<(), PaxError> {
        info!("{}: system@{attribute} = {value}", file.display());
        self.store
            .set(file, attribute, value)
            .map_err(|err| PaxError::from_store(err, format!("Failed to set {attribute}")))
    }

    fn delete_attribute(&self, file: &Path, attribute: &str) -> Result<(), PaxError> {
        debug!("{}: delete system@{attribute}", file.display());
        self.store
            .delete(file, attribute)
            .map_err(|err| PaxError::from_store(err, format!("Failed to delete {attribute}")))
    }
}
