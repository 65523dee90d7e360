//! HardenedBSD PaX feature state.
//!
//! Each PaX feature is persisted as two independent `system` namespace extended
//! attributes, one meaning "explicitly disabled" and one meaning "explicitly
//! enabled". This crate maps feature names to those attribute pairs, decodes the
//! attribute listing handed out by an [`AttributeStore`](hbsd_extattr::AttributeStore),
//! and folds every pair into a [`ResolvedState`]. Disagreeing pairs surface as
//! [`ResolvedState::Conflict`] instead of being resolved silently.
//!
//! ```
//! use hbsd_extattr::MemoryStore;
//! use hbsd_pax::{ControlOptions, FeatureControl, Polarity, ResolvedState};
//! use std::path::Path;
//!
//! let store = MemoryStore::new();
//! store.add_file("/bin/ls");
//!
//! let control = FeatureControl::new(store, ControlOptions::default());
//! control.set_state(Path::new("/bin/ls"), "aslr", Polarity::Disable)?;
//!
//! let states = control.list(Path::new("/bin/ls"))?;
//! assert_eq!(states[0].resolved, ResolvedState::Disabled);
//! # Ok::<(), hbsd_pax::PaxError>(())
//! ```

mod control;
mod decoder;
mod error;
mod matcher;
mod options;
mod reconcile;
mod registry;
mod target;

pub use control::{FeatureControl, FeatureState};
pub use decoder::{AttributeListing, decode};
pub use error::{PaxError, PaxErrorExt};
pub use matcher::AttributeMatch;
pub use options::{ControlOptions, MAX_VERBOSITY};
pub use reconcile::{FeatureStatus, RawAttributeState, ResolvedState, parse_value, reconcile};
pub use registry::{FeatureDescriptor, FeatureRegistry, Polarity};
pub use target::check_target;
