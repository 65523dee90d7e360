//! Extended attribute access for PaX feature control.
//!
//! The crate exposes one capability, [`AttributeStore`], with four operations over a
//! single attribute namespace: `list`, `get`, `set`, and `delete` (plus
//! `set_immutable` for the `-i` flag of the CLI).
//!
//! # Implementations
//!
//! 1.  **[`SystemStore`]**: the running kernel. FreeBSD uses `extattr_*_file(2)`;
//!     Linux maps the `system` namespace onto `trusted.` xattrs.
//! 2.  **[`MemoryStore`]**: a thread-safe in-memory double with a mutation journal.
//!
//! # Wire format
//!
//! `list` always returns the FreeBSD listing layout: one length byte followed by that
//! many name bytes, repeated to the end of the buffer. [`encode_listing`] produces it.
//!
//! # Examples
//!
//! ```rust
//! use hbsd_extattr::{AttributeStore, MemoryStore, encode_listing};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), hbsd_extattr::StoreError> {
//! let store = MemoryStore::new();
//! store.add_file("/usr/bin/true");
//!
//! let file = Path::new("/usr/bin/true");
//! store.set(file, "hbsd.pax.aslr", 1)?;
//!
//! assert_eq!(store.get(file, "hbsd.pax.aslr")?, b"1");
//! assert_eq!(store.list(file)?, encode_listing(["hbsd.pax.aslr"])?);
//! # Ok(())
//! # }
//! ```

mod error;
mod listing;
mod memory;
mod namespace;
mod privilege;
mod store;
mod system;

pub use error::{StoreError, StoreErrorExt};
pub use listing::{MAX_NAME_LEN, encode_listing};
pub use memory::{MemoryStore, StoreOp};
pub use namespace::Namespace;
pub use privilege::effective_uid_is_root;
pub use store::AttributeStore;
pub use system::SystemStore;
