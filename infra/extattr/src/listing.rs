//! Producer side of the attribute listing wire format.
//!
//! A listing is a run of entries, each a single length byte followed by exactly that
//! many bytes of attribute name. There is no count prefix and no terminator; the
//! listing ends where the buffer ends. This is the layout `extattr_list_file(2)`
//! returns on FreeBSD, and the layout every [`AttributeStore`](crate::AttributeStore)
//! hands back from `list`.

use crate::error::StoreError;

/// Longest name a single length byte can describe.
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Encodes attribute names into the length-prefixed listing format.
///
/// # Errors
/// Returns [`StoreError::InvalidName`] for an empty name or one longer than
/// [`MAX_NAME_LEN`] bytes.
pub fn encode_listing<I, N>(names: I) -> Result<Vec<u8>, StoreError>
where
    I: IntoIterator<Item = N>,
    N: AsRef<[u8]>,
{
    let mut out = Vec::new();

    for name in names {
        let name = name.as_ref();
        let len = u8::try_from(name.len()).map_err(|_| StoreError::InvalidName {
            message: String::from_utf8_lossy(name).into_owned().into(),
            context: Some(format!("Name exceeds {MAX_NAME_LEN} bytes").into()),
        })?;
        if len == 0 {
            return Err(StoreError::InvalidName {
                message: "EMPTY".into(),
                context: Some("Attribute names cannot be empty".into()),
            });
        }

        out.reserve(name.len() + 1);
        out.push(len);
        out.extend_from_slice(name);
    }

    Ok(out)
}
