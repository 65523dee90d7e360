use hbsd_extattr::StoreError;
use std::borrow::Cow;

/// Error types of the PaX feature core.
#[hbsd_derive::hbsd_error]
pub enum PaxError {
    /// An attribute listing entry runs past the end of the buffer.
    #[error("Malformed attribute list{}: {message}", format_context(.context))]
    MalformedAttributeList { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A feature attribute holds something other than `0` or `1`.
    #[error("Malformed attribute value{}: {message}", format_context(.context))]
    MalformedAttributeValue { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Unknown feature{}: {message}", format_context(.context))]
    UnknownFeature { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The target is not a regular file and `force` was not given.
    #[error("Unsupported target{}: {message}", format_context(.context))]
    UnsupportedTarget { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Two descriptors share a name or an attribute, or a name is empty.
    #[error("Invalid feature registry{}: {message}", format_context(.context))]
    InvalidRegistry { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Attribute store failure{}: {source}", format_context(.context))]
    AttributeStore { source: StoreError, context: Option<Cow<'static, str>> },

    #[error("Superuser privileges required{}: {message}", format_context(.context))]
    PrivilegeRequired { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl PaxError {
    /// Lifts a store failure, keeping a missing file distinguishable from other
    /// store faults.
    pub(crate) fn from_store(err: StoreError, context: impl Into<Cow<'static, str>>) -> Self {
        match err {
            StoreError::FileNotFound { message, .. } => {
                Self::FileNotFound { message, context: Some(context.into()) }
            },
            source => Self::AttributeStore { source, context: Some(context.into()) },
        }
    }
}
