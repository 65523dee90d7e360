use std::borrow::Cow;

/// Failures reported by an [`AttributeStore`](crate::AttributeStore).
#[hbsd_derive::hbsd_error]
pub enum StoreError {
    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Attribute not found{}: {message}", format_context(.context))]
    AttributeNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Permission denied{}: {message}", format_context(.context))]
    PermissionDenied { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Operation not supported{}: {message}", format_context(.context))]
    Unsupported { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid attribute name{}: {message}", format_context(.context))]
    InvalidName { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid path{}: {message}", format_context(.context))]
    InvalidPath { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Attribute I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
