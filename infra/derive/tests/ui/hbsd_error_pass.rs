use hbsd_derive::hbsd_error;
use std::borrow::Cow;

#[hbsd_error]
pub enum ListingError {
    #[error("Listing read failure{}: {source}", format_context(.context))]
    Io {
        #[source]
        source: std::io::Error,
        context: Option<Cow<'static, str>>,
    },

    #[error("Listing truncated{}: {message}", format_context(.context))]
    Truncated { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

fn read_listing() -> Result<Vec<u8>, ListingError> {
    let raw: Result<Vec<u8>, std::io::Error> =
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
    raw.context("Reading listing")
}

fn main() {
    let err = read_listing().unwrap_err();
    assert_eq!(err.kind(), "Io");
    assert!(err.to_string().contains("(Reading listing)"));

    let truncated: Result<(), ListingError> =
        Err(ListingError::Truncated { message: "3 bytes short".into(), context: None });
    let err = truncated.context("entry 2").unwrap_err();
    assert_eq!(err.kind(), "Truncated");
    assert_eq!(err.to_string(), "Listing truncated (entry 2): 3 bytes short");

    let internal: ListingError = "boom".into();
    assert_eq!(internal.kind(), "Internal");
}
