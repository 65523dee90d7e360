use std::borrow::Cow;

/// Errors raised while bootstrapping the log pipeline.
#[hbsd_derive::hbsd_error]
pub enum LoggerError {
    /// The log directory could not be created.
    #[error("Log directory unavailable{}: {source}", format_context(context))]
    LogDirectory { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// The rolling file appender rejected its settings.
    #[error("Rolling file appender error{}: {source}", format_context(context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// A global subscriber is already installed in this process.
    #[error("Tracing subscriber error{}: {source}", format_context(context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    /// Invalid settings supplied to the builder.
    #[error("Invalid logger configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
