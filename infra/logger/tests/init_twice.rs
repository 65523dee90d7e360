use hbsd_logger::{Logger, LoggerError};

#[test]
fn init_twice_returns_subscriber_error() {
    let _logger = Logger::builder()
        .name("hbsdcontrol-init-twice")
        .verbosity(0)
        .init()
        .expect("first init should succeed");

    let err = Logger::builder()
        .name("hbsdcontrol-init-twice-second")
        .verbosity(3)
        .init()
        .expect_err("second init should fail");

    assert!(
        matches!(err, LoggerError::Subscriber { .. }),
        "expected subscriber error for second init"
    );
    assert_eq!(err.kind(), "Subscriber");
}
