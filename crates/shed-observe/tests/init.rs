use shed_observe::{LoggerConfig, LoggerError, LoggerFormat, logger_init};

// One process-wide subscriber: every check lives in the same test.
#[test]
fn installs_once_and_rejects_bad_input_without_installing() {
    let err = logger_init(&LoggerConfig::default().with_level("info,shed_core=loud")).unwrap_err();
    assert!(matches!(err, LoggerError::InvalidFilter { .. }), "{err:?}");
    assert!(!tracing::dispatcher::has_been_set());

    let cfg = LoggerConfig::default().with_format(LoggerFormat::Json);
    logger_init(&cfg).unwrap();
    assert!(tracing::dispatcher::has_been_set());
    tracing::info!(cycle = 1, "logger is live");

    let err = logger_init(&LoggerConfig::default()).unwrap_err();
    assert!(matches!(err, LoggerError::AlreadyInitialized), "{err:?}");
    assert_eq!(err.to_string(), "a global logger is already installed");
}
