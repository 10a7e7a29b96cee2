use metrics_publisher::Error;
use metrics_publisher::settings::{Settings, init_logging};

/// Tests that the global subscriber can only be installed once.
#[test]
fn init_logging_once() {
    // given
    let settings = Settings::new().unwrap();

    // when
    let first = init_logging(&settings);
    let second = init_logging(&settings);

    // then
    assert!(first.is_ok());
    assert!(matches!(second, Err(Error::Init(_))));
}
