//! Command-line overrides layered over the compiled-in defaults.

use std::ffi::OsString;

use rstest::rstest;

use harness_config::{Config, LogFormat, SocketEndpoint};

fn load(extra: &[&str]) -> Config {
    let args = std::iter::once(OsString::from("harnessd"))
        .chain(extra.iter().map(OsString::from))
        .collect::<Vec<_>>();
    match Config::load_from_iter(args) {
        Ok(config) => config,
        Err(error) => panic!("configuration failed to load: {error}"),
    }
}

#[rstest]
#[case::tcp("tcp://127.0.0.1:6010", SocketEndpoint::tcp("127.0.0.1", 6010))]
#[case::unix("unix:///tmp/harness-test/harness.sock", SocketEndpoint::unix("/tmp/harness-test/harness.sock"))]
fn cli_overrides_listen_endpoint(#[case] flag: &str, #[case] expected: SocketEndpoint) {
    let config = load(&["--listen", flag]);
    assert_eq!(config.listen(), &expected);
}

#[test]
fn cli_overrides_logging() {
    let config = load(&["--log-filter", "debug", "--log-format", "compact"]);
    assert_eq!(config.log_filter(), "debug");
    assert_eq!(config.log_format(), LogFormat::Compact);
}

#[test]
fn cli_overrides_runtime_identifier() {
    let config = load(&["--runtime-identifier", "rust-nightly"]);
    assert_eq!(config.runtime_identifier(), "rust-nightly");
}

#[test]
fn invalid_listen_endpoint_fails_fast() {
    let args = vec![
        OsString::from("harnessd"),
        OsString::from("--listen"),
        OsString::from("invalid://socket"),
    ];
    assert!(Config::load_from_iter(args).is_err());
}
