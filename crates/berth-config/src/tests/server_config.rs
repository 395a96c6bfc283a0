use crate::ServerConfig;

use googletest::assert_that;
use googletest::prelude::{anything, err, ok};

// =========================================================================
// Defaults
// =========================================================================

#[test]
fn given_default_config_when_read_then_original_defaults_hold() {
    let config = ServerConfig::default();

    assert_eq!(config.host_name, "localhost");
    assert_eq!(config.port, 8080);
    assert_eq!(config.control_port, 8005);
    assert_eq!(config.path_prefix, "");
    assert_eq!(config.shutdown_timeout_ms, 10_000);
    assert!(!config.open_browser);
    assert!(!config.stop_only);
}

// =========================================================================
// Validation
// =========================================================================

#[test]
fn given_default_config_when_validate_then_ok() {
    let config = ServerConfig::default();

    assert_that!(config.validate(), ok(anything()));
}

#[test]
fn given_control_port_equal_to_port_when_validate_then_error() {
    let config = ServerConfig {
        port: 9000,
        control_port: 9000,
        ..ServerConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_zero_port_when_validate_then_error() {
    let config = ServerConfig {
        port: 0,
        ..ServerConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_zero_control_port_when_validate_then_error() {
    let config = ServerConfig {
        control_port: 0,
        ..ServerConfig::default()
    };

    assert_that!(config.validate(), err(anything()));
}

// =========================================================================
// Base URI derivation
// =========================================================================

#[test]
fn given_empty_prefix_when_base_uri_then_server_root() {
    let config = ServerConfig::default();

    let uri = config.base_uri().unwrap();

    assert_eq!(uri.as_str(), "http://localhost:8080/");
}

#[test]
fn given_prefix_when_base_uri_then_prefix_with_trailing_slash() {
    let config = ServerConfig {
        path_prefix: String::from("push-server"),
        ..ServerConfig::default()
    };

    let uri = config.base_uri().unwrap();

    assert_eq!(uri.as_str(), "http://localhost:8080/push-server/");
}

#[test]
fn given_prefix_with_stray_slashes_when_base_uri_then_normalized() {
    let config = ServerConfig {
        path_prefix: String::from("/api/"),
        ..ServerConfig::default()
    };

    let uri = config.base_uri().unwrap();

    assert_eq!(uri.as_str(), "http://localhost:8080/api/");
}

#[test]
fn given_whitespace_prefix_when_base_uri_then_collapses_to_root() {
    let config = ServerConfig {
        path_prefix: String::from("   "),
        ..ServerConfig::default()
    };

    let uri = config.base_uri().unwrap();

    assert_eq!(uri.as_str(), "http://localhost:8080/");
}

// =========================================================================
// Address helpers
// =========================================================================

#[test]
fn given_config_when_addresses_formatted_then_host_and_port_pairs() {
    let config = ServerConfig {
        host_name: String::from("example.test"),
        port: 8100,
        control_port: 8105,
        ..ServerConfig::default()
    };

    assert_eq!(config.bind_addr(), "example.test:8100");
    assert_eq!(config.control_addr(), "example.test:8105");
}
