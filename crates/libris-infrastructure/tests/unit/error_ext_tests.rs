//! Context attached to foreign errors

use libris_domain::error::{Error, Result};
use libris_infrastructure::error_ext::{ErrorContext, join_error};
use std::io;

fn missing_file() -> std::result::Result<(), io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "file not found"))
}

#[test]
fn test_context_keeps_the_io_error_as_source() {
    let result: Result<()> = missing_file().context("failed to write config");

    match result {
        Err(Error::Infrastructure { message, source }) => {
            assert_eq!(message, "failed to write config: file not found");
            assert!(source.is_some());
        }
        other => panic!("expected an infrastructure error, got {other:?}"),
    }
}

#[test]
fn test_lazy_context_names_the_path() {
    let path = "/etc/libris.toml";
    let err = missing_file()
        .with_context(|| format!("failed to read {path}"))
        .unwrap_err();
    assert!(err.to_string().contains("/etc/libris.toml"));
}

#[test]
fn test_config_context_is_a_configuration_error() {
    let err = missing_file().config_context("bad config").unwrap_err();
    assert!(matches!(err, Error::Configuration { .. }));
    assert!(!err.is_client_error());
}

#[tokio::test]
async fn test_panicked_task_becomes_internal() {
    let handle = tokio::spawn(async {
        panic!("hash worker died");
    });
    let err = join_error(handle.await.unwrap_err(), "password hashing");
    assert!(matches!(err, Error::Internal { .. }));
    assert!(err.to_string().contains("password hashing"));
}
