//! Integration tests for the process-wide run logger.
//!
//! Installing a logger is global to the test binary, so this file owns the
//! `log` facade and does not use `test_log`.

use std::fs;

use promosaic_app::init_run_logger;

#[test]
fn run_logger_tests_installs_once_and_captures_records() {
    let first_dir = tempfile::tempdir().expect("scratch dir should be creatable");
    let second_dir = tempfile::tempdir().expect("scratch dir should be creatable");

    let path = init_run_logger(first_dir.path()).expect("logger should install");
    assert!(path.starts_with(first_dir.path()));
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .expect("log file has a name");
    assert!(name.ends_with("_log.txt"));
    assert_eq!(name.len(), "YYYYMMDD_HHMMSS_log.txt".len());

    let again = init_run_logger(second_dir.path()).expect("repeat install should succeed");
    assert_eq!(again, path);
    assert_eq!(
        fs::read_dir(second_dir.path()).expect("dir readable").count(),
        0
    );

    log::info!("stage=test action=marker value=41");
    log::debug!("stage=test action=detail value=42");
    log::trace!("stage=test action=noise value=43");
    log::logger().flush();

    let contents = fs::read_to_string(&path).expect("log file readable");
    assert!(contents.contains("| INFO | "));
    assert!(contents.contains("stage=logging action=file_created"));
    assert!(contents.contains("stage=test action=marker value=41"));
    assert!(contents.contains("stage=test action=detail value=42"));
    assert!(!contents.contains("value=43"));
    assert!(contents.lines().all(|line| line.split(" | ").count() == 4));
}
