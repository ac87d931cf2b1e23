/*!
 * Tests for configuration file loading
 */

use std::io::Write;

use yavat::app_config::{Config, LogLevel};

#[test]
fn test_fromFile_withValidJson_shouldLoadSettings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"log_level":"warn","validation":{{"check_overlaps":false}}}}"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.log_level, LogLevel::Warn);
    assert!(!config.validation.check_overlaps);
    assert!(config.validation.check_predecessors);
}

#[test]
fn test_fromFile_withBrokenJson_shouldError() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{not json").unwrap();

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_fromFileOrDefault_withMissingFile_shouldUseDefaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");

    let config = Config::from_file_or_default(&path).unwrap();

    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validation.check_overlaps);
}
