use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use pipeline_studio::config::StudioConfig;
use pipeline_studio::error::StudioError;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn file_overrides_defaults_key_by_key() {
    let file = write_config(
        r#"
base_url = "https://studio.example.com"
idle_timeout_secs = 45
"#,
    );

    let config = StudioConfig::from_file(file.path()).unwrap();
    assert_eq!(config.base_url, "https://studio.example.com");
    assert_eq!(config.stream_path, "/api/run-stream");
    assert_eq!(config.idle_timeout, Some(Duration::from_secs(45)));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert_eq!(config.stream_url(), "https://studio.example.com/api/run-stream");
}

#[test]
fn zero_idle_timeout_in_file_disables_it() {
    let file = write_config("idle_timeout_secs = 0\n");
    let config = StudioConfig::from_file(file.path()).unwrap();
    assert_eq!(config.idle_timeout, None);
}

#[test]
fn unknown_key_is_a_configuration_error() {
    let file = write_config("base_uri = \"http://localhost:9000\"\n");
    let err = StudioConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, StudioError::Configuration(_)), "{err:?}");
}

#[test]
fn invalid_toml_is_a_configuration_error() {
    let file = write_config("base_url = \n");
    let err = StudioConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, StudioError::Configuration(_)), "{err:?}");
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = StudioConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, StudioError::Io(_)), "{err:?}");
}

#[test]
fn environment_wins_over_file() {
    let file = write_config(
        r#"
base_url = "https://from-file.example.com"
stream_path = "/file-path"
"#,
    );

    let config = StudioConfig::from_file(file.path())
        .unwrap()
        .apply_env(|key| match key {
            "STUDIO_BASE_URL" => Some("http://from-env:8000".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.base_url, "http://from-env:8000");
    assert_eq!(config.stream_path, "/file-path");
}

#[test]
fn code_setters_win_over_everything() {
    let file = write_config("base_url = \"https://from-file.example.com\"\n");
    let config = StudioConfig::from_file(file.path())
        .unwrap()
        .apply_env(|key| (key == "STUDIO_BASE_URL").then(|| "http://from-env".to_string()))
        .unwrap()
        .with_base_url("http://from-code:1234")
        .with_idle_timeout(None);

    assert_eq!(config.base_url, "http://from-code:1234");
    assert_eq!(config.idle_timeout, None);
    assert!(config.validate().is_ok());
}
