use khata_error::{
    ConfigError, ConfigErrorKind, JsonError, JsonErrorKind, KhataError, KhataErrorKind,
    KhataResult,
};

#[test]
fn test_config_error_tracks_location() {
    let line = line!() + 1;
    let err = ConfigError::new(ConfigErrorKind::Build("no sources".to_string()));

    assert_eq!(err.line(), line);
    assert_eq!(err.file(), file!());
    assert_eq!(
        err.kind(),
        &ConfigErrorKind::Build("no sources".to_string())
    );
}

#[test]
fn test_config_error_display_includes_kind_and_location() {
    let err = ConfigError::new(ConfigErrorKind::Parse("color: invalid type".to_string()));
    let text = err.to_string();

    assert!(text.starts_with("Configuration Error: Failed to parse configuration: color"));
    assert!(text.contains(file!()));
}

#[test]
fn test_json_error_tracks_location() {
    let line = line!() + 1;
    let err = JsonError::new(JsonErrorKind::Data("key must be a string".to_string()));

    assert_eq!(err.line(), line);
    assert_eq!(err.file(), file!());
    assert_eq!(
        err.kind(),
        &JsonErrorKind::Data("key must be a string".to_string())
    );
}

#[test]
fn test_json_error_display_names_the_kind() {
    let data = JsonError::new(JsonErrorKind::Data("NaN".to_string()));
    let io = JsonError::new(JsonErrorKind::Io("broken pipe".to_string()));

    assert!(data
        .to_string()
        .starts_with("JSON Error: Unrepresentable value: NaN"));
    assert!(io
        .to_string()
        .starts_with("JSON Error: Failed to write JSON: broken pipe"));
}

#[test]
fn test_question_mark_converts_into_khata_error() {
    fn fails() -> KhataResult<()> {
        Err(JsonError::new(JsonErrorKind::Data("bad value".to_string())))?
    }

    let err = fails().unwrap_err();
    assert!(matches!(err.kind(), KhataErrorKind::Json(_)));
    assert!(err.to_string().starts_with("Khata Error: JSON Error"));
}

#[test]
fn test_khata_error_from_config_error() {
    let err: KhataError = ConfigError::new(ConfigErrorKind::Build("x".to_string())).into();
    assert!(matches!(err.kind(), KhataErrorKind::Config(_)));
}
