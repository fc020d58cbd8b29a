//! Tests for the session summary.

use ndarray::Array2;

use crate::config::{SessionConfig, SourceInfo};
use crate::format::{FormatError, SessionSummary};
use crate::model::{AnnotationObject, ClassProperty, PixelRect};
use crate::session::AnnotationSession;
use crate::stroke::StrokeMask;

/// A session on a 10x10 image with a road and two cars painted.
fn create_painted_session() -> AnnotationSession {
    let mut session = AnnotationSession::from_config(&SessionConfig::default());
    session.open(
        SourceInfo {
            directory: "/data/".to_string(),
            file_name: "street.png".to_string(),
        },
        10,
        10,
    );

    let road = Array2::from_elem((2, 10), 1u8);
    let car = Array2::from_elem((3, 3), 1u8);
    session
        .paint(&StrokeMask::new(road.view(), 0, 8), 1, None)
        .unwrap();
    session
        .paint(&StrokeMask::at_origin(car.view()), 2, None)
        .unwrap();
    session
        .paint(&StrokeMask::new(car.view(), 5, 4), 2, None)
        .unwrap();
    session
}

#[test]
fn test_capture_and_restore() {
    let session = create_painted_session();
    let summary = SessionSummary::capture(&session, &SessionConfig::default());

    assert_eq!(summary.version, SessionSummary::CURRENT_VERSION);
    assert_eq!(summary.records.len(), 3);
    assert_eq!(
        summary.source.as_ref().map(|s| s.file_name.as_str()),
        Some("street.png")
    );

    let json = summary.to_json().unwrap();
    let loaded = SessionSummary::from_json(&json).unwrap();
    assert_eq!(loaded, summary);

    let record = loaded.build_record().unwrap();
    assert_eq!(&record, session.record());
    assert_eq!(record.check_indexes(), Ok(()));

    let mut restored = AnnotationSession::from_config(&loaded.configuration);
    restored.open(SourceInfo::default(), 10, 10);
    loaded.restore_into(&mut restored).unwrap();
    assert_eq!(restored.record().records(), session.record().records());
}

#[test]
fn test_capture_includes_added_classes() {
    let mut session = create_painted_session();
    session.add_class(ClassProperty::uniform("Sidewalk", [90, 90, 90], [200, 200, 200]));
    let summary = SessionSummary::capture(&session, &SessionConfig::default());
    assert_eq!(summary.configuration.classes.len(), 5);
    assert_eq!(summary.catalog().len(), 5);
}

#[test]
fn test_unknown_class_rejected() {
    let summary = SessionSummary::new(
        SessionConfig::default(),
        vec![AnnotationObject::new(0, 7, 0, PixelRect::new(0, 0, 1, 1))],
    );
    assert!(matches!(
        summary.build_record(),
        Err(FormatError::Records(_))
    ));
}

#[test]
fn test_version_parsing() {
    assert_eq!(SessionSummary::parse_version("0.1.0"), Some((0, 1, 0)));
    assert_eq!(SessionSummary::parse_version("10.20.30"), Some((10, 20, 30)));
    assert_eq!(SessionSummary::parse_version("invalid"), None);
    assert_eq!(SessionSummary::parse_version("1.2"), None);
    assert_eq!(SessionSummary::parse_version("1.2.3.4"), None);
}

#[test]
fn test_version_compatibility() {
    assert!(SessionSummary::is_version_compatible(
        SessionSummary::CURRENT_VERSION
    ));
    assert!(SessionSummary::is_version_compatible("0.1.7"));
    assert!(!SessionSummary::is_version_compatible("0.2.0"));
    assert!(!SessionSummary::is_version_compatible("1.0.0"));

    assert!(SessionSummary::is_version_readable("0.2.0"));
    assert!(!SessionSummary::is_version_readable("1.0.0"));
}

#[test]
fn test_incompatible_version_rejected() {
    let mut summary = SessionSummary::new(SessionConfig::default(), Vec::new());
    summary.version = "3.0.0".to_string();
    let json = summary.to_json().unwrap();
    assert!(matches!(
        SessionSummary::from_json(&json),
        Err(FormatError::VersionMismatch { .. })
    ));
}

#[test]
fn test_other_minor_version_loads() {
    let mut summary = SessionSummary::new(SessionConfig::default(), Vec::new());
    summary.version = "0.9.0".to_string();
    let json = summary.to_json().unwrap();
    let loaded = SessionSummary::from_json(&json).unwrap();
    assert_eq!(loaded.version, "0.9.0");
}

#[test]
fn test_invalid_json() {
    assert!(matches!(
        SessionSummary::from_json("{ not json"),
        Err(FormatError::Json(_))
    ));
}

#[test]
fn test_save_and_load_file() {
    let dir = std::env::temp_dir().join(format!("pxlabel-summary-{}", std::process::id()));
    let path = dir.join("nested").join("summary.json");

    let session = create_painted_session();
    let summary = SessionSummary::capture(&session, &SessionConfig::default());
    summary.save(&path).unwrap();
    let loaded = SessionSummary::load(&path).unwrap();
    assert_eq!(loaded, summary);

    std::fs::remove_dir_all(&dir).unwrap();
}
