//! Session summary: configuration plus every record of an annotated file.
//!
//! # Versioning
//!
//! The summary uses semantic versioning (MAJOR.MINOR.PATCH). Version 0.x.x
//! files are unstable: only files with the same minor version are fully
//! compatible, other 0.x files are read with a warning.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{SessionConfig, SourceInfo};
use crate::format::error::FormatError;
use crate::model::{AnnotationObject, ClassCatalog};
use crate::record::AnnotationRecord;
use crate::session::AnnotationSession;

/// Everything needed to restore the records of an annotated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Format version for compatibility checking.
    pub version: String,

    /// The annotated file, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceInfo>,

    /// Configuration in effect when the session was saved.
    pub configuration: SessionConfig,

    /// Every record, in storage order.
    pub records: Vec<AnnotationObject>,
}

impl SessionSummary {
    /// Current version of the summary format.
    pub const CURRENT_VERSION: &'static str = "0.1.0";

    /// Major version number for compatibility checking.
    pub const VERSION_MAJOR: u32 = 0;

    /// Minor version number.
    pub const VERSION_MINOR: u32 = 1;

    pub fn new(configuration: SessionConfig, records: Vec<AnnotationObject>) -> Self {
        Self {
            version: Self::CURRENT_VERSION.to_string(),
            source: None,
            configuration,
            records,
        }
    }

    /// Capture the state of a session.
    ///
    /// The class list is taken from the session, so classes added while
    /// annotating are saved too.
    pub fn capture(session: &AnnotationSession, config: &SessionConfig) -> Self {
        let mut configuration = config.clone();
        configuration.classes = session
            .catalog()
            .iter()
            .map(|(_, class)| class.clone())
            .collect();
        Self {
            source: session.source().cloned(),
            ..Self::new(configuration, session.record().records().to_vec())
        }
    }

    /// Class catalog described by the saved configuration.
    pub fn catalog(&self) -> ClassCatalog {
        self.configuration.catalog()
    }

    /// Rebuild a record store, rejecting records of unknown classes.
    pub fn build_record(&self) -> Result<AnnotationRecord, FormatError> {
        let mut record = AnnotationRecord::with_class_capacity(self.configuration.classes.len());
        record.replace_all(self.records.iter().copied())?;
        Ok(record)
    }

    /// Load the saved records into `session`.
    pub fn restore_into(&self, session: &mut AnnotationSession) -> Result<(), FormatError> {
        session.load_records(self.records.iter().copied())?;
        Ok(())
    }

    /// Parse a version string into (major, minor, patch) components.
    ///
    /// Returns None if the version string is invalid.
    pub fn parse_version(version: &str) -> Option<(u32, u32, u32)> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        let patch = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some((major, minor, patch))
    }

    /// Check if a version is compatible with the current version.
    ///
    /// For version 0.x.x (unstable), only exact minor version matches are compatible.
    /// For version 1.x.x+, any file with the same major version is compatible.
    pub fn is_version_compatible(file_version: &str) -> bool {
        let Some((file_major, file_minor, _)) = Self::parse_version(file_version) else {
            return false;
        };

        if Self::VERSION_MAJOR == 0 {
            file_major == 0 && file_minor == Self::VERSION_MINOR
        } else {
            file_major == Self::VERSION_MAJOR
        }
    }

    /// Check if we can attempt to read a file of this version.
    pub fn is_version_readable(file_version: &str) -> bool {
        Self::parse_version(file_version)
            .is_some_and(|(file_major, _, _)| file_major == Self::VERSION_MAJOR)
    }

    pub fn to_json(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a summary, checking its version.
    pub fn from_json(json: &str) -> Result<Self, FormatError> {
        let summary: Self = serde_json::from_str(json)?;

        if !Self::is_version_readable(&summary.version) {
            return Err(FormatError::VersionMismatch {
                expected: Self::CURRENT_VERSION.to_string(),
                found: summary.version,
            });
        }

        if !Self::is_version_compatible(&summary.version) {
            log::warn!(
                "Summary version {} may not be fully compatible with current version {} \
                 (version 0.x.x is unstable - format may have changed)",
                summary.version,
                Self::CURRENT_VERSION
            );
        }

        Ok(summary)
    }

    /// Write the summary, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), FormatError> {
        log::info!("Saving {} records to {:?}", self.records.len(), path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let json = std::fs::read_to_string(path)?;
        let summary = Self::from_json(&json)?;
        log::info!(
            "Loaded {} records from {:?} (format version {})",
            summary.records.len(),
            path,
            summary.version
        );
        Ok(summary)
    }
}
