//! Error types for the configuration store.

use thiserror::Error;

/// Errors that can occur during configuration store operations.
#[derive(Debug, Error)]
pub enum ConfdbError {
    /// The version already exists for this entity; the stored record is
    /// left untouched.
    #[error("Version {version} of '{entity}' already exists; corrections must use a new version")]
    VersionExists {
        /// Entity type.
        entity: String,
        /// Conflicting version.
        version: u32,
    },

    /// No record stored for this entity/version.
    #[error("No version {version} stored for '{entity}'")]
    NotFound {
        /// Entity type.
        entity: String,
        /// Requested version.
        version: u32,
    },

    /// The entity has no versions at all.
    #[error("No versions stored for '{entity}'")]
    NoVersions {
        /// Entity type.
        entity: String,
    },

    /// Entity names become directory names; path characters are rejected.
    #[error("Invalid entity name: '{name}'")]
    InvalidEntity {
        /// Offending name.
        name: String,
    },

    /// IO error.
    #[error("IO error: {source}")]
    Io {
        /// Source IO error.
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {source}")]
    Json {
        /// Source JSON error.
        #[from]
        source: serde_json::Error,
    },
}

/// Result type for configuration store operations.
pub type ConfdbResult<T> = Result<T, ConfdbError>;
