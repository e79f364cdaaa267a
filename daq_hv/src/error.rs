//! Error types for high-voltage control.

use thiserror::Error;

/// Errors that can occur during HV control operations.
#[derive(Debug, Error)]
pub enum HvError {
    /// Input line did not start with a known verb.
    #[error("Unknown command: '{text}' (try 'help')")]
    BadCommand {
        /// Offending verb text.
        text: String,
    },

    /// Channel address did not parse.
    #[error("Bad channel address '{text}': {reason}")]
    BadAddress {
        /// Offending address text.
        text: String,
        /// What was wrong.
        reason: String,
    },

    /// A required argument was missing from the command line.
    #[error("Missing argument: {what}")]
    MissingArgument {
        /// Description of the missing argument.
        what: &'static str,
    },

    /// Parameter name not known to either Info or Status.
    #[error("Unknown parameter: '{name}'")]
    UnknownParam {
        /// Offending parameter name.
        name: String,
    },

    /// Parameter value did not parse.
    #[error("Bad value '{value}' for parameter '{param}'")]
    BadValue {
        /// Parameter name.
        param: String,
        /// Offending value text.
        value: String,
    },

    /// Attempt to set a measured (read-only) parameter.
    #[error("Parameter '{name}' is measured; it cannot be set")]
    ReadOnlyParam {
        /// Offending parameter name.
        name: String,
    },

    /// The address matched no existing channel at all.
    #[error("Address '{address}' matched no channel")]
    NoMatch {
        /// The address as given.
        address: String,
    },

    /// Some addressed channels failed; the rest were still attempted.
    #[error("{failed} of {total} addressed channels failed", total = .failed + .applied)]
    BatchFailed {
        /// Channels whose handler failed (or that did not exist).
        failed: usize,
        /// Channels whose handler succeeded.
        applied: usize,
    },

    /// A recalled snapshot does not fit the current crate grid.
    #[error("Snapshot for crate {crate_id} does not match its {slots}x{channels} grid")]
    TopologyMismatch {
        /// Crate id.
        crate_id: u32,
        /// Configured slot count.
        slots: u32,
        /// Configured channels per slot.
        channels: u32,
    },

    /// No stored snapshot carries this version.
    #[error("No saved configuration with version {version}")]
    NoSuchVersion {
        /// Requested version.
        version: u32,
    },

    /// `recall`/`list` found nothing saved at all.
    #[error("Nothing saved yet")]
    NothingSaved,

    /// Configuration store failure.
    #[error(transparent)]
    Confdb(#[from] daq_confdb::ConfdbError),
}

/// Result type for HV control operations.
pub type HvResult<T> = Result<T, HvError>;
