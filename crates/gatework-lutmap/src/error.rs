//! Error types for the LUT mapping pass.
//!
//! Skips (behavioral units, zero-output fragments) are not errors and never
//! appear here; everything below aborts the whole run. Units reintegrated
//! before the abort stay reintegrated.

use thiserror::Error;

/// Errors that abort a mapping run.
#[derive(Debug, Error)]
pub enum MapError {
    /// Only part of a selected module is covered by the selection
    #[error("module {0} is only partially selected; mapping needs whole modules")]
    PartialSelection(String),

    /// A unit reached the map stage without decomposition metadata
    #[error("module {0} carries no decomposition id; run the `pre` stage first")]
    Unprepared(String),

    /// A box module ended up in the mapping selection
    #[error("box module {0} cannot be mapped")]
    BoxInSelection(String),

    /// The external engine could not be started
    #[error("failed to launch engine `{program}`")]
    EngineSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external engine exited abnormally
    #[error("engine `{program}` failed with {status}")]
    EngineFailed {
        program: String,
        status: std::process::ExitStatus,
    },

    /// Unique-name retries were exhausted while creating a workspace
    #[error("could not create a unique temp workspace from `{template}`")]
    WorkspaceCollision { template: String },

    /// An unknown label was given for the stage window
    #[error("unknown stage label `{0}`")]
    UnknownStage(String),

    /// A delegated design operation failed
    #[error("{op} failed: {message}")]
    Op { op: String, message: String },

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for mapping operations.
pub type Result<T> = std::result::Result<T, MapError>;
