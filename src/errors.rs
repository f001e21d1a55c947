use std::io;

use thiserror::Error;

use crate::constants::EXIT_USAGE;

/// Fatal error classes that abort a collection run.
///
/// Everything outside this taxonomy degrades gracefully: a failing module
/// has its error captured in its own output file, and a mail delivery
/// failure leaves the archive on disk without failing the run.
#[derive(Debug, Error)]
pub enum DebugError {
    /// Malformed or absent command-line selection. The string is the
    /// rendered usage text, printed to stderr by the caller.
    #[error("{0}")]
    Usage(String),

    /// More modules than free option characters.
    #[error("option space exhausted: {modules} modules registered, {available} option characters available")]
    AllocationExhausted { modules: usize, available: usize },

    /// The staging root could not be created or cleared.
    #[error("staging directory {path}: {source}")]
    StagingIo {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A discovered module does not honor the plugin contract.
    #[error("module {name}: {reason}")]
    ModuleMisconfigured { name: String, reason: String },

    /// The module search path exists but cannot be read.
    #[error("module directory {path}: {source}")]
    ModuleDirUnreadable {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl DebugError {
    /// Process exit code for this error class.
    pub fn exit_code(&self) -> i32 {
        match self {
            DebugError::Usage(_) => EXIT_USAGE,
            _ => 1,
        }
    }

    /// Usage errors are printed bare, without the log prefix.
    pub fn is_usage(&self) -> bool {
        matches!(self, DebugError::Usage(_))
    }
}
