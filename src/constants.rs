//! Global constants for the freenas-debug dispatcher.
//!
//! This module centralizes all hardcoded values to improve maintainability
//! and make configuration changes easier.

/// Default staging directory for collected module output.
pub const DEFAULT_STAGING_ROOT: &str = "/var/tmp/fndebug";

/// Environment variable overriding the staging directory.
pub const STAGING_DIR_ENV: &str = "FREENAS_DEBUG_DIRECTORY";

/// Environment variable overriding the external module search path.
pub const MODULE_DIR_ENV: &str = "FREENAS_DEBUG_MODULEDIR";

/// Default module search path, relative to the executable's directory.
pub const DEFAULT_MODULE_DIR: &str = "../share/freenas-debug/modules";

/// File name for the per-module captured output.
pub const DUMP_FILE_NAME: &str = "dump.txt";

/// File name for the system header written at the staging root.
pub const OSINFO_FILE_NAME: &str = "osinfo.txt";

/// Extension of the final archive produced next to the staging root.
pub const ARCHIVE_EXTENSION: &str = "tgz";

/// Ordered option alphabet probed when a preferred character is taken.
pub const OPTION_ALPHABET: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Option characters reserved for the meta flags; never assigned to modules.
pub const RESERVED_OPTIONS: &[char] = &['A', 'Z', 'e'];

/// MIME content type of the mailed archive attachment.
pub const ARCHIVE_MIME_TYPE: &str = "application/x-gtar-compressed";

/// Column width for base64 lines in the MIME attachment body.
pub const MIME_BASE64_LINE_WIDTH: usize = 76;

/// Exit code for usage errors and meta-only invocations (`-Z`).
pub const EXIT_USAGE: i32 = 2;

/// Exit code when a termination signal aborts the run.
pub const EXIT_SIGNAL: i32 = 3;
