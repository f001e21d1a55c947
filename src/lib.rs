//! # freenas-debug
//!
//! Diagnostic bundle collector for NAS hosts.
//!
//! A set of pluggable "modules", one per subsystem (ZFS, SMB, directory
//! services, networking, ...), each dumps its diagnostics into a staging
//! directory tree. The dispatcher assigns every module a unique
//! single-character CLI flag at startup, runs the selected modules strictly
//! sequentially with per-module failure isolation, and can pack the tree
//! into a gzip-compressed tar and mail it as a MIME attachment.
//!
//! ## Overview
//!
//! ```no_run
//! use freenas_debug::registry::Registry;
//! use freenas_debug::{cli, options, pipeline};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), freenas_debug::errors::DebugError> {
//! let registry = Registry::builtin();
//! let table = options::allocate(registry.modules())?;
//! let invocation = cli::parse(&table, ["freenas-debug", "-A"])?;
//! let code = pipeline::run(&registry, &table, &invocation, Path::new("/var/tmp/fndebug"))?;
//! # std::process::exit(code);
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`registry`]: the module contract, registration, and plugin discovery
//! - [`modules`]: the compiled-in per-subsystem collectors
//! - [`options`]: option-character allocation
//! - [`cli`]: runtime-built command line and parsing
//! - [`pipeline`]: the purge/prepare/select/execute/finalize state machine
//! - [`output`]: console-plus-file stream duplication
//! - [`archive`]: staging tree packaging
//! - [`notify`]: MIME mail delivery of the archive
//! - [`errors`]: the fatal error taxonomy and exit codes
//! - [`constants`]: application-wide constants

/// Runtime-built command line and parsing
pub mod cli;

/// Application constants and configuration values
pub mod constants;

/// Fatal error taxonomy and exit-code mapping
pub mod errors;

/// Compiled-in per-subsystem diagnostic collectors
pub mod modules;

/// Option-character allocation
pub mod options;

/// Console-plus-file stream duplication
pub mod output;

/// The collection state machine
pub mod pipeline;

/// Module contract, registration, and plugin discovery
pub mod registry;

/// Staging tree packaging
pub mod archive;

/// MIME mail delivery of the archived bundle
pub mod notify;
