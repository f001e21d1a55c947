use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use log::{debug, error, warn, LevelFilter};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use freenas_debug::constants::{
    DEFAULT_STAGING_ROOT, EXIT_SIGNAL, MODULE_DIR_ENV, STAGING_DIR_ENV,
};
use freenas_debug::errors::DebugError;
use freenas_debug::registry::{self, Registry};
use freenas_debug::{cli, options, pipeline};

fn main() {
    let argv: Vec<String> = env::args().collect();

    // The logger has to come up before the option table exists, so the
    // verbose flag is peeked from argv rather than parsed.
    let verbose = argv.iter().any(|a| a == "--verbose");
    if let Err(e) = initialize_logging(verbose) {
        eprintln!("freenas-debug: {e:#}");
        process::exit(1);
    }

    install_signal_handlers();

    let code = match run(&argv) {
        Ok(code) => code,
        Err(e) if e.is_usage() => {
            eprintln!("{e}");
            e.exit_code()
        }
        Err(e) => {
            error!("{e}");
            e.exit_code()
        }
    };
    process::exit(code);
}

fn run(argv: &[String]) -> Result<i32, DebugError> {
    let mut registry = Registry::builtin();
    if let Some(dir) = registry::module_dir() {
        let explicit = env::var(MODULE_DIR_ENV).map_or(false, |v| !v.is_empty());
        if explicit && !dir.exists() {
            warn!(
                "{MODULE_DIR_ENV} points at {}, which does not exist",
                dir.display()
            );
        }
        let loaded = registry.discover(&dir)?;
        if loaded > 0 {
            debug!("loaded {loaded} external modules from {}", dir.display());
        }
    }

    let table = options::allocate(registry.modules())?;
    let invocation = cli::parse(&table, argv.iter().cloned())?;

    pipeline::run(&registry, &table, &invocation, &staging_root())
}

/// Initialize logging with the specified verbosity level
fn initialize_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        log_level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .context("Failed to initialize logger")?;
    Ok(())
}

/// Staging directory for this run: `FREENAS_DEBUG_DIRECTORY` if set,
/// otherwise the fixed default.
fn staging_root() -> PathBuf {
    match env::var(STAGING_DIR_ENV) {
        Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => PathBuf::from(DEFAULT_STAGING_ROOT),
    }
}

/// A termination signal exits with a fixed non-success code instead of
/// letting a half-written bundle look complete.
#[cfg(unix)]
fn install_signal_handlers() {
    extern "C" fn abort_run(_sig: libc::c_int) {
        unsafe { libc::_exit(EXIT_SIGNAL) }
    }
    unsafe {
        libc::signal(libc::SIGINT, abort_run as libc::sighandler_t);
        libc::signal(libc::SIGTERM, abort_run as libc::sighandler_t);
    }
}

#[cfg(not(unix))]
fn install_signal_handlers() {}
