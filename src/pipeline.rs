//! The collection pipeline.
//!
//! Parse has already happened by the time [`run`] is called; the pipeline
//! walks the remaining stages of the run: purge, prepare, select, execute,
//! finalize. Modules execute strictly one at a time in allocation order,
//! since several of them issue slow network queries and count on being
//! alone on the host to keep the total elapsed time predictable.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use log::{info, warn};
use sysinfo::{System, SystemExt};

use crate::archive;
use crate::cli::Invocation;
use crate::constants::{DUMP_FILE_NAME, EXIT_USAGE, OSINFO_FILE_NAME};
use crate::errors::DebugError;
use crate::notify;
use crate::options::{Binding, OptionTable};
use crate::output::Tee;
use crate::registry::Registry;

/// Drive one collection run against `staging_root`. Returns the process
/// exit code.
///
/// Failure semantics: any filesystem error touching the staging root itself
/// aborts before a single module executes; a failing module only taints its
/// own output file; archiving or mail trouble after collection is logged
/// and the staging tree kept for manual retrieval.
pub fn run(
    registry: &Registry,
    table: &OptionTable,
    invocation: &Invocation,
    staging_root: &Path,
) -> Result<i32, DebugError> {
    // -Z wins over everything else on the command line.
    if invocation.purge {
        purge(staging_root)?;
        return Ok(EXIT_USAGE);
    }

    prepare(staging_root)?;

    let selected = select(table, invocation);
    info!(
        "collecting {} of {} modules into {}",
        selected.len(),
        table.len(),
        staging_root.display()
    );

    for (position, binding) in selected.iter().enumerate() {
        println!("{}", progress_line(position, table.len(), &binding.help));
        execute(registry, binding, staging_root);
    }

    finalize(invocation, staging_root);
    Ok(0)
}

/// Progress line printed before the `position`-th selected module
/// (0-based).
///
/// The percentage is divided across the full allocated option count, not
/// the selection, so partial runs report small percentages; the
/// middleware's progress parser relies on that denominator staying put.
fn progress_line(position: usize, total_options: usize, help: &str) -> String {
    let percent = (position + 1) * 100 / total_options.max(1);
    format!("**  {percent}%: {help}")
}

/// Remove the staging tree from a previous run, if any.
fn purge(staging_root: &Path) -> Result<(), DebugError> {
    if staging_root.exists() {
        fs::remove_dir_all(staging_root).map_err(|e| DebugError::StagingIo {
            path: staging_root.display().to_string(),
            source: e,
        })?;
        info!("removed staging directory {}", staging_root.display());
    }
    Ok(())
}

/// Clear any stale staging root, recreate it, and write the system header.
fn prepare(staging_root: &Path) -> Result<(), DebugError> {
    let staging_io = |e: io::Error| DebugError::StagingIo {
        path: staging_root.display().to_string(),
        source: e,
    };

    if staging_root.exists() {
        fs::remove_dir_all(staging_root).map_err(staging_io)?;
    }
    fs::create_dir_all(staging_root).map_err(staging_io)?;

    let mut osinfo = File::create(staging_root.join(OSINFO_FILE_NAME)).map_err(staging_io)?;
    write_osinfo(&mut osinfo).map_err(staging_io)?;
    Ok(())
}

/// System header captured at the staging root before any module runs.
fn write_osinfo(out: &mut dyn Write) -> io::Result<()> {
    let system = System::new_all();
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    let load = system.load_average();

    writeln!(out, "hostname: {host}")?;
    writeln!(out, "os: {}", system.name().unwrap_or_default())?;
    writeln!(out, "release: {}", system.os_version().unwrap_or_default())?;
    writeln!(out, "kernel: {}", system.kernel_version().unwrap_or_default())?;
    writeln!(out, "uptime: {}s", system.uptime())?;
    writeln!(out, "load: {:.2} {:.2} {:.2}", load.one, load.five, load.fifteen)?;
    writeln!(out, "generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S %z"))?;
    Ok(())
}

/// Pick the bindings to execute, in allocation order.
///
/// `-A` takes every module that captures output except the manual-only
/// ones, which are keyed off module identity so a reassigned option
/// character can never let one slip into a bulk run. Explicit flags always
/// win, manual-only and console-only modules included.
fn select<'a>(table: &'a OptionTable, invocation: &Invocation) -> Vec<&'a Binding> {
    table
        .bindings()
        .iter()
        .filter(|b| {
            if invocation.all {
                (b.directory.is_some() && !b.manual_only)
                    || invocation.selected.contains(&b.option)
            } else {
                invocation.selected.contains(&b.option)
            }
        })
        .collect()
}

/// Run one module, teeing its output to the console and its dump file.
///
/// Nothing here propagates: a module that cannot even get its output
/// directory created is logged and skipped, and a collection error is
/// captured in the output it already produced.
fn execute(registry: &Registry, binding: &Binding, staging_root: &Path) {
    let module = &registry.modules()[binding.module];
    let stdout = io::stdout();
    let mut console = stdout.lock();

    match &binding.directory {
        Some(dir) => {
            let module_dir = staging_root.join(dir);
            let dump = fs::create_dir_all(&module_dir)
                .and_then(|_| File::create(module_dir.join(DUMP_FILE_NAME)));
            let mut dump = match dump {
                Ok(f) => f,
                Err(e) => {
                    warn!("module {}: cannot open output file: {e}", binding.name);
                    return;
                }
            };
            let mut sink = Tee::new(&mut console, &mut dump);
            if let Err(e) = module.collect(&mut sink) {
                warn!("module {} failed: {e:#}", binding.name);
                let _ = writeln!(sink, "[module {} failed: {e:#}]", binding.name);
            }
            let _ = sink.flush();
        }
        None => {
            // Console-only module, nothing to capture.
            if let Err(e) = module.collect(&mut console) {
                warn!("module {} failed: {e:#}", binding.name);
            }
        }
    }
}

/// Archive and mail the bundle when recipients were given; otherwise leave
/// the staging tree for the external crash-report packager.
fn finalize(invocation: &Invocation, staging_root: &Path) {
    if invocation.recipients.is_empty() {
        info!("staging directory left at {}", staging_root.display());
        return;
    }

    let archive_path = match archive::archive(staging_root) {
        Ok(p) => p,
        Err(e) => {
            warn!("failed to archive {}: {e:#}", staging_root.display());
            return;
        }
    };

    let body = format!(
        "Debug bundle collected from this host.\r\n\r\nGenerated by: {}\r\n",
        invocation.cmdline
    );
    if let Err(e) = notify::notify(&invocation.recipients, &body, &archive_path) {
        warn!(
            "mail delivery failed: {e:#}; archive kept at {}",
            archive_path.display()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_run_keeps_the_full_option_denominator() {
        // Selecting 1 of 4 allocated options reports 25%, not 100%.
        assert_eq!(progress_line(0, 4, "Dump ZFS configuration"),
                   "**  25%: Dump ZFS configuration");
        assert_eq!(progress_line(0, 8, "Dump SMB configuration"),
                   "**  12%: Dump SMB configuration");
    }

    #[test]
    fn test_progress_walks_the_option_count() {
        let lines: Vec<String> = (0..4)
            .map(|i| progress_line(i, 4, "help text"))
            .collect();
        assert_eq!(lines[0], "**  25%: help text");
        assert_eq!(lines[1], "**  50%: help text");
        assert_eq!(lines[2], "**  75%: help text");
        assert_eq!(lines[3], "**  100%: help text");
    }

    #[test]
    fn test_progress_line_parses_like_the_middleware_does() {
        // Consumers split on ':' and read the trailing '%'-token of the
        // left half.
        let line = progress_line(2, 8, "Dump network configuration");
        assert!(line.starts_with("**"));
        let (left, help) = line.split_once(':').unwrap();
        let percent: u32 = left
            .split_whitespace()
            .last()
            .unwrap()
            .trim_end_matches('%')
            .parse()
            .unwrap();
        assert_eq!(percent, 37);
        assert_eq!(help.trim(), "Dump network configuration");
    }

    #[test]
    fn test_progress_line_with_no_options_does_not_divide_by_zero() {
        assert_eq!(progress_line(0, 0, "x"), "**  100%: x");
    }
}
