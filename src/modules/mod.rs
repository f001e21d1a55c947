//! Built-in diagnostic modules.
//!
//! Each module is a thin wrapper over the system tools for one subsystem:
//! it runs a fixed sequence of commands and file dumps, writing everything
//! into the sink the pipeline hands it. Missing tools are reported inline
//! in the captured output instead of failing the module, so a bundle from a
//! stripped-down host still contains every section.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use log::debug;

mod directoryservice;
mod dump;
mod hardware;
mod loader;
mod network;
mod smb;
mod system;
mod zfs;

pub use directoryservice::DirectoryServiceModule;
pub use dump::DumpModule;
pub use hardware::HardwareModule;
pub use loader::LoaderModule;
pub use network::NetworkModule;
pub use smb::SmbModule;
pub use system::SystemModule;
pub use zfs::ZfsModule;

use crate::registry::DebugModule;

/// The compiled-in module set, in registration order.
pub fn builtin_modules() -> Vec<Box<dyn DebugModule>> {
    vec![
        Box::new(SystemModule),
        Box::new(HardwareModule),
        Box::new(NetworkModule),
        Box::new(ZfsModule),
        Box::new(SmbModule),
        Box::new(DirectoryServiceModule),
        Box::new(LoaderModule),
        Box::new(DumpModule),
    ]
}

/// Write a section banner into the captured output.
pub(crate) fn section(out: &mut dyn Write, title: &str) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "-".repeat(60))?;
    writeln!(out, "{title}")?;
    writeln!(out, "{}", "-".repeat(60))?;
    Ok(())
}

/// Run one external command and capture its combined stdout/stderr.
///
/// A binary absent from PATH or a non-zero exit is noted inline; only a
/// write error on the sink itself fails the caller.
pub(crate) fn run_command(out: &mut dyn Write, program: &str, args: &[&str]) -> Result<()> {
    section(out, &format!("{program} {}", args.join(" ")))?;

    if which::which(program).is_err() {
        writeln!(out, "{program}: command not found")?;
        return Ok(());
    }

    match Command::new(program).args(args).output() {
        Ok(output) => {
            out.write_all(&output.stdout)
                .context("failed to write captured stdout")?;
            out.write_all(&output.stderr)
                .context("failed to write captured stderr")?;
            if !output.status.success() {
                writeln!(out, "[{program} exited with {}]", output.status)?;
            }
        }
        Err(e) => {
            debug!("{program} failed to spawn: {e}");
            writeln!(out, "{program}: failed to run: {e}")?;
        }
    }
    Ok(())
}

/// Copy a configuration file into the captured output.
pub(crate) fn dump_file(out: &mut dyn Write, path: &str) -> Result<()> {
    section(out, path)?;
    match fs::read_to_string(Path::new(path)) {
        Ok(contents) => write!(out, "{contents}")?,
        Err(e) => writeln!(out, "{path}: {e}")?,
    }
    Ok(())
}
