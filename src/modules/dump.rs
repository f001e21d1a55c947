use std::io::Write;

use anyhow::Result;

use super::{dump_file, run_command};
use crate::registry::DebugModule;

/// Kernel crash dump and thread backtrace capture.
///
/// Walking the kernel stacks of every process stalls the host for long
/// enough to be disruptive, so this module is manual-only: `-A` skips it and
/// it runs only when its own flag is given.
pub struct DumpModule;

impl DebugModule for DumpModule {
    fn name(&self) -> &str {
        "dump"
    }

    fn option(&self) -> Option<char> {
        Some('d')
    }

    fn help(&self) -> &str {
        "Dump kernel crash data and process backtraces (expensive, manual only)"
    }

    fn directory(&self) -> Option<&str> {
        Some("dump")
    }

    fn manual_only(&self) -> bool {
        true
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "ls", &["-l", "/var/crash"])?;
        dump_file(out, "/var/crash/info.last")?;
        run_command(out, "procstat", &["-kka"])?;
        Ok(())
    }
}
