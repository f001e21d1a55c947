use std::io::Write;

use anyhow::Result;

use super::run_command;
use crate::registry::DebugModule;

/// ZFS pool and dataset state.
///
/// `zpool history` can be slow on long-lived pools but is bounded; this is
/// still cheap enough for unattended bulk runs, unlike the crash-dump module.
pub struct ZfsModule;

impl DebugModule for ZfsModule {
    fn name(&self) -> &str {
        "zfs"
    }

    fn option(&self) -> Option<char> {
        Some('z')
    }

    fn help(&self) -> &str {
        "Dump ZFS configuration"
    }

    fn directory(&self) -> Option<&str> {
        Some("zfs")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "zpool", &["status", "-v"])?;
        run_command(out, "zpool", &["list"])?;
        run_command(out, "zpool", &["get", "all"])?;
        run_command(out, "zfs", &["list", "-o", "name,used,avail,refer,mountpoint"])?;
        run_command(out, "zfs", &["get", "-s", "local", "all"])?;
        run_command(out, "zpool", &["history"])?;
        Ok(())
    }
}
