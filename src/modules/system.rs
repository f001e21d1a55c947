use std::io::Write;

use anyhow::Result;

use super::{dump_file, run_command};
use crate::registry::DebugModule;

/// General OS state: kernel identification, uptime, and the full sysctl
/// tree.
pub struct SystemModule;

impl DebugModule for SystemModule {
    fn name(&self) -> &str {
        "system"
    }

    fn option(&self) -> Option<char> {
        Some('y')
    }

    fn help(&self) -> &str {
        "Dump system configuration and sysctls"
    }

    fn directory(&self) -> Option<&str> {
        Some("system")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "uname", &["-a"])?;
        run_command(out, "uptime", &[])?;
        run_command(out, "date", &[])?;
        run_command(out, "env", &[])?;
        dump_file(out, "/etc/version")?;
        run_command(out, "sysctl", &["-a"])?;
        Ok(())
    }
}
