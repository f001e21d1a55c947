use std::io::Write;

use anyhow::Result;

use super::run_command;
use crate::registry::DebugModule;

/// Hardware inventory: CPU, memory, PCI devices, and attached disks.
pub struct HardwareModule;

impl DebugModule for HardwareModule {
    fn name(&self) -> &str {
        "hardware"
    }

    fn option(&self) -> Option<char> {
        Some('h')
    }

    fn help(&self) -> &str {
        "Dump hardware configuration"
    }

    fn directory(&self) -> Option<&str> {
        Some("hardware")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "sysctl", &["hw.model", "hw.ncpu", "hw.physmem"])?;
        run_command(out, "dmidecode", &["-t", "system", "-t", "memory"])?;
        run_command(out, "pciconf", &["-lv"])?;
        run_command(out, "camcontrol", &["devlist", "-v"])?;
        run_command(out, "smartctl", &["--scan"])?;
        run_command(out, "dmesg", &[])?;
        Ok(())
    }
}
