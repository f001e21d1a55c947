use std::io::Write;

use anyhow::Result;

use super::{dump_file, run_command};
use crate::registry::DebugModule;

/// Boot loader tunables and loaded kernel modules.
pub struct LoaderModule;

impl DebugModule for LoaderModule {
    fn name(&self) -> &str {
        "loader"
    }

    fn option(&self) -> Option<char> {
        Some('l')
    }

    fn help(&self) -> &str {
        "Dump boot loader configuration"
    }

    fn directory(&self) -> Option<&str> {
        Some("loader")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        dump_file(out, "/boot/loader.conf")?;
        dump_file(out, "/boot/loader.conf.local")?;
        run_command(out, "kenv", &[])?;
        run_command(out, "kldstat", &["-v"])?;
        Ok(())
    }
}
