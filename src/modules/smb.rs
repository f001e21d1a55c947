use std::io::Write;

use anyhow::Result;

use super::{dump_file, run_command};
use crate::registry::DebugModule;

/// Samba state: build options, effective configuration, live sessions.
pub struct SmbModule;

impl DebugModule for SmbModule {
    fn name(&self) -> &str {
        "smb"
    }

    fn option(&self) -> Option<char> {
        Some('s')
    }

    fn help(&self) -> &str {
        "Dump SMB configuration"
    }

    fn directory(&self) -> Option<&str> {
        Some("smb")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "smbd", &["--version"])?;
        run_command(out, "smbd", &["-b"])?;
        run_command(out, "testparm", &["-s"])?;
        run_command(out, "smbstatus", &[])?;
        run_command(out, "net", &["conf", "list"])?;
        dump_file(out, "/usr/local/etc/smb4.conf")?;
        Ok(())
    }
}
