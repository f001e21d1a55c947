use std::io::Write;

use anyhow::Result;

use super::{dump_file, run_command};
use crate::registry::DebugModule;

/// Active Directory / LDAP client state.
///
/// The winbind queries go over the network to the domain controller, which
/// is the slowest part of a bulk run; they rely on the pipeline executing
/// modules one at a time.
pub struct DirectoryServiceModule;

impl DebugModule for DirectoryServiceModule {
    fn name(&self) -> &str {
        "directoryservice"
    }

    fn option(&self) -> Option<char> {
        Some('a')
    }

    fn help(&self) -> &str {
        "Dump Active Directory/LDAP configuration"
    }

    fn directory(&self) -> Option<&str> {
        Some("directoryservice")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "wbinfo", &["-t"])?;
        run_command(out, "wbinfo", &["--online-status"])?;
        run_command(out, "wbinfo", &["-u"])?;
        run_command(out, "wbinfo", &["-g"])?;
        run_command(out, "net", &["ads", "info"])?;
        run_command(out, "klist", &[])?;
        dump_file(out, "/etc/krb5.conf")?;
        dump_file(out, "/etc/nsswitch.conf")?;
        Ok(())
    }
}
