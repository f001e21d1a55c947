use std::io::Write;

use anyhow::Result;

use super::{dump_file, run_command};
use crate::registry::DebugModule;

/// Network state: interfaces, routing, sockets, neighbor cache, resolver.
pub struct NetworkModule;

impl DebugModule for NetworkModule {
    fn name(&self) -> &str {
        "network"
    }

    fn option(&self) -> Option<char> {
        Some('n')
    }

    fn help(&self) -> &str {
        "Dump network configuration"
    }

    fn directory(&self) -> Option<&str> {
        Some("network")
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        run_command(out, "ifconfig", &["-a"])?;
        run_command(out, "netstat", &["-rn"])?;
        run_command(out, "netstat", &["-an"])?;
        run_command(out, "arp", &["-an"])?;
        dump_file(out, "/etc/resolv.conf")?;
        dump_file(out, "/etc/hosts")?;
        Ok(())
    }
}
