//! Executable plugin modules.
//!
//! A plugin is a single executable in the module directory. It is queried
//! once per capability at load time with an argv[1] verb (`option`, `help`,
//! `directory`), each answered with one line on stdout, and run with
//! `collect`, which writes the diagnostic text to stdout/stderr.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use log::debug;

use super::DebugModule;
use crate::errors::DebugError;

/// A discovered plugin executable, with its capability answers cached at
/// load time.
#[derive(Debug)]
pub struct ExternalModule {
    name: String,
    path: PathBuf,
    option: Option<char>,
    help: String,
    directory: Option<String>,
}

impl ExternalModule {
    /// Query the plugin's capabilities and wrap it as a module.
    ///
    /// A failed or empty `help` answer is a fatal misconfiguration, as is a
    /// `directory` answer that would escape the staging root.
    pub fn load(name: String, path: &Path) -> Result<Self, DebugError> {
        let help = match query(path, "help") {
            Ok(Some(text)) => text,
            Ok(None) => {
                return Err(DebugError::ModuleMisconfigured {
                    name,
                    reason: "help query printed nothing".to_string(),
                })
            }
            Err(e) => {
                return Err(DebugError::ModuleMisconfigured {
                    name,
                    reason: format!("help query failed: {e}"),
                })
            }
        };

        let option = match query(path, "option") {
            Ok(Some(text)) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphanumeric() => Some(c),
                    _ => {
                        return Err(DebugError::ModuleMisconfigured {
                            name,
                            reason: format!("option query answered {text:?}, want one alphanumeric character"),
                        })
                    }
                }
            }
            _ => None,
        };

        let directory = match query(path, "directory") {
            Ok(Some(dir)) => {
                if dir.contains(&['/', '\\'][..]) || dir == ".." || dir == "." {
                    return Err(DebugError::ModuleMisconfigured {
                        name,
                        reason: format!("directory {dir:?} is not a plain relative name"),
                    });
                }
                Some(dir)
            }
            _ => None,
        };

        debug!(
            "loaded external module {name} from {} (option {:?}, directory {:?})",
            path.display(),
            option,
            directory
        );

        Ok(ExternalModule {
            name,
            path: path.to_path_buf(),
            option,
            help,
            directory,
        })
    }
}

impl DebugModule for ExternalModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn option(&self) -> Option<char> {
        self.option
    }

    fn help(&self) -> &str {
        &self.help
    }

    fn directory(&self) -> Option<&str> {
        self.directory.as_deref()
    }

    fn collect(&self, out: &mut dyn Write) -> Result<()> {
        let output = Command::new(&self.path)
            .arg("collect")
            .output()
            .with_context(|| format!("failed to run {}", self.path.display()))?;
        out.write_all(&output.stdout)?;
        out.write_all(&output.stderr)?;
        if !output.status.success() {
            anyhow::bail!("{} collect exited with {}", self.name, output.status);
        }
        Ok(())
    }
}

/// Run one capability query, returning the first stdout line.
///
/// `Ok(None)` means the plugin answered with an empty line; the caller
/// decides whether that capability is required.
fn query(path: &Path, verb: &str) -> Result<Option<String>> {
    let output = Command::new(path)
        .arg(verb)
        .output()
        .with_context(|| format!("failed to run {}", path.display()))?;
    if !output.status.success() {
        anyhow::bail!("{verb} query exited with {}", output.status);
    }
    let text = String::from_utf8_lossy(&output.stdout);
    let line = text.lines().next().unwrap_or("").trim().to_string();
    if line.is_empty() {
        Ok(None)
    } else {
        Ok(Some(line))
    }
}

#[cfg(unix)]
pub(super) fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub(super) fn is_executable(_path: &Path) -> bool {
    true
}
