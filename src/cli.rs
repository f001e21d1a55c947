//! Command-line surface.
//!
//! The option set is not known at compile time: every registered module
//! contributes one boolean flag with its allocated character, so the clap
//! command is assembled at runtime from the option table. Three meta flags
//! are fixed: `-A` (bulk run), `-Z` (purge staging and exit) and `-e`
//! (mail recipients).

use clap::{Arg, ArgAction, Command};

use crate::errors::DebugError;
use crate::options::OptionTable;

/// A parsed invocation, ready for the pipeline.
#[derive(Debug)]
pub struct Invocation {
    /// Run every bulk-eligible module.
    pub all: bool,
    /// Delete the staging directory and exit without collecting.
    pub purge: bool,
    /// Mail recipients from `-e`, empty when no mail was requested.
    pub recipients: Vec<String>,
    /// Explicitly selected option characters, in allocation order.
    pub selected: Vec<char>,
    /// The exact command line, quoted into the mail body.
    pub cmdline: String,
}

/// Assemble the clap command for the current option table.
///
/// The automatic `-h` short flag is disabled so that `h` stays allocatable;
/// `--help` remains available.
pub fn build_command(table: &OptionTable) -> Command {
    let mut cmd = Command::new("freenas-debug")
        .about("Collect per-subsystem diagnostics into a debug bundle")
        .disable_help_flag(true)
        .arg(
            Arg::new("help")
                .long("help")
                .action(ArgAction::Help)
                .help("Print help"),
        )
        .arg(
            Arg::new("all")
                .short('A')
                .long("all")
                .action(ArgAction::SetTrue)
                .help("Run every module that captures output (expensive manual-only modules excluded)"),
        )
        .arg(
            Arg::new("purge")
                .short('Z')
                .long("purge")
                .action(ArgAction::SetTrue)
                .help("Remove the staging directory and exit"),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("ADDRS")
                .help("Mail the archived bundle to this comma-delimited recipient list"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        );

    for binding in table.bindings() {
        cmd = cmd.arg(
            Arg::new(module_arg_id(&binding.name))
                .short(binding.option)
                .action(ArgAction::SetTrue)
                .help(binding.help.clone()),
        );
    }

    cmd
}

/// Arg id for a module flag, namespaced so that a module name can never
/// collide with a meta-flag id (a plugin file may legally be called `email`
/// or `all`).
fn module_arg_id(name: &str) -> String {
    format!("module-{name}")
}

/// Parse `argv` against the table.
///
/// Unknown flags and empty selections are both usage errors: the rendered
/// usage text goes to stderr and the process exits 2, with no staging
/// directory touched.
pub fn parse<I, S>(table: &OptionTable, argv: I) -> Result<Invocation, DebugError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let argv: Vec<String> = argv.into_iter().map(Into::into).collect();
    let cmdline = argv.join(" ");

    let mut cmd = build_command(table);
    let usage = cmd.render_usage().to_string();
    let matches = cmd
        .try_get_matches_from(&argv)
        .map_err(|e| DebugError::Usage(e.render().to_string()))?;

    let all = matches.get_flag("all");
    let purge = matches.get_flag("purge");
    let recipients = matches
        .get_one::<String>("email")
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let selected: Vec<char> = table
        .bindings()
        .iter()
        .filter(|b| matches.get_flag(&module_arg_id(&b.name)))
        .map(|b| b.option)
        .collect();

    if !all && !purge && selected.is_empty() {
        return Err(DebugError::Usage(format!(
            "{usage}\n\nSelect at least one module (-{}), -A for all, or -Z to purge.",
            table.option_string()
        )));
    }

    Ok(Invocation {
        all,
        purge,
        recipients,
        selected,
        cmdline,
    })
}
