//! Option-character allocation.
//!
//! Each module gets a unique single-character CLI flag. Declared preferences
//! are advisory: a collision is resolved by probing the ordered alphabet
//! `a-z, A-Z, 0-9` for the first free character, so registering two modules
//! that both want `-s` never fails the run.

use std::collections::HashSet;

use crate::constants::{OPTION_ALPHABET, RESERVED_OPTIONS};
use crate::errors::DebugError;
use crate::registry::DebugModule;

/// One module's slot in the option table.
#[derive(Debug)]
pub struct Binding {
    /// Index into the registry's module list.
    pub module: usize,
    /// The character actually assigned, which may differ from the module's
    /// preference.
    pub option: char,
    pub name: String,
    pub help: String,
    pub directory: Option<String>,
    pub manual_only: bool,
}

/// Assignment of option characters to modules, in allocation order.
///
/// Allocation order is registry order, and it is also the execution order of
/// the pipeline.
#[derive(Debug)]
pub struct OptionTable {
    bindings: Vec<Binding>,
}

impl OptionTable {
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Look a binding up by assigned option character.
    pub fn get(&self, option: char) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.option == option)
    }

    /// All assigned characters, alphabet order, for usage text.
    pub fn option_string(&self) -> String {
        let mut chars: Vec<char> = self.bindings.iter().map(|b| b.option).collect();
        chars.sort_by_key(|c| alphabet_index(*c));
        chars.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

fn alphabet_index(c: char) -> usize {
    OPTION_ALPHABET
        .chars()
        .position(|a| a == c)
        .unwrap_or(usize::MAX)
}

/// Assign a unique option character to every module, in registry order.
///
/// A free preferred character is honored; otherwise the first unused
/// character of the alphabet is substituted. The meta-flag characters are
/// reserved and treated as permanently taken. Exhausting the alphabet fails
/// before any collection happens.
pub fn allocate(modules: &[Box<dyn DebugModule>]) -> Result<OptionTable, DebugError> {
    let mut taken: HashSet<char> = RESERVED_OPTIONS.iter().copied().collect();
    let mut bindings = Vec::with_capacity(modules.len());

    for (index, module) in modules.iter().enumerate() {
        let preferred = module
            .option()
            .filter(|c| c.is_ascii_alphanumeric() && !taken.contains(c));
        let option = match preferred {
            Some(c) => c,
            None => OPTION_ALPHABET
                .chars()
                .find(|c| !taken.contains(c))
                .ok_or(DebugError::AllocationExhausted {
                    modules: modules.len(),
                    available: OPTION_ALPHABET.len() - RESERVED_OPTIONS.len(),
                })?,
        };
        taken.insert(option);
        bindings.push(Binding {
            module: index,
            option,
            name: module.name().to_string(),
            help: module.help().to_string(),
            directory: module.directory().map(str::to_string),
            manual_only: module.manual_only(),
        });
    }

    Ok(OptionTable { bindings })
}
