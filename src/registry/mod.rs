//! Module registration and discovery.
//!
//! The original dispatcher sourced shell fragments into a shared namespace;
//! here each diagnostic collector is an explicit [`DebugModule`] value held
//! by a [`Registry`]. Built-in modules are compiled in; external plugins are
//! discovered from a directory and driven over a small query protocol.

use std::collections::HashSet;
use std::env;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use log::debug;

use crate::constants::{DEFAULT_MODULE_DIR, MODULE_DIR_ENV};
use crate::errors::DebugError;

mod external;

pub use external::ExternalModule;

/// A diagnostic collector contributing one section of the debug bundle.
///
/// Modules are stateless across runs; the registry is rebuilt on every
/// invocation.
pub trait DebugModule {
    /// Unique module identity. Bulk-run exclusions and idempotent
    /// registration are keyed off this, never off the assigned option
    /// character.
    fn name(&self) -> &str;

    /// Preferred command-line option character. `None` leaves the choice
    /// entirely to the allocator; a taken preference is reassigned.
    fn option(&self) -> Option<char>;

    /// One-line description shown in usage text and progress output.
    fn help(&self) -> &str;

    /// Relative output directory under the staging root. `None` means the
    /// module writes to the console only, and is skipped by `-A`.
    fn directory(&self) -> Option<&str>;

    /// Produce the module's diagnostic text into `out`.
    ///
    /// A returned error is captured in the module's own output and never
    /// aborts the rest of the pipeline.
    fn collect(&self, out: &mut dyn Write) -> Result<()>;

    /// Excluded from `-A` runs even with a declared directory; must be
    /// requested explicitly. Used for collectors too disruptive to run
    /// unattended.
    fn manual_only(&self) -> bool {
        false
    }
}

/// Ordered set of registered modules, unique by name.
pub struct Registry {
    modules: Vec<Box<dyn DebugModule>>,
    names: HashSet<String>,
}

impl Registry {
    /// Empty registry, for tests and embedding.
    pub fn new() -> Self {
        Registry {
            modules: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Registry seeded with the compiled-in collectors.
    pub fn builtin() -> Self {
        let mut registry = Registry::new();
        for module in crate::modules::builtin_modules() {
            registry.register(module);
        }
        registry
    }

    /// Register a module. Returns `false` if a module of the same name is
    /// already present (the new one is dropped).
    pub fn register(&mut self, module: Box<dyn DebugModule>) -> bool {
        if self.names.contains(module.name()) {
            debug!("module {} already registered, skipping", module.name());
            return false;
        }
        self.names.insert(module.name().to_string());
        self.modules.push(module);
        true
    }

    /// Scan `dir` for executable plugin files, in sorted filename order, and
    /// register each one not already present.
    ///
    /// Returns the number of newly registered plugins. A missing directory
    /// is fine (the default search path usually does not exist); a
    /// directory that exists but cannot be read is an operator error. A
    /// plugin that fails the load-time capability queries is a fatal
    /// misconfiguration, not a silent skip.
    pub fn discover(&mut self, dir: &std::path::Path) -> Result<usize, DebugError> {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(dir) {
            Ok(iter) => iter
                .filter_map(|e| e.ok())
                .map(|e| e.path())
                .filter(|p| p.is_file())
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("module directory {} does not exist", dir.display());
                return Ok(0);
            }
            Err(e) => {
                return Err(DebugError::ModuleDirUnreadable {
                    path: dir.display().to_string(),
                    source: e,
                })
            }
        };
        entries.sort();

        let mut loaded = 0;
        for path in entries {
            if !external::is_executable(&path) {
                debug!("skipping non-executable {}", path.display());
                continue;
            }
            let name = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };
            if self.names.contains(&name) {
                debug!("module {name} already registered, skipping {}", path.display());
                continue;
            }
            let module = ExternalModule::load(name, &path)?;
            if self.register(Box::new(module)) {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Registered modules in registration order.
    pub fn modules(&self) -> &[Box<dyn DebugModule>] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new()
    }
}

/// External module search path: `FREENAS_DEBUG_MODULEDIR` if set, otherwise
/// a fixed path relative to the executable's directory.
pub fn module_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(MODULE_DIR_ENV) {
        if !dir.is_empty() {
            return Some(PathBuf::from(dir));
        }
    }
    let exe = env::current_exe().ok()?;
    Some(exe.parent()?.join(DEFAULT_MODULE_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeModule {
        name: &'static str,
    }

    impl DebugModule for FakeModule {
        fn name(&self) -> &str {
            self.name
        }
        fn option(&self) -> Option<char> {
            None
        }
        fn help(&self) -> &str {
            "fake module"
        }
        fn directory(&self) -> Option<&str> {
            Some(self.name)
        }
        fn collect(&self, out: &mut dyn Write) -> Result<()> {
            writeln!(out, "fake output")?;
            Ok(())
        }
    }

    #[test]
    fn test_register_is_idempotent_by_name() {
        let mut registry = Registry::new();
        assert!(registry.register(Box::new(FakeModule { name: "zfs" })));
        assert!(!registry.register(Box::new(FakeModule { name: "zfs" })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = Registry::new();
        registry.register(Box::new(FakeModule { name: "zfs" }));
        registry.register(Box::new(FakeModule { name: "smb" }));
        registry.register(Box::new(FakeModule { name: "network" }));
        let names: Vec<&str> = registry.modules().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["zfs", "smb", "network"]);
    }

    #[test]
    fn test_builtin_registry_has_unique_names() {
        let registry = Registry::builtin();
        assert!(!registry.is_empty());
        let mut seen = HashSet::new();
        for module in registry.modules() {
            assert!(seen.insert(module.name().to_string()));
        }
    }

    #[test]
    fn test_discover_missing_directory_is_not_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut registry = Registry::new();
        assert_eq!(registry.discover(&tmp.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn test_discover_unreadable_directory_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("modules");
        std::fs::write(&not_a_dir, "plain file, not a directory").unwrap();

        let mut registry = Registry::new();
        let err = registry.discover(&not_a_dir).unwrap_err();
        assert!(matches!(err, DebugError::ModuleDirUnreadable { .. }));
    }

    #[test]
    fn test_module_dir_env_override() {
        // Serialized by cargo running tests in one process per crate is not
        // guaranteed, so use a distinctive value and restore afterwards.
        let old = env::var(MODULE_DIR_ENV).ok();
        env::set_var(MODULE_DIR_ENV, "/nonexistent/override");
        assert_eq!(
            module_dir(),
            Some(PathBuf::from("/nonexistent/override"))
        );
        match old {
            Some(v) => env::set_var(MODULE_DIR_ENV, v),
            None => env::remove_var(MODULE_DIR_ENV),
        }
    }
}
