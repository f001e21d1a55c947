//! End-to-end tests over the built-in registry: allocation of the real
//! module set and plugin discovery feeding a full pipeline run.

use freenas_debug::cli;
use freenas_debug::options::allocate;
use freenas_debug::registry::Registry;

#[test]
fn test_builtin_preferences_are_all_honored() {
    let registry = Registry::builtin();
    let table = allocate(registry.modules()).unwrap();

    for (name, option) in [
        ("system", 'y'),
        ("hardware", 'h'),
        ("network", 'n'),
        ("zfs", 'z'),
        ("smb", 's'),
        ("directoryservice", 'a'),
        ("loader", 'l'),
        ("dump", 'd'),
    ] {
        assert_eq!(table.get(option).unwrap().name, name);
    }
}

#[test]
fn test_builtin_usage_lists_options_alphabetically() {
    let registry = Registry::builtin();
    let table = allocate(registry.modules()).unwrap();
    assert_eq!(table.option_string(), "adhlnsyz");
}

#[test]
fn test_builtin_parse_selects_by_assigned_character() {
    let registry = Registry::builtin();
    let table = allocate(registry.modules()).unwrap();

    let invocation = cli::parse(&table, ["freenas-debug", "-z", "-s"]).unwrap();
    assert_eq!(invocation.selected, vec!['z', 's']);
}

#[cfg(unix)]
mod plugin {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use tempfile::TempDir;

    use freenas_debug::options::allocate;
    use freenas_debug::registry::Registry;
    use freenas_debug::{cli, pipeline};

    fn write_plugin(dir: &Path, name: &str, option: char, directory: &str) {
        let body = format!(
            "#!/bin/sh\n\
             case \"$1\" in\n\
             option) echo {option} ;;\n\
             help) echo 'Dump {name} diagnostics' ;;\n\
             directory) echo {directory} ;;\n\
             collect) echo '{name} collected' ;;\n\
             esac\n"
        );
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[test]
    fn test_discovered_plugin_runs_through_the_pipeline() {
        let moduledir = TempDir::new().unwrap();
        write_plugin(moduledir.path(), "extattr", 'q', "extattr");

        let mut registry = Registry::builtin();
        assert_eq!(registry.discover(moduledir.path()).unwrap(), 1);

        let table = allocate(registry.modules()).unwrap();
        assert_eq!(table.get('q').unwrap().name, "extattr");

        let staging_parent = TempDir::new().unwrap();
        let staging = staging_parent.path().join("fndebug");
        let invocation = cli::parse(&table, ["freenas-debug", "-q"]).unwrap();
        let code = pipeline::run(&registry, &table, &invocation, &staging).unwrap();
        assert_eq!(code, 0);

        let dump = fs::read_to_string(staging.join("extattr").join("dump.txt")).unwrap();
        assert!(dump.contains("extattr collected"));
    }

    #[test]
    fn test_plugin_preferring_taken_character_is_reassigned() {
        let moduledir = TempDir::new().unwrap();
        // 'z' belongs to the built-in zfs module; 'a' is taken too, so the
        // probe lands on 'b'.
        write_plugin(moduledir.path(), "wedged", 'z', "wedged");

        let mut registry = Registry::builtin();
        registry.discover(moduledir.path()).unwrap();

        let table = allocate(registry.modules()).unwrap();
        assert_eq!(table.get('z').unwrap().name, "zfs");
        assert_eq!(table.get('b').unwrap().name, "wedged");
    }

    #[test]
    fn test_plugin_shadowed_by_builtin_name_is_skipped() {
        let moduledir = TempDir::new().unwrap();
        write_plugin(moduledir.path(), "zfs", 'q', "zfs-extra");

        let mut registry = Registry::builtin();
        let before = registry.len();
        assert_eq!(registry.discover(moduledir.path()).unwrap(), 0);
        assert_eq!(registry.len(), before);
    }
}
