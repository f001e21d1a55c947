//! Staging tree packaging.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;

use crate::constants::ARCHIVE_EXTENSION;

/// Pack the staging tree into a gzip-compressed tar next to it.
///
/// The archive lands at `<parent>/<staging-name>.tgz` and contains the
/// staging directory as its single top-level entry, so unpacking reproduces
/// the tree exactly. The archive is never modified after this returns.
pub fn archive(staging_root: &Path) -> Result<PathBuf> {
    let name = staging_root
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| anyhow!("staging root {} has no name", staging_root.display()))?;
    let parent = staging_root
        .parent()
        .ok_or_else(|| anyhow!("staging root {} has no parent", staging_root.display()))?;
    let archive_path = parent.join(format!("{name}.{ARCHIVE_EXTENSION}"));

    let file = File::create(&archive_path)
        .with_context(|| format!("failed to create {}", archive_path.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder
        .append_dir_all(name, staging_root)
        .with_context(|| format!("failed to pack {}", staging_root.display()))?;
    builder
        .into_inner()
        .context("failed to finish tar stream")?
        .finish()
        .context("failed to finish gzip stream")?;

    info!("debug bundle archived at {}", archive_path.display());
    Ok(archive_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn populate_staging(root: &Path) {
        fs::create_dir_all(root.join("zfs")).unwrap();
        fs::create_dir_all(root.join("smb")).unwrap();
        fs::write(root.join("osinfo.txt"), "host info\n").unwrap();
        fs::write(root.join("zfs").join("dump.txt"), "zpool status output\n").unwrap();
        fs::write(root.join("smb").join("dump.txt"), "smbstatus output\n").unwrap();
    }

    #[test]
    fn test_archive_path_derives_from_staging_name() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("fndebug");
        populate_staging(&staging);

        let path = archive(&staging).unwrap();
        assert_eq!(path, tmp.path().join("fndebug.tgz"));
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_reproduces_staging_tree() {
        let tmp = TempDir::new().unwrap();
        let staging = tmp.path().join("fndebug");
        populate_staging(&staging);

        let path = archive(&staging).unwrap();

        let extract = TempDir::new().unwrap();
        let file = File::open(&path).unwrap();
        let mut unpacker = tar::Archive::new(flate2::read::GzDecoder::new(file));
        unpacker.unpack(extract.path()).unwrap();

        let unpacked = extract.path().join("fndebug");
        for rel in ["osinfo.txt", "zfs/dump.txt", "smb/dump.txt"] {
            let original = fs::read(staging.join(rel)).unwrap();
            let restored = fs::read(unpacked.join(rel)).unwrap();
            assert_eq!(original, restored, "mismatch in {rel}");
        }
    }

    #[test]
    fn test_missing_staging_root_is_an_error() {
        let tmp = TempDir::new().unwrap();
        assert!(archive(&tmp.path().join("missing")).is_err());
    }
}
