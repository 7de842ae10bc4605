//! TAR archive extraction with symlink and hardlink recreation.

use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

use tar::Archive;
use tar::EntryType;

use crate::ArchiveError;
use crate::CancelToken;
use crate::Result;
use crate::links::SymlinkPrimitive;
use crate::links::materialize_link;
use crate::links::resolve_link_target;

use super::clean_entry_name;
use super::create_dir_in_root;
use super::ensure_parent_in_root;
use super::guarded_join;
use super::write_file_entry;

/// Extracts a gzip-compressed TAR archive under `root`.
///
/// `root` must be the canonicalized destination directory.
///
/// # Errors
///
/// Returns an error on path traversal, cancellation, or stream corruption.
pub fn extract_tar_gz(
    archive: &Path,
    root: &Path,
    cancel: &CancelToken,
    links: &dyn SymlinkPrimitive,
) -> Result<()> {
    let file = File::open(archive)?;
    extract_entries(
        Archive::new(flate2::read::GzDecoder::new(file)),
        root,
        cancel,
        links,
    )
}

/// Extracts a bzip2-compressed TAR archive under `root`.
///
/// # Errors
///
/// Same failure conditions as [`extract_tar_gz`].
pub fn extract_tar_bz2(
    archive: &Path,
    root: &Path,
    cancel: &CancelToken,
    links: &dyn SymlinkPrimitive,
) -> Result<()> {
    let file = File::open(archive)?;
    extract_entries(
        Archive::new(bzip2::read::BzDecoder::new(file)),
        root,
        cancel,
        links,
    )
}

/// Walks the TAR stream sequentially and recreates every entry.
fn extract_entries<R: Read>(
    mut archive: Archive<R>,
    root: &Path,
    cancel: &CancelToken,
    links: &dyn SymlinkPrimitive,
) -> Result<()> {
    for entry in archive.entries()? {
        cancel.check()?;
        let mut entry = entry?;

        let raw_name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let name = clean_entry_name(&raw_name);
        let kind = entry.header().entry_type();

        if name.is_empty() && kind != EntryType::Directory {
            continue;
        }
        let dest = guarded_join(root, &name)?;

        match kind {
            EntryType::Directory => {
                create_dir_in_root(&dest, root)?;
            }
            EntryType::Symlink => {
                let raw_link = link_name(&entry);
                ensure_parent_in_root(&dest, root)?;
                let parent = dest.parent().unwrap_or(root);
                let resolution = resolve_link_target(&raw_link, parent, root);
                materialize_link(&dest, &resolution, links)?;
            }
            EntryType::Link => {
                extract_hardlink(&link_name(&entry), &dest, root)?;
            }
            _ => {
                write_file_entry(&mut entry, &dest, root)?;
            }
        }
    }
    Ok(())
}

/// Hardlink entries are materialized as copies, never as real hard links:
/// the target is resolved against the extraction root and re-verified not
/// to escape it, including through symlinks left by earlier entries.
fn extract_hardlink(raw_link: &str, dest: &Path, root: &Path) -> Result<()> {
    let target_name = clean_entry_name(raw_link);
    let target = guarded_join(root, &target_name)?;
    let target = match fs::canonicalize(&target) {
        Ok(resolved) if resolved.starts_with(root) => resolved,
        Ok(_) => {
            return Err(ArchiveError::PathTraversal {
                path: PathBuf::from(&target_name),
            });
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => target,
        Err(err) => return Err(err.into()),
    };
    ensure_parent_in_root(dest, root)?;
    if target.is_dir() {
        fs::create_dir_all(dest)?;
    } else if target.is_file() {
        fs::copy(&target, dest)?;
    } else {
        File::create(dest)?;
    }
    Ok(())
}

fn link_name<R: Read>(entry: &tar::Entry<'_, R>) -> String {
    entry
        .link_name_bytes()
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ArchiveError;
    use crate::links::OsSymlinks;
    use std::io::Write;
    use tar::Builder;
    use tar::Header;
    use tempfile::TempDir;

    /// Builds a .tar.gz in memory-backed files from explicit headers, so
    /// hostile entry names can be crafted.
    fn write_archive(path: &Path, entries: &[(&str, EntryType, &[u8], Option<&str>)]) {
        let file = File::create(path).unwrap();
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = Builder::new(encoder);
        for (name, kind, data, link) in entries {
            let mut header = Header::new_gnu();
            header.set_entry_type(*kind);
            header.set_size(data.len() as u64);
            {
                // Written directly as raw bytes: `set_path`/`set_link_name`
                // reject `..` components, which these fixtures rely on.
                let gnu = header.as_gnu_mut().unwrap();
                gnu.name[..name.len()].copy_from_slice(name.as_bytes());
                if let Some(target) = link {
                    gnu.linkname[..target.len()].copy_from_slice(target.as_bytes());
                }
            }
            header.set_cksum();
            builder.append(&header, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
    }

    #[test]
    fn test_extract_regular_files() {
        let archive_dir = TempDir::new().unwrap();
        let archive = archive_dir.path().join("a.tar.gz");
        write_archive(
            &archive,
            &[
                ("a.txt", EntryType::Regular, b"alpha", None),
                ("sub/b.txt", EntryType::Regular, b"beta", None),
            ],
        );

        let out = TempDir::new().unwrap();
        let root = out.path().canonicalize().unwrap();
        extract_tar_gz(&archive, &root, &CancelToken::new(), &OsSymlinks).unwrap();

        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(root.join("sub/b.txt")).unwrap(), "beta");
    }

    #[test]
    fn test_extract_traversal_entry_aborts() {
        let archive_dir = TempDir::new().unwrap();
        let archive = archive_dir.path().join("evil.tar.gz");
        write_archive(
            &archive,
            &[
                ("ok.txt", EntryType::Regular, b"fine", None),
                ("../../evil.txt", EntryType::Regular, b"bad", None),
            ],
        );

        let outer = TempDir::new().unwrap();
        let dest = outer.path().join("inner/deep");
        fs::create_dir_all(&dest).unwrap();
        let root = dest.canonicalize().unwrap();

        let err = extract_tar_gz(&archive, &root, &CancelToken::new(), &OsSymlinks).unwrap_err();
        assert!(matches!(err, ArchiveError::PathTraversal { .. }));

        // The earlier entry stays (no cleanup), nothing escapes the root.
        assert!(root.join("ok.txt").exists());
        assert!(!outer.path().join("evil.txt").exists());
        assert!(!outer.path().join("inner/evil.txt").exists());
    }

    #[test]
    fn test_extract_hardlink_becomes_copy() {
        let archive_dir = TempDir::new().unwrap();
        let archive = archive_dir.path().join("hl.tar.gz");
        write_archive(
            &archive,
            &[
                ("orig.txt", EntryType::Regular, b"shared", None),
                ("alias.txt", EntryType::Link, b"", Some("orig.txt")),
            ],
        );

        let out = TempDir::new().unwrap();
        let root = out.path().canonicalize().unwrap();
        extract_tar_gz(&archive, &root, &CancelToken::new(), &OsSymlinks).unwrap();

        assert_eq!(fs::read_to_string(root.join("alias.txt")).unwrap(), "shared");
        // A copy: editing the alias must not change the original.
        fs::write(root.join("alias.txt"), "edited").unwrap();
        assert_eq!(fs::read_to_string(root.join("orig.txt")).unwrap(), "shared");
    }

    #[test]
    fn test_extract_hardlink_escape_rejected() {
        let archive_dir = TempDir::new().unwrap();
        let archive = archive_dir.path().join("hl.tar.gz");
        write_archive(
            &archive,
            &[("alias.txt", EntryType::Link, b"", Some("../../secret"))],
        );

        let out = TempDir::new().unwrap();
        let root = out.path().canonicalize().unwrap();
        let err = extract_tar_gz(&archive, &root, &CancelToken::new(), &OsSymlinks).unwrap_err();
        assert!(matches!(err, ArchiveError::PathTraversal { .. }));
    }

    #[test]
    fn test_extract_directory_entry() {
        let archive_dir = TempDir::new().unwrap();
        let archive = archive_dir.path().join("d.tar.gz");
        write_archive(&archive, &[("only/dirs/", EntryType::Directory, b"", None)]);

        let out = TempDir::new().unwrap();
        let root = out.path().canonicalize().unwrap();
        extract_tar_gz(&archive, &root, &CancelToken::new(), &OsSymlinks).unwrap();
        assert!(root.join("only/dirs").is_dir());
    }

    #[test]
    fn test_extract_cancelled() {
        let archive_dir = TempDir::new().unwrap();
        let archive = archive_dir.path().join("c.tar.gz");
        write_archive(&archive, &[("a.txt", EntryType::Regular, b"x", None)]);

        let out = TempDir::new().unwrap();
        let root = out.path().canonicalize().unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = extract_tar_gz(&archive, &root, &cancel, &OsSymlinks).unwrap_err();
        assert!(matches!(err, ArchiveError::Cancelled));
        assert!(!root.join("a.txt").exists());
    }
}
