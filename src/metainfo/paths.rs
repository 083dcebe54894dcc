//! Input resolution and torrent-relative paths.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use super::error::MetainfoError;

/// Longest shared component prefix of `paths`.
///
/// The comparison is per path segment, so `/www/site` and `/www/sitemap`
/// share `/www`, not `/www/site`. Unrelated absolute paths share only the
/// root. An empty slice yields an empty path.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use twt_gen::metainfo::common_ancestor;
///
/// let paths = [Path::new("/www/site/index.html"), Path::new("/www/sitemap.xml")];
/// assert_eq!(common_ancestor(&paths), PathBuf::from("/www"));
/// ```
pub fn common_ancestor<P: AsRef<Path>>(paths: &[P]) -> PathBuf {
    let mut iter = paths.iter();
    let Some(first) = iter.next() else {
        return PathBuf::new();
    };

    let mut prefix: Vec<Component<'_>> = first.as_ref().components().collect();
    for path in iter {
        let shared = prefix
            .iter()
            .zip(path.as_ref().components())
            .take_while(|(a, b)| **a == *b)
            .count();
        prefix.truncate(shared);
    }

    prefix.iter().collect()
}

/// Directory that the torrent's relative paths are computed from.
///
/// This is the [`common_ancestor`] of the inputs, moved up to its parent
/// when it names a file rather than a directory (a single file input, or the
/// same file given repeatedly).
pub fn torrent_root<P: AsRef<Path>>(inputs: &[P]) -> PathBuf {
    let ancestor = common_ancestor(inputs);
    if ancestor.is_dir() {
        return ancestor;
    }
    match ancestor.parent() {
        Some(parent) => parent.to_path_buf(),
        None => ancestor,
    }
}

/// Splits `path` into the segments below `ancestor`.
///
/// The result is never empty and its last element is the file name.
pub fn relativize(path: &Path, ancestor: &Path) -> Result<Vec<String>, MetainfoError> {
    let invalid = || MetainfoError::InvalidPath(path.to_path_buf());
    let rest = path.strip_prefix(ancestor).map_err(|_| invalid())?;

    let components = rest
        .components()
        .map(|c| match c {
            Component::Normal(s) => Ok(s.to_string_lossy().into_owned()),
            _ => Err(invalid()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if components.is_empty() {
        return Err(invalid());
    }
    Ok(components)
}

/// Whether `path` should be treated as hidden: its name starts with `.`, or
/// the filesystem marks it hidden. Failing to read attributes counts as not
/// hidden.
pub fn is_hidden(path: &Path) -> bool {
    let dot_name = path
        .file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false);

    dot_name || has_hidden_attribute(path)
}

#[cfg(windows)]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;

    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    fs::metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(target_os = "macos")]
fn has_hidden_attribute(path: &Path) -> bool {
    use std::os::macos::fs::MetadataExt;

    const UF_HIDDEN: u32 = 0x8000;

    fs::metadata(path)
        .map(|m| m.st_flags() & UF_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(any(windows, target_os = "macos")))]
fn has_hidden_attribute(_path: &Path) -> bool {
    false
}

/// Expands `inputs` into the ordered list of files to include.
///
/// Directories are replaced in place by the files below them, visited in
/// file-name order. A path reached twice is kept at its first position.
/// Every subdirectory is walked. Unless `include_hidden` is set, files whose
/// own name is hidden are dropped; a visible file inside a hidden directory
/// is kept.
pub fn resolve_inputs<P: AsRef<Path>>(
    inputs: &[P],
    include_hidden: bool,
) -> Result<Vec<PathBuf>, MetainfoError> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();
    let mut push = |path: PathBuf| {
        if seen.insert(path.clone()) {
            files.push(path);
        } else {
            debug!("Skipping duplicate {}", path.display());
        }
    };

    for input in inputs {
        let input = input.as_ref();
        let metadata = fs::metadata(input).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => MetainfoError::PathNotFound(input.to_path_buf()),
            _ => MetainfoError::io(input, e),
        })?;

        if metadata.is_dir() {
            for path in walk_files(input, include_hidden)? {
                push(path);
            }
        } else if include_hidden || !is_hidden(input) {
            push(input.to_path_buf());
        } else {
            debug!("Skipping hidden file {}", input.display());
        }
    }

    Ok(files)
}

fn walk_files(dir: &Path, include_hidden: bool) -> Result<Vec<PathBuf>, MetainfoError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            MetainfoError::io(path, io::Error::from(e))
        })?;

        if entry.file_type().is_dir() {
            continue;
        }
        // follows symlinks; sockets, fifos and dangling links are not content
        if !entry.path().is_file() {
            continue;
        }
        if include_hidden || !is_hidden(entry.path()) {
            files.push(entry.into_path());
        } else {
            debug!("Skipping hidden file {}", entry.path().display());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str, data: &[u8]) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_common_ancestor_is_segment_based() {
        let paths = [
            PathBuf::from("/srv/www/site/index.html"),
            PathBuf::from("/srv/www/sitemap.xml"),
        ];
        assert_eq!(common_ancestor(&paths), PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_common_ancestor_unrelated_is_root() {
        let paths = [PathBuf::from("/a/x"), PathBuf::from("/b/y")];
        assert_eq!(common_ancestor(&paths), PathBuf::from("/"));
    }

    #[test]
    fn test_common_ancestor_single_and_empty() {
        assert_eq!(
            common_ancestor(&[PathBuf::from("/a/b/c.txt")]),
            PathBuf::from("/a/b/c.txt")
        );
        let none: [PathBuf; 0] = [];
        assert_eq!(common_ancestor(&none), PathBuf::new());
    }

    #[test]
    fn test_torrent_root_of_single_file_is_parent() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "site/index.html", b"<html>");
        assert_eq!(torrent_root(&[&file]), dir.path().join("site"));
    }

    #[test]
    fn test_torrent_root_of_directory_is_itself() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "site/index.html", b"<html>");
        let site = dir.path().join("site");
        assert_eq!(torrent_root(&[&site]), site);
    }

    #[test]
    fn test_relativize() {
        let parts = relativize(
            Path::new("/srv/www/css/main.css"),
            Path::new("/srv/www"),
        )
        .unwrap();
        assert_eq!(parts, vec!["css", "main.css"]);

        let parts = relativize(Path::new("/a/x"), Path::new("/")).unwrap();
        assert_eq!(parts, vec!["a", "x"]);
    }

    #[test]
    fn test_relativize_rejects_outside_and_self() {
        assert!(matches!(
            relativize(Path::new("/other/file"), Path::new("/srv/www")),
            Err(MetainfoError::InvalidPath(_))
        ));
        assert!(matches!(
            relativize(Path::new("/srv/www"), Path::new("/srv/www")),
            Err(MetainfoError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new("/site/.htaccess")));
        assert!(!is_hidden(Path::new("/site/index.html")));
        assert!(!is_hidden(Path::new("/nonexistent/visible.txt")));
    }

    #[test]
    fn test_resolve_expands_directories_in_place() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let first = touch(root, "first.txt", b"1");
        touch(root, "site/b.css", b"b");
        touch(root, "site/a/index.html", b"a");
        let last = touch(root, "last.txt", b"2");

        let resolved = resolve_inputs(&[first.clone(), root.join("site"), last.clone()], false)
            .unwrap();
        assert_eq!(
            resolved,
            vec![
                first,
                root.join("site/a/index.html"),
                root.join("site/b.css"),
                last,
            ]
        );
    }

    #[test]
    fn test_resolve_filters_hidden() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "index.html", b"x");
        touch(root, ".env", b"secret");
        touch(root, ".git/config", b"[core]");

        let resolved = resolve_inputs(&[root], false).unwrap();
        assert_eq!(resolved, vec![root.join(".git/config"), root.join("index.html")]);

        let mut all = resolve_inputs(&[root], true).unwrap();
        all.sort();
        assert_eq!(
            all,
            vec![root.join(".env"), root.join(".git/config"), root.join("index.html")]
        );
    }

    #[test]
    fn test_resolve_keeps_visible_files_in_hidden_dirs() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site");
        touch(&site, "index.html", b"<html>");
        touch(&site, ".well-known/security.txt", b"Contact: mailto:a@b.c");
        touch(&site, ".well-known/.secret", b"x");

        let resolved = resolve_inputs(&[&site], false).unwrap();
        assert_eq!(
            resolved,
            vec![site.join(".well-known/security.txt"), site.join("index.html")]
        );
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_is_hidden_reads_macos_flag() {
        let dir = TempDir::new().unwrap();
        let file = touch(dir.path(), "visible.txt", b"x");
        assert!(!is_hidden(&file));

        let status = std::process::Command::new("chflags")
            .arg("hidden")
            .arg(&file)
            .status()
            .unwrap();
        assert!(status.success());
        assert!(is_hidden(&file));
    }

    #[test]
    fn test_resolve_drops_explicit_hidden_file() {
        let dir = TempDir::new().unwrap();
        let hidden = touch(dir.path(), ".hidden", b"x");
        assert!(resolve_inputs(&[&hidden], false).unwrap().is_empty());
        assert_eq!(resolve_inputs(&[&hidden], true).unwrap(), vec![hidden.clone()]);
    }

    #[test]
    fn test_resolve_deduplicates() {
        let dir = TempDir::new().unwrap();
        let a = touch(dir.path(), "a.txt", b"a");
        let b = touch(dir.path(), "b.txt", b"b");

        let resolved = resolve_inputs(&[a.clone(), dir.path().to_path_buf(), a.clone()], false)
            .unwrap();
        assert_eq!(resolved, vec![a, b]);
    }

    #[test]
    fn test_resolve_missing_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        match resolve_inputs(&[&missing], false) {
            Err(MetainfoError::PathNotFound(p)) => assert_eq!(p, missing),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
