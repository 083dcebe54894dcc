//! Torrent descriptor builder.
//!
//! [`TorrentBuilder`] turns files and directories on disk into a
//! [`Descriptor`]: it expands directories, works out the torrent root and
//! relative paths, hashes every file as one stream and fills in the
//! top-level fields.
//!
//! # Examples
//!
//! ```no_run
//! use twt_gen::metainfo::TorrentBuilder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = TorrentBuilder::new()
//!     .add_path("/srv/www/site")
//!     .add_tracker("udp://tracker.example:1337")
//!     .add_web_seed("https://example.com/site/")
//!     .piece_length(32768)
//!     .build()?;
//!
//! std::fs::write("site.torrent", descriptor.to_bytes())?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use super::descriptor::{Descriptor, FileEntry, FileLayout, Info};
use super::error::MetainfoError;
use super::hasher::{hash_file, PieceHasher};
use super::paths::{relativize, resolve_inputs, torrent_root};

/// Default piece length (16 KiB). Small pieces let a browser show the first
/// files of a website before the whole torrent is fetched.
pub const DEFAULT_PIECE_LENGTH: u64 = 16384;

/// Default `created by` value.
pub const DEFAULT_CREATED_BY: &str = concat!("TWT-Gen/", env!("CARGO_PKG_VERSION"));

/// Value of the `encoding` field.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Name used when neither an explicit name nor a base name is available,
/// which happens when the inputs only share the filesystem root.
pub const DEFAULT_NAME: &str = "torrent";

/// Builder for torrent descriptors.
///
/// Inputs are absolute paths to files or directories. All other settings
/// have defaults, so `TorrentBuilder::new().add_path(p).build()` is enough
/// for a trackerless torrent.
#[derive(Debug, Clone)]
pub struct TorrentBuilder {
    /// Files and directories, in the order given.
    inputs: Vec<PathBuf>,
    /// Overrides the derived name when set and non-empty.
    name: Option<String>,
    /// Tracker URLs; the first one becomes `announce`.
    trackers: Vec<String>,
    /// Web seed URLs.
    web_seeds: Vec<String>,
    piece_length: u64,
    include_hidden: bool,
    comment: Option<String>,
    created_by: String,
    /// Creation timestamp (defaults to now).
    creation_date: Option<i64>,
}

impl Default for TorrentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TorrentBuilder {
    pub fn new() -> Self {
        Self {
            inputs: Vec::new(),
            name: None,
            trackers: Vec::new(),
            web_seeds: Vec::new(),
            piece_length: DEFAULT_PIECE_LENGTH,
            include_hidden: false,
            comment: None,
            created_by: DEFAULT_CREATED_BY.to_string(),
            creation_date: None,
        }
    }

    /// Adds a file or directory. Directories are expanded recursively.
    pub fn add_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    pub fn add_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.inputs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the torrent name.
    ///
    /// Without one, a single-file torrent is named after its file and a
    /// multi-file torrent after the directory containing all inputs.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn add_tracker(mut self, url: impl Into<String>) -> Self {
        self.trackers.push(url.into());
        self
    }

    pub fn add_web_seed(mut self, url: impl Into<String>) -> Self {
        self.web_seeds.push(url.into());
        self
    }

    /// Sets the piece length in bytes.
    ///
    /// Any positive length is accepted here. Clients generally expect a
    /// power of two, which the command-line front end enforces.
    pub fn piece_length(mut self, length: u64) -> Self {
        self.piece_length = length;
        self
    }

    /// Includes dot files and files the filesystem marks hidden.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn created_by(mut self, created_by: impl Into<String>) -> Self {
        self.created_by = created_by.into();
        self
    }

    /// Fixes the creation date (Unix timestamp), for reproducible output.
    pub fn creation_date(mut self, timestamp: i64) -> Self {
        self.creation_date = Some(timestamp);
        self
    }

    /// Reads and hashes the inputs and returns the finished descriptor.
    ///
    /// Either the whole descriptor is produced or an error is returned;
    /// nothing is written anywhere.
    pub fn build(self) -> Result<Descriptor, MetainfoError> {
        self.validate()?;

        let paths = resolve_inputs(&self.inputs, self.include_hidden)?;
        if paths.is_empty() {
            return Err(MetainfoError::NoFiles);
        }

        let root = torrent_root(&self.inputs);
        debug!("Torrent root is {}", root.display());

        let files = paths
            .into_iter()
            .map(|path| file_entry(path, &root))
            .collect::<Result<Vec<_>, _>>()?;

        let mut hasher = PieceHasher::new(self.piece_length);
        for file in &files {
            let read = hash_file(&mut hasher, &file.path)?;
            if read != file.length {
                return Err(MetainfoError::LengthMismatch {
                    path: file.path.clone(),
                    expected: file.length,
                    actual: read,
                });
            }
        }
        let total_length = hasher.total_length();
        let pieces = hasher.finish();

        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => derive_name(&files, &root),
        };

        let layout = if files.len() == 1 {
            FileLayout::Single {
                length: files[0].length,
            }
        } else {
            FileLayout::Multi { files }
        };

        info!(
            "Built torrent {}: {} bytes in {} pieces",
            name,
            total_length,
            pieces.len()
        );

        let creation_date = self.creation_date.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as i64)
                .unwrap_or(0)
        });

        let announce_list = if self.trackers.is_empty() {
            Vec::new()
        } else {
            vec![self.trackers.clone()]
        };

        Ok(Descriptor {
            created_by: Some(self.created_by),
            creation_date: Some(creation_date),
            encoding: Some(DEFAULT_ENCODING.to_string()),
            announce: self.trackers.into_iter().next(),
            announce_list,
            url_list: self.web_seeds,
            comment: self.comment,
            info: Info {
                name,
                piece_length: self.piece_length,
                pieces,
                layout,
            },
        })
    }

    /// Checks the settings that do not need the filesystem.
    fn validate(&self) -> Result<(), MetainfoError> {
        if self.piece_length == 0
            || i64::try_from(self.piece_length).is_err()
            || usize::try_from(self.piece_length).is_err()
        {
            return Err(MetainfoError::InvalidPieceLength(self.piece_length));
        }

        if self.inputs.is_empty() {
            return Err(MetainfoError::NoFiles);
        }

        Ok(())
    }
}

fn file_entry(path: PathBuf, root: &Path) -> Result<FileEntry, MetainfoError> {
    let length = fs::metadata(&path)
        .map_err(|e| MetainfoError::io(&path, e))?
        .len();
    let components = relativize(&path, root)?;
    debug!("Adding {} as {}", path.display(), components.join("/"));

    Ok(FileEntry {
        path,
        components,
        length,
    })
}

fn derive_name(files: &[FileEntry], root: &Path) -> String {
    if let [single] = files {
        if let Some(file_name) = single.components.last() {
            return file_name.clone();
        }
    }

    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha1::{Digest, Sha1};
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_builder_single_file() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "hello.txt", b"hello");

        let descriptor = TorrentBuilder::new()
            .add_path(&file)
            .creation_date(1_234)
            .build()
            .unwrap();

        assert_eq!(descriptor.info.name, "hello.txt");
        assert_eq!(descriptor.info.layout, FileLayout::Single { length: 5 });
        let digest: [u8; 20] = Sha1::digest(b"hello").into();
        assert_eq!(descriptor.info.pieces, vec![digest]);
        assert_eq!(descriptor.creation_date, Some(1_234));
        assert_eq!(descriptor.encoding.as_deref(), Some("UTF-8"));
        assert!(descriptor
            .created_by
            .as_deref()
            .unwrap()
            .starts_with("TWT-Gen/"));
    }

    #[test]
    fn test_builder_directory_is_named_after_it() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site");
        write(&site, "index.html", b"<html></html>");
        write(&site, "css/main.css", b"body {}");

        let descriptor = TorrentBuilder::new().add_path(&site).build().unwrap();

        assert_eq!(descriptor.info.name, "site");
        let FileLayout::Multi { files } = &descriptor.info.layout else {
            panic!("expected multi-file layout");
        };
        let components: Vec<_> = files.iter().map(|f| f.components.join("/")).collect();
        assert_eq!(components, vec!["css/main.css", "index.html"]);
        assert!(descriptor.has_root_index());
    }

    #[test]
    fn test_builder_directory_with_one_file_is_single_file() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site");
        write(&site, "index.html", b"<html></html>");

        let descriptor = TorrentBuilder::new().add_path(&site).build().unwrap();

        assert!(descriptor.is_single_file());
        assert_eq!(descriptor.info.name, "index.html");
    }

    #[test]
    fn test_builder_trackers_and_seeds() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "a.txt", b"a");

        let descriptor = TorrentBuilder::new()
            .add_path(file)
            .add_tracker("udp://one.example:80")
            .add_tracker("https://two.example/announce")
            .add_web_seed("https://seed.example/")
            .comment("hi")
            .build()
            .unwrap();

        assert_eq!(descriptor.announce.as_deref(), Some("udp://one.example:80"));
        assert_eq!(
            descriptor.announce_list,
            vec![vec![
                "udp://one.example:80".to_string(),
                "https://two.example/announce".to_string(),
            ]]
        );
        assert_eq!(descriptor.url_list, vec!["https://seed.example/"]);
        assert_eq!(descriptor.comment.as_deref(), Some("hi"));
    }

    #[test]
    fn test_builder_empty_name_falls_back_to_derived() {
        let dir = TempDir::new().unwrap();
        let file = write(dir.path(), "a.txt", b"a");

        let descriptor = TorrentBuilder::new().add_path(file).name("").build().unwrap();
        assert_eq!(descriptor.info.name, "a.txt");
    }

    #[test]
    fn test_builder_rejects_bad_piece_length_before_io() {
        let missing = PathBuf::from("/definitely/not/here");
        for length in [0, u64::MAX] {
            let result = TorrentBuilder::new()
                .add_path(&missing)
                .piece_length(length)
                .build();
            assert!(matches!(result, Err(MetainfoError::InvalidPieceLength(n)) if n == length));
        }
    }

    #[test]
    fn test_builder_no_inputs() {
        assert!(matches!(
            TorrentBuilder::new().build(),
            Err(MetainfoError::NoFiles)
        ));
    }

    #[test]
    fn test_builder_only_hidden_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), ".hidden", b"x");

        let result = TorrentBuilder::new().add_path(dir.path()).build();
        assert!(matches!(result, Err(MetainfoError::NoFiles)));
    }

    // procfs reports a size of 0 but yields content when read
    #[cfg(target_os = "linux")]
    #[test]
    fn test_builder_size_changed_while_hashing() {
        let status = PathBuf::from("/proc/self/status");
        assert_eq!(fs::metadata(&status).unwrap().len(), 0);

        let result = TorrentBuilder::new().add_path(&status).build();
        match result {
            Err(MetainfoError::LengthMismatch {
                path,
                expected,
                actual,
            }) => {
                assert_eq!(path, status);
                assert_eq!(expected, 0);
                assert!(actual > 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_derive_name_for_root() {
        let files = vec![
            FileEntry {
                path: PathBuf::from("/a/x"),
                components: vec!["a".into(), "x".into()],
                length: 1,
            },
            FileEntry {
                path: PathBuf::from("/b/y"),
                components: vec!["b".into(), "y".into()],
                length: 1,
            },
        ];
        assert_eq!(derive_name(&files, Path::new("/")), DEFAULT_NAME);
        assert_eq!(derive_name(&files, Path::new("/srv/www")), "www");
    }
}
