use std::collections::BTreeMap;
use std::path::PathBuf;

use bytes::Bytes;

use super::error::MetainfoError;
use super::hasher::{concat_digests, PieceDigest, DIGEST_LEN};
use super::info_hash::InfoHash;
use crate::bencode::{decode, encode, Value};

/// File name a browser looks for at the root of a website torrent.
pub const INDEX_FILE: &str = "index.html";

/// A file in a multi-file descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Where the file was read from. For parsed descriptors this is the path
    /// relative to the torrent root.
    pub path: PathBuf,
    /// Path segments below the torrent root, file name last.
    pub components: Vec<String>,
    /// Size in bytes.
    pub length: u64,
}

impl FileEntry {
    fn to_value(&self) -> Value {
        let mut dict = BTreeMap::new();
        dict.insert(
            Bytes::from_static(b"length"),
            Value::Integer(self.length as i64),
        );
        dict.insert(
            Bytes::from_static(b"path"),
            Value::string_list(&self.components),
        );
        Value::Dict(dict)
    }
}

/// Whether the content is one file or a list of files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileLayout {
    /// Encoded with `info.length`.
    Single { length: u64 },
    /// Encoded with `info.files`, in hashing order.
    Multi { files: Vec<FileEntry> },
}

/// The `info` dictionary: everything the info hash covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    pub name: String,
    pub piece_length: u64,
    pub pieces: Vec<PieceDigest>,
    pub layout: FileLayout,
}

impl Info {
    pub fn to_value(&self) -> Value {
        let mut info = BTreeMap::new();

        info.insert(Bytes::from_static(b"name"), Value::string(&self.name));
        info.insert(
            Bytes::from_static(b"piece length"),
            Value::Integer(self.piece_length as i64),
        );
        info.insert(
            Bytes::from_static(b"pieces"),
            Value::from(concat_digests(&self.pieces)),
        );

        match &self.layout {
            FileLayout::Single { length } => {
                info.insert(Bytes::from_static(b"length"), Value::Integer(*length as i64));
            }
            FileLayout::Multi { files } => {
                info.insert(
                    Bytes::from_static(b"files"),
                    Value::List(files.iter().map(FileEntry::to_value).collect()),
                );
            }
        }

        Value::Dict(info)
    }
}

/// A complete torrent descriptor.
///
/// Built by [`TorrentBuilder`](super::TorrentBuilder) or parsed back with
/// [`Descriptor::from_bytes`].
///
/// # Examples
///
/// ```
/// use twt_gen::metainfo::{Descriptor, FileLayout, Info};
///
/// let descriptor = Descriptor {
///     created_by: Some("TWT-Gen/0.0.1".into()),
///     creation_date: Some(1_700_000_000),
///     encoding: Some("UTF-8".into()),
///     announce: None,
///     announce_list: Vec::new(),
///     url_list: Vec::new(),
///     comment: None,
///     info: Info {
///         name: "index.html".into(),
///         piece_length: 16384,
///         pieces: vec![[0u8; 20]],
///         layout: FileLayout::Single { length: 5 },
///     },
/// };
///
/// let bytes = descriptor.to_bytes();
/// assert_eq!(Descriptor::from_bytes(&bytes).unwrap(), descriptor);
/// assert!(descriptor.has_root_index());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub created_by: Option<String>,
    pub creation_date: Option<i64>,
    pub encoding: Option<String>,
    /// First tracker.
    pub announce: Option<String>,
    /// Tracker tiers.
    pub announce_list: Vec<Vec<String>>,
    /// Web seed URLs.
    pub url_list: Vec<String>,
    pub comment: Option<String>,
    pub info: Info,
}

impl Descriptor {
    /// Builds the top-level dictionary. Absent optional fields are omitted
    /// rather than encoded as empty values.
    pub fn to_value(&self) -> Value {
        let mut root = BTreeMap::new();

        root.insert(Bytes::from_static(b"info"), self.info.to_value());

        if let Some(ref announce) = self.announce {
            root.insert(Bytes::from_static(b"announce"), Value::string(announce));
        }

        if !self.announce_list.is_empty() {
            let tiers = self
                .announce_list
                .iter()
                .map(Value::string_list)
                .collect();
            root.insert(Bytes::from_static(b"announce-list"), Value::List(tiers));
        }

        if !self.url_list.is_empty() {
            root.insert(
                Bytes::from_static(b"url-list"),
                Value::string_list(&self.url_list),
            );
        }

        if let Some(ref comment) = self.comment {
            root.insert(Bytes::from_static(b"comment"), Value::string(comment));
        }

        if let Some(ref created_by) = self.created_by {
            root.insert(Bytes::from_static(b"created by"), Value::string(created_by));
        }

        if let Some(date) = self.creation_date {
            root.insert(Bytes::from_static(b"creation date"), Value::Integer(date));
        }

        if let Some(ref encoding) = self.encoding {
            root.insert(Bytes::from_static(b"encoding"), Value::string(encoding));
        }

        Value::Dict(root)
    }

    /// Canonical encoding of the descriptor, ready to write to a `.torrent`
    /// file.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode(&self.to_value())
    }

    /// Parses a `.torrent` file.
    ///
    /// Keys this crate does not produce are ignored. A single-string
    /// `url-list`, as written by some other tools, is read as one web seed.
    pub fn from_bytes(data: &[u8]) -> Result<Self, MetainfoError> {
        let value = decode(data)?;
        let dict = value.as_dict().ok_or(MetainfoError::InvalidField("root"))?;

        let info = dict
            .get(b"info".as_slice())
            .ok_or(MetainfoError::MissingField("info"))
            .and_then(parse_info)?;

        let announce = optional_string(dict, b"announce", "announce")?;

        let announce_list = match dict.get(b"announce-list".as_slice()) {
            None => Vec::new(),
            Some(v) => v
                .as_list()
                .ok_or(MetainfoError::InvalidField("announce-list"))?
                .iter()
                .map(|tier| string_list(tier, "announce-list"))
                .collect::<Result<_, _>>()?,
        };

        let url_list = match dict.get(b"url-list".as_slice()) {
            None => Vec::new(),
            Some(Value::Bytes(_)) => vec![required_str(dict, b"url-list", "url-list")?],
            Some(v) => string_list(v, "url-list")?,
        };

        let creation_date = match dict.get(b"creation date".as_slice()) {
            None => None,
            Some(v) => Some(
                v.as_integer()
                    .ok_or(MetainfoError::InvalidField("creation date"))?,
            ),
        };

        Ok(Self {
            created_by: optional_string(dict, b"created by", "created by")?,
            creation_date,
            encoding: optional_string(dict, b"encoding", "encoding")?,
            announce,
            announce_list,
            url_list,
            comment: optional_string(dict, b"comment", "comment")?,
            info,
        })
    }

    /// SHA-1 of the encoded `info` dictionary.
    pub fn info_hash(&self) -> InfoHash {
        InfoHash::from_info_bytes(&encode(&self.info.to_value()))
    }

    /// Sum of all file lengths.
    pub fn total_length(&self) -> u64 {
        match &self.info.layout {
            FileLayout::Single { length } => *length,
            FileLayout::Multi { files } => files.iter().map(|f| f.length).sum(),
        }
    }

    pub fn piece_count(&self) -> usize {
        self.info.pieces.len()
    }

    pub fn is_single_file(&self) -> bool {
        matches!(self.info.layout, FileLayout::Single { .. })
    }

    /// Whether an `index.html` sits at the root of the torrent, so that the
    /// content can be opened as a website.
    ///
    /// In single-file mode this can only be told from the name, which an
    /// explicit name may have replaced.
    pub fn has_root_index(&self) -> bool {
        match &self.info.layout {
            FileLayout::Single { .. } => self.info.name == INDEX_FILE,
            FileLayout::Multi { files } => files
                .iter()
                .any(|f| f.components.len() == 1 && f.components[0] == INDEX_FILE),
        }
    }
}

fn parse_info(value: &Value) -> Result<Info, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("info"))?;

    let name = required_str(dict, b"name", "name")?;

    let piece_length = dict
        .get(b"piece length".as_slice())
        .ok_or(MetainfoError::MissingField("piece length"))?
        .as_integer()
        .filter(|&n| n > 0)
        .ok_or(MetainfoError::InvalidField("piece length"))? as u64;

    let pieces_bytes = dict
        .get(b"pieces".as_slice())
        .ok_or(MetainfoError::MissingField("pieces"))?
        .as_bytes()
        .ok_or(MetainfoError::InvalidField("pieces"))?;

    if pieces_bytes.is_empty() || pieces_bytes.len() % DIGEST_LEN != 0 {
        return Err(MetainfoError::InvalidField("pieces"));
    }

    let pieces: Vec<PieceDigest> = pieces_bytes
        .chunks_exact(DIGEST_LEN)
        .map(|chunk| {
            let mut arr = [0u8; DIGEST_LEN];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();

    let layout = if let Some(length) = dict.get(b"length".as_slice()) {
        FileLayout::Single {
            length: non_negative(length, "length")?,
        }
    } else if let Some(files) = dict.get(b"files".as_slice()) {
        let files = files
            .as_list()
            .ok_or(MetainfoError::InvalidField("files"))?
            .iter()
            .map(parse_file)
            .collect::<Result<Vec<_>, _>>()?;
        FileLayout::Multi { files }
    } else {
        return Err(MetainfoError::MissingField("length or files"));
    };

    Ok(Info {
        name,
        piece_length,
        pieces,
        layout,
    })
}

fn parse_file(value: &Value) -> Result<FileEntry, MetainfoError> {
    let dict = value.as_dict().ok_or(MetainfoError::InvalidField("files"))?;

    let length = dict
        .get(b"length".as_slice())
        .ok_or(MetainfoError::MissingField("file length"))
        .and_then(|v| non_negative(v, "file length"))?;

    let components = dict
        .get(b"path".as_slice())
        .ok_or(MetainfoError::MissingField("file path"))
        .and_then(|v| string_list(v, "file path"))?;

    if components.is_empty() {
        return Err(MetainfoError::InvalidField("file path"));
    }

    Ok(FileEntry {
        path: components.iter().collect(),
        components,
        length,
    })
}

fn non_negative(value: &Value, field: &'static str) -> Result<u64, MetainfoError> {
    value
        .as_integer()
        .and_then(|n| u64::try_from(n).ok())
        .ok_or(MetainfoError::InvalidField(field))
}

fn string_list(value: &Value, field: &'static str) -> Result<Vec<String>, MetainfoError> {
    value
        .as_list()
        .ok_or(MetainfoError::InvalidField(field))?
        .iter()
        .map(|v| {
            v.as_str()
                .map(String::from)
                .ok_or(MetainfoError::InvalidField(field))
        })
        .collect()
}

fn required_str(
    dict: &BTreeMap<Bytes, Value>,
    key: &[u8],
    field: &'static str,
) -> Result<String, MetainfoError> {
    optional_string(dict, key, field)?.ok_or(MetainfoError::MissingField(field))
}

fn optional_string(
    dict: &BTreeMap<Bytes, Value>,
    key: &[u8],
    field: &'static str,
) -> Result<Option<String>, MetainfoError> {
    match dict.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.to_string()))
            .ok_or(MetainfoError::InvalidField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn multi_file() -> Descriptor {
        let files = vec![
            FileEntry {
                path: PathBuf::from("index.html"),
                components: vec!["index.html".into()],
                length: 10,
            },
            FileEntry {
                path: PathBuf::from("css/site.css"),
                components: vec!["css".into(), "site.css".into()],
                length: 20,
            },
        ];
        Descriptor {
            created_by: Some("TWT-Gen/0.0.1".into()),
            creation_date: Some(1_600_000_000),
            encoding: Some("UTF-8".into()),
            announce: Some("udp://tracker.example:1337".into()),
            announce_list: vec![vec![
                "udp://tracker.example:1337".into(),
                "https://tracker.example/announce".into(),
            ]],
            url_list: vec!["https://example.com/site/".into()],
            comment: Some("a website".into()),
            info: Info {
                name: "site".into(),
                piece_length: 16384,
                pieces: vec![[7u8; DIGEST_LEN]],
                layout: FileLayout::Multi { files },
            },
        }
    }

    #[test]
    fn test_roundtrip_multi_file() {
        let descriptor = multi_file();
        let parsed = Descriptor::from_bytes(&descriptor.to_bytes()).unwrap();
        assert_eq!(parsed, descriptor);
        assert_eq!(parsed.total_length(), 30);
        assert_eq!(parsed.piece_count(), 1);
        assert!(!parsed.is_single_file());
        assert!(parsed.has_root_index());
    }

    #[test]
    fn test_encoded_keys_are_sorted() {
        let bytes = multi_file().to_bytes();
        assert!(crate::bencode::decode_strict(&bytes).is_ok());
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let mut descriptor = multi_file();
        descriptor.announce = None;
        descriptor.announce_list.clear();
        descriptor.url_list.clear();
        descriptor.comment = None;

        let value = descriptor.to_value();
        let root = value.as_dict().unwrap();
        let absent: [&[u8]; 4] = [b"announce", b"announce-list", b"url-list", b"comment"];
        for key in absent {
            assert!(root.get(key).is_none());
        }
        assert!(root.get(b"encoding".as_slice()).is_some());
    }

    #[test]
    fn test_single_web_seed_is_a_list() {
        let mut descriptor = multi_file();
        descriptor.url_list = vec!["https://example.com/".into()];
        let value = descriptor.to_value();
        assert!(value.get(b"url-list").unwrap().as_list().is_some());
    }

    #[test]
    fn test_parse_string_url_list() {
        let data = b"d4:infod6:lengthi1e4:name1:x12:piece lengthi16384e6:pieces20:\
aaaaaaaaaaaaaaaaaaaae8:url-list14:http://seed/x/e";
        let parsed = Descriptor::from_bytes(data).unwrap();
        assert_eq!(parsed.url_list, vec!["http://seed/x/"]);
        assert!(parsed.is_single_file());
    }

    #[test]
    fn test_info_hash_covers_only_info() {
        let a = multi_file();
        let mut b = multi_file();
        b.comment = None;
        b.creation_date = Some(0);
        assert_eq!(a.info_hash(), b.info_hash());

        b.info.name = "other".into();
        assert_ne!(a.info_hash(), b.info_hash());
    }

    #[test]
    fn test_info_hash_is_sha1_of_encoded_info() {
        let descriptor = multi_file();
        let bytes = descriptor.to_bytes();
        let root = decode(&bytes).unwrap();
        let info = encode(root.get(b"info").unwrap());
        assert_eq!(descriptor.info_hash(), InfoHash::from_info_bytes(&info));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            Descriptor::from_bytes(b"i1e"),
            Err(MetainfoError::InvalidField("root"))
        ));
        assert!(matches!(
            Descriptor::from_bytes(b"de"),
            Err(MetainfoError::MissingField("info"))
        ));
        assert!(matches!(
            Descriptor::from_bytes(b"d4:infod4:name1:x12:piece lengthi16384e6:pieces3:abcee"),
            Err(MetainfoError::InvalidField("pieces"))
        ));
        assert!(matches!(
            Descriptor::from_bytes(b"d4:infod4:name1:x12:piece lengthi0ee"),
            Err(MetainfoError::InvalidField("piece length"))
        ));
        assert!(matches!(
            Descriptor::from_bytes(b"d4:info"),
            Err(MetainfoError::Bencode(_))
        ));
    }

    #[test]
    fn test_parse_requires_layout() {
        let data = b"d4:infod4:name1:x12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";
        assert!(matches!(
            Descriptor::from_bytes(data),
            Err(MetainfoError::MissingField("length or files"))
        ));
    }

    #[test]
    fn test_root_index_only_at_top_level() {
        let mut descriptor = multi_file();
        if let FileLayout::Multi { files } = &mut descriptor.info.layout {
            files[0].components = vec!["docs".into(), "index.html".into()];
        }
        assert!(!descriptor.has_root_index());
    }
}
