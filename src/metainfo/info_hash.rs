use std::fmt;

use sha1::{Digest, Sha1};

use super::hasher::DIGEST_LEN;

/// SHA-1 hash of a descriptor's encoded `info` dictionary.
///
/// This identifies the torrent on the network, so two descriptors with the
/// same content but different trackers or comments share an info hash.
///
/// ```
/// use twt_gen::metainfo::InfoHash;
///
/// let hash = InfoHash::from_info_bytes(b"d4:name1:xe");
/// assert_eq!(hash.to_hex().len(), 40);
/// assert_eq!(hash.to_string(), hash.to_hex());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; DIGEST_LEN]);

impl InfoHash {
    /// Hashes an already encoded `info` dictionary.
    pub fn from_info_bytes(info: &[u8]) -> Self {
        Self(Sha1::digest(info).into())
    }

    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal form, as used in magnet links.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}
