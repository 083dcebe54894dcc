//! Piece hashing over the concatenation of many files.
//!
//! BitTorrent v1 treats every file of a torrent as one contiguous stream of
//! bytes and hashes that stream in fixed-size windows ("pieces"). A piece may
//! therefore start in one file and finish in the next. [`PieceHasher`] keeps
//! the SHA-1 state of the piece being filled across `update` calls, so
//! callers can simply feed files one after another.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use sha1::{Digest, Sha1};
use tracing::debug;

use super::error::MetainfoError;

/// Length in bytes of a v1 piece digest.
pub const DIGEST_LEN: usize = 20;

/// SHA-1 digest of one piece.
pub type PieceDigest = [u8; DIGEST_LEN];

/// Size of the chunks read from disk.
const READ_CHUNK: usize = 64 * 1024;

/// Streaming piece hasher.
///
/// # Examples
///
/// ```
/// use twt_gen::metainfo::PieceHasher;
///
/// let mut hasher = PieceHasher::new(4);
/// hasher.update(b"abc");
/// hasher.update(b"defg");
/// let pieces = hasher.finish();
///
/// // "abcd" and "efg"
/// assert_eq!(pieces.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct PieceHasher {
    piece_length: u64,
    current: Sha1,
    filled: u64,
    total: u64,
    pieces: Vec<PieceDigest>,
}

impl PieceHasher {
    /// Creates a hasher producing one digest per `piece_length` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `piece_length` is zero. Callers validate the configured
    /// piece length before hashing.
    pub fn new(piece_length: u64) -> Self {
        assert!(piece_length > 0, "piece length must be positive");
        Self {
            piece_length,
            current: Sha1::new(),
            filled: 0,
            total: 0,
            pieces: Vec::new(),
        }
    }

    /// Feeds the next bytes of the logical stream.
    pub fn update(&mut self, mut data: &[u8]) {
        self.total += data.len() as u64;

        while !data.is_empty() {
            let room = self.piece_length - self.filled;
            let take = room.min(data.len() as u64) as usize;
            let (head, rest) = data.split_at(take);

            self.current.update(head);
            self.filled += take as u64;
            data = rest;

            if self.filled == self.piece_length {
                self.pieces.push(self.current.finalize_reset().into());
                self.filled = 0;
            }
        }
    }

    /// Drains `reader` into the stream and returns how many bytes it produced.
    pub fn update_from_reader<R: Read>(&mut self, mut reader: R) -> std::io::Result<u64> {
        let mut buf = vec![0u8; READ_CHUNK];
        let mut read = 0u64;

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.update(&buf[..n]);
            read += n as u64;
        }

        Ok(read)
    }

    /// Total number of bytes fed so far.
    pub fn total_length(&self) -> u64 {
        self.total
    }

    /// Hashes the trailing partial piece and returns all digests in stream
    /// order.
    ///
    /// An empty stream still yields one digest, that of the empty input.
    pub fn finish(mut self) -> Vec<PieceDigest> {
        if self.filled > 0 || self.pieces.is_empty() {
            self.pieces.push(self.current.finalize().into());
        }
        self.pieces
    }
}

/// Hashes the files at `paths`, in order, as one logical byte stream.
///
/// Any file that cannot be opened or read aborts the whole operation.
pub fn hash_pieces<P: AsRef<Path>>(
    paths: &[P],
    piece_length: u64,
) -> Result<Vec<PieceDigest>, MetainfoError> {
    if piece_length == 0 {
        return Err(MetainfoError::InvalidPieceLength(piece_length));
    }

    let mut hasher = PieceHasher::new(piece_length);
    for path in paths {
        hash_file(&mut hasher, path.as_ref())?;
    }
    Ok(hasher.finish())
}

/// Feeds one file into `hasher`, returning the number of bytes read.
pub(crate) fn hash_file(hasher: &mut PieceHasher, path: &Path) -> Result<u64, MetainfoError> {
    let file = File::open(path).map_err(|e| MetainfoError::io(path, e))?;
    let read = hasher
        .update_from_reader(file)
        .map_err(|e| MetainfoError::io(path, e))?;

    debug!("Hashed {} ({} bytes)", path.display(), read);
    Ok(read)
}

/// Concatenates digests into the `pieces` byte string.
pub fn concat_digests(pieces: &[PieceDigest]) -> Vec<u8> {
    pieces.iter().flat_map(|h| h.iter().copied()).collect()
}
