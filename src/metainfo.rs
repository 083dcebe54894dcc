//! Torrent descriptors ([BEP-3]) built from files on disk.
//!
//! # Overview
//!
//! A descriptor (`.torrent` file) tells a client what to download and how to
//! check it:
//! - the file names, sizes and directory layout
//! - one SHA-1 digest per fixed-size piece of the concatenated content
//! - trackers and web seeds to get the content from
//!
//! [`TorrentBuilder`] produces a [`Descriptor`] from input paths. The pieces
//! it is made of are exposed on their own: [`resolve_inputs`] and
//! [`common_ancestor`] for paths, [`PieceHasher`] and [`hash_pieces`] for
//! hashing, [`magnet_link`] and [`browser_link`] for sharing the result.
//!
//! # Examples
//!
//! ```no_run
//! use twt_gen::metainfo::{magnet_link, TorrentBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let descriptor = TorrentBuilder::new()
//!     .add_path("/srv/www/site")
//!     .add_tracker("udp://tracker.example:1337")
//!     .build()?;
//!
//! println!("Name: {}", descriptor.info.name);
//! println!("Info hash: {}", descriptor.info_hash());
//! println!("Total size: {} bytes", descriptor.total_length());
//! println!("Pieces: {}", descriptor.piece_count());
//! println!("{}", magnet_link(&descriptor, true));
//!
//! std::fs::write("site.torrent", descriptor.to_bytes())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Descriptor structure
//!
//! - **info** - hashed to create the info hash
//!   - `name` - suggested file or directory name
//!   - `piece length` - size of each piece in bytes
//!   - `pieces` - concatenated SHA-1 digests
//!   - `length` (one file) OR `files` (list of `length` and `path`)
//! - **announce** - first tracker
//! - **announce-list** - one tier holding every tracker
//! - **url-list** - web seeds
//! - **comment**, **created by**, **creation date**, **encoding**
//!
//! [BEP-3]: http://bittorrent.org/beps/bep_0003.html

mod builder;
mod descriptor;
mod error;
mod hasher;
mod info_hash;
mod links;
mod paths;

pub use builder::{
    TorrentBuilder, DEFAULT_CREATED_BY, DEFAULT_ENCODING, DEFAULT_NAME, DEFAULT_PIECE_LENGTH,
};
pub use descriptor::{Descriptor, FileEntry, FileLayout, Info, INDEX_FILE};
pub use error::{ErrorKind, MetainfoError};
pub use hasher::{concat_digests, hash_pieces, PieceDigest, PieceHasher, DIGEST_LEN};
pub use info_hash::InfoHash;
pub use links::{browser_link, magnet_link};
pub use paths::{common_ancestor, is_hidden, relativize, resolve_inputs, torrent_root};
