//! twt-gen - torrent generator for websites
//!
//! This library builds BitTorrent descriptors (`.torrent` files) from files
//! and directories on disk, so that a static website can be shared and
//! opened straight from a torrent.
//!
//! # Modules
//!
//! - [`bencode`] - BEP-3 Bencode encoding/decoding
//! - [`metainfo`] - path resolution, piece hashing, descriptor building and
//!   share links

pub mod bencode;
pub mod metainfo;

pub use bencode::{decode, encode, BencodeError, Value};
pub use metainfo::{Descriptor, InfoHash, MetainfoError, TorrentBuilder};
