#![deny(unused_mut)]

//! `wasi_unstable` ABI types used by the POSIX filesystem layer.
//!
//! The layouts in here are load-bearing: `Filestat` and `Fdstat` are passed
//! to the host by address and directory entries are decoded byte by byte.

mod directory;
mod errno;
mod file;
mod flags;
pub mod host;

pub use directory::*;
pub use errno::*;
pub use file::*;
pub use flags::*;
pub use host::{Host, RawErrno};

/// Non-negative file size or length of a region within a file.
pub type Filesize = u64;
/// Relative offset within a file.
pub type Filedelta = i64;
/// Timestamp in nanoseconds.
pub type Timestamp = u64;
/// A reference to the offset of a directory entry.
pub type Dircookie = u64;
/// File serial number that is unique within its file system.
pub type Inode = u64;
/// Identifier for a device containing a file system.
pub type Device = u64;
/// Number of hard links to an inode.
pub type Linkcount = u32;
/// Size of a buffer as seen by the guest (`size_t` on wasm32).
pub type Size = u32;
