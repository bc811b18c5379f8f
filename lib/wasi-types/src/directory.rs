use byteorder::{ByteOrder, LittleEndian};

use crate::{Dircookie, Filetype, Inode};

/// A reference to the offset of a directory entry.
pub const DIRCOOKIE_START: Dircookie = 0;

/// Size of the fixed part of a directory entry on the wire.
pub const DIRENT_SIZE: usize = 24;

/// Header of a directory entry, as produced by `fd_readdir`.
///
/// On the wire the header is followed by `d_namlen` bytes of name.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Dirent {
    /// The offset of the next directory entry stored in this directory.
    pub d_next: Dircookie,
    /// The serial number of the file referred to by this directory entry.
    pub d_ino: Inode,
    /// The length of the name of the directory entry.
    pub d_namlen: u32,
    /// The type of the file referred to by this directory entry.
    pub d_type: Filetype,
}

impl Dirent {
    /// Decodes the header at the start of `buf`.
    ///
    /// Returns `None` when fewer than [`DIRENT_SIZE`] bytes are available.
    pub fn read_header(buf: &[u8]) -> Option<Dirent> {
        if buf.len() < DIRENT_SIZE {
            return None;
        }
        Some(Dirent {
            d_next: LittleEndian::read_u64(&buf[0..8]),
            d_ino: LittleEndian::read_u64(&buf[8..16]),
            d_namlen: LittleEndian::read_u32(&buf[16..20]),
            d_type: Filetype::try_from(buf[20]).unwrap_or(Filetype::Unknown),
        })
    }

    /// Total number of bytes this record occupies, name included.
    ///
    /// `None` when the length does not fit in `usize`.
    pub fn record_len(&self) -> Option<usize> {
        usize::try_from(self.d_namlen).ok()?.checked_add(DIRENT_SIZE)
    }
}

/// Encodes the header of `ent` the way a host lays it out in memory.
pub fn dirent_to_le_bytes(ent: &Dirent) -> [u8; DIRENT_SIZE] {
    let mut out = [0u8; DIRENT_SIZE];
    LittleEndian::write_u64(&mut out[0..8], ent.d_next);
    LittleEndian::write_u64(&mut out[8..16], ent.d_ino);
    LittleEndian::write_u32(&mut out[16..20], ent.d_namlen);
    out[20] = ent.d_type.into();
    out
}
