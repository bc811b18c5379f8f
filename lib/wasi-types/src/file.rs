use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::{Device, Fdflags, Filesize, Inode, Linkcount, Rights, Timestamp};

/// A file descriptor handle.
pub type Fd = u32;

pub const STDIN_FILENO: Fd = 0;
pub const STDOUT_FILENO: Fd = 1;
pub const STDERR_FILENO: Fd = 2;

/// The first pre-opened directory handed out by the host.
pub const ROOT_FD: Fd = 3;

/// The type of a file descriptor or file.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Filetype {
    Unknown = 0,
    BlockDevice,
    CharacterDevice,
    Directory,
    RegularFile,
    SocketDgram,
    SocketStream,
    SymbolicLink,
}

impl Default for Filetype {
    fn default() -> Self {
        Filetype::Unknown
    }
}

/// The position relative to which to set the offset of the file descriptor.
///
/// The numbering is the `wasi_unstable` one, not the POSIX `SEEK_*` one.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
pub enum Whence {
    Cur = 0,
    End = 1,
    Set = 2,
}

/// File attributes, as written by `fd_filestat_get` and `path_filestat_get`.
///
/// Field order and widths are a contract with the host: the struct is
/// passed by address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(C)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Filestat {
    pub st_dev: Device,
    pub st_ino: Inode,
    pub st_filetype: u8,
    pub st_nlink: Linkcount,
    pub st_size: Filesize,
    pub st_atim: Timestamp,
    pub st_mtim: Timestamp,
    pub st_ctim: Timestamp,
}

impl Filestat {
    /// Decoded file type, `Unknown` when the host wrote an out of range tag.
    pub fn filetype(&self) -> Filetype {
        Filetype::try_from(self.st_filetype).unwrap_or(Filetype::Unknown)
    }

    pub fn is_dir(&self) -> bool {
        self.filetype() == Filetype::Directory
    }
}

/// File descriptor attributes, as written by `fd_fdstat_get`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[repr(C)]
pub struct Fdstat {
    pub fs_filetype: u8,
    pub fs_flags: u16,
    pub fs_rights_base: u64,
    pub fs_rights_inheriting: u64,
}

impl Fdstat {
    pub fn flags(&self) -> Fdflags {
        Fdflags::from_bits_truncate(self.fs_flags)
    }

    pub fn rights_base(&self) -> Rights {
        Rights::from_bits_truncate(self.fs_rights_base)
    }

    pub fn rights_inheriting(&self) -> Rights {
        Rights::from_bits_truncate(self.fs_rights_inheriting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoffset::offset_of;
    use std::mem;

    #[test]
    fn filestat_layout() {
        assert_eq!(mem::size_of::<Filestat>(), 56);
        assert_eq!(offset_of!(Filestat, st_dev), 0);
        assert_eq!(offset_of!(Filestat, st_ino), 8);
        assert_eq!(offset_of!(Filestat, st_filetype), 16);
        assert_eq!(offset_of!(Filestat, st_nlink), 20);
        assert_eq!(offset_of!(Filestat, st_size), 24);
        assert_eq!(offset_of!(Filestat, st_atim), 32);
        assert_eq!(offset_of!(Filestat, st_mtim), 40);
        assert_eq!(offset_of!(Filestat, st_ctim), 48);
    }

    #[test]
    fn fdstat_layout() {
        assert_eq!(mem::size_of::<Fdstat>(), 24);
        assert_eq!(offset_of!(Fdstat, fs_filetype), 0);
        assert_eq!(offset_of!(Fdstat, fs_flags), 2);
        assert_eq!(offset_of!(Fdstat, fs_rights_base), 8);
        assert_eq!(offset_of!(Fdstat, fs_rights_inheriting), 16);
    }

    #[test]
    fn unknown_filetype_tag_decodes_as_unknown() {
        let stat = Filestat {
            st_filetype: 42,
            ..Default::default()
        };
        assert_eq!(stat.filetype(), Filetype::Unknown);
        assert!(!stat.is_dir());
    }
}
