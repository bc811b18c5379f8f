use bitflags::bitflags;

bitflags! {
    /// File descriptor rights, determining which actions may be performed.
    #[derive(Default)]
    #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Rights: u64 {
        /// The right to invoke `fd_datasync`.
        const FD_DATASYNC = 1 << 0;
        /// The right to invoke `fd_read`.
        ///
        /// If `FD_SEEK` is set, includes the right to invoke `fd_pread`.
        const FD_READ = 1 << 1;
        /// The right to invoke `fd_seek`. This flag implies `FD_TELL`.
        const FD_SEEK = 1 << 2;
        const FD_FDSTAT_SET_FLAGS = 1 << 3;
        const FD_SYNC = 1 << 4;
        const FD_TELL = 1 << 5;
        /// The right to invoke `fd_write`.
        ///
        /// If `FD_SEEK` is set, includes the right to invoke `fd_pwrite`.
        const FD_WRITE = 1 << 6;
        const FD_ADVISE = 1 << 7;
        const FD_ALLOCATE = 1 << 8;
        const PATH_CREATE_DIRECTORY = 1 << 9;
        const PATH_CREATE_FILE = 1 << 10;
        const PATH_LINK_SOURCE = 1 << 11;
        const PATH_LINK_TARGET = 1 << 12;
        const PATH_OPEN = 1 << 13;
        /// The right to invoke `fd_readdir`.
        const FD_READDIR = 1 << 14;
        const PATH_READLINK = 1 << 15;
        const PATH_RENAME_SOURCE = 1 << 16;
        const PATH_RENAME_TARGET = 1 << 17;
        const PATH_FILESTAT_GET = 1 << 18;
        /// The right to change a file's size through `path_open` with `Oflags::TRUNC`.
        const PATH_FILESTAT_SET_SIZE = 1 << 19;
        const PATH_FILESTAT_SET_TIMES = 1 << 20;
        const FD_FILESTAT_GET = 1 << 21;
        /// The right to invoke `fd_filestat_set_size`.
        const FD_FILESTAT_SET_SIZE = 1 << 22;
        const FD_FILESTAT_SET_TIMES = 1 << 23;
        const PATH_SYMLINK = 1 << 24;
        const PATH_REMOVE_DIRECTORY = 1 << 25;
        const PATH_UNLINK_FILE = 1 << 26;
        const POLL_FD_READWRITE = 1 << 27;
        const SOCK_SHUTDOWN = 1 << 28;
    }
}

impl Rights {
    /// Rights that allow the content or the size of a file to change.
    pub const WRITE_CLASS: Rights = Rights::from_bits_truncate(
        Rights::FD_DATASYNC.bits()
            | Rights::FD_WRITE.bits()
            | Rights::FD_ALLOCATE.bits()
            | Rights::PATH_FILESTAT_SET_SIZE.bits()
            | Rights::FD_FILESTAT_SET_SIZE.bits(),
    );

    /// Rights that allow data or directory entries to be read.
    pub const READ_CLASS: Rights =
        Rights::from_bits_truncate(Rights::FD_READ.bits() | Rights::FD_READDIR.bits());
}

bitflags! {
    /// File descriptor flags.
    #[derive(Default)]
    #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Fdflags: u16 {
        /// Append mode: Data written to the file is always appended to the file's end.
        const APPEND = 1 << 0;
        const DSYNC = 1 << 1;
        const NONBLOCK = 1 << 2;
        const RSYNC = 1 << 3;
        const SYNC = 1 << 4;
    }
}

bitflags! {
    /// Open flags used by `path_open`.
    #[derive(Default)]
    #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Oflags: u16 {
        /// Create file if it does not exist.
        const CREATE = 1 << 0;
        /// Fail if not a directory.
        const DIRECTORY = 1 << 1;
        /// Fail if file already exists.
        const EXCL = 1 << 2;
        /// Truncate file to size 0.
        const TRUNC = 1 << 3;
    }
}

bitflags! {
    /// Flags determining the method of how paths are resolved.
    #[derive(Default)]
    #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Lookup: u32 {
        /// As long as the resolved path corresponds to a symbolic link, it is expanded.
        const SYMLINK_FOLLOW = 1 << 0;
    }
}

bitflags! {
    /// Which file time attributes to adjust.
    #[derive(Default)]
    #[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Fstflags: u16 {
        const ATIM = 1 << 0;
        const ATIM_NOW = 1 << 1;
        const MTIM = 1 << 2;
        const MTIM_NOW = 1 << 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rights_bits_match_the_abi() {
        assert_eq!(Rights::FD_READ.bits(), 0x2);
        assert_eq!(Rights::FD_WRITE.bits(), 0x40);
        assert_eq!(Rights::FD_READDIR.bits(), 0x4000);
        assert_eq!(Rights::PATH_FILESTAT_SET_SIZE.bits(), 0x80000);
        assert_eq!(Rights::SOCK_SHUTDOWN.bits(), 0x1000_0000);
        assert_eq!(Rights::all().bits(), 0x1fff_ffff);
    }

    #[test]
    fn read_and_write_classes_are_disjoint() {
        assert!((Rights::READ_CLASS & Rights::WRITE_CLASS).is_empty());
        assert!(Rights::WRITE_CLASS.contains(Rights::FD_WRITE));
        assert!(Rights::READ_CLASS.contains(Rights::FD_READDIR));
    }
}
