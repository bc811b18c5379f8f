//! The import surface consumed by the POSIX layer.
//!
//! Every method mirrors one `wasi_unstable` import: results are written
//! through the `&mut` out-parameters and the return value is the raw
//! status code (`0` on success, an [`Errno`](crate::Errno) value
//! otherwise). Implementations must not interpret descriptors they did
//! not hand out themselves.

use crate::{
    Dircookie, Fd, Fdflags, Fdstat, Filedelta, Filesize, Filestat, Fstflags, Lookup, Oflags,
    Rights, Size, Timestamp,
};

/// Raw status code returned by an import.
pub type RawErrno = u16;

pub trait Host: Send + Sync {
    fn fd_close(&self, fd: Fd) -> RawErrno;

    fn fd_fdstat_get(&self, fd: Fd, buf: &mut Fdstat) -> RawErrno;

    fn fd_filestat_get(&self, fd: Fd, buf: &mut Filestat) -> RawErrno;

    fn fd_filestat_set_size(&self, fd: Fd, size: Filesize) -> RawErrno;

    fn fd_read(&self, fd: Fd, buf: &mut [u8], nread: &mut Size) -> RawErrno;

    fn fd_write(&self, fd: Fd, buf: &[u8], nwritten: &mut Size) -> RawErrno;

    fn fd_pread(&self, fd: Fd, buf: &mut [u8], offset: Filesize, nread: &mut Size) -> RawErrno;

    fn fd_pwrite(&self, fd: Fd, buf: &[u8], offset: Filesize, nwritten: &mut Size) -> RawErrno;

    fn fd_seek(
        &self,
        fd: Fd,
        offset: Filedelta,
        whence: u8,
        newoffset: &mut Filesize,
    ) -> RawErrno;

    /// Fills `buf` with directory entries starting at `cookie`.
    ///
    /// A `bufused` smaller than `buf.len()` means the end of the directory
    /// was reached. The last record may be truncated.
    fn fd_readdir(
        &self,
        fd: Fd,
        buf: &mut [u8],
        cookie: Dircookie,
        bufused: &mut Size,
    ) -> RawErrno;

    #[allow(clippy::too_many_arguments)]
    fn path_open(
        &self,
        dirfd: Fd,
        dirflags: Lookup,
        path: &[u8],
        oflags: Oflags,
        fs_rights_base: Rights,
        fs_rights_inheriting: Rights,
        fs_flags: Fdflags,
        fd: &mut Fd,
    ) -> RawErrno;

    fn path_create_directory(&self, fd: Fd, path: &[u8]) -> RawErrno;

    fn path_remove_directory(&self, fd: Fd, path: &[u8]) -> RawErrno;

    fn path_unlink_file(&self, fd: Fd, path: &[u8]) -> RawErrno;

    fn path_rename(&self, old_fd: Fd, old_path: &[u8], new_fd: Fd, new_path: &[u8]) -> RawErrno;

    fn path_link(
        &self,
        old_fd: Fd,
        old_flags: Lookup,
        old_path: &[u8],
        new_fd: Fd,
        new_path: &[u8],
    ) -> RawErrno;

    fn path_symlink(&self, old_path: &[u8], fd: Fd, new_path: &[u8]) -> RawErrno;

    /// Writes the target of the symlink at `path` into `buf`.
    ///
    /// A target longer than `buf` is truncated and `bufused == buf.len()`.
    fn path_readlink(&self, fd: Fd, path: &[u8], buf: &mut [u8], bufused: &mut Size)
    -> RawErrno;

    fn path_filestat_get(
        &self,
        fd: Fd,
        flags: Lookup,
        path: &[u8],
        buf: &mut Filestat,
    ) -> RawErrno;

    #[allow(clippy::too_many_arguments)]
    fn path_filestat_set_times(
        &self,
        fd: Fd,
        flags: Lookup,
        path: &[u8],
        st_atim: Timestamp,
        st_mtim: Timestamp,
        fst_flags: Fstflags,
    ) -> RawErrno;

    fn random_get(&self, buf: &mut [u8]) -> RawErrno;
}
