//! The `wasi_unstable` imports, as provided by the embedding runtime.

use wasi_posix_types::{
    Dircookie, Fd, Fdflags, Fdstat, Filedelta, Filesize, Filestat, Fstflags, Host, Lookup,
    Oflags, RawErrno, Rights, Size, Timestamp,
};

#[repr(C)]
struct Iovec {
    buf: *mut u8,
    buf_len: usize,
}

#[repr(C)]
struct Ciovec {
    buf: *const u8,
    buf_len: usize,
}

mod sys {
    use super::{Ciovec, Iovec};
    use wasi_posix_types::{Fdstat, Filestat};

    #[link(wasm_import_module = "wasi_unstable")]
    unsafe extern "C" {
        pub fn fd_close(fd: u32) -> u16;
        pub fn fd_fdstat_get(fd: u32, buf: *mut Fdstat) -> u16;
        pub fn fd_filestat_get(fd: u32, buf: *mut Filestat) -> u16;
        pub fn fd_filestat_set_size(fd: u32, size: u64) -> u16;
        pub fn fd_read(fd: u32, iovs: *const Iovec, iovs_len: usize, nread: *mut usize) -> u16;
        pub fn fd_write(
            fd: u32,
            iovs: *const Ciovec,
            iovs_len: usize,
            nwritten: *mut usize,
        ) -> u16;
        pub fn fd_pread(
            fd: u32,
            iovs: *const Iovec,
            iovs_len: usize,
            offset: u64,
            nread: *mut usize,
        ) -> u16;
        pub fn fd_pwrite(
            fd: u32,
            iovs: *const Ciovec,
            iovs_len: usize,
            offset: u64,
            nwritten: *mut usize,
        ) -> u16;
        pub fn fd_seek(fd: u32, offset: i64, whence: u8, newoffset: *mut u64) -> u16;
        pub fn fd_readdir(
            fd: u32,
            buf: *mut u8,
            buf_len: usize,
            cookie: u64,
            bufused: *mut usize,
        ) -> u16;
        pub fn path_open(
            dirfd: u32,
            dirflags: u32,
            path: *const u8,
            path_len: usize,
            oflags: u16,
            fs_rights_base: u64,
            fs_rights_inheriting: u64,
            fs_flags: u16,
            fd: *mut u32,
        ) -> u16;
        pub fn path_create_directory(fd: u32, path: *const u8, path_len: usize) -> u16;
        pub fn path_remove_directory(fd: u32, path: *const u8, path_len: usize) -> u16;
        pub fn path_unlink_file(fd: u32, path: *const u8, path_len: usize) -> u16;
        pub fn path_rename(
            old_fd: u32,
            old_path: *const u8,
            old_path_len: usize,
            new_fd: u32,
            new_path: *const u8,
            new_path_len: usize,
        ) -> u16;
        pub fn path_link(
            old_fd: u32,
            old_flags: u32,
            old_path: *const u8,
            old_path_len: usize,
            new_fd: u32,
            new_path: *const u8,
            new_path_len: usize,
        ) -> u16;
        pub fn path_symlink(
            old_path: *const u8,
            old_path_len: usize,
            fd: u32,
            new_path: *const u8,
            new_path_len: usize,
        ) -> u16;
        pub fn path_readlink(
            fd: u32,
            path: *const u8,
            path_len: usize,
            buf: *mut u8,
            buf_len: usize,
            bufused: *mut usize,
        ) -> u16;
        pub fn path_filestat_get(
            fd: u32,
            flags: u32,
            path: *const u8,
            path_len: usize,
            buf: *mut Filestat,
        ) -> u16;
        pub fn path_filestat_set_times(
            fd: u32,
            flags: u32,
            path: *const u8,
            path_len: usize,
            st_atim: u64,
            st_mtim: u64,
            fst_flags: u16,
        ) -> u16;
        pub fn random_get(buf: *mut u8, buf_len: usize) -> u16;
    }
}

/// The host the module was instantiated in.
#[derive(Debug, Default, Clone, Copy)]
pub struct WasiUnstable;

// `usize` and `Size` are both 32 bits wide on this target.
fn store(out: &mut Size, value: usize) {
    *out = value as Size;
}

impl Host for WasiUnstable {
    fn fd_close(&self, fd: Fd) -> RawErrno {
        unsafe { sys::fd_close(fd) }
    }

    fn fd_fdstat_get(&self, fd: Fd, buf: &mut Fdstat) -> RawErrno {
        unsafe { sys::fd_fdstat_get(fd, buf) }
    }

    fn fd_filestat_get(&self, fd: Fd, buf: &mut Filestat) -> RawErrno {
        unsafe { sys::fd_filestat_get(fd, buf) }
    }

    fn fd_filestat_set_size(&self, fd: Fd, size: Filesize) -> RawErrno {
        unsafe { sys::fd_filestat_set_size(fd, size) }
    }

    fn fd_read(&self, fd: Fd, buf: &mut [u8], nread: &mut Size) -> RawErrno {
        let iov = Iovec {
            buf: buf.as_mut_ptr(),
            buf_len: buf.len(),
        };
        let mut n = 0usize;
        let errno = unsafe { sys::fd_read(fd, &iov, 1, &mut n) };
        store(nread, n);
        errno
    }

    fn fd_write(&self, fd: Fd, buf: &[u8], nwritten: &mut Size) -> RawErrno {
        let iov = Ciovec {
            buf: buf.as_ptr(),
            buf_len: buf.len(),
        };
        let mut n = 0usize;
        let errno = unsafe { sys::fd_write(fd, &iov, 1, &mut n) };
        store(nwritten, n);
        errno
    }

    fn fd_pread(&self, fd: Fd, buf: &mut [u8], offset: Filesize, nread: &mut Size) -> RawErrno {
        let iov = Iovec {
            buf: buf.as_mut_ptr(),
            buf_len: buf.len(),
        };
        let mut n = 0usize;
        let errno = unsafe { sys::fd_pread(fd, &iov, 1, offset, &mut n) };
        store(nread, n);
        errno
    }

    fn fd_pwrite(&self, fd: Fd, buf: &[u8], offset: Filesize, nwritten: &mut Size) -> RawErrno {
        let iov = Ciovec {
            buf: buf.as_ptr(),
            buf_len: buf.len(),
        };
        let mut n = 0usize;
        let errno = unsafe { sys::fd_pwrite(fd, &iov, 1, offset, &mut n) };
        store(nwritten, n);
        errno
    }

    fn fd_seek(
        &self,
        fd: Fd,
        offset: Filedelta,
        whence: u8,
        newoffset: &mut Filesize,
    ) -> RawErrno {
        unsafe { sys::fd_seek(fd, offset, whence, newoffset) }
    }

    fn fd_readdir(
        &self,
        fd: Fd,
        buf: &mut [u8],
        cookie: Dircookie,
        bufused: &mut Size,
    ) -> RawErrno {
        let mut n = 0usize;
        let errno = unsafe { sys::fd_readdir(fd, buf.as_mut_ptr(), buf.len(), cookie, &mut n) };
        store(bufused, n);
        errno
    }

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
    ) -> RawErrno {
        unsafe {
            sys::path_open(
                dirfd,
                dirflags.bits(),
                path.as_ptr(),
                path.len(),
                oflags.bits(),
                fs_rights_base.bits(),
                fs_rights_inheriting.bits(),
                fs_flags.bits(),
                fd,
            )
        }
    }

    fn path_create_directory(&self, fd: Fd, path: &[u8]) -> RawErrno {
        unsafe { sys::path_create_directory(fd, path.as_ptr(), path.len()) }
    }

    fn path_remove_directory(&self, fd: Fd, path: &[u8]) -> RawErrno {
        unsafe { sys::path_remove_directory(fd, path.as_ptr(), path.len()) }
    }

    fn path_unlink_file(&self, fd: Fd, path: &[u8]) -> RawErrno {
        unsafe { sys::path_unlink_file(fd, path.as_ptr(), path.len()) }
    }

    fn path_rename(&self, old_fd: Fd, old_path: &[u8], new_fd: Fd, new_path: &[u8]) -> RawErrno {
        unsafe {
            sys::path_rename(
                old_fd,
                old_path.as_ptr(),
                old_path.len(),
                new_fd,
                new_path.as_ptr(),
                new_path.len(),
            )
        }
    }

    fn path_link(
        &self,
        old_fd: Fd,
        old_flags: Lookup,
        old_path: &[u8],
        new_fd: Fd,
        new_path: &[u8],
    ) -> RawErrno {
        unsafe {
            sys::path_link(
                old_fd,
                old_flags.bits(),
                old_path.as_ptr(),
                old_path.len(),
                new_fd,
                new_path.as_ptr(),
                new_path.len(),
            )
        }
    }

    fn path_symlink(&self, old_path: &[u8], fd: Fd, new_path: &[u8]) -> RawErrno {
        unsafe {
            sys::path_symlink(
                old_path.as_ptr(),
                old_path.len(),
                fd,
                new_path.as_ptr(),
                new_path.len(),
            )
        }
    }

    fn path_readlink(
        &self,
        fd: Fd,
        path: &[u8],
        buf: &mut [u8],
        bufused: &mut Size,
    ) -> RawErrno {
        let mut n = 0usize;
        let errno = unsafe {
            sys::path_readlink(
                fd,
                path.as_ptr(),
                path.len(),
                buf.as_mut_ptr(),
                buf.len(),
                &mut n,
            )
        };
        store(bufused, n);
        errno
    }

    fn path_filestat_get(
        &self,
        fd: Fd,
        flags: Lookup,
        path: &[u8],
        buf: &mut Filestat,
    ) -> RawErrno {
        unsafe { sys::path_filestat_get(fd, flags.bits(), path.as_ptr(), path.len(), buf) }
    }

    fn path_filestat_set_times(
        &self,
        fd: Fd,
        flags: Lookup,
        path: &[u8],
        st_atim: Timestamp,
        st_mtim: Timestamp,
        fst_flags: Fstflags,
    ) -> RawErrno {
        unsafe {
            sys::path_filestat_set_times(
                fd,
                flags.bits(),
                path.as_ptr(),
                path.len(),
                st_atim,
                st_mtim,
                fst_flags.bits(),
            )
        }
    }

    fn random_get(&self, buf: &mut [u8]) -> RawErrno {
        unsafe { sys::random_get(buf.as_mut_ptr(), buf.len()) }
    }
}
