//! Operations the host has no import for.
//!
//! None of these reach the host; they all fail with `Errno::Nosys`.

use super::*;

fn nosys<T>() -> Result<T> {
    Err(Errno::Nosys.into())
}

impl<H: Host> Posix<H> {
    #[instrument(level = "trace", skip_all, fields(path = %path, mode = mode), err)]
    pub fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(%fd, mode = mode), err)]
    pub fn fchmod(&self, fd: Fd, mode: u32) -> Result<()> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(path = %path, uid = uid, gid = gid), err)]
    pub fn chown(&self, path: &str, uid: i32, gid: i32) -> Result<()> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(%fd, uid = uid, gid = gid), err)]
    pub fn fchown(&self, fd: Fd, uid: i32, gid: i32) -> Result<()> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(path = %path, uid = uid, gid = gid), err)]
    pub fn lchown(&self, path: &str, uid: i32, gid: i32) -> Result<()> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(%fd), err)]
    pub fn dup(&self, fd: Fd) -> Result<Fd> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(%fd, %new_fd), err)]
    pub fn dup2(&self, fd: Fd, new_fd: Fd) -> Result<Fd> {
        nosys()
    }

    /// Would return the read and write ends.
    #[instrument(level = "trace", skip_all, err)]
    pub fn pipe(&self) -> Result<(Fd, Fd)> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(%fd), err)]
    pub fn fsync(&self, fd: Fd) -> Result<()> {
        nosys()
    }

    /// Single-entry directory reads; use [`Posix::read_dir`] instead.
    #[instrument(level = "trace", skip_all, fields(%fd, len = buf.len()), err)]
    pub fn read_dirent(&self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        nosys()
    }

    #[instrument(level = "trace", skip_all, fields(domain = domain, ty = ty, proto = proto), err)]
    pub fn socket(&self, domain: i32, ty: i32, proto: i32) -> Result<Fd> {
        nosys()
    }
}
