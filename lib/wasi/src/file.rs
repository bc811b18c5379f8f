use std::io;

use tracing::instrument;
use wasi_posix_types::{Fd, Filestat, Host};

use crate::{
    Result,
    context::Posix,
    dir::{DirCursor, DirNames, ReadDirError},
    rights::OpenFlags,
    syscalls::{SEEK_CUR, SEEK_END, SEEK_SET},
};

/// An open descriptor together with its directory read position.
///
/// The descriptor is closed on drop unless [`File::close`] was called.
pub struct File<'a, H: Host> {
    posix: &'a Posix<H>,
    fd: Fd,
    cursor: Option<DirCursor>,
    closed: bool,
}

impl<H: Host> Posix<H> {
    /// Like [`Posix::open`], wrapped in a [`File`].
    pub fn open_file(&self, path: &str, flags: OpenFlags, perm: u32) -> Result<File<'_, H>> {
        let fd = self.open(path, flags, perm)?;
        Ok(File {
            posix: self,
            fd,
            cursor: None,
            closed: false,
        })
    }
}

impl<'a, H: Host> File<'a, H> {
    pub fn fd(&self) -> Fd {
        self.fd
    }

    pub fn stat(&self) -> Result<Filestat> {
        self.posix.fstat(self.fd)
    }

    fn cursor(&mut self) -> &mut DirCursor {
        let size = self.posix.config.dir_buf_size;
        self.cursor.get_or_insert_with(|| DirCursor::new(size))
    }

    /// Reads up to `n` entry names; `n <= 0` reads all that is left.
    ///
    /// `Ok(None)` marks the end of the directory. On failure the names
    /// read so far travel with the error.
    #[instrument(level = "trace", skip_all, fields(fd = self.fd, n), err)]
    pub fn read_names(&mut self, n: isize) -> Result<Option<Vec<String>>, ReadDirError> {
        let posix: &'a Posix<H> = self.posix;
        let fd = self.fd;
        self.cursor().read_names(&posix.host, fd, n)
    }

    /// Iterates over the remaining entry names.
    pub fn names(&mut self) -> DirNames<'_> {
        let posix: &'a Posix<H> = self.posix;
        let fd = self.fd;
        DirNames::new(self.cursor(), &posix.host, fd)
    }

    /// Closes the descriptor, reporting the host's answer.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.posix.close(self.fd)
    }
}

impl<H: Host> Drop for File<'_, H> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.posix.close(self.fd);
        }
    }
}

impl<H: Host> io::Read for File<'_, H> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.posix.read(self.fd, buf)?)
    }
}

impl<H: Host> io::Write for File<'_, H> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.posix.write(self.fd, buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<H: Host> io::Seek for File<'_, H> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            io::SeekFrom::Start(offset) => (
                i64::try_from(offset).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?,
                SEEK_SET,
            ),
            io::SeekFrom::Current(offset) => (offset, SEEK_CUR),
            io::SeekFrom::End(offset) => (offset, SEEK_END),
        };
        Ok(self.posix.seek(self.fd, offset, whence)?)
    }
}
