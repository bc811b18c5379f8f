use super::*;

impl<H: Host> Posix<H> {
    /// ### `open()`
    /// Opens the file at `path` below the root descriptor
    /// Inputs:
    /// - `&str path`
    ///     Absolute, or relative to the working directory. Symlinks are
    ///     followed, including a trailing one
    /// - `OpenFlags flags`
    ///     Access mode plus creation flags. The base rights requested from
    ///     the host are narrowed to the access mode
    /// - `u32 perm`
    ///     Ignored, the host has no permission bits
    /// Output:
    /// - `Fd`
    ///     The new descriptor, remembered with its absolute path
    /// Errors:
    /// - `Errno::Inval`
    ///     If `path` is empty
    /// - `Errno::Noent`
    ///     If the file does not exist and `CREAT` is not set
    #[instrument(level = "debug", skip_all, fields(path = %path, ?flags, fd = field::Empty), err)]
    pub fn open(&self, path: &str, flags: OpenFlags, _perm: u32) -> Result<Fd> {
        if path.is_empty() {
            return Err(Errno::Inval.into());
        }
        let cwd = self.cwd();
        let path = absolute(&cwd, path);
        let resolved = self.resolver().resolve(&cwd, &path, true)?;

        let mut fd: Fd = 0;
        check(self.host.path_open(
            self.root_fd(),
            Lookup::empty(),
            resolved.as_bytes(),
            flags.oflags(),
            self.rights.open_rights(flags),
            self.rights.file(),
            flags.fdflags(),
            &mut fd,
        ))?;
        Span::current().record("fd", fd);
        self.fds.record(fd, path);
        Ok(fd)
    }

    /// ### `close()`
    /// Closes a descriptor
    ///
    /// The path recorded for `fd` is dropped first, whatever the host says.
    /// Errors:
    /// - `Errno::Badf`
    ///     If `fd` is invalid or not open
    #[instrument(level = "debug", skip_all, fields(%fd), err)]
    pub fn close(&self, fd: Fd) -> Result<()> {
        self.fds.forget(fd);
        check(self.host.fd_close(fd))
    }

    /// ### `close_on_exec()`
    /// Nothing to do, there is no `exec`
    pub fn close_on_exec(&self, _fd: Fd) {}

    /// ### `read()`
    /// Reads from the current offset of `fd`
    /// Output:
    /// - `usize`
    ///     Bytes read, `0` at end of file or for an empty `buf`
    #[instrument(level = "trace", skip_all, fields(%fd, len = buf.len()), ret, err)]
    pub fn read(&self, fd: Fd, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = host_len(buf.len());
        let mut nread: Size = 0;
        check(self.host.fd_read(fd, &mut buf[..len], &mut nread))?;
        Ok(nread as usize)
    }

    /// ### `write()`
    /// Writes at the current offset of `fd`, or at its end in append mode
    #[instrument(level = "trace", skip_all, fields(%fd, len = buf.len()), ret, err)]
    pub fn write(&self, fd: Fd, buf: &[u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let len = host_len(buf.len());
        let mut nwritten: Size = 0;
        check(self.host.fd_write(fd, &buf[..len], &mut nwritten))?;
        Ok(nwritten as usize)
    }

    /// ### `pread()`
    /// Reads at `offset` without moving the descriptor offset
    #[instrument(level = "trace", skip_all, fields(%fd, len = buf.len(), offset), ret, err)]
    pub fn pread(&self, fd: Fd, buf: &mut [u8], offset: i64) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let offset = filesize(offset)?;
        let len = host_len(buf.len());
        let mut nread: Size = 0;
        check(self.host.fd_pread(fd, &mut buf[..len], offset, &mut nread))?;
        Ok(nread as usize)
    }

    /// ### `pwrite()`
    /// Writes at `offset` without moving the descriptor offset
    #[instrument(level = "trace", skip_all, fields(%fd, len = buf.len(), offset), ret, err)]
    pub fn pwrite(&self, fd: Fd, buf: &[u8], offset: i64) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let offset = filesize(offset)?;
        let len = host_len(buf.len());
        let mut nwritten: Size = 0;
        check(self.host.fd_pwrite(fd, &buf[..len], offset, &mut nwritten))?;
        Ok(nwritten as usize)
    }

    /// ### `seek()`
    /// Moves the offset of `fd`
    /// Inputs:
    /// - `i64 offset`
    /// - `i32 whence`
    ///     One of [`SEEK_SET`], [`SEEK_CUR`] or [`SEEK_END`]
    /// Output:
    /// - `u64`
    ///     The new offset from the start of the file
    /// Errors:
    /// - `Errno::Inval`
    ///     If `whence` is none of the above, without asking the host
    #[instrument(level = "trace", skip_all, fields(%fd, offset, whence), ret, err)]
    pub fn seek(&self, fd: Fd, offset: i64, whence: i32) -> Result<Filesize> {
        let whence = whence_from_posix(whence)?;
        let mut new_offset: Filesize = 0;
        check(self.host.fd_seek(fd, offset, whence.into(), &mut new_offset))?;
        Ok(new_offset)
    }

    /// ### `fstat()`
    /// Attributes of the file behind `fd`
    #[instrument(level = "trace", skip_all, fields(%fd), err)]
    pub fn fstat(&self, fd: Fd) -> Result<Filestat> {
        let mut stat = Filestat::default();
        check(self.host.fd_filestat_get(fd, &mut stat))?;
        Ok(stat)
    }

    /// ### `ftruncate()`
    /// Sets the size of the file behind `fd`, zero-filling when it grows
    /// Errors:
    /// - `Errno::Inval`
    ///     If `len` is negative
    #[instrument(level = "debug", skip_all, fields(%fd, len), err)]
    pub fn ftruncate(&self, fd: Fd, len: i64) -> Result<()> {
        let len = filesize(len)?;
        check(self.host.fd_filestat_set_size(fd, len))
    }

    /// ### `read_dir()`
    /// Raw `fd_readdir`: fills `buf` with packed entries starting at `cookie`
    ///
    /// Most callers want [`File::read_names`](crate::File::read_names).
    /// Output:
    /// - `usize`
    ///     Bytes used. Less than `buf.len()` means the end was reached
    #[instrument(level = "trace", skip_all, fields(%fd, len = buf.len(), cookie), ret, err)]
    pub fn read_dir(&self, fd: Fd, buf: &mut [u8], cookie: Dircookie) -> Result<usize> {
        let len = host_len(buf.len());
        let mut used: Size = 0;
        check(self.host.fd_readdir(fd, &mut buf[..len], cookie, &mut used))?;
        Ok(used as usize)
    }
}
