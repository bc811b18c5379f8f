use super::*;

impl<H: Host> Posix<H> {
    /// ### `stat()`
    /// Attributes of the file at `path`, following every symlink
    /// Errors:
    /// - `Errno::Noent`
    ///     If nothing exists at `path`
    /// - `Errno::Loop`
    ///     If resolving `path` expands too many symlinks
    #[instrument(level = "trace", skip_all, fields(path = %path), err)]
    pub fn stat(&self, path: &str) -> Result<Filestat> {
        self.filestat(path, true)
    }

    /// ### `lstat()`
    /// Like [`Posix::stat`], but a trailing symlink is described itself
    #[instrument(level = "trace", skip_all, fields(path = %path), err)]
    pub fn lstat(&self, path: &str) -> Result<Filestat> {
        self.filestat(path, false)
    }

    fn filestat(&self, path: &str, follow: bool) -> Result<Filestat> {
        let resolved = self.resolve(path, follow)?;
        let mut stat = Filestat::default();
        check(self.host.path_filestat_get(
            self.root_fd(),
            Lookup::empty(),
            resolved.as_bytes(),
            &mut stat,
        ))?;
        Ok(stat)
    }

    /// ### `mkdir()`
    /// Creates a directory. `perm` is ignored
    /// Errors:
    /// - `Errno::Exist`
    ///     If something already exists at `path`
    #[instrument(level = "debug", skip_all, fields(path = %path), err)]
    pub fn mkdir(&self, path: &str, _perm: u32) -> Result<()> {
        let resolved = self.resolve(path, false)?;
        check(
            self.host
                .path_create_directory(self.root_fd(), resolved.as_bytes()),
        )
    }

    /// ### `rmdir()`
    /// Removes an empty directory
    /// Errors:
    /// - `Errno::Notempty`
    ///     If the directory still has entries
    #[instrument(level = "debug", skip_all, fields(path = %path), err)]
    pub fn rmdir(&self, path: &str) -> Result<()> {
        let resolved = self.resolve(path, false)?;
        check(
            self.host
                .path_remove_directory(self.root_fd(), resolved.as_bytes()),
        )
    }

    /// ### `unlink()`
    /// Removes a file or a symlink, never its target
    #[instrument(level = "debug", skip_all, fields(path = %path), err)]
    pub fn unlink(&self, path: &str) -> Result<()> {
        let resolved = self.resolve(path, false)?;
        check(self.host.path_unlink_file(self.root_fd(), resolved.as_bytes()))
    }

    /// ### `rename()`
    /// Moves `from` to `to`. Symlinks in the last segment of either path
    /// are renamed, not followed
    #[instrument(level = "debug", skip_all, fields(from = %from, to = %to), err)]
    pub fn rename(&self, from: &str, to: &str) -> Result<()> {
        let old = self.resolve(from, false)?;
        let new = self.resolve(to, false)?;
        let root = self.root_fd();
        check(
            self.host
                .path_rename(root, old.as_bytes(), root, new.as_bytes()),
        )
    }

    /// ### `link()`
    /// Creates `link` as a hard link to `path`
    #[instrument(level = "debug", skip_all, fields(path = %path, link = %link), err)]
    pub fn link(&self, path: &str, link: &str) -> Result<()> {
        let old = self.resolve(path, false)?;
        let new = self.resolve(link, false)?;
        let root = self.root_fd();
        check(self.host.path_link(
            root,
            Lookup::empty(),
            old.as_bytes(),
            root,
            new.as_bytes(),
        ))
    }

    /// ### `symlink()`
    /// Creates `link` pointing at `target`
    ///
    /// `target` is stored verbatim, it is neither resolved nor checked.
    /// Errors:
    /// - `Errno::Inval`
    ///     If `target` or `link` is empty
    #[instrument(level = "debug", skip_all, fields(target = %target, link = %link), err)]
    pub fn symlink(&self, target: &str, link: &str) -> Result<()> {
        if target.is_empty() {
            return Err(Errno::Inval.into());
        }
        let new = self.resolve(link, false)?;
        check(
            self.host
                .path_symlink(target.as_bytes(), self.root_fd(), new.as_bytes()),
        )
    }

    /// ### `readlink()`
    /// Copies the target of the symlink at `path` into `buf`
    /// Output:
    /// - `usize`
    ///     Bytes written. A target longer than `buf` is cut short
    #[instrument(level = "trace", skip_all, fields(path = %path, len = buf.len()), ret, err)]
    pub fn readlink(&self, path: &str, buf: &mut [u8]) -> Result<usize> {
        let resolved = self.resolve(path, false)?;
        let len = host_len(buf.len());
        let mut used: Size = 0;
        check(self.host.path_readlink(
            self.root_fd(),
            resolved.as_bytes(),
            &mut buf[..len],
            &mut used,
        ))?;
        Ok(used as usize)
    }

    /// ### `truncate()`
    /// Sets the size of the file at `path`
    ///
    /// Opens the file write-only, resizes it and closes it again. A resize
    /// failure is reported over a close failure.
    #[instrument(level = "debug", skip_all, fields(path = %path, len), err)]
    pub fn truncate(&self, path: &str, len: i64) -> Result<()> {
        let fd = self.open(path, OpenFlags::WRONLY, 0)?;
        let truncated = self.ftruncate(fd, len);
        let closed = self.close(fd);
        truncated.and(closed)
    }

    /// ### `utimes_nano()`
    /// Sets the access and modification times of `path`, in nanoseconds
    #[instrument(level = "debug", skip_all, fields(path = %path, atime, mtime), err)]
    pub fn utimes_nano(&self, path: &str, atime: Timestamp, mtime: Timestamp) -> Result<()> {
        let resolved = self.resolve(path, false)?;
        check(self.host.path_filestat_set_times(
            self.root_fd(),
            Lookup::empty(),
            resolved.as_bytes(),
            atime,
            mtime,
            Fstflags::ATIM | Fstflags::MTIM,
        ))
    }
}
