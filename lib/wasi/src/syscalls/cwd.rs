use std::sync::Arc;

use parking_lot::RwLockUpgradableReadGuard;

use super::*;

impl<H: Host> Posix<H> {
    /// ### `getwd()`
    /// The current working directory, always absolute
    pub fn getwd(&self) -> String {
        self.cwd().to_string()
    }

    /// ### `chdir()`
    /// Sets the current working directory
    ///
    /// The new directory is stored as given (joined onto the old one when
    /// relative), not in its symlink-free form.
    /// Errors:
    /// - `Errno::Inval`
    ///     If `path` is empty
    /// - `Errno::Noent`
    ///     If nothing exists at `path`
    /// - `Errno::Notdir`
    ///     If `path` is not a directory
    #[instrument(level = "debug", skip_all, fields(path = %path, dir = field::Empty), err)]
    pub fn chdir(&self, path: &str) -> Result<()> {
        if path.is_empty() {
            return Err(Errno::Inval.into());
        }
        // held across the stat so concurrent changes apply one at a time
        let cwd = self.cwd.upgradable_read();
        let dir = absolute(&cwd, path);
        let resolved = self.resolver().resolve(&cwd, &dir, true)?;
        let mut stat = Filestat::default();
        check(self.host.path_filestat_get(
            self.root_fd(),
            Lookup::empty(),
            resolved.as_bytes(),
            &mut stat,
        ))?;
        if !stat.is_dir() {
            return Err(Errno::Notdir.into());
        }

        Span::current().record("dir", dir.as_str());
        debug!(dir = %dir, "working directory changed");
        let mut cwd = RwLockUpgradableReadGuard::upgrade(cwd);
        *cwd = Arc::from(dir);
        Ok(())
    }

    /// ### `fchdir()`
    /// Changes to the directory `fd` was opened from
    ///
    /// No host call is made: the path recorded at open time is reused.
    /// Errors:
    /// - `Errno::Badf`
    ///     If `fd` was not opened through [`Posix::open`] or is closed
    #[instrument(level = "debug", skip_all, fields(%fd), err)]
    pub fn fchdir(&self, fd: Fd) -> Result<()> {
        let dir = self.fds.lookup(fd).ok_or(Error::from(Errno::Badf))?;
        debug!(dir = %dir, "working directory changed");
        *self.cwd.write() = Arc::from(dir);
        Ok(())
    }
}
