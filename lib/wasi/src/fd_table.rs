use std::collections::HashMap;

use parking_lot::Mutex;
use wasi_posix_types::Fd;

/// Remembers the absolute path each open descriptor was opened with.
///
/// Only `fchdir` reads it back. The lock is never held across a host call.
#[derive(Debug, Default)]
pub struct FdTable {
    paths: Mutex<HashMap<Fd, String>>,
}

impl FdTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, fd: Fd, path: impl Into<String>) {
        self.paths.lock().insert(fd, path.into());
    }

    /// Drops the record of `fd`, returning it if there was one.
    pub fn forget(&self, fd: Fd) -> Option<String> {
        self.paths.lock().remove(&fd)
    }

    pub fn lookup(&self, fd: Fd) -> Option<String> {
        self.paths.lock().get(&fd).cloned()
    }

    pub fn len(&self) -> usize {
        self.paths.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
