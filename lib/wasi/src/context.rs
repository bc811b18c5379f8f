use std::sync::Arc;

use parking_lot::RwLock;
use wasi_posix_types::{Fd, Host};

use crate::{
    Result,
    builder::{BuildError, PosixBuilder},
    config::PosixConfig,
    fd_table::FdTable,
    path::{ResolvedPath, Resolver},
    rights::RightsRegistry,
};

/// A POSIX view of one `wasi_unstable` host.
///
/// Owns everything the syscalls share: the host itself, the rights split
/// off the root descriptor, the working directory and the record of which
/// path each descriptor was opened with. `Send + Sync` whenever the host is.
pub struct Posix<H: Host> {
    pub(crate) host: H,
    pub(crate) config: PosixConfig,
    pub(crate) rights: RightsRegistry,
    pub(crate) cwd: RwLock<Arc<str>>,
    pub(crate) fds: FdTable,
}

impl<H: Host> Posix<H> {
    /// Builds a context with the default configuration.
    ///
    /// Fails when the root descriptor cannot be queried.
    pub fn new(host: H) -> Result<Self, BuildError> {
        PosixBuilder::new().build(host)
    }

    pub(crate) fn from_parts(
        host: H,
        config: PosixConfig,
        rights: RightsRegistry,
        cwd: Arc<str>,
    ) -> Self {
        Self {
            host,
            config,
            rights,
            cwd: RwLock::new(cwd),
            fds: FdTable::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &PosixConfig {
        &self.config
    }

    pub fn rights(&self) -> &RightsRegistry {
        &self.rights
    }

    pub fn fd_table(&self) -> &FdTable {
        &self.fds
    }

    pub(crate) fn root_fd(&self) -> Fd {
        self.config.root_fd
    }

    pub(crate) fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.host, &self.config)
    }

    /// A snapshot of the working directory.
    pub(crate) fn cwd(&self) -> Arc<str> {
        self.cwd.read().clone()
    }

    /// Resolves `path` the way the path syscalls do.
    pub fn resolve(&self, path: &str, follow: bool) -> Result<ResolvedPath> {
        let cwd = self.cwd();
        self.resolver().resolve(&cwd, path, follow)
    }
}

impl<H: Host> std::fmt::Debug for Posix<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Posix")
            .field("config", &self.config)
            .field("rights", &self.rights)
            .field("cwd", &self.cwd())
            .field("fds", &self.fds.len())
            .finish()
    }
}
