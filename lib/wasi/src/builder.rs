use std::sync::Arc;

use thiserror::Error;
use tracing::debug;
use wasi_posix_types::{Fd, Host};

use crate::{config::PosixConfig, context::Posix, errno::Error, rights::RightsRegistry};

/// Error type returned when a [`Posix`] context cannot be created.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("cannot query rights of root descriptor {fd}: {source}")]
    RootRights {
        fd: Fd,
        #[source]
        source: Error,
    },
    #[error("working directory must be absolute: `{0}`")]
    RelativeCurrentDir(String),
    #[error("working directory contains a nul byte: `{0}`")]
    CurrentDirContainsNulByte(String),
}

/// Builder for [`Posix`].
///
/// Without an explicit working directory the value of the configured
/// environment variable (`PWD` by default) is used, falling back to `/`
/// when it is missing or not absolute.
#[derive(Debug, Default, Clone)]
pub struct PosixBuilder {
    config: PosixConfig,
    current_dir: Option<String>,
}

impl PosixBuilder {
    /// Creates a [`PosixBuilder`] with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: PosixConfig) -> Self {
        self.set_config(config);
        self
    }

    pub fn set_config(&mut self, config: PosixConfig) {
        self.config = config;
    }

    /// Sets the pre-opened directory used as the root.
    pub fn root_fd(mut self, fd: Fd) -> Self {
        self.config.root_fd = fd;
        self
    }

    /// Bounds the number of symlinks expanded while resolving one path.
    pub fn max_symlinks(mut self, max: u16) -> Self {
        self.config.max_symlinks = max;
        self
    }

    /// Sets the initial working directory, ignoring the environment.
    ///
    /// The directory must be absolute; it is not checked for existence.
    pub fn current_dir(mut self, dir: impl Into<String>) -> Self {
        self.set_current_dir(dir);
        self
    }

    pub fn set_current_dir(&mut self, dir: impl Into<String>) {
        self.current_dir = Some(dir.into());
    }

    fn initial_dir(&self) -> Result<String, BuildError> {
        match &self.current_dir {
            Some(dir) if dir.contains('\0') => {
                Err(BuildError::CurrentDirContainsNulByte(dir.clone()))
            }
            Some(dir) if !dir.starts_with('/') => Err(BuildError::RelativeCurrentDir(dir.clone())),
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::var(&self.config.cwd_env)
                .ok()
                .filter(|dir| dir.starts_with('/') && !dir.contains('\0'))
                .unwrap_or_else(|| "/".to_string())),
        }
    }

    /// Queries the root descriptor and produces the context.
    pub fn build<H: Host>(self, host: H) -> Result<Posix<H>, BuildError> {
        let cwd = self.initial_dir()?;
        let root_fd = self.config.root_fd;
        let rights = RightsRegistry::init(&host, root_fd)
            .map_err(|source| BuildError::RootRights { fd: root_fd, source })?;
        debug!(root_fd, cwd = %cwd, "posix context ready");
        Ok(Posix::from_parts(host, self.config, rights, Arc::from(cwd)))
    }
}
