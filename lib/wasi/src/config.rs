use wasi_posix_types::{Fd, ROOT_FD};

/// Tunables of the POSIX layer.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "enable-serde", serde(default))]
pub struct PosixConfig {
    /// The pre-opened directory every path is resolved against.
    pub root_fd: Fd,
    /// Environment variable seeding the working directory.
    pub cwd_env: String,
    /// Size of the buffer handed to `fd_readdir`.
    ///
    /// Must stay well above 5760 bytes, some hosts misbehave with short
    /// directory reads.
    pub dir_buf_size: usize,
    /// First buffer size tried when reading a symlink during resolution.
    pub readlink_buf_size: usize,
    /// Symlink expansions allowed while resolving a single path.
    pub max_symlinks: u16,
}

impl Default for PosixConfig {
    fn default() -> Self {
        Self {
            root_fd: ROOT_FD,
            cwd_env: "PWD".to_string(),
            dir_buf_size: 8192,
            readlink_buf_size: 128,
            max_symlinks: 40,
        }
    }
}
