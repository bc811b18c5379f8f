#![deny(unused_mut)]
#![doc(html_favicon_url = "https://wasmer.io/images/icons/favicon-32x32.png")]
#![doc(html_logo_url = "https://github.com/wasmerio.png?size=200")]

//! POSIX filesystem calls on top of the `wasi_unstable` imports.
//!
//! The host only knows pre-opened directories and descriptors scoped by
//! rights. [`Posix`] layers the usual path-based API over it: a working
//! directory, absolute and relative paths, symlinks followed segment by
//! segment, rights narrowed to the access mode of each open, and directory
//! listings read through an opaque cookie.
//!
//! ```ignore
//! use wasi_posix::{OpenFlags, Posix};
//!
//! let posix = Posix::new(host)?;
//! posix.mkdir("/tmp/out", 0o755)?;
//! let fd = posix.open("/tmp/out/log", OpenFlags::WRONLY | OpenFlags::CREAT, 0o644)?;
//! posix.write(fd, b"hello")?;
//! posix.close(fd)?;
//! ```

mod builder;
mod config;
mod context;
mod dir;
pub mod errno;
mod fd_table;
mod file;
#[cfg(all(target_arch = "wasm32", target_os = "wasi"))]
mod global;
pub mod host;
mod path;
mod rights;
mod syscalls;

pub use wasi_posix_types as types;
pub use wasi_posix_types::{Errno, Fd, Filestat, Filetype, Host, Rights};

pub use crate::{
    builder::{BuildError, PosixBuilder},
    config::PosixConfig,
    context::Posix,
    dir::{DirCursor, DirNames, ReadDirError},
    errno::{Error, ErrnoError, translate},
    fd_table::FdTable,
    file::File,
    path::{ResolvedPath, Resolver, absolute},
    rights::{OpenFlags, RightsRegistry},
    syscalls::{RandomReader, SEEK_CUR, SEEK_END, SEEK_SET},
};

#[cfg(all(target_arch = "wasm32", target_os = "wasi"))]
pub use crate::global::global;

/// Result of a POSIX operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;
