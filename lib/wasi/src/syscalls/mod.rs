//! The POSIX surface, as methods on [`Posix`].
//!
//! Every operation resolves its paths, issues a single host call (except
//! `truncate`) and translates the status through [`check`].

mod cwd;
mod fd;
mod path;
mod random;
mod unsupported;

pub use random::RandomReader;

use tracing::{Span, debug, field, instrument};
use wasi_posix_types::{
    Dircookie, Errno, Fd, Filesize, Filestat, Fstflags, Host, Lookup, Size, Timestamp, Whence,
};

use crate::{
    Result,
    context::Posix,
    errno::{Error, check},
    path::absolute,
    rights::OpenFlags,
};

/// `lseek` origin: start of the file.
pub const SEEK_SET: i32 = 0;
/// `lseek` origin: current offset.
pub const SEEK_CUR: i32 = 1;
/// `lseek` origin: end of the file.
pub const SEEK_END: i32 = 2;

fn whence_from_posix(whence: i32) -> Result<Whence> {
    match whence {
        SEEK_SET => Ok(Whence::Set),
        SEEK_CUR => Ok(Whence::Cur),
        SEEK_END => Ok(Whence::End),
        _ => Err(Errno::Inval.into()),
    }
}

fn filesize(len: i64) -> Result<Filesize> {
    Filesize::try_from(len).map_err(|_| Errno::Inval.into())
}

/// Clamps a buffer length to what a single host call can express.
fn host_len(len: usize) -> usize {
    len.min(Size::MAX as usize)
}
