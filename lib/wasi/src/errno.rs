//! Raw host status → [`Error`] translation.
//!
//! This is the only place where status codes coming back from the imports
//! are turned into error values. The three codes that show up the most
//! (`Again`, `Inval`, `Noent`) have dedicated singletons; every other code
//! points into a static table built once.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use thiserror::Error;
use wasi_posix_types::{Errno, RawErrno};

/// A named error code together with its message.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrnoError {
    errno: Errno,
    message: Cow<'static, str>,
}

impl ErrnoError {
    fn new(errno: Errno) -> Self {
        let message = match errno {
            Errno::Nosys => Cow::Owned(format!("Not implemented on {}", std::env::consts::OS)),
            other => Cow::Borrowed(other.message()),
        };
        Self { errno, message }
    }

    pub fn errno(&self) -> Errno {
        self.errno
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ErrnoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

static ERRNO_TABLE: Lazy<Vec<ErrnoError>> =
    Lazy::new(|| Errno::errors().map(ErrnoError::new).collect());

static ERR_AGAIN: Lazy<ErrnoError> = Lazy::new(|| ErrnoError::new(Errno::Again));
static ERR_INVAL: Lazy<ErrnoError> = Lazy::new(|| ErrnoError::new(Errno::Inval));
static ERR_NOENT: Lazy<ErrnoError> = Lazy::new(|| ErrnoError::new(Errno::Noent));

const SUCCESS: RawErrno = Errno::Success as RawErrno;
const EAGAIN: RawErrno = Errno::Again as RawErrno;
const EINVAL: RawErrno = Errno::Inval as RawErrno;
const ENOENT: RawErrno = Errno::Noent as RawErrno;

/// Errors surfaced by the POSIX layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A code from the errno table, reported by the host or synthesized locally.
    #[error("{0}")]
    Errno(&'static ErrnoError),
    /// The host returned a code outside of the table.
    #[error("errno {0}")]
    Unknown(RawErrno),
    /// An error tagged with the name of the operation that produced it.
    #[error("{op}: {source}")]
    Op {
        op: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The errno behind this error, looking through operation tags.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Error::Errno(entry) => Some(entry.errno()),
            Error::Unknown(_) => None,
            Error::Op { source, .. } => source.errno(),
        }
    }

    pub fn is(&self, errno: Errno) -> bool {
        self.errno() == Some(errno)
    }

    pub(crate) fn with_op(self, op: &'static str) -> Error {
        Error::Op {
            op,
            source: Box::new(self),
        }
    }
}

/// `Errno::Success` is not an error and must not be converted; use
/// [`check`] on raw host codes instead.
impl From<Errno> for Error {
    fn from(errno: Errno) -> Self {
        debug_assert_ne!(errno, Errno::Success, "success is not an error");
        translate(errno.raw()).unwrap_or(Error::Unknown(SUCCESS))
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = err
            .errno()
            .map(std::io::ErrorKind::from)
            .unwrap_or(std::io::ErrorKind::Other);
        std::io::Error::new(kind, err)
    }
}

/// Translates a raw status code. `0` is not an error.
pub fn translate(code: RawErrno) -> Option<Error> {
    let entry: &'static ErrnoError = match code {
        SUCCESS => return None,
        EAGAIN => &ERR_AGAIN,
        EINVAL => &ERR_INVAL,
        ENOENT => &ERR_NOENT,
        code => match ERRNO_TABLE.get(code as usize - 1) {
            Some(entry) => entry,
            None => return Some(Error::Unknown(code)),
        },
    };
    Some(Error::Errno(entry))
}

/// `Ok(())` for a successful status, the translated error otherwise.
pub(crate) fn check(code: RawErrno) -> Result<(), Error> {
    match translate(code) {
        None => Ok(()),
        Some(err) => Err(err),
    }
}
