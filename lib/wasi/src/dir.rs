//! Directory enumeration on top of `fd_readdir`.
//!
//! The host fills a buffer with packed records and hands back how many
//! bytes it used. Records may be cut at the end of the buffer; a cut
//! record is dropped and fetched again by the next refill, which starts
//! from the cookie of the last record fully consumed.

use thiserror::Error;
use tracing::trace;
use wasi_posix_types::{DIRCOOKIE_START, DIRENT_SIZE, Dircookie, Dirent, Errno, Fd, Host, Size};

use crate::errno::{Error, check};

const UNBOUNDED_CAPACITY: usize = 100;

/// A failed directory read, along with the names read before the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("directory read stopped after {} names", .names.len())]
pub struct ReadDirError {
    pub names: Vec<String>,
    pub source: Error,
}

impl ReadDirError {
    pub fn into_parts(self) -> (Vec<String>, Error) {
        (self.names, self.source)
    }
}

/// Read position of one open directory.
#[derive(Debug)]
pub struct DirCursor {
    buf: Vec<u8>,
    /// Unread range within `buf`.
    start: usize,
    end: usize,
    cookie: Dircookie,
}

impl DirCursor {
    pub fn new(buf_size: usize) -> Self {
        Self {
            buf: vec![0; buf_size.max(DIRENT_SIZE)],
            start: 0,
            end: 0,
            cookie: DIRCOOKIE_START,
        }
    }

    fn unread(&self) -> &[u8] {
        &self.buf[self.start..self.end]
    }

    fn discard(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Refills the buffer from the current cookie. Returns `true` when the
    /// host signalled the end of the directory.
    fn refill(&mut self, host: &dyn Host, fd: Fd) -> Result<bool, Error> {
        let mut used: Size = 0;
        let res = check(host.fd_readdir(fd, &mut self.buf, self.cookie, &mut used));
        let used = (used as usize).min(self.buf.len());
        self.start = 0;
        self.end = used;
        res?;
        trace!(fd, cookie = self.cookie, used, "refilled directory buffer");
        Ok(used < self.buf.len())
    }

    /// Reads up to `n` entry names, skipping `.` and `..`.
    ///
    /// `n <= 0` reads everything that is left. `Ok(None)` means the
    /// directory is exhausted and no name was produced.
    pub fn read_names(
        &mut self,
        host: &dyn Host,
        fd: Fd,
        n: isize,
    ) -> Result<Option<Vec<String>>, ReadDirError> {
        let (mut remaining, capacity) = if n <= 0 {
            (None, UNBOUNDED_CAPACITY)
        } else {
            (Some(n as usize), n as usize)
        };
        let mut names = Vec::with_capacity(capacity.min(UNBOUNDED_CAPACITY));

        while remaining != Some(0) {
            let mut done = false;
            if self.start == self.end {
                done = match self.refill(host, fd) {
                    Ok(done) => done,
                    Err(source) => {
                        return Err(ReadDirError {
                            names,
                            source: source.with_op("readdirnames"),
                        });
                    }
                };
            }

            while remaining != Some(0) {
                let Some(ent) = Dirent::read_header(self.unread()) else {
                    self.discard();
                    break;
                };
                let Some(len) = ent.record_len() else {
                    self.discard();
                    return Err(ReadDirError {
                        names,
                        source: Error::from(Errno::Overflow).with_op("readdirnames"),
                    });
                };
                if self.unread().len() < len {
                    if len > self.buf.len() {
                        // a single record bigger than the whole buffer
                        self.buf.resize(len.checked_next_power_of_two().unwrap_or(len), 0);
                        done = false;
                    }
                    self.discard();
                    break;
                }
                self.cookie = ent.d_next;
                let name = &self.unread()[DIRENT_SIZE..len];
                let name = String::from_utf8_lossy(name).into_owned();
                self.start += len;
                if name == "." || name == ".." {
                    continue;
                }
                names.push(name);
                if let Some(left) = remaining.as_mut() {
                    *left -= 1;
                }
            }

            if done {
                break;
            }
        }

        if names.is_empty() {
            return Ok(None);
        }
        Ok(Some(names))
    }
}

/// Iterator over the names of a directory, one at a time.
///
/// Shares its cursor with the owning handle, so names already consumed
/// through [`DirCursor::read_names`] are not repeated. Names read before a
/// host failure are yielded before the error itself.
pub struct DirNames<'a> {
    cursor: &'a mut DirCursor,
    host: &'a dyn Host,
    fd: Fd,
    pending: std::vec::IntoIter<String>,
    failed: Option<Error>,
    finished: bool,
}

impl<'a> DirNames<'a> {
    pub(crate) fn new(cursor: &'a mut DirCursor, host: &'a dyn Host, fd: Fd) -> Self {
        Self {
            cursor,
            host,
            fd,
            pending: Vec::new().into_iter(),
            failed: None,
            finished: false,
        }
    }
}

impl Iterator for DirNames<'_> {
    type Item = Result<String, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(name) = self.pending.next() {
                return Some(Ok(name));
            }
            if let Some(err) = self.failed.take() {
                return Some(Err(err));
            }
            if self.finished {
                return None;
            }
            match self.cursor.read_names(self.host, self.fd, 1) {
                Ok(Some(names)) => self.pending = names.into_iter(),
                Ok(None) => self.finished = true,
                Err(err) => {
                    let (names, source) = err.into_parts();
                    self.pending = names.into_iter();
                    self.failed = Some(source);
                    self.finished = true;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wasi_posix_mem::MemHost;
    use wasi_posix_types::Errno;

    fn open_dir(host: &MemHost, path: &str) -> Fd {
        host.open_dir(path).unwrap()
    }

    fn sorted(mut names: Vec<String>) -> Vec<String> {
        names.sort();
        names
    }

    #[test]
    fn reads_everything_in_one_call() {
        let host = MemHost::new();
        for name in ["a", "b", "c"] {
            host.write_file(&format!("/d/{name}"), b"");
        }
        let fd = open_dir(&host, "/d");
        let mut cursor = DirCursor::new(8192);
        let names = cursor.read_names(&host, fd, 0).unwrap().unwrap();
        assert_eq!(sorted(names), vec!["a", "b", "c"]);
        assert_eq!(cursor.read_names(&host, fd, 0).unwrap(), None);
    }

    #[test]
    fn empty_directory_is_end_of_stream() {
        let host = MemHost::new();
        host.mkdir_all("/empty");
        let fd = open_dir(&host, "/empty");
        let mut cursor = DirCursor::new(8192);
        assert_eq!(cursor.read_names(&host, fd, 0).unwrap(), None);
        assert_eq!(cursor.read_names(&host, fd, 3).unwrap(), None);
    }

    #[test]
    fn bounded_reads_resume_where_they_stopped() {
        let host = MemHost::new();
        for i in 0..10 {
            host.write_file(&format!("/d/f{i}"), b"");
        }
        let fd = open_dir(&host, "/d");
        let mut cursor = DirCursor::new(8192);
        let mut all = Vec::new();
        while let Some(names) = cursor.read_names(&host, fd, 3).unwrap() {
            assert!(names.len() <= 3);
            all.extend(names);
        }
        let expected: Vec<String> = (0..10).map(|i| format!("f{i}")).collect();
        assert_eq!(sorted(all), sorted(expected));
    }

    #[test]
    fn split_records_are_fetched_again() {
        let host = MemHost::new();
        let expected: Vec<String> = (0..20).map(|i| format!("entry-{i:02}")).collect();
        for name in &expected {
            host.write_file(&format!("/d/{name}"), b"");
        }
        let fd = open_dir(&host, "/d");
        // 24-byte header plus 8-byte name, and a few sizes that cut records
        // inside the header or inside the name
        for buf_size in [24, 30, 47, 48, 50, 70, 100] {
            let mut cursor = DirCursor::new(buf_size);
            let names = cursor.read_names(&host, fd, 0).unwrap().unwrap();
            assert_eq!(sorted(names), expected, "buffer of {buf_size} bytes");
        }
    }

    #[test]
    fn records_larger_than_the_buffer_grow_it() {
        let host = MemHost::new();
        let long = "n".repeat(200);
        host.write_file(&format!("/d/{long}"), b"");
        let fd = open_dir(&host, "/d");
        let mut cursor = DirCursor::new(64);
        assert_eq!(cursor.read_names(&host, fd, 0).unwrap(), Some(vec![long]));
    }

    #[test]
    fn host_errors_are_tagged() {
        let host = MemHost::new();
        let mut cursor = DirCursor::new(8192);
        let err = cursor.read_names(&host, 77, 0).unwrap_err();
        assert!(err.names.is_empty());
        assert!(err.source.is(Errno::Badf));
        assert!(err.source.to_string().starts_with("readdirnames: "));
        assert_eq!(err.to_string(), "directory read stopped after 0 names");
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("readdirnames: Bad file number"));
    }

    #[test]
    fn iterator_yields_every_name_once() {
        let host = MemHost::new();
        for name in ["x", "y"] {
            host.write_file(&format!("/d/{name}"), b"");
        }
        let fd = open_dir(&host, "/d");
        let mut cursor = DirCursor::new(8192);
        let names: Result<Vec<_>, _> = DirNames::new(&mut cursor, &host, fd).collect();
        assert_eq!(sorted(names.unwrap()), vec!["x", "y"]);
    }

    #[test]
    fn iterator_stops_after_an_error() {
        let host = MemHost::new();
        let mut cursor = DirCursor::new(8192);
        let mut names = DirNames::new(&mut cursor, &host, 99);
        assert!(matches!(names.next(), Some(Err(_))));
        assert!(names.next().is_none());
    }
}
