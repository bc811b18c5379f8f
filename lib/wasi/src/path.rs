//! Path resolution against the root descriptor.
//!
//! The host only understands paths relative to a pre-opened directory, so
//! every user path is made absolute, then walked segment by segment while
//! symlinks are expanded by hand. The result is the root-relative form
//! (`"." + absolute`) handed to the `path_*` imports.

use std::fmt;

use smallvec::SmallVec;
use tracing::trace;
use wasi_posix_types::{Errno, Fd, Host, Size};

use crate::{config::PosixConfig, errno::{Error, check}};

/// A path ready to be handed to the host, relative to the root descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath(String);

impl ResolvedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResolvedPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Joins a relative `path` onto `cwd`. Absolute paths are returned as-is.
///
/// No cleaning happens: `"a//b"` and `".."` reach the host untouched.
pub fn absolute(cwd: &str, path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        let mut joined = String::with_capacity(cwd.len() + 1 + path.len());
        joined.push_str(cwd);
        joined.push('/');
        joined.push_str(path);
        joined
    }
}

/// Walks paths on behalf of one context.
pub struct Resolver<'a> {
    host: &'a dyn Host,
    root_fd: Fd,
    readlink_buf_size: usize,
    max_symlinks: u16,
}

impl<'a> Resolver<'a> {
    pub fn new(host: &'a dyn Host, config: &PosixConfig) -> Self {
        Self {
            host,
            root_fd: config.root_fd,
            readlink_buf_size: config.readlink_buf_size.max(1),
            max_symlinks: config.max_symlinks,
        }
    }

    /// Resolves `path` against `cwd`.
    ///
    /// With `follow` unset the last segment is left alone, so the result
    /// names a symlink itself rather than its target.
    pub fn resolve(&self, cwd: &str, path: &str, follow: bool) -> Result<ResolvedPath, Error> {
        if path.is_empty() {
            return Err(Errno::Inval.into());
        }
        let path = absolute(cwd, path);
        let parts: SmallVec<[&str; 8]> = path[1..].split('/').collect();
        let last = parts.len() - 1;

        let mut resolved = String::with_capacity(path.len());
        let mut hops = 0u16;
        for (i, part) in parts.iter().enumerate() {
            resolved.push('/');
            resolved.push_str(part);
            if i == last && !follow {
                break;
            }
            loop {
                let dest = match self.readlink(&format!(".{resolved}")) {
                    Ok(dest) if !dest.is_empty() => dest,
                    // not a symlink
                    _ => break,
                };
                hops += 1;
                if hops > self.max_symlinks {
                    trace!(path = %path, hops, "too many symlinks");
                    return Err(Errno::Loop.into());
                }
                trace!(link = %resolved, dest = %dest, hops, "following symlink");
                if dest.starts_with('/') {
                    resolved = dest;
                } else {
                    let cut = resolved.rfind('/').unwrap_or(0);
                    resolved.truncate(cut);
                    resolved.push('/');
                    resolved.push_str(&dest);
                }
            }
        }

        resolved.insert(0, '.');
        Ok(ResolvedPath(resolved))
    }

    /// Reads the target of the symlink at the root-relative `path`.
    ///
    /// The buffer doubles until the host leaves room to spare.
    pub fn readlink(&self, path: &str) -> Result<String, Error> {
        let mut buf_len = self.readlink_buf_size;
        loop {
            let mut buf = vec![0u8; buf_len];
            let mut used: Size = 0;
            check(
                self.host
                    .path_readlink(self.root_fd, path.as_bytes(), &mut buf, &mut used),
            )?;
            let used = used as usize;
            if used < buf_len {
                buf.truncate(used);
                return String::from_utf8(buf).map_err(|_| Errno::Ilseq.into());
            }
            buf_len *= 2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wasi_posix_mem::MemHost;

    fn resolve(host: &MemHost, cwd: &str, path: &str, follow: bool) -> Result<String, Error> {
        Resolver::new(host, &PosixConfig::default())
            .resolve(cwd, path, follow)
            .map(ResolvedPath::into_string)
    }

    #[test]
    fn empty_path_is_invalid_without_host_calls() {
        let host = MemHost::new();
        let err = resolve(&host, "/", "", true).unwrap_err();
        assert!(err.is(Errno::Inval));
        assert_eq!(host.calls(), 0);
    }

    #[test]
    fn absolute_without_symlinks_is_prefixed() {
        let host = MemHost::new();
        host.mkdir_all("/a/b");
        for follow in [true, false] {
            assert_eq!(resolve(&host, "/", "/a/b/c", follow).unwrap(), "./a/b/c");
        }
    }

    #[test]
    fn relative_joins_the_working_directory() {
        let host = MemHost::new();
        host.mkdir_all("/work");
        assert_eq!(resolve(&host, "/work", "f", true).unwrap(), "./work/f");
        assert_eq!(
            resolve(&host, "/work", "f", true).unwrap(),
            resolve(&host, "/", "/work/f", true).unwrap()
        );
    }

    #[test]
    fn absolute_target_replaces_the_prefix() {
        let host = MemHost::new();
        host.mkdir_all("/x");
        host.symlink("/x", "/a");
        assert_eq!(resolve(&host, "/", "/a/b", false).unwrap(), "./x/b");
    }

    #[test]
    fn relative_target_replaces_the_last_segment() {
        let host = MemHost::new();
        host.mkdir_all("/d/real");
        host.symlink("real", "/d/link");
        assert_eq!(resolve(&host, "/", "/d/link/f", true).unwrap(), "./d/real/f");
    }

    #[test]
    fn trailing_symlink_is_kept_unless_followed() {
        let host = MemHost::new();
        host.write_file("/target", b"x");
        host.symlink("/target", "/link");
        assert_eq!(resolve(&host, "/", "/link", false).unwrap(), "./link");
        assert_eq!(resolve(&host, "/", "/link", true).unwrap(), "./target");
    }

    #[test]
    fn chained_symlinks_are_expanded() {
        let host = MemHost::new();
        host.mkdir_all("/c");
        host.symlink("/c", "/b");
        host.symlink("/b", "/a");
        assert_eq!(resolve(&host, "/", "/a/f", true).unwrap(), "./c/f");
    }

    #[test]
    fn symlink_cycle_is_a_loop() {
        let host = MemHost::new();
        host.symlink("/b", "/a");
        host.symlink("/a", "/b");
        let err = resolve(&host, "/", "/a/f", true).unwrap_err();
        assert!(err.is(Errno::Loop));
    }

    #[test]
    fn hop_budget_is_configurable() {
        let host = MemHost::new();
        host.mkdir_all("/c");
        host.symlink("/c", "/b");
        host.symlink("/b", "/a");
        let config = PosixConfig {
            max_symlinks: 1,
            ..Default::default()
        };
        let err = Resolver::new(&host, &config)
            .resolve("/", "/a", true)
            .unwrap_err();
        assert!(err.is(Errno::Loop));
    }

    #[test]
    fn long_targets_grow_the_buffer() {
        let host = MemHost::new();
        let target = format!("/{}", "t".repeat(300));
        host.symlink(&target, "/long");
        let config = PosixConfig {
            readlink_buf_size: 16,
            ..Default::default()
        };
        let resolver = Resolver::new(&host, &config);
        assert_eq!(resolver.readlink("./long").unwrap(), target);
    }

    #[test]
    fn absolute_keeps_paths_verbatim() {
        assert_eq!(absolute("/w", "/abs"), "/abs");
        assert_eq!(absolute("/w", "rel"), "/w/rel");
        assert_eq!(absolute("/", "rel"), "//rel");
    }
}
