//! An in-memory `wasi_unstable` host.
//!
//! [`MemHost`] keeps a whole directory tree in memory and answers the
//! imports of [`Host`] the way a runtime would: descriptors carry rights,
//! paths are resolved below the pre-opened directory (descriptor 3) and
//! `fd_readdir` packs records into the caller's buffer, cutting the last
//! one short when it does not fit.
//!
//! On top of the imports it has a few helpers to set up and inspect the
//! tree, to see what was passed to `path_open` and to make the next call
//! of an import fail.

mod host;
mod node;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use wasi_posix_types::{Errno, Fd, Fdflags, Filestat, Oflags, ROOT_FD, Rights};

use crate::node::{Inode, Kind, Tree, components};

/// What was asked of `path_open`, successful or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRecord {
    pub dirfd: Fd,
    pub path: String,
    pub oflags: Oflags,
    pub rights_base: Rights,
    pub rights_inheriting: Rights,
    pub fdflags: Fdflags,
}

#[derive(Debug, Clone)]
pub(crate) struct OpenFd {
    pub inode: Inode,
    pub offset: u64,
    pub base: Rights,
    pub inheriting: Rights,
    pub flags: Fdflags,
}

#[derive(Debug, Default)]
pub(crate) struct State {
    pub tree: Tree,
    pub fds: HashMap<Fd, OpenFd>,
    pub opens: Vec<OpenRecord>,
    pub failures: HashMap<&'static str, Errno>,
}

impl State {
    pub fn alloc_fd(&mut self, open: OpenFd) -> Fd {
        let fd = (ROOT_FD + 1..)
            .find(|fd| !self.fds.contains_key(fd))
            .unwrap_or(Fd::MAX);
        self.fds.insert(fd, open);
        fd
    }

    pub fn is_open(&self, inode: Inode) -> bool {
        self.fds.values().any(|fd| fd.inode == inode)
    }

    /// Frees `inode` if neither a name nor a descriptor refers to it.
    pub fn reap(&mut self, inode: Inode) {
        if !self.is_open(inode) {
            self.tree.reap(inode);
        }
    }
}

/// An in-memory filesystem exposed through the `wasi_unstable` imports.
#[derive(Debug)]
pub struct MemHost {
    state: Mutex<State>,
    calls: AtomicUsize,
}

impl Default for MemHost {
    fn default() -> Self {
        Self::new()
    }
}

impl MemHost {
    /// An empty tree pre-opened as descriptor 3 with every right.
    pub fn new() -> Self {
        Self::with_root_rights(Rights::all(), Rights::all())
    }

    /// An empty tree whose pre-opened root carries the given rights.
    pub fn with_root_rights(base: Rights, inheriting: Rights) -> Self {
        let mut state = State::default();
        let root = state.tree.root();
        state.fds.insert(
            ROOT_FD,
            OpenFd {
                inode: root,
                offset: 0,
                base,
                inheriting,
                flags: Fdflags::empty(),
            },
        );
        Self {
            state: Mutex::new(state),
            calls: AtomicUsize::new(0),
        }
    }

    /// A host without any pre-opened directory.
    pub fn without_root() -> Self {
        Self {
            state: Mutex::new(State::default()),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn enter(&self, import: &'static str) -> Result<parking_lot::MutexGuard<'_, State>, Errno> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        if let Some(errno) = state.failures.remove(import) {
            tracing::trace!(import, %errno, "injected failure");
            return Err(errno);
        }
        Ok(state)
    }

    /// Number of imports called so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every `path_open` seen so far, in order.
    pub fn opens(&self) -> Vec<OpenRecord> {
        self.state.lock().opens.clone()
    }

    /// Makes the next call to `import` fail with `errno` without side effects.
    pub fn fail_next(&self, import: &'static str, errno: Errno) {
        self.state.lock().failures.insert(import, errno);
    }

    /// Number of open descriptors, the pre-opened root included.
    pub fn open_fds(&self) -> usize {
        self.state.lock().fds.len()
    }

    /// Creates `path` and any missing parent directories.
    pub fn mkdir_all(&self, path: &str) {
        let mut state = self.state.lock();
        mkdir_all(&mut state.tree, &components(path));
    }

    /// Creates or replaces a regular file, creating parent directories.
    pub fn write_file(&self, path: &str, data: &[u8]) {
        let mut state = self.state.lock();
        let mut parts = components(path);
        let Some(name) = parts.pop() else {
            return;
        };
        let parent = mkdir_all(&mut state.tree, &parts);
        let existing = state.tree.lookup(parent, name).ok().flatten();
        match existing.and_then(|inode| state.tree.get_mut(inode).ok()) {
            Some(node) => {
                node.kind = Kind::File {
                    data: data.to_vec(),
                }
            }
            None => {
                let _ = state.tree.insert(
                    parent,
                    name,
                    Kind::File {
                        data: data.to_vec(),
                    },
                );
            }
        }
    }

    /// Creates a symlink at `link` pointing at `target`, verbatim.
    pub fn symlink(&self, target: &str, link: &str) {
        let mut state = self.state.lock();
        let mut parts = components(link);
        let Some(name) = parts.pop() else {
            return;
        };
        let parent = mkdir_all(&mut state.tree, &parts);
        let _ = state.tree.insert(
            parent,
            name,
            Kind::Symlink {
                target: target.to_string(),
            },
        );
    }

    /// Contents of the regular file at `path`, following symlinks.
    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        let state = self.state.lock();
        let root = state.tree.root();
        let inode = state.tree.walk(root, path, true).ok()?;
        match &state.tree.get(inode).ok()?.kind {
            Kind::File { data } => Some(data.clone()),
            _ => None,
        }
    }

    /// Attributes of whatever is at `path`, without following a trailing symlink.
    pub fn stat(&self, path: &str) -> Option<Filestat> {
        let state = self.state.lock();
        let root = state.tree.root();
        let inode = state.tree.walk(root, path, false).ok()?;
        state.tree.stat(inode).ok()
    }

    pub fn exists(&self, path: &str) -> bool {
        self.stat(path).is_some()
    }

    /// Opens the directory at `path` for reading entries, bypassing `path_open`.
    pub fn open_dir(&self, path: &str) -> Result<Fd, Errno> {
        let mut state = self.state.lock();
        let root = state.tree.root();
        let inode = state.tree.walk(root, path, true)?;
        if !state.tree.get(inode)?.is_dir() {
            return Err(Errno::Notdir);
        }
        Ok(state.alloc_fd(OpenFd {
            inode,
            offset: 0,
            base: Rights::all(),
            inheriting: Rights::all(),
            flags: Fdflags::empty(),
        }))
    }
}

fn mkdir_all(tree: &mut Tree, parts: &[&str]) -> Inode {
    let mut cur = tree.root();
    for part in parts {
        cur = match tree.walk(cur, part, true) {
            Ok(inode) => inode,
            _ => match tree.insert(
                cur,
                part,
                Kind::Dir {
                    entries: Default::default(),
                },
            ) {
                Ok(inode) => inode,
                Err(_) => return cur,
            },
        };
    }
    cur
}
