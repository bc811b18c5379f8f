//! The directory tree behind [`MemHost`](crate::MemHost).
//!
//! Nodes live in a slab and are addressed by their slab key, which doubles
//! as the inode number. Directories map names to keys, so hard links are
//! simply two names pointing at the same key.

use std::collections::{BTreeMap, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

use slab::Slab;
use wasi_posix_types::{Errno, Filestat, Filetype, Timestamp};

pub(crate) type Inode = usize;

/// Symlinks expanded while walking one path.
const MAX_SYMLINKS: u32 = 40;

#[derive(Debug)]
pub(crate) enum Kind {
    File { data: Vec<u8> },
    Dir { entries: BTreeMap<String, Inode> },
    Symlink { target: String },
}

#[derive(Debug)]
pub(crate) struct Node {
    pub kind: Kind,
    /// Containing directory. Only meaningful for directories.
    pub parent: Inode,
    pub nlink: u32,
    pub atim: Timestamp,
    pub mtim: Timestamp,
    pub ctim: Timestamp,
}

impl Node {
    fn new(kind: Kind, parent: Inode) -> Self {
        let now = now();
        Self {
            kind,
            parent,
            nlink: 1,
            atim: now,
            mtim: now,
            ctim: now,
        }
    }

    pub fn filetype(&self) -> Filetype {
        match self.kind {
            Kind::File { .. } => Filetype::RegularFile,
            Kind::Dir { .. } => Filetype::Directory,
            Kind::Symlink { .. } => Filetype::SymbolicLink,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, Kind::Dir { .. })
    }

    fn size(&self) -> u64 {
        match &self.kind {
            Kind::File { data } => data.len() as u64,
            Kind::Dir { entries } => entries.len() as u64,
            Kind::Symlink { target } => target.len() as u64,
        }
    }
}

pub(crate) fn now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as Timestamp)
        .unwrap_or(0)
}

/// Splits a host path into its meaningful components.
pub(crate) fn components(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|c| !c.is_empty() && *c != ".")
        .collect()
}

#[derive(Debug)]
pub(crate) struct Tree {
    nodes: Slab<Node>,
    root: Inode,
}

impl Default for Tree {
    fn default() -> Self {
        let mut nodes = Slab::new();
        let entry = nodes.vacant_entry();
        let root = entry.key();
        entry.insert(Node::new(
            Kind::Dir {
                entries: BTreeMap::new(),
            },
            root,
        ));
        Self { nodes, root }
    }
}

impl Tree {
    pub fn root(&self) -> Inode {
        self.root
    }

    pub fn get(&self, inode: Inode) -> Result<&Node, Errno> {
        self.nodes.get(inode).ok_or(Errno::Noent)
    }

    pub fn get_mut(&mut self, inode: Inode) -> Result<&mut Node, Errno> {
        self.nodes.get_mut(inode).ok_or(Errno::Noent)
    }

    pub fn entries(&self, dir: Inode) -> Result<&BTreeMap<String, Inode>, Errno> {
        match &self.get(dir)?.kind {
            Kind::Dir { entries } => Ok(entries),
            _ => Err(Errno::Notdir),
        }
    }

    fn entries_mut(&mut self, dir: Inode) -> Result<&mut BTreeMap<String, Inode>, Errno> {
        match &mut self.get_mut(dir)?.kind {
            Kind::Dir { entries } => Ok(entries),
            _ => Err(Errno::Notdir),
        }
    }

    pub fn stat(&self, inode: Inode) -> Result<Filestat, Errno> {
        let node = self.get(inode)?;
        Ok(Filestat {
            st_dev: 1,
            st_ino: inode as u64,
            st_filetype: node.filetype().into(),
            st_nlink: node.nlink,
            st_size: node.size(),
            st_atim: node.atim,
            st_mtim: node.mtim,
            st_ctim: node.ctim,
        })
    }

    /// Looks `name` up in `dir` without following symlinks.
    pub fn lookup(&self, dir: Inode, name: &str) -> Result<Option<Inode>, Errno> {
        if name == ".." {
            if dir == self.root {
                return Err(Errno::Notcapable);
            }
            return Ok(Some(self.get(dir)?.parent));
        }
        Ok(self.entries(dir)?.get(name).copied())
    }

    /// Walks `path` from `start`. Intermediate symlinks are always
    /// expanded, the last one only with `follow`. Absolute targets are
    /// taken relative to the root.
    pub fn walk(&self, start: Inode, path: &str, follow: bool) -> Result<Inode, Errno> {
        let mut queue: VecDeque<String> = components(path).into_iter().map(String::from).collect();
        let mut cur = start;
        let mut hops = 0;
        while let Some(name) = queue.pop_front() {
            let child = self.lookup(cur, &name)?.ok_or(Errno::Noent)?;
            if let Kind::Symlink { target } = &self.get(child)?.kind {
                if follow || !queue.is_empty() {
                    hops += 1;
                    if hops > MAX_SYMLINKS {
                        return Err(Errno::Loop);
                    }
                    if target.starts_with('/') {
                        cur = self.root;
                    }
                    for part in components(target).into_iter().rev() {
                        queue.push_front(part.to_string());
                    }
                    continue;
                }
            }
            cur = child;
        }
        Ok(cur)
    }

    /// Splits `path` into the directory holding its last component and
    /// that component. `None` when the path names `start` itself.
    pub fn walk_parent<'p>(
        &self,
        start: Inode,
        path: &'p str,
    ) -> Result<Option<(Inode, &'p str)>, Errno> {
        let mut parts = components(path);
        let Some(name) = parts.pop() else {
            return Ok(None);
        };
        let parent = self.walk(start, &parts.join("/"), true)?;
        if !self.get(parent)?.is_dir() {
            return Err(Errno::Notdir);
        }
        Ok(Some((parent, name)))
    }

    pub fn insert(&mut self, parent: Inode, name: &str, kind: Kind) -> Result<Inode, Errno> {
        if self.entries(parent)?.contains_key(name) || name == ".." {
            return Err(Errno::Exist);
        }
        let inode = self.nodes.insert(Node::new(kind, parent));
        self.entries_mut(parent)?.insert(name.to_string(), inode);
        self.touch(parent)?;
        Ok(inode)
    }

    pub fn link(&mut self, parent: Inode, name: &str, inode: Inode) -> Result<(), Errno> {
        if self.entries(parent)?.contains_key(name) || name == ".." {
            return Err(Errno::Exist);
        }
        self.entries_mut(parent)?.insert(name.to_string(), inode);
        self.get_mut(inode)?.nlink += 1;
        self.touch(parent)
    }

    /// Removes the entry `name` from `parent`.
    ///
    /// The node stays allocated until [`Tree::reap`] is called for it, so
    /// descriptors still pointing at it keep working.
    pub fn unlink(&mut self, parent: Inode, name: &str) -> Result<Inode, Errno> {
        let inode = self
            .entries_mut(parent)?
            .remove(name)
            .ok_or(Errno::Noent)?;
        let node = self.get_mut(inode)?;
        node.nlink = node.nlink.saturating_sub(1);
        self.touch(parent)?;
        Ok(inode)
    }

    /// Frees a node that no name refers to anymore.
    pub fn reap(&mut self, inode: Inode) {
        if self.nodes.get(inode).is_some_and(|n| n.nlink == 0) {
            self.nodes.remove(inode);
        }
    }

    /// Moves an entry, replacing what `new_name` pointed to if allowed.
    /// Returns the replaced node.
    pub fn rename(
        &mut self,
        old_parent: Inode,
        old_name: &str,
        new_parent: Inode,
        new_name: &str,
    ) -> Result<Option<Inode>, Errno> {
        if old_name == ".." || new_name == ".." {
            return Err(Errno::Inval);
        }
        let inode = self
            .entries(old_parent)?
            .get(old_name)
            .copied()
            .ok_or(Errno::Noent)?;
        let moving_dir = self.get(inode)?.is_dir();

        if moving_dir && self.is_ancestor(inode, new_parent)? {
            return Err(Errno::Inval);
        }
        let mut replaced = None;
        if let Some(existing) = self.entries(new_parent)?.get(new_name).copied() {
            if existing == inode {
                return Ok(None);
            }
            let existing_node = self.get(existing)?;
            match (moving_dir, existing_node.is_dir()) {
                (true, false) => return Err(Errno::Notdir),
                (false, true) => return Err(Errno::Isdir),
                (true, true) if !self.entries(existing)?.is_empty() => {
                    return Err(Errno::Notempty);
                }
                _ => {}
            }
            replaced = Some(self.unlink(new_parent, new_name)?);
        }

        self.entries_mut(old_parent)?.remove(old_name);
        self.entries_mut(new_parent)?.insert(new_name.to_string(), inode);
        if moving_dir {
            self.get_mut(inode)?.parent = new_parent;
        }
        self.touch(old_parent)?;
        self.touch(new_parent)?;
        Ok(replaced)
    }

    /// Whether `dir` is `node` or lies below it.
    fn is_ancestor(&self, node: Inode, mut dir: Inode) -> Result<bool, Errno> {
        loop {
            if dir == node {
                return Ok(true);
            }
            if dir == self.root {
                return Ok(false);
            }
            dir = self.get(dir)?.parent;
        }
    }

    fn touch(&mut self, inode: Inode) -> Result<(), Errno> {
        let node = self.get_mut(inode)?;
        node.mtim = now();
        node.ctim = node.mtim;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir() -> Kind {
        Kind::Dir {
            entries: BTreeMap::new(),
        }
    }

    #[test]
    fn walk_follows_intermediate_symlinks_only() {
        let mut tree = Tree::default();
        let root = tree.root();
        let real = tree.insert(root, "real", dir()).unwrap();
        let file = tree
            .insert(real, "f", Kind::File { data: vec![] })
            .unwrap();
        let link = tree
            .insert(
                root,
                "link",
                Kind::Symlink {
                    target: "/real".into(),
                },
            )
            .unwrap();

        assert_eq!(tree.walk(root, "./link/f", false).unwrap(), file);
        assert_eq!(tree.walk(root, "link", false).unwrap(), link);
        assert_eq!(tree.walk(root, "link", true).unwrap(), real);
    }

    #[test]
    fn cannot_climb_above_the_root() {
        let tree = Tree::default();
        assert_eq!(tree.walk(tree.root(), "..", true), Err(Errno::Notcapable));
    }

    #[test]
    fn rename_refuses_to_move_a_dir_into_itself() {
        let mut tree = Tree::default();
        let root = tree.root();
        let a = tree.insert(root, "a", dir()).unwrap();
        tree.insert(a, "b", dir()).unwrap();
        let b = tree.walk(root, "a/b", true).unwrap();
        assert_eq!(tree.rename(root, "a", b, "a"), Err(Errno::Inval));
    }

    #[test]
    fn unlinked_nodes_are_dropped() {
        let mut tree = Tree::default();
        let root = tree.root();
        let f = tree.insert(root, "f", Kind::File { data: vec![] }).unwrap();
        tree.link(root, "g", f).unwrap();
        tree.unlink(root, "f").unwrap();
        tree.reap(f);
        assert_eq!(tree.get(f).unwrap().nlink, 1);
        tree.unlink(root, "g").unwrap();
        tree.reap(f);
        assert!(tree.get(f).is_err());
    }
}
