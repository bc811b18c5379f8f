use tracing::trace;
use wasi_posix_types::{
    DIRENT_SIZE, Dircookie, Dirent, Errno, Fd, Fdflags, Fdstat, Filedelta, Filesize, Filestat,
    Filetype, Fstflags, Host, Lookup, Oflags, RawErrno, Rights, Size, Timestamp, Whence,
    dirent_to_le_bytes,
};

use crate::node::{Inode, Kind, now};
use crate::{MemHost, OpenFd, OpenRecord, State};

/// Runs an import body against the locked state and turns its outcome
/// into a raw status.
macro_rules! import {
    ($host:expr, $name:literal, |$state:ident| $body:block) => {{
        let result = (|| -> Result<(), Errno> {
            let mut $state = $host.enter($name)?;
            let $state: &mut State = &mut $state;
            $body
        })();
        match result {
            Ok(()) => Errno::Success.raw(),
            Err(errno) => {
                trace!(import = $name, %errno);
                errno.raw()
            }
        }
    }};
}

fn path_str(path: &[u8]) -> Result<&str, Errno> {
    if path.is_empty() {
        return Err(Errno::Noent);
    }
    std::str::from_utf8(path).map_err(|_| Errno::Ilseq)
}

fn to_size(n: usize) -> Size {
    n.min(Size::MAX as usize) as Size
}

impl State {
    fn fd(&mut self, fd: Fd, need: Rights) -> Result<&mut OpenFd, Errno> {
        let open = self.fds.get_mut(&fd).ok_or(Errno::Badf)?;
        if !open.base.contains(need) {
            return Err(Errno::Notcapable);
        }
        Ok(open)
    }

    /// The directory behind `fd`, provided the descriptor carries `need`.
    fn dir(&mut self, fd: Fd, need: Rights) -> Result<Inode, Errno> {
        let inode = self.fd(fd, need)?.inode;
        if !self.tree.get(inode)?.is_dir() {
            return Err(Errno::Notdir);
        }
        Ok(inode)
    }

    fn file_data(&mut self, inode: Inode) -> Result<&mut Vec<u8>, Errno> {
        match &mut self.tree.get_mut(inode)?.kind {
            Kind::File { data } => Ok(data),
            Kind::Dir { .. } => Err(Errno::Isdir),
            Kind::Symlink { .. } => Err(Errno::Inval),
        }
    }

    fn read_at(&mut self, inode: Inode, buf: &mut [u8], offset: u64) -> Result<usize, Errno> {
        let data = self.file_data(inode)?;
        let start = (offset as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.tree.get_mut(inode)?.atim = now();
        Ok(n)
    }

    fn write_at(&mut self, inode: Inode, buf: &[u8], offset: u64) -> Result<usize, Errno> {
        let data = self.file_data(inode)?;
        let start = usize::try_from(offset).map_err(|_| Errno::Fbig)?;
        let end = start.checked_add(buf.len()).ok_or(Errno::Fbig)?;
        if data.len() < end {
            data.resize(end, 0);
        }
        data[start..end].copy_from_slice(buf);
        let node = self.tree.get_mut(inode)?;
        node.mtim = now();
        node.ctim = node.mtim;
        Ok(buf.len())
    }

    /// Packs the entries of `dir` from `cookie` on, `.` and `..` first.
    fn dirents(&self, dir: Inode, cookie: Dircookie) -> Result<Vec<u8>, Errno> {
        let tree = &self.tree;
        let parent = if dir == tree.root() {
            dir
        } else {
            tree.get(dir)?.parent
        };
        let mut entries = vec![
            (".".to_string(), dir, Filetype::Directory),
            ("..".to_string(), parent, Filetype::Directory),
        ];
        for (name, inode) in tree.entries(dir)? {
            entries.push((name.clone(), *inode, tree.get(*inode)?.filetype()));
        }

        let mut out = Vec::new();
        for (i, (name, inode, d_type)) in entries.iter().enumerate().skip(cookie as usize) {
            let dirent = Dirent {
                d_next: i as Dircookie + 1,
                d_ino: *inode as u64,
                d_namlen: name.len() as u32,
                d_type: *d_type,
            };
            out.extend_from_slice(&dirent_to_le_bytes(&dirent));
            out.extend_from_slice(name.as_bytes());
        }
        Ok(out)
    }
}

impl Host for MemHost {
    fn fd_close(&self, fd: Fd) -> RawErrno {
        import!(self, "fd_close", |state| {
            let open = state.fds.remove(&fd).ok_or(Errno::Badf)?;
            state.reap(open.inode);
            Ok(())
        })
    }

    fn fd_fdstat_get(&self, fd: Fd, buf: &mut Fdstat) -> RawErrno {
        import!(self, "fd_fdstat_get", |state| {
            let open = state.fd(fd, Rights::empty())?.clone();
            let filetype = state.tree.get(open.inode)?.filetype();
            *buf = Fdstat {
                fs_filetype: filetype.into(),
                fs_flags: open.flags.bits(),
                fs_rights_base: open.base.bits(),
                fs_rights_inheriting: open.inheriting.bits(),
            };
            Ok(())
        })
    }

    fn fd_filestat_get(&self, fd: Fd, buf: &mut Filestat) -> RawErrno {
        import!(self, "fd_filestat_get", |state| {
            let inode = state.fd(fd, Rights::FD_FILESTAT_GET)?.inode;
            *buf = state.tree.stat(inode)?;
            Ok(())
        })
    }

    fn fd_filestat_set_size(&self, fd: Fd, size: Filesize) -> RawErrno {
        import!(self, "fd_filestat_set_size", |state| {
            let inode = state.fd(fd, Rights::FD_FILESTAT_SET_SIZE)?.inode;
            let size = usize::try_from(size).map_err(|_| Errno::Fbig)?;
            state.file_data(inode)?.resize(size, 0);
            state.tree.get_mut(inode)?.mtim = now();
            Ok(())
        })
    }

    fn fd_read(&self, fd: Fd, buf: &mut [u8], nread: &mut Size) -> RawErrno {
        import!(self, "fd_read", |state| {
            let open = state.fd(fd, Rights::FD_READ)?.clone();
            let n = state.read_at(open.inode, buf, open.offset)?;
            state.fd(fd, Rights::empty())?.offset += n as u64;
            *nread = to_size(n);
            Ok(())
        })
    }

    fn fd_write(&self, fd: Fd, buf: &[u8], nwritten: &mut Size) -> RawErrno {
        import!(self, "fd_write", |state| {
            let open = state.fd(fd, Rights::FD_WRITE)?.clone();
            let offset = if open.flags.contains(Fdflags::APPEND) {
                state.file_data(open.inode)?.len() as u64
            } else {
                open.offset
            };
            let n = state.write_at(open.inode, buf, offset)?;
            state.fd(fd, Rights::empty())?.offset = offset + n as u64;
            *nwritten = to_size(n);
            Ok(())
        })
    }

    fn fd_pread(&self, fd: Fd, buf: &mut [u8], offset: Filesize, nread: &mut Size) -> RawErrno {
        import!(self, "fd_pread", |state| {
            let inode = state.fd(fd, Rights::FD_READ | Rights::FD_SEEK)?.inode;
            *nread = to_size(state.read_at(inode, buf, offset)?);
            Ok(())
        })
    }

    fn fd_pwrite(&self, fd: Fd, buf: &[u8], offset: Filesize, nwritten: &mut Size) -> RawErrno {
        import!(self, "fd_pwrite", |state| {
            let inode = state.fd(fd, Rights::FD_WRITE | Rights::FD_SEEK)?.inode;
            *nwritten = to_size(state.write_at(inode, buf, offset)?);
            Ok(())
        })
    }

    fn fd_seek(
        &self,
        fd: Fd,
        offset: Filedelta,
        whence: u8,
        newoffset: &mut Filesize,
    ) -> RawErrno {
        import!(self, "fd_seek", |state| {
            let whence = Whence::try_from(whence).map_err(|_| Errno::Inval)?;
            let open = state.fd(fd, Rights::FD_SEEK)?.clone();
            let base = match whence {
                Whence::Set => 0,
                Whence::Cur => open.offset as i128,
                Whence::End => state.file_data(open.inode)?.len() as i128,
            };
            let target = base + offset as i128;
            let target = u64::try_from(target).map_err(|_| Errno::Inval)?;
            state.fd(fd, Rights::empty())?.offset = target;
            *newoffset = target;
            Ok(())
        })
    }

    fn fd_readdir(
        &self,
        fd: Fd,
        buf: &mut [u8],
        cookie: Dircookie,
        bufused: &mut Size,
    ) -> RawErrno {
        import!(self, "fd_readdir", |state| {
            *bufused = 0;
            let open = state.fd(fd, Rights::FD_READDIR)?.clone();
            if buf.len() < DIRENT_SIZE {
                return Err(Errno::Inval);
            }
            let packed = state.dirents(open.inode, cookie)?;
            let n = packed.len().min(buf.len());
            buf[..n].copy_from_slice(&packed[..n]);
            *bufused = to_size(n);
            Ok(())
        })
    }

    fn path_open(
        &self,
        dirfd: Fd,
        dirflags: Lookup,
        path: &[u8],
        oflags: Oflags,
        fs_rights_base: Rights,
        fs_rights_inheriting: Rights,
        fs_flags: Fdflags,
        fd: &mut Fd,
    ) -> RawErrno {
        import!(self, "path_open", |state| {
            state.opens.push(OpenRecord {
                dirfd,
                path: String::from_utf8_lossy(path).into_owned(),
                oflags,
                rights_base: fs_rights_base,
                rights_inheriting: fs_rights_inheriting,
                fdflags: fs_flags,
            });
            let path = path_str(path)?;
            let dir = state.dir(dirfd, Rights::PATH_OPEN)?;
            let allowed = state.fd(dirfd, Rights::empty())?.inheriting;
            if !allowed.contains(fs_rights_base | fs_rights_inheriting) {
                return Err(Errno::Notcapable);
            }
            let follow = dirflags.contains(Lookup::SYMLINK_FOLLOW);

            let inode = match state.tree.walk_parent(dir, path)? {
                None => dir,
                Some((parent, name)) => match state.tree.lookup(parent, name)? {
                    Some(_) if oflags.contains(Oflags::CREATE | Oflags::EXCL) => {
                        return Err(Errno::Exist);
                    }
                    Some(child) => {
                        if let Kind::Symlink { .. } = state.tree.get(child)?.kind {
                            if !follow {
                                return Err(Errno::Loop);
                            }
                            state.tree.walk(parent, name, true)?
                        } else {
                            child
                        }
                    }
                    None if oflags.contains(Oflags::CREATE) => {
                        if oflags.contains(Oflags::DIRECTORY) {
                            return Err(Errno::Inval);
                        }
                        state.fd(dirfd, Rights::PATH_CREATE_FILE)?;
                        state
                            .tree
                            .insert(parent, name, Kind::File { data: Vec::new() })?
                    }
                    None => return Err(Errno::Noent),
                },
            };

            let is_dir = state.tree.get(inode)?.is_dir();
            if oflags.contains(Oflags::DIRECTORY) && !is_dir {
                return Err(Errno::Notdir);
            }
            if is_dir && (fs_rights_base.contains(Rights::FD_WRITE) || oflags.contains(Oflags::TRUNC)) {
                return Err(Errno::Isdir);
            }
            if oflags.contains(Oflags::TRUNC) {
                state.file_data(inode)?.clear();
            }
            *fd = state.alloc_fd(OpenFd {
                inode,
                offset: 0,
                base: fs_rights_base,
                inheriting: fs_rights_inheriting,
                flags: fs_flags,
            });
            Ok(())
        })
    }

    fn path_create_directory(&self, fd: Fd, path: &[u8]) -> RawErrno {
        import!(self, "path_create_directory", |state| {
            let path = path_str(path)?;
            let dir = state.dir(fd, Rights::PATH_CREATE_DIRECTORY)?;
            let (parent, name) = state.tree.walk_parent(dir, path)?.ok_or(Errno::Exist)?;
            state.tree.insert(
                parent,
                name,
                Kind::Dir {
                    entries: Default::default(),
                },
            )?;
            Ok(())
        })
    }

    fn path_remove_directory(&self, fd: Fd, path: &[u8]) -> RawErrno {
        import!(self, "path_remove_directory", |state| {
            let path = path_str(path)?;
            let dir = state.dir(fd, Rights::PATH_REMOVE_DIRECTORY)?;
            let (parent, name) = state.tree.walk_parent(dir, path)?.ok_or(Errno::Inval)?;
            if name == ".." {
                return Err(Errno::Inval);
            }
            let inode = state.tree.lookup(parent, name)?.ok_or(Errno::Noent)?;
            if !state.tree.entries(inode)?.is_empty() {
                return Err(Errno::Notempty);
            }
            state.tree.unlink(parent, name)?;
            state.reap(inode);
            Ok(())
        })
    }

    fn path_unlink_file(&self, fd: Fd, path: &[u8]) -> RawErrno {
        import!(self, "path_unlink_file", |state| {
            let path = path_str(path)?;
            let dir = state.dir(fd, Rights::PATH_UNLINK_FILE)?;
            let (parent, name) = state.tree.walk_parent(dir, path)?.ok_or(Errno::Isdir)?;
            let inode = state.tree.lookup(parent, name)?.ok_or(Errno::Noent)?;
            if state.tree.get(inode)?.is_dir() {
                return Err(Errno::Isdir);
            }
            state.tree.unlink(parent, name)?;
            state.reap(inode);
            Ok(())
        })
    }

    fn path_rename(&self, old_fd: Fd, old_path: &[u8], new_fd: Fd, new_path: &[u8]) -> RawErrno {
        import!(self, "path_rename", |state| {
            let old_path = path_str(old_path)?;
            let new_path = path_str(new_path)?;
            let old_dir = state.dir(old_fd, Rights::PATH_RENAME_SOURCE)?;
            let new_dir = state.dir(new_fd, Rights::PATH_RENAME_TARGET)?;
            let (old_parent, old_name) = state
                .tree
                .walk_parent(old_dir, old_path)?
                .ok_or(Errno::Busy)?;
            let (new_parent, new_name) = state
                .tree
                .walk_parent(new_dir, new_path)?
                .ok_or(Errno::Busy)?;
            if let Some(replaced) = state
                .tree
                .rename(old_parent, old_name, new_parent, new_name)?
            {
                state.reap(replaced);
            }
            Ok(())
        })
    }

    fn path_link(
        &self,
        old_fd: Fd,
        old_flags: Lookup,
        old_path: &[u8],
        new_fd: Fd,
        new_path: &[u8],
    ) -> RawErrno {
        import!(self, "path_link", |state| {
            let old_path = path_str(old_path)?;
            let new_path = path_str(new_path)?;
            let old_dir = state.dir(old_fd, Rights::PATH_LINK_SOURCE)?;
            let new_dir = state.dir(new_fd, Rights::PATH_LINK_TARGET)?;
            let follow = old_flags.contains(Lookup::SYMLINK_FOLLOW);
            let inode = state.tree.walk(old_dir, old_path, follow)?;
            if state.tree.get(inode)?.is_dir() {
                return Err(Errno::Perm);
            }
            let (parent, name) = state
                .tree
                .walk_parent(new_dir, new_path)?
                .ok_or(Errno::Exist)?;
            state.tree.link(parent, name, inode)
        })
    }

    fn path_symlink(&self, old_path: &[u8], fd: Fd, new_path: &[u8]) -> RawErrno {
        import!(self, "path_symlink", |state| {
            let target = std::str::from_utf8(old_path).map_err(|_| Errno::Ilseq)?;
            let new_path = path_str(new_path)?;
            let dir = state.dir(fd, Rights::PATH_SYMLINK)?;
            let (parent, name) = state
                .tree
                .walk_parent(dir, new_path)?
                .ok_or(Errno::Exist)?;
            state.tree.insert(
                parent,
                name,
                Kind::Symlink {
                    target: target.to_string(),
                },
            )?;
            Ok(())
        })
    }

    fn path_readlink(
        &self,
        fd: Fd,
        path: &[u8],
        buf: &mut [u8],
        bufused: &mut Size,
    ) -> RawErrno {
        import!(self, "path_readlink", |state| {
            *bufused = 0;
            let path = path_str(path)?;
            let dir = state.dir(fd, Rights::PATH_READLINK)?;
            let inode = state.tree.walk(dir, path, false)?;
            let Kind::Symlink { target } = &state.tree.get(inode)?.kind else {
                return Err(Errno::Inval);
            };
            let n = target.len().min(buf.len());
            buf[..n].copy_from_slice(&target.as_bytes()[..n]);
            *bufused = to_size(n);
            Ok(())
        })
    }

    fn path_filestat_get(
        &self,
        fd: Fd,
        flags: Lookup,
        path: &[u8],
        buf: &mut Filestat,
    ) -> RawErrno {
        import!(self, "path_filestat_get", |state| {
            let path = path_str(path)?;
            let dir = state.dir(fd, Rights::PATH_FILESTAT_GET)?;
            let inode = state
                .tree
                .walk(dir, path, flags.contains(Lookup::SYMLINK_FOLLOW))?;
            *buf = state.tree.stat(inode)?;
            Ok(())
        })
    }

    fn path_filestat_set_times(
        &self,
        fd: Fd,
        flags: Lookup,
        path: &[u8],
        st_atim: Timestamp,
        st_mtim: Timestamp,
        fst_flags: Fstflags,
    ) -> RawErrno {
        import!(self, "path_filestat_set_times", |state| {
            if fst_flags.contains(Fstflags::ATIM | Fstflags::ATIM_NOW)
                || fst_flags.contains(Fstflags::MTIM | Fstflags::MTIM_NOW)
            {
                return Err(Errno::Inval);
            }
            let path = path_str(path)?;
            let dir = state.dir(fd, Rights::PATH_FILESTAT_SET_TIMES)?;
            let inode = state
                .tree
                .walk(dir, path, flags.contains(Lookup::SYMLINK_FOLLOW))?;
            let node = state.tree.get_mut(inode)?;
            if fst_flags.contains(Fstflags::ATIM) {
                node.atim = st_atim;
            } else if fst_flags.contains(Fstflags::ATIM_NOW) {
                node.atim = now();
            }
            if fst_flags.contains(Fstflags::MTIM) {
                node.mtim = st_mtim;
            } else if fst_flags.contains(Fstflags::MTIM_NOW) {
                node.mtim = now();
            }
            Ok(())
        })
    }

    fn random_get(&self, buf: &mut [u8]) -> RawErrno {
        import!(self, "random_get", |state| {
            let _ = state;
            getrandom::getrandom(buf).map_err(|_| Errno::Io)
        })
    }
}
