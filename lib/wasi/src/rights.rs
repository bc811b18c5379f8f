//! Rights bookkeeping for descriptors opened from paths.

use bitflags::bitflags;
use tracing::debug;
use wasi_posix_types::{Fd, Fdflags, Fdstat, Host, Oflags, Rights};

use crate::errno::{Error, check};

bitflags! {
    /// POSIX `open(2)` flags as understood by [`Posix::open`](crate::Posix::open).
    ///
    /// Read-only is the absence of `WRONLY` and `RDWR`, see [`OpenFlags::RDONLY`].
    #[derive(Default)]
    pub struct OpenFlags: u32 {
        const WRONLY = 0o1;
        const RDWR = 0o2;
        const CREAT = 0o100;
        const EXCL = 0o200;
        const TRUNC = 0o1000;
        const APPEND = 0o2000;
        const SYNC = 0o10000;
    }
}

impl OpenFlags {
    pub const RDONLY: OpenFlags = OpenFlags::empty();

    pub(crate) fn oflags(self) -> Oflags {
        let mut oflags = Oflags::empty();
        if self.contains(OpenFlags::CREAT) {
            oflags |= Oflags::CREATE;
        }
        if self.contains(OpenFlags::TRUNC) {
            oflags |= Oflags::TRUNC;
        }
        if self.contains(OpenFlags::EXCL) {
            oflags |= Oflags::EXCL;
        }
        oflags
    }

    pub(crate) fn fdflags(self) -> Fdflags {
        let mut fdflags = Fdflags::empty();
        if self.contains(OpenFlags::APPEND) {
            fdflags |= Fdflags::APPEND;
        }
        if self.contains(OpenFlags::SYNC) {
            fdflags |= Fdflags::SYNC;
        }
        fdflags
    }
}

/// The two capability ceilings derived from the root descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RightsRegistry {
    dir: Rights,
    file: Rights,
}

impl RightsRegistry {
    /// Queries the root descriptor once and splits its rights.
    pub fn init(host: &dyn Host, root_fd: Fd) -> Result<Self, Error> {
        let mut stat = Fdstat::default();
        check(host.fd_fdstat_get(root_fd, &mut stat))?;
        let registry = Self {
            dir: stat.rights_base(),
            file: stat.rights_inheriting(),
        };
        debug!(root_fd, dir = ?registry.dir, file = ?registry.file, "root rights");
        Ok(registry)
    }

    /// Rights of the root directory itself.
    pub fn dir(&self) -> Rights {
        self.dir
    }

    /// Rights inherited by everything opened below the root.
    pub fn file(&self) -> Rights {
        self.file
    }

    /// The minimal base rights to request for an open in `mode`.
    pub fn open_rights(&self, mode: OpenFlags) -> Rights {
        let mut rights = self.file;
        if mode.contains(OpenFlags::WRONLY) {
            rights.remove(Rights::READ_CLASS);
        } else if mode.contains(OpenFlags::RDWR) {
            // read-write keeps everything
        } else {
            rights.remove(Rights::WRITE_CLASS);
        }
        rights
    }
}
