use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Error codes returned by the `wasi_unstable` imports.
///
/// `Success` is the only non-error value. Every other code has a fixed
/// POSIX-flavored message, see [`Errno::message`].
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[cfg_attr(feature = "enable-serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Errno {
    /// No error occurred. System call completed successfully.
    Success = 0,
    Toobig,
    Access,
    Addrinuse,
    Addrnotavail,
    Afnosupport,
    Again,
    Already,
    Badf,
    Badmsg,
    Busy,
    Canceled,
    Child,
    Connaborted,
    Connrefused,
    Connreset,
    Deadlk,
    Destaddrreq,
    Dom,
    Dquot,
    Exist,
    Fault,
    Fbig,
    Hostunreach,
    Idrm,
    Ilseq,
    Inprogress,
    Intr,
    Inval,
    Io,
    Isconn,
    Isdir,
    Loop,
    Mfile,
    Mlink,
    Msgsize,
    Multihop,
    Nametoolong,
    Netdown,
    Netreset,
    Netunreach,
    Nfile,
    Nobufs,
    Nodev,
    Noent,
    Noexec,
    Nolck,
    Nolink,
    Nomem,
    Nomsg,
    Noprotoopt,
    Nospc,
    Nosys,
    Notconn,
    Notdir,
    Notempty,
    Notrecoverable,
    Notsock,
    Notsup,
    Notty,
    Nxio,
    Overflow,
    Ownerdead,
    Perm,
    Pipe,
    Proto,
    Protonosupport,
    Prototype,
    Range,
    Rofs,
    Spipe,
    Srch,
    Stale,
    Timedout,
    Txtbsy,
    Xdev,
    /// Extension: Capabilities insufficient.
    Notcapable,
}

impl Errno {
    /// Highest code defined by the ABI.
    pub const MAX: u16 = Errno::Notcapable as u16;

    /// Every error code in ascending order, `Success` excluded.
    pub fn errors() -> impl Iterator<Item = Errno> {
        (1..=Self::MAX).filter_map(|code| Errno::try_from(code).ok())
    }

    pub fn raw(self) -> u16 {
        self.into()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Errno::Success => "ESUCCESS",
            Errno::Toobig => "E2BIG",
            Errno::Access => "EACCES",
            Errno::Addrinuse => "EADDRINUSE",
            Errno::Addrnotavail => "EADDRNOTAVAIL",
            Errno::Afnosupport => "EAFNOSUPPORT",
            Errno::Again => "EAGAIN",
            Errno::Already => "EALREADY",
            Errno::Badf => "EBADF",
            Errno::Badmsg => "EBADMSG",
            Errno::Busy => "EBUSY",
            Errno::Canceled => "ECANCELED",
            Errno::Child => "ECHILD",
            Errno::Connaborted => "ECONNABORTED",
            Errno::Connrefused => "ECONNREFUSED",
            Errno::Connreset => "ECONNRESET",
            Errno::Deadlk => "EDEADLK",
            Errno::Destaddrreq => "EDESTADDRREQ",
            Errno::Dom => "EDOM",
            Errno::Dquot => "EDQUOT",
            Errno::Exist => "EEXIST",
            Errno::Fault => "EFAULT",
            Errno::Fbig => "EFBIG",
            Errno::Hostunreach => "EHOSTUNREACH",
            Errno::Idrm => "EIDRM",
            Errno::Ilseq => "EILSEQ",
            Errno::Inprogress => "EINPROGRESS",
            Errno::Intr => "EINTR",
            Errno::Inval => "EINVAL",
            Errno::Io => "EIO",
            Errno::Isconn => "EISCONN",
            Errno::Isdir => "EISDIR",
            Errno::Loop => "ELOOP",
            Errno::Mfile => "EMFILE",
            Errno::Mlink => "EMLINK",
            Errno::Msgsize => "EMSGSIZE",
            Errno::Multihop => "EMULTIHOP",
            Errno::Nametoolong => "ENAMETOOLONG",
            Errno::Netdown => "ENETDOWN",
            Errno::Netreset => "ENETRESET",
            Errno::Netunreach => "ENETUNREACH",
            Errno::Nfile => "ENFILE",
            Errno::Nobufs => "ENOBUFS",
            Errno::Nodev => "ENODEV",
            Errno::Noent => "ENOENT",
            Errno::Noexec => "ENOEXEC",
            Errno::Nolck => "ENOLCK",
            Errno::Nolink => "ENOLINK",
            Errno::Nomem => "ENOMEM",
            Errno::Nomsg => "ENOMSG",
            Errno::Noprotoopt => "ENOPROTOOPT",
            Errno::Nospc => "ENOSPC",
            Errno::Nosys => "ENOSYS",
            Errno::Notconn => "ENOTCONN",
            Errno::Notdir => "ENOTDIR",
            Errno::Notempty => "ENOTEMPTY",
            Errno::Notrecoverable => "ENOTRECOVERABLE",
            Errno::Notsock => "ENOTSOCK",
            Errno::Notsup => "ENOTSUP",
            Errno::Notty => "ENOTTY",
            Errno::Nxio => "ENXIO",
            Errno::Overflow => "EOVERFLOW",
            Errno::Ownerdead => "EOWNERDEAD",
            Errno::Perm => "EPERM",
            Errno::Pipe => "EPIPE",
            Errno::Proto => "EPROTO",
            Errno::Protonosupport => "EPROTONOSUPPORT",
            Errno::Prototype => "EPROTOTYPE",
            Errno::Range => "ERANGE",
            Errno::Rofs => "EROFS",
            Errno::Spipe => "ESPIPE",
            Errno::Srch => "ESRCH",
            Errno::Stale => "ESTALE",
            Errno::Timedout => "ETIMEDOUT",
            Errno::Txtbsy => "ETXTBSY",
            Errno::Xdev => "EXDEV",
            Errno::Notcapable => "ENOTCAPABLE",
        }
    }

    /// Human readable text for the code.
    ///
    /// `Nosys` is platform dependent and gets its final text from the
    /// error table of the syscall layer; this is the generic fallback.
    pub fn message(&self) -> &'static str {
        match self {
            Errno::Success => "Success",
            Errno::Toobig => "Argument list too long",
            Errno::Access => "Permission denied",
            Errno::Addrinuse => "Address already in use",
            Errno::Addrnotavail => "Address not available",
            Errno::Afnosupport => "Address family not supported by protocol family",
            Errno::Again => "Try again",
            Errno::Already => "Socket already connected",
            Errno::Badf => "Bad file number",
            Errno::Badmsg => "Trying to read unreadable message",
            Errno::Busy => "Device or resource busy",
            Errno::Canceled => "Operation canceled.",
            Errno::Child => "No child processes",
            Errno::Connaborted => "Connection aborted",
            Errno::Connrefused => "Connection refused",
            Errno::Connreset => "Connection reset by peer",
            Errno::Deadlk => "Deadlock condition",
            Errno::Destaddrreq => "Destination address required",
            Errno::Dom => "Math arg out of domain of func",
            Errno::Dquot => "Quota exceeded",
            Errno::Exist => "File exists",
            Errno::Fault => "Bad address",
            Errno::Fbig => "File too large",
            Errno::Hostunreach => "Host is unreachable",
            Errno::Idrm => "Identifier removed",
            Errno::Ilseq => "Illegal byte sequence",
            Errno::Inprogress => "Connection already in progress",
            Errno::Intr => "Interrupted system call",
            Errno::Inval => "Invalid argument",
            Errno::Io => "I/O error",
            Errno::Isconn => "Socket is already connected",
            Errno::Isdir => "Is a directory",
            Errno::Loop => "Too many symbolic links",
            Errno::Mfile => "Too many open files",
            Errno::Mlink => "Too many links",
            Errno::Msgsize => "Message too long",
            Errno::Multihop => "Multihop attempted",
            Errno::Nametoolong => "File name too long",
            Errno::Netdown => "Network interface is not configured",
            Errno::Netreset => "Network dropped connection on reset",
            Errno::Netunreach => "Network is unreachable",
            Errno::Nfile => "File table overflow",
            Errno::Nobufs => "No buffer space available",
            Errno::Nodev => "No such device",
            Errno::Noent => "No such file or directory",
            Errno::Noexec => "Exec format error",
            Errno::Nolck => "No record locks available",
            Errno::Nolink => "The link has been severed",
            Errno::Nomem => "Out of memory",
            Errno::Nomsg => "No message of desired type",
            Errno::Noprotoopt => "Protocol not available",
            Errno::Nospc => "No space left on device",
            Errno::Nosys => "Not implemented",
            Errno::Notconn => "Socket is not connected",
            Errno::Notdir => "Not a directory",
            Errno::Notempty => "Directory not empty",
            Errno::Notrecoverable => "State not recoverable",
            Errno::Notsock => "Socket operation on non-socket",
            Errno::Notsup => "Not supported",
            Errno::Notty => "Not a typewriter",
            Errno::Nxio => "No such device or address",
            Errno::Overflow => "Value too large for defined data type",
            Errno::Ownerdead => "Owner died",
            Errno::Perm => "Operation not permitted",
            Errno::Pipe => "Broken pipe",
            Errno::Proto => "Protocol error",
            Errno::Protonosupport => "Unknown protocol",
            Errno::Prototype => "Protocol wrong type for socket",
            Errno::Range => "Math result not representable",
            Errno::Rofs => "Read-only file system",
            Errno::Spipe => "Illegal seek",
            Errno::Srch => "No such process",
            Errno::Stale => "Stale file handle",
            Errno::Timedout => "Connection timed out",
            Errno::Txtbsy => "Text file busy",
            Errno::Xdev => "Cross-device link",
            Errno::Notcapable => "Capabilities insufficient",
        }
    }
}

impl core::fmt::Display for Errno {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} ({})", self.message(), self.name())
    }
}

impl From<Errno> for std::io::ErrorKind {
    fn from(err: Errno) -> Self {
        use std::io::ErrorKind;
        match err {
            Errno::Access | Errno::Perm | Errno::Notcapable => ErrorKind::PermissionDenied,
            Errno::Addrinuse => ErrorKind::AddrInUse,
            Errno::Addrnotavail => ErrorKind::AddrNotAvailable,
            Errno::Again => ErrorKind::WouldBlock,
            Errno::Connaborted => ErrorKind::ConnectionAborted,
            Errno::Connrefused => ErrorKind::ConnectionRefused,
            Errno::Connreset => ErrorKind::ConnectionReset,
            Errno::Exist => ErrorKind::AlreadyExists,
            Errno::Intr => ErrorKind::Interrupted,
            Errno::Inval => ErrorKind::InvalidInput,
            Errno::Noent => ErrorKind::NotFound,
            Errno::Notconn => ErrorKind::NotConnected,
            Errno::Pipe => ErrorKind::BrokenPipe,
            Errno::Timedout => ErrorKind::TimedOut,
            Errno::Nosys | Errno::Notsup => ErrorKind::Unsupported,
            Errno::Nomem => ErrorKind::OutOfMemory,
            _ => ErrorKind::Other,
        }
    }
}
