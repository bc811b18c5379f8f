use std::io::{Read, Write};

use pretty_assertions::assert_eq;
use wasi_posix::{
    Errno, Fd, Filetype, OpenFlags, Posix, PosixBuilder, SEEK_CUR, SEEK_END, SEEK_SET,
};
use wasi_posix_mem::MemHost;

fn posix() -> Posix<MemHost> {
    PosixBuilder::new()
        .current_dir("/")
        .build(MemHost::new())
        .unwrap()
}

#[test]
fn builder_defaults_match_new() {
    let built = PosixBuilder::new().build(MemHost::new()).unwrap();
    let plain = Posix::new(MemHost::new()).unwrap();
    assert_eq!(built.rights().dir(), plain.rights().dir());
    assert_eq!(built.rights().file(), plain.rights().file());
    assert_eq!(built.getwd(), plain.getwd());
}

fn create(posix: &Posix<MemHost>, path: &str) -> Fd {
    posix
        .open(path, OpenFlags::RDWR | OpenFlags::CREAT, 0o644)
        .unwrap()
}

#[test_log::test]
fn write_then_read_back() {
    let posix = posix();
    let fd = create(&posix, "/hello.txt");
    assert_eq!(posix.write(fd, b"hello world").unwrap(), 11);
    assert_eq!(posix.seek(fd, 0, SEEK_SET).unwrap(), 0);

    let mut buf = [0u8; 32];
    let n = posix.read(fd, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"hello world");
    assert_eq!(posix.read(fd, &mut buf).unwrap(), 0);
    posix.close(fd).unwrap();

    assert_eq!(posix.host().read_file("/hello.txt").unwrap(), b"hello world");
}

#[test]
fn positional_io_at_start_middle_and_past_the_end() {
    let posix = posix();
    let fd = create(&posix, "/data");
    posix.write(fd, b"0123456789").unwrap();

    let cases: [(i64, &[u8]); 4] = [(0, b"012"), (5, b"567"), (9, b"9"), (12, b"")];
    for (offset, expected) in cases {
        let mut buf = [0u8; 3];
        let n = posix.pread(fd, &mut buf, offset).unwrap();
        assert_eq!(&buf[..n], expected, "pread at {offset}");
    }

    assert_eq!(posix.pwrite(fd, b"ab", 4).unwrap(), 2);
    let mut buf = [0u8; 10];
    posix.pread(fd, &mut buf, 0).unwrap();
    assert_eq!(&buf, b"0123ab6789");

    // the descriptor offset is untouched by positional calls
    assert_eq!(posix.seek(fd, 0, SEEK_CUR).unwrap(), 10);
    posix.close(fd).unwrap();
}

#[test]
fn negative_offsets_are_rejected_locally() {
    let posix = posix();
    let fd = create(&posix, "/f");
    let before = posix.host().calls();
    let mut buf = [0u8; 4];
    assert!(posix.pread(fd, &mut buf, -1).unwrap_err().is(Errno::Inval));
    assert!(posix.pwrite(fd, b"x", -1).unwrap_err().is(Errno::Inval));
    assert!(posix.ftruncate(fd, -1).unwrap_err().is(Errno::Inval));
    assert!(posix.seek(fd, 0, 7).unwrap_err().is(Errno::Inval));
    assert_eq!(posix.host().calls(), before);
}

#[test]
fn empty_buffers_skip_the_host() {
    let posix = posix();
    let fd = create(&posix, "/f");
    let before = posix.host().calls();
    assert_eq!(posix.read(fd, &mut []).unwrap(), 0);
    assert_eq!(posix.write(fd, &[]).unwrap(), 0);
    assert_eq!(posix.pread(fd, &mut [], 3).unwrap(), 0);
    assert_eq!(posix.pwrite(fd, &[], 3).unwrap(), 0);
    assert_eq!(posix.host().calls(), before);
}

#[test]
fn seek_from_the_end() {
    let posix = posix();
    posix.host().write_file("/f", b"abcdef");
    let fd = posix.open("/f", OpenFlags::RDONLY, 0).unwrap();
    assert_eq!(posix.seek(fd, -2, SEEK_END).unwrap(), 4);
    let mut buf = [0u8; 8];
    let n = posix.read(fd, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"ef");
    posix.close(fd).unwrap();
}

#[test]
fn append_mode_writes_at_the_end() {
    let posix = posix();
    posix.host().write_file("/log", b"one\n");
    let fd = posix
        .open("/log", OpenFlags::WRONLY | OpenFlags::APPEND, 0)
        .unwrap();
    posix.write(fd, b"two\n").unwrap();
    posix.close(fd).unwrap();
    assert_eq!(posix.host().read_file("/log").unwrap(), b"one\ntwo\n");
}

#[test]
fn opening_a_missing_file_fails_with_noent() {
    let posix = posix();
    let err = posix.open("/missing", OpenFlags::RDONLY, 0).unwrap_err();
    assert!(err.is(Errno::Noent));
    assert!(posix.fd_table().is_empty());
}

#[test]
fn exclusive_create_refuses_existing_files() {
    let posix = posix();
    posix.host().write_file("/f", b"");
    let err = posix
        .open("/f", OpenFlags::WRONLY | OpenFlags::CREAT | OpenFlags::EXCL, 0)
        .unwrap_err();
    assert!(err.is(Errno::Exist));
}

#[test]
fn open_through_a_symlink_reaches_the_target() {
    let posix = posix();
    posix.host().write_file("/real", b"payload");
    posix.host().symlink("/real", "/alias");

    let fd = posix.open("/alias", OpenFlags::RDONLY, 0).unwrap();
    let mut buf = [0u8; 16];
    let n = posix.read(fd, &mut buf).unwrap();
    assert_eq!(&buf[..n], b"payload");
    assert_eq!(posix.fd_table().lookup(fd).as_deref(), Some("/alias"));
    posix.close(fd).unwrap();
}

#[test]
fn close_forgets_the_path_even_when_the_host_fails() {
    let posix = posix();
    let fd = create(&posix, "/f");
    assert_eq!(posix.fd_table().lookup(fd).as_deref(), Some("/f"));

    posix.host().fail_next("fd_close", Errno::Io);
    assert!(posix.close(fd).unwrap_err().is(Errno::Io));
    assert_eq!(posix.fd_table().lookup(fd), None);
}

#[test]
fn mkdir_and_rmdir_leave_no_descriptors_behind() {
    let posix = posix();
    posix.mkdir("/d", 0o755).unwrap();
    assert!(posix.stat("/d").unwrap().is_dir());
    assert!(posix.mkdir("/d", 0o755).unwrap_err().is(Errno::Exist));
    posix.rmdir("/d").unwrap();

    assert!(posix.fd_table().is_empty());
    assert_eq!(posix.host().open_fds(), 1);
    assert!(posix.stat("/d").unwrap_err().is(Errno::Noent));
}

#[test]
fn rmdir_refuses_non_empty_directories() {
    let posix = posix();
    posix.host().write_file("/d/f", b"");
    assert!(posix.rmdir("/d").unwrap_err().is(Errno::Notempty));
    posix.unlink("/d/f").unwrap();
    posix.rmdir("/d").unwrap();
}

#[test]
fn stat_follows_and_lstat_does_not() {
    let posix = posix();
    posix.host().write_file("/real", b"12345");
    posix.host().symlink("/real", "/alias");

    let stat = posix.stat("/alias").unwrap();
    assert_eq!(stat.filetype(), Filetype::RegularFile);
    assert_eq!(stat.st_size, 5);

    let lstat = posix.lstat("/alias").unwrap();
    assert_eq!(lstat.filetype(), Filetype::SymbolicLink);
}

#[test]
fn fstat_describes_the_open_file() {
    let posix = posix();
    posix.host().write_file("/f", b"abc");
    let fd = posix.open("/f", OpenFlags::RDONLY, 0).unwrap();
    let stat = posix.fstat(fd).unwrap();
    assert_eq!(stat.st_size, 3);
    assert_eq!(stat, posix.stat("/f").unwrap());
    posix.close(fd).unwrap();
}

#[test]
fn truncate_resizes_by_path() {
    let posix = posix();
    posix.host().write_file("/f", b"abcdef");
    posix.truncate("/f", 2).unwrap();
    assert_eq!(posix.host().read_file("/f").unwrap(), b"ab");

    posix.truncate("/f", 4).unwrap();
    assert_eq!(posix.host().read_file("/f").unwrap(), b"ab\0\0");

    assert!(posix.fd_table().is_empty());
    assert_eq!(posix.host().open_fds(), 1);
}

#[test]
fn truncate_reports_the_resize_failure_and_still_closes() {
    let posix = posix();
    posix.host().write_file("/f", b"abc");
    assert!(posix.truncate("/f", -1).unwrap_err().is(Errno::Inval));
    assert_eq!(posix.host().open_fds(), 1);
    assert!(posix.truncate("/missing", 0).unwrap_err().is(Errno::Noent));
}

#[test]
fn rename_moves_entries() {
    let posix = posix();
    posix.host().write_file("/a", b"content");
    posix.mkdir("/dir", 0o755).unwrap();
    posix.rename("/a", "/dir/b").unwrap();

    assert!(!posix.host().exists("/a"));
    assert_eq!(posix.host().read_file("/dir/b").unwrap(), b"content");
}

#[test]
fn rename_renames_a_symlink_not_its_target() {
    let posix = posix();
    posix.host().write_file("/real", b"");
    posix.host().symlink("/real", "/alias");
    posix.rename("/alias", "/moved").unwrap();

    assert!(posix.host().exists("/real"));
    assert_eq!(
        posix.lstat("/moved").unwrap().filetype(),
        Filetype::SymbolicLink
    );
}

#[test]
fn hard_links_share_the_inode() {
    let posix = posix();
    posix.host().write_file("/a", b"shared");
    posix.link("/a", "/b").unwrap();

    let a = posix.stat("/a").unwrap();
    let b = posix.stat("/b").unwrap();
    assert_eq!(a.st_ino, b.st_ino);
    assert_eq!(b.st_nlink, 2);

    posix.unlink("/a").unwrap();
    assert_eq!(posix.host().read_file("/b").unwrap(), b"shared");
}

#[test]
fn symlink_and_readlink() {
    let posix = posix();
    posix.symlink("../somewhere/else", "/link").unwrap();

    let mut buf = [0u8; 64];
    let n = posix.readlink("/link", &mut buf).unwrap();
    assert_eq!(&buf[..n], b"../somewhere/else");

    let mut short = [0u8; 4];
    assert_eq!(posix.readlink("/link", &mut short).unwrap(), 4);
    assert_eq!(&short, b"../s");

    assert!(posix.symlink("", "/other").unwrap_err().is(Errno::Inval));
    assert!(!posix.host().exists("/other"));
}

#[test]
fn unlink_removes_the_link_only() {
    let posix = posix();
    posix.host().write_file("/real", b"");
    posix.host().symlink("/real", "/alias");
    posix.unlink("/alias").unwrap();
    assert!(!posix.host().exists("/alias"));
    assert!(posix.host().exists("/real"));
}

#[test]
fn utimes_sets_both_timestamps() {
    let posix = posix();
    posix.host().write_file("/f", b"");
    posix.utimes_nano("/f", 1_000, 2_000).unwrap();
    let stat = posix.stat("/f").unwrap();
    assert_eq!(stat.st_atim, 1_000);
    assert_eq!(stat.st_mtim, 2_000);
}

#[test]
fn relative_paths_use_the_working_directory() {
    let posix = PosixBuilder::new()
        .current_dir("/home")
        .build(MemHost::new())
        .unwrap();
    posix.host().mkdir_all("/home");

    let fd = posix
        .open("notes", OpenFlags::WRONLY | OpenFlags::CREAT, 0o600)
        .unwrap();
    posix.write(fd, b"x").unwrap();
    posix.close(fd).unwrap();

    assert_eq!(posix.host().read_file("/home/notes").unwrap(), b"x");
    assert_eq!(posix.stat("notes").unwrap().st_size, 1);
}

#[test_log::test]
fn chdir_changes_how_relative_paths_resolve() {
    let posix = posix();
    posix.host().write_file("/srv/app/config", b"cfg");

    posix.chdir("/srv").unwrap();
    assert_eq!(posix.getwd(), "/srv");
    posix.chdir("app").unwrap();
    assert_eq!(posix.getwd(), "/srv/app");
    assert_eq!(posix.stat("config").unwrap().st_size, 3);
}

#[test]
fn chdir_rejects_bad_targets() {
    let posix = posix();
    posix.host().write_file("/file", b"");

    assert!(posix.chdir("").unwrap_err().is(Errno::Inval));
    assert!(posix.chdir("/missing").unwrap_err().is(Errno::Noent));
    assert!(posix.chdir("/file").unwrap_err().is(Errno::Notdir));
    assert_eq!(posix.getwd(), "/");
}

#[test]
fn chdir_keeps_the_path_as_given() {
    let posix = posix();
    posix.host().mkdir_all("/real");
    posix.host().symlink("/real", "/alias");

    posix.chdir("/alias").unwrap();
    assert_eq!(posix.getwd(), "/alias");
}

#[test]
fn fchdir_uses_the_recorded_path() {
    let posix = posix();
    posix.host().mkdir_all("/var/lib");
    posix.host().write_file("/var/lib/state", b"s");

    let fd = posix.open("/var/lib", OpenFlags::RDONLY, 0).unwrap();
    let before = posix.host().calls();
    posix.fchdir(fd).unwrap();
    assert_eq!(posix.host().calls(), before);
    assert_eq!(posix.getwd(), "/var/lib");
    assert_eq!(posix.stat("state").unwrap().st_size, 1);

    posix.close(fd).unwrap();
    assert!(posix.fchdir(fd).unwrap_err().is(Errno::Badf));
}

#[test]
fn file_handles_speak_std_io() {
    let posix = posix();
    let mut file = posix
        .open_file("/io", OpenFlags::RDWR | OpenFlags::CREAT, 0o644)
        .unwrap();
    file.write_all(b"through std::io").unwrap();
    std::io::Seek::seek(&mut file, std::io::SeekFrom::Start(8)).unwrap();
    let mut rest = String::new();
    file.read_to_string(&mut rest).unwrap();
    assert_eq!(rest, "std::io");
    file.close().unwrap();
    assert!(posix.fd_table().is_empty());
}

#[test]
fn host_errors_map_to_their_codes() {
    let posix = posix();
    posix.host().fail_next("path_filestat_get", Errno::Access);
    let err = posix.stat("/").unwrap_err();
    assert!(err.is(Errno::Access));
    assert_eq!(err.to_string(), "Permission denied");
}
