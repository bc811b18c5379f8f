use pretty_assertions::assert_eq;
use wasi_posix::{Errno, OpenFlags, Posix, PosixBuilder, PosixConfig};
use wasi_posix_mem::MemHost;

fn posix_with_buffer(dir_buf_size: usize) -> Posix<MemHost> {
    let config = PosixConfig {
        dir_buf_size,
        ..Default::default()
    };
    PosixBuilder::new()
        .config(config)
        .current_dir("/")
        .build(MemHost::new())
        .unwrap()
}

fn populate(posix: &Posix<MemHost>, count: usize) -> Vec<String> {
    let mut names: Vec<String> = (0..count).map(|i| format!("entry-{i:03}")).collect();
    for name in &names {
        posix.host().write_file(&format!("/dir/{name}"), b"");
    }
    names.sort();
    names
}

#[test]
fn unbounded_read_lists_every_entry_once() {
    for buf_size in [24, 40, 64, 8192] {
        let posix = posix_with_buffer(buf_size);
        let expected = populate(&posix, 25);

        let mut dir = posix.open_file("/dir", OpenFlags::RDONLY, 0).unwrap();
        let mut names = dir.read_names(-1).unwrap().unwrap();
        names.sort();
        assert_eq!(names, expected, "buffer of {buf_size} bytes");
        assert_eq!(dir.read_names(-1).unwrap(), None);
    }
}

#[test]
fn one_name_at_a_time() {
    let posix = posix_with_buffer(48);
    let expected = populate(&posix, 7);

    let mut dir = posix.open_file("/dir", OpenFlags::RDONLY, 0).unwrap();
    let mut names = Vec::new();
    while let Some(batch) = dir.read_names(1).unwrap() {
        assert_eq!(batch.len(), 1);
        names.extend(batch);
    }
    names.sort();
    assert_eq!(names, expected);
}

#[test]
fn bounded_batches_add_up() {
    let posix = posix_with_buffer(100);
    let expected = populate(&posix, 10);

    let mut dir = posix.open_file("/dir", OpenFlags::RDONLY, 0).unwrap();
    let mut names = dir.read_names(4).unwrap().unwrap();
    assert_eq!(names.len(), 4);
    names.extend(dir.read_names(4).unwrap().unwrap());
    let tail = dir.read_names(4).unwrap().unwrap();
    assert_eq!(tail.len(), 2);
    names.extend(tail);
    assert_eq!(dir.read_names(4).unwrap(), None);

    names.sort();
    assert_eq!(names, expected);
}

#[test]
fn empty_directory_reads_as_none() {
    let posix = posix_with_buffer(8192);
    posix.mkdir("/empty", 0o755).unwrap();

    let mut dir = posix.open_file("/empty", OpenFlags::RDONLY, 0).unwrap();
    assert_eq!(dir.read_names(0).unwrap(), None);
    assert_eq!(dir.read_names(3).unwrap(), None);
    assert_eq!(dir.names().count(), 0);
}

#[test]
fn long_names_outgrow_a_small_buffer() {
    let posix = posix_with_buffer(32);
    let long = "n".repeat(200);
    posix.host().write_file(&format!("/dir/{long}"), b"");
    posix.host().write_file("/dir/short", b"");

    let mut dir = posix.open_file("/dir", OpenFlags::RDONLY, 0).unwrap();
    let mut names = dir.read_names(-1).unwrap().unwrap();
    names.sort();
    assert_eq!(names, vec![long, "short".to_string()]);
}

#[test]
fn iterator_matches_read_names() {
    let posix = posix_with_buffer(64);
    let expected = populate(&posix, 12);

    let mut dir = posix.open_file("/dir", OpenFlags::RDONLY, 0).unwrap();
    let mut names = dir.names().collect::<Result<Vec<_>, _>>().unwrap();
    names.sort();
    assert_eq!(names, expected);
}

#[test]
fn host_failure_keeps_the_names_read_so_far() {
    let posix = posix_with_buffer(64);
    populate(&posix, 10);

    let mut dir = posix.open_file("/dir", OpenFlags::RDONLY, 0).unwrap();
    let first = dir.read_names(2).unwrap().unwrap();
    assert_eq!(first.len(), 2);

    posix.host().fail_next("fd_readdir", Errno::Io);
    let (names, err) = dir.read_names(-1).unwrap_err().into_parts();
    assert!(err.is(Errno::Io));
    assert!(err.to_string().starts_with("readdirnames: "));
    assert!(names.len() < 8);

    // the cursor was left intact, the next call resumes
    let mut rest = dir.read_names(-1).unwrap().unwrap();
    rest.extend(names);
    rest.extend(first);
    rest.sort();
    rest.dedup();
    assert_eq!(rest.len(), 10);
}

#[test]
fn reading_a_regular_file_fails() {
    let posix = posix_with_buffer(8192);
    posix.host().write_file("/plain", b"data");
    let mut file = posix.open_file("/plain", OpenFlags::RDONLY, 0).unwrap();
    let (names, err) = file.read_names(-1).unwrap_err().into_parts();
    assert!(names.is_empty());
    assert!(err.is(Errno::Notdir));
}

#[test]
fn raw_read_dir_reports_bytes_used() {
    let posix = posix_with_buffer(8192);
    posix.host().write_file("/dir/a", b"");
    let fd = posix.open("/dir", OpenFlags::RDONLY, 0).unwrap();

    let mut buf = [0u8; 4096];
    // ".", ".." and "a", each behind a 24 byte header
    assert_eq!(posix.read_dir(fd, &mut buf, 0).unwrap(), 24 * 3 + 1 + 2 + 1);
    assert!(
        posix
            .read_dir(fd, &mut buf[..10], 0)
            .unwrap_err()
            .is(Errno::Inval)
    );
    posix.close(fd).unwrap();
}
