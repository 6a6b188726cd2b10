use flatarch::{
    list, pack, unpack, ArchiveError, AssumeNo, AssumeYes, EntryKind, EntryWriter, FormatError,
    PackOutcome, UnpackStats,
};
use std::fs::{self, File};
use std::path::Path;
use tempfile::tempdir;

fn utf8(p: &Path) -> &str {
    p.to_str().unwrap()
}

/// docs/a.txt = "hi", docs/sub/ empty.
fn make_docs(base: &Path) -> std::path::PathBuf {
    let docs = base.join("docs");
    fs::create_dir_all(docs.join("sub")).unwrap();
    fs::write(docs.join("a.txt"), b"hi").unwrap();
    docs
}

#[test]
fn test_docs_example_in_place() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");

    pack(&docs, &archive, &mut AssumeNo).unwrap();
    fs::remove_dir_all(&docs).unwrap();

    let stats = unpack(&archive, "").unwrap();
    assert_eq!(stats, UnpackStats { files: 1, folders: 2, bytes: 2 });
    assert!(docs.is_dir());
    assert!(docs.join("sub").is_dir());
    assert_eq!(fs::read(docs.join("a.txt")).unwrap(), b"hi");
}

#[test]
fn test_in_place_unpack_collides_with_original() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");

    pack(&docs, &archive, &mut AssumeNo).unwrap();

    let err = unpack(&archive, "").unwrap_err();
    assert!(matches!(err, ArchiveError::AlreadyExists(p) if p == docs));
}

#[test]
fn test_roundtrip_to_new_root() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    fs::create_dir_all(src.join("nested/deeper")).unwrap();
    fs::create_dir_all(src.join("empty")).unwrap();
    fs::write(src.join("root.txt"), b"root level").unwrap();
    fs::write(src.join("nested/data.bin"), (0..=255u8).cycle().take(100_000).collect::<Vec<_>>()).unwrap();
    fs::write(src.join("nested/deeper/zero.txt"), b"").unwrap();
    let archive = dir.path().join("src.arch");
    let dest = dir.path().join("copy");

    pack(&src, &archive, &mut AssumeNo).unwrap();
    let stats = unpack(&archive, utf8(&dest)).unwrap();

    assert_eq!(stats.files, 3);
    assert_eq!(stats.folders, 4);
    for rel in ["root.txt", "nested/data.bin", "nested/deeper/zero.txt"] {
        assert_eq!(fs::read(dest.join(rel)).unwrap(), fs::read(src.join(rel)).unwrap(), "{rel}");
    }
    assert!(dest.join("empty").is_dir());
}

#[test]
fn test_trailing_slash_on_source_and_destination() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");
    let dest = format!("{}/moved/", utf8(dir.path()));

    pack(format!("{}/", utf8(&docs)), &archive, &mut AssumeNo).unwrap();
    unpack(&archive, &dest).unwrap();

    assert_eq!(fs::read(dir.path().join("moved/a.txt")).unwrap(), b"hi");
    assert!(dir.path().join("moved/sub").is_dir());
}

#[test]
fn test_single_file_archive() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("note.txt");
    fs::write(&src, b"single").unwrap();
    let archive = dir.path().join("note.arch");
    let dest = dir.path().join("restored.txt");

    pack(&src, &archive, &mut AssumeNo).unwrap();
    unpack(&archive, utf8(&dest)).unwrap();

    assert_eq!(fs::read(&dest).unwrap(), b"single");
}

#[test]
fn test_invalid_magic_rejected_without_side_effects() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("bogus.arch");
    fs::write(&archive, b"definitely not an archive").unwrap();
    let dest = dir.path().join("out");

    let err = unpack(&archive, utf8(&dest)).unwrap_err();
    assert!(matches!(err, ArchiveError::NotAnArchive(_)));
    assert!(!dest.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_declined_overwrite_keeps_archive() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");
    fs::write(&archive, b"previous archive bytes").unwrap();

    let mut asked = 0;
    let mut prompt = |p: &Path| -> std::io::Result<bool> {
        assert_eq!(p, archive.as_path());
        asked += 1;
        Ok(false)
    };
    let outcome = pack(&docs, &archive, &mut prompt).unwrap();

    assert_eq!(outcome, PackOutcome::Declined);
    assert_eq!(asked, 1);
    assert_eq!(fs::read(&archive).unwrap(), b"previous archive bytes");
}

#[test]
fn test_confirmed_overwrite_replaces_archive() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");
    fs::write(&archive, b"previous archive bytes").unwrap();

    let outcome = pack(&docs, &archive, &mut AssumeYes).unwrap();

    assert!(matches!(outcome, PackOutcome::Written(_)));
    assert_eq!(&fs::read(&archive).unwrap()[..5], flatarch::MAGIC);
}

#[test]
fn test_collision_aborts_and_keeps_earlier_entries() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("dup.arch");
    {
        let mut w = EntryWriter::new(File::create(&archive).unwrap(), "src").unwrap();
        w.write_folder("src").unwrap();
        w.write_file("src/a.txt", 5, &b"first"[..]).unwrap();
        w.write_file("src/a.txt", 6, &b"second"[..]).unwrap();
        w.write_file("src/b.txt", 1, &b"b"[..]).unwrap();
        w.finish().unwrap();
    }
    let dest = dir.path().join("out");

    let err = unpack(&archive, utf8(&dest)).unwrap_err();

    assert!(matches!(err, ArchiveError::AlreadyExists(ref p) if p == &dest.join("a.txt")));
    // no rollback: what was extracted before the collision stays
    assert!(dest.is_dir());
    assert_eq!(fs::read(dest.join("a.txt")).unwrap(), b"first");
    assert!(!dest.join("b.txt").exists());
}

#[test]
fn test_truncated_archive_keeps_partial_output() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");
    pack(&docs, &archive, &mut AssumeNo).unwrap();

    let bytes = fs::read(&archive).unwrap();
    fs::write(&archive, &bytes[..bytes.len() - 1]).unwrap();
    let dest = dir.path().join("partial");

    let err = unpack(&archive, utf8(&dest)).unwrap_err();
    assert!(matches!(err, ArchiveError::Format { source: FormatError::Truncated, .. }));
    assert!(dest.is_dir());
}

#[test]
fn test_list_reports_stream_order() {
    let dir = tempdir().unwrap();
    let docs = make_docs(dir.path());
    let archive = dir.path().join("out.arch");
    pack(&docs, &archive, &mut AssumeNo).unwrap();

    let entries = list(&archive).unwrap();

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].kind, EntryKind::Folder);
    assert_eq!(entries[0].path, utf8(&docs));
    let file = entries.iter().find(|e| e.kind == EntryKind::File).unwrap();
    assert_eq!(file.path, format!("{}/a.txt", utf8(&docs)));
    assert_eq!(file.size, Some(2));
}

#[test]
fn test_list_rejects_non_archive() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("empty.arch");
    File::create(&archive).unwrap();
    assert!(matches!(list(&archive), Err(ArchiveError::NotAnArchive(_))));
}
