use std::fs;
use std::io::Write;

use datum_fs::{Error, OutputFile, WriteMode, ensure_dir_all};
use tempfile::tempdir;

#[test]
fn test_output_after_materializing_parent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data/train/part-0.csv");

    assert!(OutputFile::create(&path, WriteMode::Staged).is_err());

    ensure_dir_all(dir.path(), path.parent().unwrap()).unwrap();
    let mut out = OutputFile::create(&path, WriteMode::Staged).unwrap();
    out.write_all(b"a,b\n1,2\n").unwrap();
    out.finish().unwrap();

    assert_eq!(fs::read(&path).unwrap(), b"a,b\n1,2\n");
}

#[test]
fn test_staged_replaces_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("labels.txt");
    fs::write(&path, "old").unwrap();

    let mut out = OutputFile::create(&path, WriteMode::Staged).unwrap();
    out.write_all(b"new").unwrap();
    out.finish().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "new");
}

#[test]
fn test_staged_onto_directory_fails() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("occupied");
    fs::create_dir(&path).unwrap();

    let mut out = OutputFile::create(&path, WriteMode::Staged).unwrap();
    out.write_all(b"x").unwrap();
    let err = out.finish().unwrap_err();

    assert!(matches!(err, Error::Persist { .. }));
    assert!(err.io_error().is_some());
    assert!(path.is_dir());
}

#[test]
fn test_ensure_dir_all_is_idempotent() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("x/y/z");
    for _ in 0..3 {
        ensure_dir_all(dir.path(), &target).unwrap();
    }
    assert!(target.is_dir());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}
