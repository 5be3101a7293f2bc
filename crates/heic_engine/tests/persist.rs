use std::fs;

use heic_engine::{ensure_output_dir, AtomicFileWriter, DirectorySink, DownloadSink, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("a.jpg", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "a.jpg");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("a.jpg", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("a.jpg", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("a.jpg").exists());
}

#[test]
fn names_with_path_components_are_refused() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("out"));

    for name in ["../escape.jpg", "nested/a.jpg", "..", ""] {
        let result = writer.write(name, b"data");
        assert!(
            matches!(result, Err(PersistError::InvalidName(_))),
            "{name:?} was accepted"
        );
    }
    assert!(!temp.path().join("escape.jpg").exists());
}

#[test]
fn directory_sink_writes_downloads() {
    let temp = TempDir::new().unwrap();
    let sink = DirectorySink::new(temp.path().join("downloads"));

    sink.deliver("c.jpg", &[0xFF, 0xD8]).unwrap();
    assert_eq!(
        fs::read(temp.path().join("downloads").join("c.jpg")).unwrap(),
        vec![0xFF, 0xD8]
    );
}
