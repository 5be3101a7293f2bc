use std::io::{Cursor, Read};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};

use bytes::Bytes;
use heic_core::{ArchiveRequestEntry, ResultKey};
use heic_engine::{
    last_write_wins, ArchiveEntry, Archiver, DownloadSink, MemoryResultStore, Packager,
    PackagingError, PersistError, ResultStore, ZipArchiver,
};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct MemorySink {
    delivered: Mutex<Vec<(String, Vec<u8>)>>,
    threads: Mutex<Vec<ThreadId>>,
    fail: bool,
}

impl DownloadSink for MemorySink {
    fn deliver(&self, name: &str, bytes: &[u8]) -> Result<(), PersistError> {
        self.threads.lock().unwrap().push(thread::current().id());
        if self.fail {
            return Err(PersistError::OutputDir("disk full".to_string()));
        }
        self.delivered
            .lock()
            .unwrap()
            .push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

fn entry(name: &str, bytes: &'static [u8]) -> ArchiveEntry {
    ArchiveEntry {
        name: name.to_string(),
        bytes: Bytes::from_static(bytes),
    }
}

fn read_zip(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut content = Vec::new();
            file.read_to_end(&mut content).unwrap();
            (file.name().to_string(), content)
        })
        .collect()
}

fn packager(store: Arc<MemoryResultStore>, sink: Arc<MemorySink>) -> Packager {
    Packager {
        archiver: Arc::new(ZipArchiver::default()),
        store,
        sink,
        archive_name: "converted_images.zip".to_string(),
    }
}

#[test]
fn zip_archiver_round_trips_entries() {
    for archiver in [ZipArchiver::default(), ZipArchiver::stored()] {
        let packed = archiver
            .pack(&[entry("a.jpg", b"aaaa"), entry("c.jpg", b"cc")])
            .unwrap();
        assert_eq!(
            read_zip(&packed),
            vec![
                ("a.jpg".to_string(), b"aaaa".to_vec()),
                ("c.jpg".to_string(), b"cc".to_vec())
            ]
        );
    }
}

#[test]
fn duplicate_names_keep_the_last_payload() {
    let collapsed = last_write_wins(vec![
        entry("x.jpg", b"first"),
        entry("y.jpg", b"y"),
        entry("x.jpg", b"second"),
    ]);

    assert_eq!(
        collapsed,
        vec![entry("x.jpg", b"second"), entry("y.jpg", b"y")]
    );
}

#[tokio::test]
async fn packager_delivers_archive_and_releases_it() {
    let store = Arc::new(MemoryResultStore::new());
    let sink = Arc::new(MemorySink::default());
    let a = store.insert(Bytes::from_static(b"jpeg a"));
    let c = store.insert(Bytes::from_static(b"jpeg c"));

    let summary = packager(store.clone(), sink.clone())
        .build(vec![
            ArchiveRequestEntry {
                name: "a.jpg".to_string(),
                key: a,
            },
            ArchiveRequestEntry {
                name: "c.jpg".to_string(),
                key: c,
            },
        ])
        .await
        .unwrap();

    assert_eq!(summary.entry_count, 2);
    assert_eq!(summary.name, "converted_images.zip");
    // Results stay live; the archive handle does not.
    assert_eq!(store.live_count(), 2);

    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, "converted_images.zip");
    assert_eq!(summary.byte_len, delivered[0].1.len() as u64);
    assert_eq!(
        read_zip(&delivered[0].1),
        vec![
            ("a.jpg".to_string(), b"jpeg a".to_vec()),
            ("c.jpg".to_string(), b"jpeg c".to_vec())
        ]
    );
}

#[tokio::test]
async fn colliding_names_produce_one_entry() {
    let store = Arc::new(MemoryResultStore::new());
    let sink = Arc::new(MemorySink::default());
    let first = store.insert(Bytes::from_static(b"from heic"));
    let second = store.insert(Bytes::from_static(b"from HEIC"));

    let summary = packager(store, sink.clone())
        .build(vec![
            ArchiveRequestEntry {
                name: "x.jpg".to_string(),
                key: first,
            },
            ArchiveRequestEntry {
                name: "x.jpg".to_string(),
                key: second,
            },
        ])
        .await
        .unwrap();

    assert_eq!(summary.entry_count, 1);
    let delivered = sink.delivered.lock().unwrap();
    assert_eq!(
        read_zip(&delivered[0].1),
        vec![("x.jpg".to_string(), b"from HEIC".to_vec())]
    );
}

#[tokio::test]
async fn missing_result_delivers_nothing() {
    let store = Arc::new(MemoryResultStore::new());
    let sink = Arc::new(MemorySink::default());
    let a = store.insert(Bytes::from_static(b"a"));
    let gone = ResultKey { id: 999, byte_len: 1 };

    let err = packager(store.clone(), sink.clone())
        .build(vec![
            ArchiveRequestEntry {
                name: "a.jpg".to_string(),
                key: a,
            },
            ArchiveRequestEntry {
                name: "b.jpg".to_string(),
                key: gone,
            },
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, PackagingError::MissingResult { ref name } if name == "b.jpg"));
    assert!(sink.delivered.lock().unwrap().is_empty());
    assert_eq!(store.live_count(), 1);
}

#[tokio::test]
async fn failed_delivery_still_releases_the_archive() {
    let store = Arc::new(MemoryResultStore::new());
    let sink = Arc::new(MemorySink {
        fail: true,
        ..MemorySink::default()
    });
    let a = store.insert(Bytes::from_static(b"a"));
    let b = store.insert(Bytes::from_static(b"b"));

    let err = packager(store.clone(), sink)
        .build(vec![
            ArchiveRequestEntry {
                name: "a.jpg".to_string(),
                key: a,
            },
            ArchiveRequestEntry {
                name: "b.jpg".to_string(),
                key: b,
            },
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, PackagingError::Delivery(_)));
    assert_eq!(store.live_count(), 2);
}

#[tokio::test]
async fn fewer_than_two_entries_is_refused() {
    let store = Arc::new(MemoryResultStore::new());
    let sink = Arc::new(MemorySink::default());
    let a = store.insert(Bytes::from_static(b"a"));

    let err = packager(store, sink.clone())
        .build(vec![ArchiveRequestEntry {
            name: "a.jpg".to_string(),
            key: a,
        }])
        .await
        .unwrap_err();

    assert!(matches!(err, PackagingError::TooFewEntries(1)));
    assert!(sink.delivered.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delivery_runs_off_the_async_thread() {
    let store = Arc::new(MemoryResultStore::new());
    let sink = Arc::new(MemorySink::default());
    let a = store.insert(Bytes::from_static(b"a"));
    let b = store.insert(Bytes::from_static(b"b"));

    packager(store, sink.clone())
        .build(vec![
            ArchiveRequestEntry {
                name: "a.jpg".to_string(),
                key: a,
            },
            ArchiveRequestEntry {
                name: "b.jpg".to_string(),
                key: b,
            },
        ])
        .await
        .unwrap();

    // The current-thread test runtime polls on this thread only.
    let threads = sink.threads.lock().unwrap();
    assert_eq!(threads.len(), 1);
    assert_ne!(threads[0], thread::current().id());
}
