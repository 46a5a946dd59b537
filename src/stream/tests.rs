use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use parking_lot::Mutex;

use super::*;
use crate::metainfo::{FileEntry, InfoHash, Metainfo};
use crate::tree::{FileId, TorrentTree};

struct MockProvider {
    pieces: Mutex<HashMap<u32, Bytes>>,
    deadlines: Mutex<Vec<(u32, u32)>>,
    reads: Mutex<Vec<u32>>,
}

impl MockProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            pieces: Mutex::new(HashMap::new()),
            deadlines: Mutex::new(Vec::new()),
            reads: Mutex::new(Vec::new()),
        })
    }

    fn deliver(&self, piece: u32, data: &[u8]) {
        self.pieces
            .lock()
            .insert(piece, Bytes::copy_from_slice(data));
    }

    fn deadlines(&self) -> Vec<(u32, u32)> {
        self.deadlines.lock().clone()
    }

    fn reads(&self) -> Vec<u32> {
        self.reads.lock().clone()
    }
}

impl PieceProvider for MockProvider {
    fn have_piece(&self, piece: u32) -> bool {
        self.pieces.lock().contains_key(&piece)
    }

    fn read_piece(&self, piece: u32) -> Option<Bytes> {
        self.reads.lock().push(piece);
        self.pieces.lock().get(&piece).cloned()
    }

    fn set_piece_deadline(&self, piece: u32, rank: u32) {
        self.deadlines.lock().push((piece, rank));
    }

    fn clear_deadlines(&self) {
        self.deadlines.lock().clear();
    }
}

fn fill(total: u64) -> Vec<u8> {
    (0..total).map(|i| (i % 251) as u8).collect()
}

/// Builds a tree over the given files plus a provider already holding
/// every piece of the deterministic content pattern.
fn setup(
    piece_length: u64,
    files: &[(&[&str], u64)],
) -> (Arc<TorrentTree>, Arc<MockProvider>, Vec<u8>) {
    let entries: Vec<FileEntry> = files
        .iter()
        .map(|(path, length)| FileEntry {
            path: path
                .iter()
                .map(|s| Bytes::copy_from_slice(s.as_bytes()))
                .collect(),
            length: *length,
        })
        .collect();
    let total: u64 = entries.iter().map(|f| f.length).sum();
    let hashes = total.div_ceil(piece_length) as usize;

    let meta = Metainfo {
        announce: "http://t/a".to_string(),
        comment: None,
        created_by: None,
        creation_date: 42,
        publisher: None,
        publisher_url: None,
        name: Bytes::from_static(b"root"),
        piece_length,
        pieces: (0..hashes).map(|i| [i as u8; 20]).collect(),
        files: entries,
        total_length: total,
        info_hash: InfoHash::from_bytes([0; 20]),
    };
    let tree = Arc::new(TorrentTree::build(&meta).unwrap());

    let content = fill(total);
    let provider = MockProvider::new();
    for (index, chunk) in content.chunks(piece_length as usize).enumerate() {
        provider.deliver(index as u32, chunk);
    }

    (tree, provider, content)
}

fn quick_config() -> StreamConfig {
    StreamConfig {
        poke_interval: Duration::from_millis(5),
        read_budget: Duration::from_millis(40),
        read_ahead_pieces: 8,
    }
}

#[tokio::test]
async fn test_read_across_piece_boundary() {
    let (tree, provider, content) = setup(4, &[(&[], 5)]);
    let mut stream = FileStream::open(tree, FileId(0), provider);

    let mut buf = [0u8; 16];
    let n = stream.read(&mut buf).await;
    assert_eq!(n, 5);
    assert_eq!(&buf[..5], &content[..]);
    assert_eq!(stream.position(), 5);

    assert_eq!(stream.read(&mut buf).await, 0);
}

#[tokio::test]
async fn test_read_maps_file_offset_into_pieces() {
    // the second file starts mid-piece at global offset 5
    let (tree, provider, content) = setup(4, &[(&["a"], 5), (&["b"], 7)]);
    let mut stream = FileStream::open(tree, FileId(1), provider);

    let mut buf = [0u8; 7];
    let n = stream.read(&mut buf).await;
    assert_eq!(n, 7);
    assert_eq!(&buf[..], &content[5..12]);
}

#[tokio::test]
async fn test_seek_from_end_and_read_tail() {
    let (tree, provider, content) = setup(16, &[(&[], 100)]);
    let mut stream = FileStream::open(tree, FileId(0), provider);

    assert_eq!(stream.seek(10, Whence::FromEnd).unwrap(), 90);

    let mut buf = [0u8; 20];
    let n = stream.read(&mut buf).await;
    assert_eq!(n, 10);
    assert_eq!(&buf[..10], &content[90..100]);

    assert_eq!(stream.read(&mut buf).await, 0);
}

#[tokio::test]
async fn test_seek_bounds() {
    let (tree, provider, _) = setup(16, &[(&[], 100)]);
    let mut stream = FileStream::open(tree, FileId(0), provider);

    // to the end is legal, past it is not
    assert_eq!(stream.seek(100, Whence::FromBeginning).unwrap(), 100);
    assert_eq!(
        stream.seek(1, Whence::FromCurrent).unwrap_err(),
        StreamError::OutOfRange
    );
    assert_eq!(stream.position(), 100);

    assert_eq!(stream.seek(-30, Whence::FromCurrent).unwrap(), 70);
    assert_eq!(
        stream.seek(-71, Whence::FromCurrent).unwrap_err(),
        StreamError::OutOfRange
    );
    assert_eq!(stream.position(), 70);

    assert_eq!(
        stream.seek(101, Whence::FromEnd).unwrap_err(),
        StreamError::OutOfRange
    );
    assert_eq!(
        stream.seek(-1, Whence::FromEnd).unwrap_err(),
        StreamError::OutOfRange
    );
    assert_eq!(stream.seek(100, Whence::FromEnd).unwrap(), 0);
}

#[tokio::test]
async fn test_write_is_rejected() {
    let (tree, provider, _) = setup(4, &[(&[], 5)]);
    let mut stream = FileStream::open(tree, FileId(0), provider);
    assert_eq!(stream.write(b"data").unwrap_err(), StreamError::ReadOnly);
}

#[tokio::test]
async fn test_budget_elapse_returns_short_read() {
    let (tree, provider, content) = setup(4, &[(&[], 8)]);
    // second piece never arrives
    provider.pieces.lock().remove(&1);

    let mut stream = FileStream::open_with(tree, FileId(0), provider, quick_config());
    let mut buf = [0u8; 8];
    let n = stream.read(&mut buf).await;
    assert_eq!(n, 4);
    assert_eq!(&buf[..4], &content[..4]);
    assert_eq!(stream.position(), 4);
}

#[tokio::test]
async fn test_budget_elapse_with_nothing_copied_reads_zero() {
    let (tree, provider, _) = setup(4, &[(&[], 8)]);
    provider.pieces.lock().clear();

    let mut stream = FileStream::open_with(tree, FileId(0), provider, quick_config());
    let mut buf = [0u8; 8];
    assert_eq!(stream.read(&mut buf).await, 0);
    assert_eq!(stream.position(), 0);
}

#[tokio::test]
async fn test_piece_arriving_during_wait_is_read() {
    let (tree, provider, content) = setup(4, &[(&[], 4)]);
    provider.pieces.lock().clear();

    let late = Arc::clone(&provider);
    let piece = content[..4].to_vec();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(15)).await;
        late.deliver(0, &piece);
    });

    let mut stream = FileStream::open_with(
        tree,
        FileId(0),
        provider,
        StreamConfig {
            poke_interval: Duration::from_millis(5),
            read_budget: Duration::from_secs(5),
            read_ahead_pieces: 8,
        },
    );
    let mut buf = [0u8; 4];
    assert_eq!(stream.read(&mut buf).await, 4);
    assert_eq!(&buf[..], &content[..4]);
}

#[tokio::test]
async fn test_buffered_piece_is_fetched_once() {
    let (tree, provider, _) = setup(8, &[(&[], 8)]);
    let mut stream = FileStream::open(tree, FileId(0), Arc::<MockProvider>::clone(&provider));

    let mut buf = [0u8; 3];
    stream.read(&mut buf).await;
    stream.read(&mut buf).await;

    assert_eq!(provider.reads(), vec![0]);
}

#[tokio::test]
async fn test_read_ahead_hints_on_open() {
    let (tree, provider, _) = setup(4, &[(&[], 12)]);
    let _stream = FileStream::open(tree, FileId(0), Arc::<MockProvider>::clone(&provider));

    // three pieces cover the file; ranks increase with distance
    assert_eq!(provider.deadlines(), vec![(0, 0), (1, 1), (2, 2)]);
}

#[tokio::test]
async fn test_read_ahead_hints_follow_seek() {
    let (tree, provider, _) = setup(4, &[(&[], 12)]);
    let mut stream = FileStream::open(tree, FileId(0), Arc::<MockProvider>::clone(&provider));

    stream.seek(8, Whence::FromBeginning).unwrap();
    assert_eq!(provider.deadlines(), vec![(2, 0)]);
}

#[tokio::test]
async fn test_read_ahead_bounded_by_hint_depth() {
    let (tree, provider, _) = setup(1, &[(&[], 100)]);
    let _stream = FileStream::open_with(
        tree,
        FileId(0),
        Arc::<MockProvider>::clone(&provider),
        StreamConfig {
            read_ahead_pieces: 3,
            ..StreamConfig::default()
        },
    );

    assert_eq!(provider.deadlines(), vec![(0, 0), (1, 1), (2, 2)]);
}
