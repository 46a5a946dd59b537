use bytes::Bytes;

use super::*;
use crate::metainfo::{FileEntry, InfoHash, Metainfo};

fn meta(name: &str, piece_length: u64, files: &[(&[&str], u64)], hashes: usize) -> Metainfo {
    let files: Vec<FileEntry> = files
        .iter()
        .map(|(path, length)| FileEntry {
            path: path
                .iter()
                .map(|s| Bytes::copy_from_slice(s.as_bytes()))
                .collect(),
            length: *length,
        })
        .collect();
    let total_length = files.iter().map(|f| f.length).sum();

    Metainfo {
        announce: "http://t/a".to_string(),
        comment: None,
        created_by: None,
        creation_date: 42,
        publisher: None,
        publisher_url: None,
        name: Bytes::copy_from_slice(name.as_bytes()),
        piece_length,
        pieces: (0..hashes).map(|i| [i as u8; 20]).collect(),
        files,
        total_length,
        info_hash: InfoHash::from_bytes([0; 20]),
    }
}

fn child_names(node: &Node) -> Vec<&[u8]> {
    node.children()
        .unwrap()
        .keys()
        .map(|k| k.as_ref())
        .collect()
}

#[test]
fn test_single_file_layout() {
    let tree = TorrentTree::build(&meta("hello", 4, &[(&[], 5)], 2)).unwrap();

    let root = tree.root();
    assert!(!root.is_directory());
    assert_eq!(root.location(), "/hello");
    assert_eq!(root.file_id(), Some(FileId(0)));

    let file = tree.file(FileId(0));
    assert_eq!(file.length, 5);
    assert_eq!(
        file.fragments,
        vec![
            FileFragment { piece: 0, offset_in_piece: 0, length: 4 },
            FileFragment { piece: 1, offset_in_piece: 0, length: 1 },
        ]
    );

    assert_eq!(tree.pieces_count(), 2);
    assert_eq!(tree.pieces()[0].length, 4);
    assert_eq!(tree.pieces()[1].length, 1);
    assert_eq!(
        tree.pieces()[0].slices,
        vec![PieceSlice { file: FileId(0), offset_in_file: 0, length: 4 }]
    );
    assert_eq!(
        tree.pieces()[1].slices,
        vec![PieceSlice { file: FileId(0), offset_in_file: 4, length: 1 }]
    );
}

#[test]
fn test_multi_file_tree_shape() {
    let tree = TorrentTree::build(&meta(
        "root",
        8,
        &[
            (&["a", "b.txt"], 10),
            (&["a", "c.txt"], 7),
            (&["d.txt"], 3),
        ],
        3,
    ))
    .unwrap();

    let root = tree.root();
    assert!(root.is_directory());
    assert_eq!(root.location(), "/root");
    assert_eq!(child_names(root), vec![b"a".as_slice(), b"d.txt".as_slice()]);

    let a = &root.children().unwrap()[b"a".as_slice()];
    assert!(a.is_directory());
    assert_eq!(a.location(), "/root/a");
    assert_eq!(child_names(a), vec![b"b.txt".as_slice(), b"c.txt".as_slice()]);

    let b = &a.children().unwrap()[b"b.txt".as_slice()];
    assert_eq!(b.location(), "/root/a/b.txt");
    assert_eq!(tree.file(b.file_id().unwrap()).length, 10);

    assert_eq!(tree.total_length(), 20);
    assert_eq!(tree.pieces_count(), 3);
    assert_eq!(tree.pieces()[2].length, 4);
}

#[test]
fn test_multi_file_fragments() {
    let tree = TorrentTree::build(&meta(
        "root",
        8,
        &[
            (&["a", "b.txt"], 10),
            (&["a", "c.txt"], 7),
            (&["d.txt"], 3),
        ],
        3,
    ))
    .unwrap();

    assert_eq!(
        tree.file(FileId(0)).fragments,
        vec![
            FileFragment { piece: 0, offset_in_piece: 0, length: 8 },
            FileFragment { piece: 1, offset_in_piece: 0, length: 2 },
        ]
    );
    assert_eq!(
        tree.file(FileId(1)).fragments,
        vec![
            FileFragment { piece: 1, offset_in_piece: 2, length: 6 },
            FileFragment { piece: 2, offset_in_piece: 0, length: 1 },
        ]
    );
    assert_eq!(
        tree.file(FileId(2)).fragments,
        vec![FileFragment { piece: 2, offset_in_piece: 1, length: 3 }]
    );
}

#[test]
fn test_views_are_mutual_inverses() {
    let tree = TorrentTree::build(&meta(
        "root",
        8,
        &[
            (&["a", "b.txt"], 10),
            (&["a", "c.txt"], 7),
            (&["d.txt"], 3),
            (&["empty"], 0),
        ],
        3,
    ))
    .unwrap();

    // Every piece slice corresponds to exactly one file fragment and the
    // slices tile the piece front to back.
    for piece in tree.pieces() {
        let mut covered = 0u64;
        for slice in &piece.slices {
            let file = tree.file(slice.file);
            let fragment = file
                .fragments
                .iter()
                .find(|f| f.piece == piece.index)
                .expect("slice without matching fragment");
            assert_eq!(fragment.length, slice.length);
            assert_eq!(fragment.offset_in_piece, covered);

            // the slice's file offset is the bytes of all prior fragments
            let prior: u64 = file
                .fragments
                .iter()
                .take_while(|f| f.piece != piece.index)
                .map(|f| f.length)
                .sum();
            assert_eq!(slice.offset_in_file, prior);

            covered += slice.length;
        }
        assert_eq!(covered, piece.length);
    }

    // Every file fragment appears as a piece slice.
    for file in tree.files() {
        assert_eq!(file.fragments.iter().map(|f| f.length).sum::<u64>(), file.length);
        for fragment in &file.fragments {
            assert!(tree.pieces()[fragment.piece as usize]
                .slices
                .iter()
                .any(|s| s.file == file.id && s.length == fragment.length));
        }
    }
}

#[test]
fn test_files_partition_piece_space() {
    let tree = TorrentTree::build(&meta(
        "root",
        8,
        &[(&["x"], 5), (&["y"], 0), (&["z"], 11)],
        2,
    ))
    .unwrap();

    // files in metainfo order abut in the global piece space
    let mut expected_offset = 0u64;
    for file in tree.files() {
        assert_eq!(file.offset, expected_offset);
        expected_offset += file.length;
    }
    assert_eq!(expected_offset, tree.total_length());
}

#[test]
fn test_sibling_order_is_byte_lexicographic() {
    let tree = TorrentTree::build(&meta(
        "root",
        8,
        &[(&["z.txt"], 1), (&["a.txt"], 1), (&["m.txt"], 1)],
        1,
    ))
    .unwrap();

    assert_eq!(
        child_names(tree.root()),
        vec![b"a.txt".as_slice(), b"m.txt".as_slice(), b"z.txt".as_slice()]
    );
}

#[test]
fn test_exact_multiple_keeps_full_last_piece() {
    let tree = TorrentTree::build(&meta("data", 8, &[(&[], 16)], 2)).unwrap();
    assert_eq!(tree.pieces()[1].length, 8);
}

#[test]
fn test_zero_length_file_occupies_no_pieces() {
    let tree = TorrentTree::build(&meta(
        "root",
        4,
        &[(&["empty.txt"], 0), (&["data.bin"], 4)],
        1,
    ))
    .unwrap();

    let empty = &tree.root().children().unwrap()[b"empty.txt".as_slice()];
    let file = tree.file(empty.file_id().unwrap());
    assert_eq!(file.length, 0);
    assert!(file.fragments.is_empty());

    assert_eq!(tree.pieces()[0].slices.len(), 1);
    assert_eq!(tree.pieces()[0].slices[0].file, FileId(1));
}

#[test]
fn test_empty_torrent_needs_no_pieces() {
    let tree = TorrentTree::build(&meta("root", 4, &[(&["a"], 0)], 0)).unwrap();
    assert_eq!(tree.pieces_count(), 0);
    assert_eq!(tree.total_length(), 0);
}

#[test]
fn test_duplicate_leaf_collides() {
    let result = TorrentTree::build(&meta(
        "root",
        8,
        &[(&["a", "f"], 1), (&["a", "f"], 1)],
        1,
    ));
    assert_eq!(result.unwrap_err(), TreeError::PathCollision);
}

#[test]
fn test_file_directory_collision() {
    let result = TorrentTree::build(&meta("root", 8, &[(&["a"], 1), (&["a", "b"], 1)], 1));
    assert_eq!(result.unwrap_err(), TreeError::PathCollision);

    let result = TorrentTree::build(&meta("root", 8, &[(&["a", "b"], 1), (&["a"], 1)], 1));
    assert_eq!(result.unwrap_err(), TreeError::PathCollision);
}

#[test]
fn test_hash_count_mismatch() {
    assert_eq!(
        TorrentTree::build(&meta("f", 4, &[(&[], 5)], 0)).unwrap_err(),
        TreeError::PieceCountMismatch
    );
    assert_eq!(
        TorrentTree::build(&meta("root", 4, &[(&["a"], 0)], 1)).unwrap_err(),
        TreeError::PieceCountMismatch
    );
}

#[test]
fn test_final_piece_out_of_range() {
    // one hash too few: the last piece would need 5 > 4 bytes
    assert_eq!(
        TorrentTree::build(&meta("f", 4, &[(&[], 5)], 1)).unwrap_err(),
        TreeError::FinalPieceOutOfRange
    );
    // one hash too many: the last piece would be empty
    assert_eq!(
        TorrentTree::build(&meta("f", 4, &[(&[], 8)], 3)).unwrap_err(),
        TreeError::FinalPieceOutOfRange
    );
}

#[test]
fn test_location_overflow() {
    let long = "a".repeat(5000);
    let result = TorrentTree::build(&meta("root", 8, &[(&[long.as_str()], 1)], 1));
    assert_eq!(result.unwrap_err(), TreeError::LocationOverflow);
}
