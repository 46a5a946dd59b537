use std::collections::BTreeMap;

use bytes::Bytes;

use super::error::TreeError;
use super::layout::{FileFragment, FileId, FileMeta, Node, Piece, PieceSlice, TorrentTree};
use crate::constants::MAX_LOCATION_LENGTH;
use crate::metainfo::Metainfo;

impl TorrentTree {
    /// Builds the directory tree and piece layout from validated metainfo.
    ///
    /// Files are processed in metainfo order, the canonical order that
    /// defines the piece layout. Directory children are created on demand
    /// from the intermediate path segments; the last segment names the leaf.
    ///
    /// # Errors
    ///
    /// Fails if the hash count does not cover the total length, a file path
    /// collides with an existing entry, or an entry location exceeds the
    /// maximum length.
    pub fn build(meta: &Metainfo) -> Result<TorrentTree, TreeError> {
        let piece_length = meta.piece_length;
        let total = meta.total_length;
        let pieces_count = meta.pieces.len() as u64;

        if pieces_count == 0 {
            if total != 0 {
                return Err(TreeError::PieceCountMismatch);
            }
        } else {
            if total == 0 {
                return Err(TreeError::PieceCountMismatch);
            }
            let span = pieces_count
                .checked_mul(piece_length)
                .ok_or(TreeError::FinalPieceOutOfRange)?;
            // final piece size = total - (count-1)*piece_length, in (0, piece_length]
            if span < total || span - total >= piece_length {
                return Err(TreeError::FinalPieceOutOfRange);
            }
        }

        let mut pieces: Vec<Piece> = meta
            .pieces
            .iter()
            .enumerate()
            .map(|(index, hash)| {
                let length = if index as u64 + 1 == pieces_count {
                    total - (pieces_count - 1) * piece_length
                } else {
                    piece_length
                };
                Piece {
                    index: index as u32,
                    hash: *hash,
                    length,
                    slices: Vec::new(),
                }
            })
            .collect();

        let root_location = push_segment("", &meta.name)?;
        let mut files = Vec::with_capacity(meta.files.len());

        let root = if meta.is_single_file() {
            let entry = &meta.files[0];
            files.push(file_meta(
                FileId(0),
                root_location.clone(),
                entry.length,
                0,
                piece_length,
                &mut pieces,
            ));
            Node::File {
                location: root_location,
                file: FileId(0),
            }
        } else {
            let mut children = BTreeMap::new();
            let mut global_offset = 0u64;

            for (index, entry) in meta.files.iter().enumerate() {
                let id = FileId(index);

                let (leaf, parents) = match entry.path.split_last() {
                    Some(parts) => parts,
                    // an unnamed file would occupy the root itself
                    None => return Err(TreeError::PathCollision),
                };

                let mut dir = &mut children;
                let mut location = root_location.clone();

                for segment in parents {
                    location = push_segment(&location, segment)?;
                    let node = dir.entry(segment.clone()).or_insert_with(|| Node::Directory {
                        location: location.clone(),
                        children: BTreeMap::new(),
                    });
                    match node {
                        Node::Directory { children, .. } => dir = children,
                        Node::File { .. } => return Err(TreeError::PathCollision),
                    }
                }

                let location = push_segment(&location, leaf)?;
                if dir.contains_key(leaf.as_ref()) {
                    return Err(TreeError::PathCollision);
                }
                dir.insert(
                    leaf.clone(),
                    Node::File {
                        location: location.clone(),
                        file: id,
                    },
                );

                files.push(file_meta(
                    id,
                    location,
                    entry.length,
                    global_offset,
                    piece_length,
                    &mut pieces,
                ));
                global_offset += entry.length;
            }

            Node::Directory {
                location: root_location,
                children,
            }
        };

        Ok(TorrentTree {
            root_name: meta.name.clone(),
            root,
            files,
            pieces,
            piece_length,
            total_length: total,
            creation_date: meta.creation_date,
        })
    }
}

/// Computes the fragments covering one file and records the matching slices
/// on the pieces it touches.
fn file_meta(
    id: FileId,
    location: String,
    length: u64,
    offset: u64,
    piece_length: u64,
    pieces: &mut [Piece],
) -> FileMeta {
    let mut fragments = Vec::new();

    if length > 0 {
        let first = offset / piece_length;
        let last = (offset + length - 1) / piece_length;
        fragments.reserve((last - first + 1) as usize);

        let end = offset + length;
        let mut pos = offset;

        for piece in first..=last {
            let piece_start = piece * piece_length;
            let frag_end = (piece_start + piece_length).min(end);
            let fragment = FileFragment {
                piece: piece as u32,
                offset_in_piece: pos - piece_start,
                length: frag_end - pos,
            };
            pieces[piece as usize].slices.push(PieceSlice {
                file: id,
                offset_in_file: pos - offset,
                length: fragment.length,
            });
            fragments.push(fragment);
            pos = frag_end;
        }
    }

    FileMeta {
        id,
        location,
        length,
        offset,
        fragments,
    }
}

fn push_segment(base: &str, segment: &Bytes) -> Result<String, TreeError> {
    let segment = String::from_utf8_lossy(segment);
    let mut location = String::with_capacity(base.len() + 1 + segment.len());
    location.push_str(base);
    location.push('/');
    location.push_str(&segment);
    if location.len() > MAX_LOCATION_LENGTH {
        return Err(TreeError::LocationOverflow);
    }
    Ok(location)
}
