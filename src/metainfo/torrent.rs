use bytes::Bytes;

use super::error::MetainfoError;
use super::info_hash::InfoHash;
use crate::bencode::{decode_torrent, DecodedTorrent, Value};
use crate::constants::HASH_SIZE;

/// A validated torrent metainfo record.
///
/// Produced from the raw bytes of a `.torrent` file; read-only once built.
/// Multi-file torrents keep their files in metainfo order, which is the
/// canonical order that defines the piece layout.
///
/// # Examples
///
/// ```no_run
/// use btfs::metainfo::Metainfo;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = std::fs::read("example.torrent")?;
/// let metainfo = Metainfo::from_bytes(&data, 0)?;
///
/// println!("Name: {}", String::from_utf8_lossy(&metainfo.name));
/// println!("Size: {} bytes", metainfo.total_length);
/// println!("Info hash: {}", metainfo.info_hash);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metainfo {
    /// Tracker announce URL.
    pub announce: String,
    /// Optional comment about the torrent.
    pub comment: Option<String>,
    /// Name/version of the program that created the torrent.
    pub created_by: Option<String>,
    /// Unix timestamp when the torrent was created; defaults to the
    /// creation time of the backing file when the field is absent.
    pub creation_date: i64,
    /// Optional publisher name.
    pub publisher: Option<String>,
    /// Optional publisher URL.
    pub publisher_url: Option<String>,
    /// Suggested name for the root file or directory (raw bytes).
    pub name: Bytes,
    /// Number of bytes per piece.
    pub piece_length: u64,
    /// SHA-1 hash of each piece.
    pub pieces: Vec<[u8; 20]>,
    /// Files in metainfo order. Single-file torrents hold one entry with an
    /// empty path; multi-file entries carry their path segments.
    pub files: Vec<FileEntry>,
    /// Total size of all files combined.
    pub total_length: u64,
    /// The unique identifier for this torrent.
    pub info_hash: InfoHash,
}

/// A file within a torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path segments below the root directory; empty for single-file mode.
    pub path: Vec<Bytes>,
    /// Size of the file in bytes.
    pub length: u64,
}

impl Metainfo {
    /// Parses and validates a torrent file from raw bytes.
    ///
    /// `host_ctime` is the creation time of the backing file, used when the
    /// metainfo carries no `creation date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid bencode, a required field
    /// is missing or mistyped, any recognized key appears twice, `length`
    /// and `files` are both (or neither) present, a declared `encoding` is
    /// not `UTF-8`, or a file path contains empty, `.`, `..`, or
    /// separator-bearing segments.
    pub fn from_bytes(data: &[u8], host_ctime: i64) -> Result<Self, MetainfoError> {
        Self::from_decoded(decode_torrent(data)?, data, host_ctime)
    }

    /// Validates an already-decoded torrent against its source bytes.
    ///
    /// The info hash is computed over the `info` span the decoder recorded
    /// in `source_bytes`; everything else comes from the decoded tree.
    /// [`from_bytes`](Self::from_bytes) is a convenience that decodes
    /// first and then calls this.
    pub fn from_decoded(
        decoded: DecodedTorrent,
        source_bytes: &[u8],
        host_ctime: i64,
    ) -> Result<Self, MetainfoError> {
        let info_hash = decoded
            .info_span
            .as_ref()
            .and_then(|span| source_bytes.get(span.clone()))
            .map(InfoHash::from_info_bytes);
        validate(&decoded.root, info_hash, host_ctime)
    }

    /// Returns the number of pieces.
    pub fn pieces_count(&self) -> u64 {
        self.pieces.len() as u64
    }

    /// Returns `true` for single-file torrents.
    pub fn is_single_file(&self) -> bool {
        self.files.len() == 1 && self.files[0].path.is_empty()
    }
}

fn validate(
    root: &Value,
    info_hash: Option<InfoHash>,
    host_ctime: i64,
) -> Result<Metainfo, MetainfoError> {
    let pairs = root.as_dict().ok_or(MetainfoError::WrongType("root"))?;

    let mut announce = None;
    let mut comment = None;
    let mut created_by = None;
    let mut creation_date = None;
    let mut encoding = None;
    let mut info = None;
    let mut publisher = None;
    let mut publisher_url = None;

    for (key, value) in pairs {
        match key.as_ref() {
            b"announce" => set_once(&mut announce, value, "announce")?,
            b"comment" => set_once(&mut comment, value, "comment")?,
            b"created by" => set_once(&mut created_by, value, "created by")?,
            b"creation date" => set_once(&mut creation_date, value, "creation date")?,
            b"encoding" => set_once(&mut encoding, value, "encoding")?,
            b"info" => set_once(&mut info, value, "info")?,
            b"publisher" => set_once(&mut publisher, value, "publisher")?,
            b"publisher-url" => set_once(&mut publisher_url, value, "publisher-url")?,
            _ => {}
        }
    }

    let announce = announce
        .ok_or(MetainfoError::MissingField("announce"))?
        .as_str()
        .ok_or(MetainfoError::WrongType("announce"))?
        .to_string();

    if let Some(value) = encoding {
        let bytes = value
            .as_bytes()
            .ok_or(MetainfoError::WrongType("encoding"))?;
        if bytes.as_ref() != b"UTF-8" {
            return Err(MetainfoError::BadEncoding);
        }
    }

    let comment = optional_text(comment, "comment")?;
    let created_by = optional_text(created_by, "created by")?;
    let publisher = optional_text(publisher, "publisher")?;
    let publisher_url = optional_text(publisher_url, "publisher-url")?;

    let creation_date = match creation_date {
        Some(value) => value
            .as_integer()
            .ok_or(MetainfoError::WrongType("creation date"))?,
        None => host_ctime,
    };

    let info = info.ok_or(MetainfoError::MissingField("info"))?;
    let info_pairs = info.as_dict().ok_or(MetainfoError::WrongType("info"))?;
    let info_hash = info_hash.ok_or(MetainfoError::MissingField("info"))?;

    let mut files = None;
    let mut length = None;
    let mut name = None;
    let mut piece_length = None;
    let mut pieces = None;

    for (key, value) in info_pairs {
        match key.as_ref() {
            b"files" => set_once(&mut files, value, "files")?,
            b"length" => set_once(&mut length, value, "length")?,
            b"name" => set_once(&mut name, value, "name")?,
            b"piece length" => set_once(&mut piece_length, value, "piece length")?,
            b"pieces" => set_once(&mut pieces, value, "pieces")?,
            _ => {}
        }
    }

    let name = name
        .ok_or(MetainfoError::MissingField("name"))?
        .as_bytes()
        .ok_or(MetainfoError::WrongType("name"))?
        .clone();
    if name.is_empty() {
        return Err(MetainfoError::EmptyName);
    }

    let piece_length = piece_length
        .ok_or(MetainfoError::MissingField("piece length"))?
        .as_integer()
        .ok_or(MetainfoError::WrongType("piece length"))?;
    if piece_length <= 0 {
        return Err(MetainfoError::WrongType("piece length"));
    }

    let pieces_bytes = pieces
        .ok_or(MetainfoError::MissingField("pieces"))?
        .as_bytes()
        .ok_or(MetainfoError::WrongType("pieces"))?;
    if pieces_bytes.len() % HASH_SIZE != 0 {
        return Err(MetainfoError::PiecesNotMultiple20);
    }
    let pieces: Vec<[u8; 20]> = pieces_bytes
        .chunks_exact(HASH_SIZE)
        .map(|chunk| {
            let mut arr = [0u8; 20];
            arr.copy_from_slice(chunk);
            arr
        })
        .collect();

    let (files, total_length) = match (length, files) {
        (Some(_), Some(_)) | (None, None) => return Err(MetainfoError::LengthFilesConflict),
        (Some(value), None) => {
            let length = value
                .as_integer()
                .ok_or(MetainfoError::WrongType("length"))?;
            if length <= 0 {
                return Err(MetainfoError::WrongType("length"));
            }
            let entry = FileEntry {
                path: Vec::new(),
                length: length as u64,
            };
            (vec![entry], length as u64)
        }
        (None, Some(value)) => parse_files(value)?,
    };

    Ok(Metainfo {
        announce,
        comment,
        created_by,
        creation_date,
        publisher,
        publisher_url,
        name,
        piece_length: piece_length as u64,
        pieces,
        files,
        total_length,
        info_hash,
    })
}

fn parse_files(value: &Value) -> Result<(Vec<FileEntry>, u64), MetainfoError> {
    let list = value.as_list().ok_or(MetainfoError::WrongType("files"))?;

    let mut files = Vec::with_capacity(list.len());
    let mut total = 0u64;

    for entry in list {
        let pairs = entry.as_dict().ok_or(MetainfoError::WrongType("files"))?;

        let mut length = None;
        let mut path = None;

        for (key, val) in pairs {
            match key.as_ref() {
                b"length" => set_once(&mut length, val, "length")?,
                b"path" => set_once(&mut path, val, "path")?,
                _ => {}
            }
        }

        let length = length
            .ok_or(MetainfoError::MissingField("length"))?
            .as_integer()
            .ok_or(MetainfoError::WrongType("length"))?;
        if length < 0 {
            return Err(MetainfoError::WrongType("length"));
        }

        let path = validate_path(path.ok_or(MetainfoError::MissingField("path"))?)?;

        total = total
            .checked_add(length as u64)
            .ok_or(MetainfoError::WrongType("length"))?;
        files.push(FileEntry {
            path,
            length: length as u64,
        });
    }

    Ok((files, total))
}

fn validate_path(value: &Value) -> Result<Vec<Bytes>, MetainfoError> {
    let list = value.as_list().ok_or(MetainfoError::WrongType("path"))?;
    if list.is_empty() {
        return Err(MetainfoError::BadPath);
    }

    let mut segments = Vec::with_capacity(list.len());
    for segment in list {
        let bytes = segment.as_bytes().ok_or(MetainfoError::WrongType("path"))?;
        if bytes.is_empty()
            || bytes.as_ref() == b"."
            || bytes.as_ref() == b".."
            || bytes.contains(&b'/')
            || bytes.contains(&b'\\')
        {
            return Err(MetainfoError::BadPath);
        }
        segments.push(bytes.clone());
    }

    Ok(segments)
}

fn set_once<'a>(
    slot: &mut Option<&'a Value>,
    value: &'a Value,
    key: &'static str,
) -> Result<(), MetainfoError> {
    if slot.replace(value).is_some() {
        return Err(MetainfoError::DuplicateKey(key));
    }
    Ok(())
}

fn optional_text(
    slot: Option<&Value>,
    key: &'static str,
) -> Result<Option<String>, MetainfoError> {
    match slot {
        Some(value) => {
            let bytes = value.as_bytes().ok_or(MetainfoError::WrongType(key))?;
            Ok(Some(String::from_utf8_lossy(bytes).into_owned()))
        }
        None => Ok(None),
    }
}
