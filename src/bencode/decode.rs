use std::ops::Range;

use bytes::Bytes;

use super::error::DecodeError;
use super::value::Value;
use crate::constants::MAX_DECODE_DEPTH;

/// A decoded `.torrent` file: the root value plus the byte range of the
/// top-level `info` dictionary in the original buffer.
///
/// The range covers the `d…e` delimiters of the value stored under the key
/// `info` in the outermost dictionary. It is `None` when no such entry
/// exists. Hashing `source[info_span]` yields the torrent's identity even
/// when the source deviates from canonical key order, which a re-encode of
/// the decoded tree would not.
#[derive(Debug, Clone)]
pub struct DecodedTorrent {
    /// The decoded root value.
    pub root: Value,
    /// Byte range of the top-level `info` dictionary, delimiters included.
    pub info_span: Option<Range<usize>>,
}

/// Decodes a single bencode value from a byte slice.
///
/// The input must contain exactly one complete value with no trailing data.
///
/// # Errors
///
/// Returns an error if the input is empty or truncated
/// ([`DecodeError::UnexpectedEof`]), contains invalid syntax, nests deeper
/// than 256 levels ([`DecodeError::DepthLimit`]), or carries data after the
/// outer value ([`DecodeError::Trailing`]).
///
/// # Examples
///
/// ```
/// use btfs::bencode::decode;
///
/// let int = decode(b"i42e").unwrap();
/// assert_eq!(int.as_integer(), Some(42));
///
/// let string = decode(b"5:hello").unwrap();
/// assert_eq!(string.as_str(), Some("hello"));
///
/// let list = decode(b"li1ei2ei3ee").unwrap();
/// assert_eq!(list.as_list().unwrap().len(), 3);
///
/// let dict = decode(b"d4:name5:Alice3:agei30ee").unwrap();
/// assert_eq!(dict.get(b"name").and_then(|v| v.as_str()), Some("Alice"));
/// ```
pub fn decode(data: &[u8]) -> Result<Value, DecodeError> {
    Ok(decode_torrent(data)?.root)
}

/// Decodes a bencode value and records where the top-level `info`
/// dictionary sits in `data`.
///
/// The span is captured while the decoder consumes the `info` key; it never
/// re-scans the buffer. Only an entry of the *outermost* dictionary
/// qualifies; an `info` key nested deeper is ordinary data.
pub fn decode_torrent(data: &[u8]) -> Result<DecodedTorrent, DecodeError> {
    let mut pos = 0;
    let mut info_span = None;
    let root = decode_value(data, &mut pos, 0, &mut info_span)?;

    if pos != data.len() {
        return Err(DecodeError::Trailing);
    }

    Ok(DecodedTorrent { root, info_span })
}

fn decode_value(
    data: &[u8],
    pos: &mut usize,
    depth: usize,
    info_span: &mut Option<Range<usize>>,
) -> Result<Value, DecodeError> {
    if depth > MAX_DECODE_DEPTH {
        return Err(DecodeError::DepthLimit);
    }

    if *pos >= data.len() {
        return Err(DecodeError::UnexpectedEof);
    }

    match data[*pos] {
        b'i' => decode_integer(data, pos),
        b'l' => decode_list(data, pos, depth, info_span),
        b'd' => decode_dict(data, pos, depth, info_span),
        b'0'..=b'9' => decode_bytes(data, pos),
        _ => Err(DecodeError::BadStringLength),
    }
}

fn decode_integer(data: &[u8], pos: &mut usize) -> Result<Value, DecodeError> {
    *pos += 1;

    let start = *pos;
    while *pos < data.len() && data[*pos] != b'e' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(DecodeError::UnexpectedEof);
    }

    let digits = &data[start..*pos];
    let int_str = std::str::from_utf8(digits)
        .map_err(|_| DecodeError::BadInteger("not ascii".into()))?;

    if int_str.is_empty() || int_str == "-" {
        return Err(DecodeError::BadInteger("empty".into()));
    }

    // `-0` and leading zeros are forbidden; the literal `0` is not.
    let magnitude = int_str.strip_prefix('-').unwrap_or(int_str);
    if magnitude.starts_with('0') && magnitude.len() > 1 {
        return Err(DecodeError::BadInteger("leading zeros".into()));
    }
    if int_str == "-0" {
        return Err(DecodeError::BadInteger("negative zero".into()));
    }

    let value: i64 = int_str
        .parse()
        .map_err(|_| DecodeError::BadInteger(int_str.into()))?;

    *pos += 1;
    Ok(Value::Integer(value))
}

fn decode_bytes(data: &[u8], pos: &mut usize) -> Result<Value, DecodeError> {
    let start = *pos;
    while *pos < data.len() && data[*pos] != b':' {
        *pos += 1;
    }

    if *pos >= data.len() {
        return Err(DecodeError::UnexpectedEof);
    }

    let len_str = std::str::from_utf8(&data[start..*pos])
        .map_err(|_| DecodeError::BadStringLength)?;
    let len: usize = len_str.parse().map_err(|_| DecodeError::BadStringLength)?;

    *pos += 1;

    // Bounds check before allocation keeps memory use tied to the input size.
    if len > data.len() - *pos {
        return Err(DecodeError::UnexpectedEof);
    }

    let bytes = Bytes::copy_from_slice(&data[*pos..*pos + len]);
    *pos += len;

    Ok(Value::Bytes(bytes))
}

fn decode_list(
    data: &[u8],
    pos: &mut usize,
    depth: usize,
    info_span: &mut Option<Range<usize>>,
) -> Result<Value, DecodeError> {
    *pos += 1;
    let mut list = Vec::new();

    while *pos < data.len() && data[*pos] != b'e' {
        list.push(decode_value(data, pos, depth + 1, info_span)?);
    }

    if *pos >= data.len() {
        return Err(DecodeError::UnexpectedEof);
    }

    *pos += 1;
    Ok(Value::List(list))
}

fn decode_dict(
    data: &[u8],
    pos: &mut usize,
    depth: usize,
    info_span: &mut Option<Range<usize>>,
) -> Result<Value, DecodeError> {
    *pos += 1;
    let mut pairs = Vec::new();

    while *pos < data.len() && data[*pos] != b'e' {
        if !data[*pos].is_ascii_digit() {
            return Err(DecodeError::BadKeyType);
        }
        let key = match decode_bytes(data, pos)? {
            Value::Bytes(b) => b,
            _ => unreachable!("decode_bytes yields byte strings"),
        };

        let value_start = *pos;
        let value = decode_value(data, pos, depth + 1, info_span)?;

        // The torrent identity hash covers the first `info` dictionary of
        // the outermost dictionary, exactly as it appears in the source.
        if depth == 0
            && key.as_ref() == b"info"
            && matches!(value, Value::Dict(_))
            && info_span.is_none()
        {
            *info_span = Some(value_start..*pos);
        }

        pairs.push((key, value));
    }

    if *pos >= data.len() {
        return Err(DecodeError::UnexpectedEof);
    }

    *pos += 1;
    Ok(Value::Dict(pairs))
}
