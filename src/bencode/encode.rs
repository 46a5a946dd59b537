use super::value::Value;

/// Encodes a value back to bencode.
///
/// Dictionary pairs are written in the order they are stored, so decoding
/// an encoded value yields the original and re-encoding a decoded buffer
/// reproduces it byte for byte. The torrent identity hash never relies on
/// this; it is always taken over the recorded source span.
///
/// # Examples
///
/// ```
/// use btfs::bencode::{decode, encode};
///
/// let data = b"d3:cow3:moo4:spam4:eggse";
/// let value = decode(data).unwrap();
/// assert_eq!(encode(&value), data);
/// ```
pub fn encode(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_value(value, &mut buf);
    buf
}

fn encode_value(value: &Value, buf: &mut Vec<u8>) {
    match value {
        Value::Integer(i) => {
            buf.extend_from_slice(b"i");
            buf.extend_from_slice(i.to_string().as_bytes());
            buf.extend_from_slice(b"e");
        }
        Value::Bytes(b) => {
            buf.extend_from_slice(b.len().to_string().as_bytes());
            buf.extend_from_slice(b":");
            buf.extend_from_slice(b);
        }
        Value::List(l) => {
            buf.extend_from_slice(b"l");
            for item in l {
                encode_value(item, buf);
            }
            buf.extend_from_slice(b"e");
        }
        Value::Dict(d) => {
            buf.extend_from_slice(b"d");
            for (key, val) in d {
                buf.extend_from_slice(key.len().to_string().as_bytes());
                buf.extend_from_slice(b":");
                buf.extend_from_slice(key);
                encode_value(val, buf);
            }
            buf.extend_from_slice(b"e");
        }
    }
}
