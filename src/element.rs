//! The tuple-layer's logical value model and its per-type codecs
//! (spec.md §3, §4.4). [`Value`] is the fully decoded, owned form of one
//! tuple element; [`encode_value`]/[`decode_value`] are the single
//! dispatch points every other encoder/decoder in this crate funnels
//! through, the way the teacher's `element.rs` centers on one `Element`
//! enum and one `serialize_elem` match.

use crate::error::{Error, Result};
use crate::integer::{self, Integer};
use crate::marker::{Tag, ESCAPE};
use crate::tuple::Tuple;
use crate::writer::{unmangle_float_bytes, Writer};

/// One decoded tuple element. Covers the closed set of logical types
/// spec.md §3 defines; derived mappings (bool, char, timestamps,
/// durations, IP addresses) live in [`crate::derived`] as conversions on
/// top of this type rather than as new wire tags.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Value {
    Null,
    Bytes(Vec<u8>),
    Unicode(String),
    Int(Integer),
    Float(f32),
    Double(f64),
    Uuid128([u8; 16]),
    Uuid64([u8; 8]),
    Tuple(Tuple),
}

impl Value {
    /// Relative type ordering rank, matching spec.md §3's cross-type order.
    pub(crate) fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bytes(_) => 1,
            Value::Unicode(_) => 2,
            Value::Tuple(_) => 3,
            Value::Int(_) => 4,
            Value::Float(_) => 5,
            Value::Double(_) => 6,
            Value::Uuid128(_) => 7,
            Value::Uuid64(_) => 8,
        }
    }
}

/// Write `value` into `w` using the matching primitive emitter. This is
/// the encoder's half of the packer dispatcher (spec.md §4.6): every path
/// that turns a typed value into bytes passes through here exactly once
/// per element, nested tuples included.
pub(crate) fn encode_value(w: &mut Writer, value: &Value) {
    match value {
        Value::Null => w.emit_null(),
        Value::Bytes(b) => w.emit_bytes(b),
        Value::Unicode(s) => w.emit_string(s),
        Value::Int(n) => w.emit_int(*n),
        Value::Float(f) => w.emit_float32(*f),
        Value::Double(d) => w.emit_float64(*d),
        Value::Uuid128(bytes) => w.emit_uuid128(*bytes),
        Value::Uuid64(bytes) => w.emit_uuid64(*bytes),
        Value::Tuple(t) => {
            w.begin_nested();
            for element in t.iter() {
                encode_value(w, &element);
            }
            w.end_nested();
        }
    }
}

/// Zero-escape scan: returns the number of bytes consumed by one
/// byte/unicode payload segment, including its terminator, given `bytes`
/// starting right after the tag byte.
fn scan_escaped(bytes: &[u8], base_offset: usize) -> Result<usize> {
    let mut pos = 0;
    loop {
        if pos >= bytes.len() {
            return Err(Error::MalformedTuple {
                offset: base_offset + pos,
                reason: "unterminated byte/unicode string".to_string(),
            });
        }
        if bytes[pos] == 0x00 {
            if bytes.get(pos + 1) == Some(&ESCAPE) {
                pos += 2;
                continue;
            }
            pos += 1;
            break;
        }
        pos += 1;
    }
    Ok(pos)
}

/// Undo zero-escaping: `bytes` is a payload segment *without* its
/// terminator (i.e. `&raw[..len-1]` from [`scan_escaped`]'s `len`).
fn unescape(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        out.push(bytes[i]);
        if bytes[i] == 0x00 {
            i += 2;
        } else {
            i += 1;
        }
    }
    out
}

/// Length, in bytes, of exactly one encoded element starting at
/// `bytes[0]`, including its tag and any payload/terminator — nested
/// tuples included, recursively. `top_level` distinguishes a bare `0x00`
/// (a null element, 1 byte, only valid directly under the top-level tuple
/// or as the return of a nested recursive call that already consumed its
/// own terminator) from the escaped-null encoding used inside a nested
/// tuple's body.
pub(crate) fn element_len(
    bytes: &[u8],
    base_offset: usize,
    depth: crate::depth::Depth,
    top_level: bool,
) -> Result<usize> {
    let tag_byte = *bytes.first().ok_or(Error::MalformedTuple {
        offset: base_offset,
        reason: "truncated element: missing tag byte".to_string(),
    })?;
    match Tag::from_u8(tag_byte) {
        Some(Tag::Null) => {
            if top_level {
                Ok(1)
            } else if bytes.get(1) == Some(&ESCAPE) {
                Ok(2)
            } else {
                Err(Error::MalformedTuple {
                    offset: base_offset,
                    reason: "unescaped null inside nested tuple".to_string(),
                })
            }
        }
        Some(Tag::Bytes) | Some(Tag::Unicode) => {
            let len = scan_escaped(&bytes[1..], base_offset + 1)?;
            Ok(1 + len)
        }
        Some(Tag::Nested) => {
            depth.check_limit(base_offset)?;
            let mut inner_depth = depth;
            inner_depth.enter();
            let mut pos = 1usize;
            loop {
                if pos >= bytes.len() {
                    return Err(Error::MalformedTuple {
                        offset: base_offset,
                        reason: "unterminated nested tuple".to_string(),
                    });
                }
                if bytes[pos] == 0x00 {
                    if bytes.get(pos + 1) == Some(&ESCAPE) {
                        pos += 2;
                        continue;
                    }
                    pos += 1;
                    break;
                }
                let elen = element_len(&bytes[pos..], base_offset + pos, inner_depth, false)?;
                pos += elen;
            }
            Ok(pos + 1)
        }
        Some(Tag::Int(_)) => {
            let n = (tag_byte as i16 - crate::marker::INT_ZERO as i16).unsigned_abs() as usize;
            if 1 + n > bytes.len() {
                return Err(Error::MalformedTuple {
                    offset: base_offset,
                    reason: "truncated integer payload".to_string(),
                });
            }
            Ok(1 + n)
        }
        Some(Tag::Float) => require_len(bytes, base_offset, 5, "truncated f32"),
        Some(Tag::Double) => require_len(bytes, base_offset, 9, "truncated f64"),
        Some(Tag::Uuid128) => require_len(bytes, base_offset, 17, "truncated 128-bit uuid"),
        Some(Tag::Uuid64) => require_len(bytes, base_offset, 9, "truncated 64-bit uuid"),
        None => Err(Error::MalformedTuple {
            offset: base_offset,
            reason: "unrecognized tag byte".to_string(),
        }),
    }
}

fn require_len(bytes: &[u8], base_offset: usize, len: usize, reason: &'static str) -> Result<usize> {
    if bytes.len() >= len {
        Ok(len)
    } else {
        Err(Error::MalformedTuple {
            offset: base_offset,
            reason: reason.to_string(),
        })
    }
}

/// Decode the single element spanning all of `bytes` (as previously
/// delimited by [`element_len`]) into an owned [`Value`].
pub(crate) fn decode_value(bytes: &[u8], base_offset: usize) -> Result<Value> {
    let tag_byte = bytes[0];
    match Tag::from_u8(tag_byte).expect("bytes span was already validated by element_len") {
        Tag::Null => Ok(Value::Null),
        Tag::Bytes => Ok(Value::Bytes(unescape(&bytes[1..bytes.len() - 1]))),
        Tag::Unicode => {
            let raw = unescape(&bytes[1..bytes.len() - 1]);
            String::from_utf8(raw)
                .map(Value::Unicode)
                .map_err(|_| Error::MalformedTuple {
                    offset: base_offset,
                    reason: "unicode string segment is not valid UTF-8".to_string(),
                })
        }
        Tag::Nested => {
            let mut elements = Vec::new();
            let mut pos = 1usize;
            let body_end = bytes.len() - 1;
            while pos < body_end {
                if bytes[pos] == 0x00 {
                    // escaped null element
                    elements.push(Value::Null);
                    pos += 2;
                    continue;
                }
                let elen = element_len(
                    &bytes[pos..],
                    base_offset + pos,
                    crate::depth::Depth::new(),
                    false,
                )?;
                let elem = decode_value(&bytes[pos..pos + elen], base_offset + pos)?;
                elements.push(elem);
                pos += elen;
            }
            Ok(Value::Tuple(Tuple::from_vec(elements)))
        }
        Tag::Int(_) => {
            let (int, _) = integer::decode_int(bytes, base_offset)?;
            Ok(Value::Int(int))
        }
        Tag::Float => {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[1..5]);
            unmangle_float_bytes(&mut buf);
            Ok(Value::Float(f32::from_bits(u32::from_be_bytes(buf))))
        }
        Tag::Double => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[1..9]);
            unmangle_float_bytes(&mut buf);
            Ok(Value::Double(f64::from_bits(u64::from_be_bytes(buf))))
        }
        Tag::Uuid128 => {
            let mut buf = [0u8; 16];
            buf.copy_from_slice(&bytes[1..17]);
            Ok(Value::Uuid128(buf))
        }
        Tag::Uuid64 => {
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[1..9]);
            Ok(Value::Uuid64(buf))
        }
    }
}
