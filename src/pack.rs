//! Packer dispatcher, batch packing, and range derivation (spec.md §4.6,
//! §4.7): the crate's top-level entry points. Everything below this
//! module is plumbing; this is what a caller actually reaches for.

use crate::element::{self, Value};
use crate::error::{Error, Result};
use crate::integer::Integer;
use crate::tuple::Tuple;
use crate::writer::Writer;

/// Implemented by every type with a registered tuple-layer codec. The
/// packer dispatcher (`pack`) is just "call `pack_into` on whatever
/// implements this trait"; there is no runtime type registry to look up,
/// since Rust resolves the impl at compile time instead of reflecting on
/// a runtime type tag the way spec.md's source language does.
pub trait TuplePack {
    fn pack_into(&self, w: &mut Writer);
}

macro_rules! impl_pack_int {
    ($t:ty) => {
        impl TuplePack for $t {
            fn pack_into(&self, w: &mut Writer) {
                w.emit_int(Integer::from(*self));
            }
        }
    };
}

impl_pack_int!(i8);
impl_pack_int!(i16);
impl_pack_int!(i32);
impl_pack_int!(i64);
impl_pack_int!(u8);
impl_pack_int!(u16);
impl_pack_int!(u32);
impl_pack_int!(u64);

impl TuplePack for bool {
    fn pack_into(&self, w: &mut Writer) {
        element::encode_value(w, &crate::derived::bool_to_value(*self));
    }
}

impl TuplePack for char {
    fn pack_into(&self, w: &mut Writer) {
        element::encode_value(w, &crate::derived::char_to_value(*self));
    }
}

impl TuplePack for str {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_string(self);
    }
}

impl TuplePack for String {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_string(self);
    }
}

impl TuplePack for [u8] {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_bytes(self);
    }
}

impl TuplePack for Vec<u8> {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_bytes(self);
    }
}

impl TuplePack for f32 {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_float32(*self);
    }
}

impl TuplePack for f64 {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_float64(*self);
    }
}

impl TuplePack for uuid::Uuid {
    fn pack_into(&self, w: &mut Writer) {
        w.emit_uuid128(*self.as_bytes());
    }
}

impl TuplePack for Value {
    fn pack_into(&self, w: &mut Writer) {
        element::encode_value(w, self);
    }
}

impl TuplePack for Tuple {
    fn pack_into(&self, w: &mut Writer) {
        w.begin_nested();
        for v in self.iter() {
            element::encode_value(w, &v);
        }
        w.end_nested();
    }
}

impl<T: TuplePack> TuplePack for Option<T> {
    fn pack_into(&self, w: &mut Writer) {
        match self {
            Some(v) => v.pack_into(w),
            None => w.emit_null(),
        }
    }
}

impl<T: TuplePack + ?Sized> TuplePack for &T {
    fn pack_into(&self, w: &mut Writer) {
        (*self).pack_into(w)
    }
}

/// Pack a single value to its canonical wire bytes. For a value with no
/// registered codec, would be `Error::Unsupported` in a dynamically typed
/// source language; in Rust, the absence of a `TuplePack` impl is instead
/// a compile error, so this function itself can never fail.
pub fn pack<T: TuplePack + ?Sized>(value: &T) -> Vec<u8> {
    let mut w = Writer::new();
    value.pack_into(&mut w);
    w.finish()
}

/// Decode `bytes` as a flat sequence of elements, failing on the first
/// malformed one.
pub fn unpack(bytes: &[u8]) -> Result<Tuple> {
    Tuple::from_bytes(bytes)
}

/// The result of [`pack_many`]: one shared buffer plus the `[start, end)`
/// span of each item within it.
#[derive(Clone, Debug)]
pub struct PackedBatch {
    buffer: Vec<u8>,
    spans: Vec<(usize, usize)>,
}

impl PackedBatch {
    /// The shared backing buffer every item's span indexes into.
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Number of packed items.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// The packed bytes for item `index`, or `Error::OutOfRange`.
    pub fn get(&self, index: usize) -> Result<&[u8]> {
        let (start, end) = *self
            .spans
            .get(index)
            .ok_or(Error::OutOfRange { index, len: self.spans.len() })?;
        Ok(&self.buffer[start..end])
    }

    /// Iterate over every item's packed bytes in order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> {
        self.spans.iter().map(move |&(s, e)| &self.buffer[s..e])
    }
}

/// Pack every item in `items` behind a common `prefix`, writing the
/// prefix and each item's encoding into one shared buffer rather than
/// allocating once per item (spec.md §4.6). An item that is `None`
/// contributes an empty span — no prefix, no bytes — matching the
/// item-transform convention where a null item means "no key for this
/// one".
pub fn pack_many<T: TuplePack>(prefix: &[u8], items: &[Option<T>]) -> PackedBatch {
    let mut w = Writer::with_capacity(prefix.len() * items.len().max(1) + 16);
    let mut spans = Vec::with_capacity(items.len());
    let mut start = w.position();
    for item in items {
        match item {
            Some(v) => {
                w.write_raw(prefix);
                v.pack_into(&mut w);
            }
            None => {}
        }
        let end = w.position();
        spans.push((start, end));
        start = end;
    }
    PackedBatch {
        buffer: w.finish(),
        spans,
    }
}

/// Derive the half-open byte range `[begin, end)` that every tuple packed
/// behind `prefix` falls into (spec.md §4.7). `end` is `None` for an
/// empty prefix — since every key in the store falls under it, there is
/// no finite upper bound to name, and the range is open-ended — and
/// `Some(prefix || 0xFF)` otherwise. Pinned to that `0xFF` convention
/// rather than an incremented last byte; see [`crate::tuple::next_prefix`]
/// for callers storing keys outside the tuple layer's own byte space.
pub fn range(prefix: &[u8]) -> (Vec<u8>, Option<Vec<u8>>) {
    if prefix.is_empty() {
        return (Vec::new(), None);
    }
    let mut begin = prefix.to_vec();
    begin.push(0x00);
    let mut end = prefix.to_vec();
    end.push(0xff);
    (begin, Some(end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_primitives_matches_emitters() {
        assert_eq!(pack(&1i64), vec![0x15, 0x01]);
        assert_eq!(pack("hello"), vec![0x02, b'h', b'e', b'l', b'l', b'o', 0x00]);
        assert_eq!(pack(&vec![0u8, 1]), vec![0x01, 0x00, 0xff, 0x01, 0x00]);
    }

    #[test]
    fn pack_option_none_is_null() {
        assert_eq!(pack(&None::<i64>), vec![0x00]);
        assert_eq!(pack(&Some(5i64)), pack(&5i64));
    }

    #[test]
    fn pack_tuple_nests() {
        let inner = Tuple::from_vec(vec![Value::Int(1i64.into()), Value::Int(2i64.into())]);
        assert_eq!(pack(&inner), vec![0x03, 0x15, 0x01, 0x15, 0x02, 0x00]);
    }

    #[test]
    fn pack_many_shares_one_buffer_and_records_spans() {
        let batch = pack_many(b"\x01", &[Some(1i64), None, Some(2i64)]);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.get(0).unwrap(), &[0x01, 0x15, 0x01][..]);
        assert_eq!(batch.get(1).unwrap(), &[][..]);
        assert_eq!(batch.get(2).unwrap(), &[0x01, 0x15, 0x02][..]);
    }

    #[test]
    fn range_matches_worked_example() {
        // ("Hello",) -> prefix 02 48 65 6C 6C 6F 00
        let p = pack("Hello");
        assert_eq!(p, vec![0x02, b'H', b'e', b'l', b'l', b'o', 0x00]);
        let (begin, end) = range(&p);
        let mut expected_begin = p.clone();
        expected_begin.push(0x00);
        assert_eq!(begin, expected_begin);
        let mut expected_end = p;
        expected_end.push(0xff);
        assert_eq!(end, Some(expected_end));
    }

    #[test]
    fn range_of_empty_prefix_is_open_ended() {
        let (begin, end) = range(&[]);
        assert_eq!(begin, Vec::<u8>::new());
        assert_eq!(end, None);
    }

    #[test]
    fn unpack_recovers_packed_tuple() {
        let original = Tuple::from_vec(vec![Value::Int(1i64.into()), Value::Unicode("x".to_string())]);
        let bytes = original.to_bytes();
        let decoded = unpack(&bytes).unwrap();
        assert_eq!(decoded, original);
    }
}
