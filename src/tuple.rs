//! The polymorphic tuple model (spec.md §4.5): a sequence of [`Value`]s
//! that can be backed by an inline small-arity buffer, an owned `Vec`, a
//! prefix spliced ahead of another tuple, or a lazily-decoded byte slice.
//! Shared behavior (`len`, `get`, `slice`, `append`, `concat`, `iter`,
//! equality, hashing) is implemented once over the variant rather than via
//! a trait hierarchy — the same flat-enum-plus-free-functions shape the
//! teacher's `Value` uses instead of a class tree.

use std::hash::{Hash, Hasher};
use std::rc::Rc;

use arrayvec::ArrayVec;

use crate::depth::Depth;
use crate::element::{self, Value};
use crate::error::{Error, Result};
use crate::writer::Writer;

/// Largest arity stored inline by [`Tuple::Small`] before falling back to
/// [`Tuple::List`]. Matches spec.md §2/§3's "small fixed-arity (1..8)"
/// variant.
const SMALL_MAX: usize = 8;

/// A tuple: an ordered sequence of [`Value`]s, with several internal
/// representations chosen for how the tuple was produced rather than
/// what it logically contains.
#[derive(Clone, Debug)]
pub enum Tuple {
    /// No elements.
    Empty,
    /// 1 to 8 elements stored inline (no heap allocation for the spine),
    /// for the common case of small, short-lived key tuples.
    Small(ArrayVec<Value, SMALL_MAX>),
    /// Owned, fully decoded elements of arbitrary length.
    List(Vec<Value>),
    /// `prefix` spliced ahead of `tail`. The prefix is opaque bytes — it
    /// need not itself parse as a valid tuple segment.
    PrefixTail { prefix: Vec<u8>, tail: Box<Tuple> },
    /// Shares its backing bytes via `Rc` rather than borrowing through a
    /// lifetime (see DESIGN.md). `offsets[i]` delimits element `i`'s span
    /// within `bytes`; the element itself is decoded lazily, the first
    /// time it's read.
    Slice {
        bytes: Rc<[u8]>,
        offsets: Vec<(usize, usize)>,
    },
}

impl Default for Tuple {
    fn default() -> Self {
        Tuple::Empty
    }
}

impl Tuple {
    /// An empty tuple.
    pub fn new() -> Self {
        Tuple::Empty
    }

    /// Build a tuple from already-decoded elements, choosing the inline
    /// [`Tuple::Small`] representation for arities in `1..=8` and falling
    /// back to [`Tuple::List`] beyond that.
    pub fn from_vec(values: Vec<Value>) -> Self {
        match values.len() {
            0 => Tuple::Empty,
            1..=SMALL_MAX => {
                let mut small = ArrayVec::new();
                small.extend(values);
                Tuple::Small(small)
            }
            _ => Tuple::List(values),
        }
    }

    /// Delimit `bytes` into a lazily-decoded tuple without eagerly
    /// decoding every element. `bytes` must be the exact packed encoding
    /// of a tuple (no trailing garbage) — use [`crate::reader::Reader`]
    /// directly to walk a byte string you don't control the end of.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Ok(Tuple::Empty);
        }
        let mut offsets = Vec::new();
        let mut pos = 0usize;
        while pos < bytes.len() {
            let len = element::element_len(&bytes[pos..], pos, Depth::new(), true)?;
            offsets.push((pos, pos + len));
            pos += len;
        }
        Ok(Tuple::Slice {
            bytes: Rc::from(bytes),
            offsets,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Tuple::Empty => 0,
            Tuple::Small(v) => v.len(),
            Tuple::List(v) => v.len(),
            Tuple::PrefixTail { tail, .. } => tail.len(),
            Tuple::Slice { offsets, .. } => offsets.len(),
        }
    }

    /// `true` if this tuple has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The element at `index`, or `Error::OutOfRange`.
    pub fn get(&self, index: usize) -> Result<Value> {
        let len = self.len();
        match self {
            Tuple::Empty => Err(Error::OutOfRange { index, len }),
            Tuple::Small(v) => v
                .get(index)
                .cloned()
                .ok_or(Error::OutOfRange { index, len }),
            Tuple::List(v) => v
                .get(index)
                .cloned()
                .ok_or(Error::OutOfRange { index, len }),
            Tuple::PrefixTail { tail, .. } => tail.get(index),
            Tuple::Slice { bytes, offsets } => {
                let (start, end) = *offsets.get(index).ok_or(Error::OutOfRange { index, len })?;
                element::decode_value(&bytes[start..end], start)
            }
        }
    }

    /// A half-open sub-tuple `[from, to)`, clamped to `len()`; empty if
    /// `from >= to`.
    pub fn slice(&self, from: usize, to: usize) -> Tuple {
        let len = self.len();
        let from = from.min(len);
        let to = to.min(len);
        if from >= to {
            return Tuple::Empty;
        }
        match self {
            Tuple::Slice { bytes, offsets } => Tuple::Slice {
                bytes: bytes.clone(),
                offsets: offsets[from..to].to_vec(),
            },
            _ => {
                let values: Vec<Value> = (from..to).map(|i| self.get(i).expect("in range")).collect();
                Tuple::from_vec(values)
            }
        }
    }

    /// A new tuple with `v` appended; does not mutate `self`.
    pub fn append(&self, v: Value) -> Tuple {
        let mut values = self.iter().collect::<Vec<_>>();
        values.push(v);
        Tuple::from_vec(values)
    }

    /// A new tuple with `other`'s elements appended after this one's;
    /// does not mutate either receiver.
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut values = self.iter().collect::<Vec<_>>();
        values.extend(other.iter());
        Tuple::from_vec(values)
    }

    /// Iterate over every element, decoding lazily where the backing
    /// representation allows it. Finite and restartable: each call
    /// produces a fresh iterator from the start.
    pub fn iter(&self) -> TupleIter<'_> {
        TupleIter {
            tuple: self,
            index: 0,
            len: self.len(),
        }
    }

    /// Pack this tuple to its canonical wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_bytes_with_prefix(&[])
    }

    /// Pack this tuple to its canonical wire bytes, with `prefix` spliced
    /// in front verbatim (not itself re-encoded).
    pub fn to_bytes_with_prefix(&self, prefix: &[u8]) -> Vec<u8> {
        if let Tuple::PrefixTail { prefix: p, tail } = self {
            let mut combined = Vec::with_capacity(prefix.len() + p.len());
            combined.extend_from_slice(prefix);
            combined.extend_from_slice(p);
            return tail.to_bytes_with_prefix(&combined);
        }
        let mut w = Writer::with_capacity(prefix.len() + 16);
        w.write_raw(prefix);
        for value in self.iter() {
            element::encode_value(&mut w, &value);
        }
        w.finish()
    }

    /// Wrap `tail` behind an opaque `prefix`. `to_bytes()` on the result
    /// is exactly `prefix || tail.to_bytes()`; `len`/`get`/`append` all
    /// delegate straight to `tail`.
    pub fn with_prefix(prefix: Vec<u8>, tail: Tuple) -> Tuple {
        Tuple::PrefixTail {
            prefix,
            tail: Box::new(tail),
        }
    }

    /// Structural equality over decoded values (NaN payloads compare
    /// unequal to themselves, matching IEEE-754 and [`Value`]'s own
    /// `PartialEq`).
    pub fn equals(&self, other: &Tuple) -> bool {
        self == other
    }

    /// Structural hash. Hashes the canonical packed bytes rather than the
    /// decoded values directly, so two tuples built through different
    /// internal representations — or two bit-identical NaN payloads that
    /// don't compare equal under [`Tuple::equals`] — still collide the
    /// way a `HashMap` keyed on packed bytes would.
    pub fn hash_canonical<H: Hasher>(&self, state: &mut H) {
        self.to_bytes().hash(state);
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Tuple) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl Hash for Tuple {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash_canonical(state);
    }
}

/// A finite, restartable iterator over a [`Tuple`]'s elements.
pub struct TupleIter<'a> {
    tuple: &'a Tuple,
    index: usize,
    len: usize,
}

impl Iterator for TupleIter<'_> {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        if self.index >= self.len {
            return None;
        }
        let v = self.tuple.get(self.index).expect("index within bounds");
        self.index += 1;
        Some(v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len - self.index;
        (remaining, Some(remaining))
    }
}

impl serde::Serialize for Tuple {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for value in self.iter() {
            seq.serialize_element(&value)?;
        }
        seq.end()
    }
}

impl<'de> serde::Deserialize<'de> for Tuple {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let values = Vec::<Value>::deserialize(deserializer)?;
        Ok(Tuple::from_vec(values))
    }
}

/// Compute the smallest byte string strictly greater than every string
/// with prefix `p`, by incrementing `p`'s last non-`0xFF` byte and
/// truncating the trailing run of `0xFF`s. `None` if `p` is all `0xFF`
/// (or empty) — there is no finite successor, and the range is open-ended.
pub fn next_prefix(p: &[u8]) -> Option<Vec<u8>> {
    let mut out = p.to_vec();
    while let Some(&last) = out.last() {
        if last == 0xff {
            out.pop();
        } else {
            *out.last_mut().expect("non-empty") += 1;
            return Some(out);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integer::Integer;

    fn v_int(n: i64) -> Value {
        Value::Int(Integer::from(n))
    }

    #[test]
    fn empty_tuple_has_zero_length() {
        assert_eq!(Tuple::new().len(), 0);
        assert!(Tuple::new().is_empty());
    }

    #[test]
    fn small_arity_get_and_len() {
        let t = Tuple::from_vec(vec![v_int(1), v_int(2), v_int(3)]);
        assert!(matches!(t, Tuple::Small(_)));
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(1).unwrap(), v_int(2));
        assert!(t.get(3).is_err());
    }

    #[test]
    fn arity_above_eight_falls_back_to_list() {
        let values: Vec<Value> = (0..9).map(v_int).collect();
        let t = Tuple::from_vec(values.clone());
        assert!(matches!(t, Tuple::List(_)));
        assert_eq!(t.len(), 9);
        for (i, v) in values.iter().enumerate() {
            assert_eq!(&t.get(i).unwrap(), v);
        }
    }

    #[test]
    fn arity_of_exactly_eight_stays_small() {
        let values: Vec<Value> = (0..8).map(v_int).collect();
        let t = Tuple::from_vec(values);
        assert!(matches!(t, Tuple::Small(_)));
        assert_eq!(t.len(), 8);
    }

    #[test]
    fn slice_is_half_open_and_clamped() {
        let t = Tuple::from_vec(vec![v_int(1), v_int(2), v_int(3)]);
        let s = t.slice(1, 3);
        assert_eq!(s.len(), 2);
        assert_eq!(s.get(0).unwrap(), v_int(2));
        assert!(t.slice(2, 1).is_empty());
        assert_eq!(t.slice(0, 100).len(), 3);
    }

    #[test]
    fn append_and_concat_do_not_mutate_receiver() {
        let t = Tuple::from_vec(vec![v_int(1)]);
        let t2 = t.append(v_int(2));
        assert_eq!(t.len(), 1);
        assert_eq!(t2.len(), 2);
        let t3 = t.concat(&t2);
        assert_eq!(t3.len(), 3);
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn prefix_tail_delegates_to_tail() {
        let tail = Tuple::from_vec(vec![v_int(1), v_int(2)]);
        let pt = Tuple::with_prefix(vec![0xab], tail.clone());
        assert_eq!(pt.len(), tail.len());
        assert_eq!(pt.get(0).unwrap(), v_int(1));
        assert_eq!(pt.to_bytes(), {
            let mut expected = vec![0xab];
            expected.extend_from_slice(&tail.to_bytes());
            expected
        });
    }

    #[test]
    fn from_bytes_roundtrips_through_to_bytes() {
        let t = Tuple::from_vec(vec![v_int(1), Value::Unicode("hi".to_string())]);
        let bytes = t.to_bytes();
        let lazy = Tuple::from_bytes(&bytes).unwrap();
        assert_eq!(lazy, t);
        assert_eq!(lazy.to_bytes(), bytes);
    }

    #[test]
    fn equal_tuples_hash_equal_regardless_of_representation() {
        use std::collections::hash_map::DefaultHasher;
        let a = Tuple::from_vec(vec![v_int(1), v_int(2)]);
        let bytes = a.to_bytes();
        let b = Tuple::from_bytes(&bytes).unwrap();
        assert_eq!(a, b);
        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn next_prefix_increments_and_strips_trailing_ff() {
        assert_eq!(next_prefix(&[0x01, 0xff]), Some(vec![0x02]));
        assert_eq!(next_prefix(&[0x01]), Some(vec![0x02]));
        assert_eq!(next_prefix(&[0xff, 0xff]), None);
        assert_eq!(next_prefix(&[]), None);
    }
}
