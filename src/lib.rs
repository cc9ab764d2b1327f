//! An order-preserving binary tuple codec for ranged key-value stores.
//!
//! A tuple — a finite, ordered sequence of typed values — packs into a
//! byte string whose unsigned lexicographic order matches the tuple's
//! own element-wise natural order. Two packed tuples compare the same
//! way their decoded values would, so a range scan over raw key bytes in
//! a store like FoundationDB can stand in for a range scan over typed
//! tuples, with no secondary index required.
//!
//! ```
//! use tuple_layer::{pack, unpack, range};
//!
//! let packed = pack(&"hello");
//! assert_eq!(unpack(&packed).unwrap().get(0).unwrap(), tuple_layer::Value::Unicode("hello".into()));
//!
//! let (begin, end) = range(&packed);
//! assert!(begin <= packed);
//! assert!(end.unwrap() > packed);
//! ```
//!
//! See `SPEC_FULL.md` in this repository for the full wire format and
//! module layout this crate implements.

mod buffer;
mod depth;
mod derived;
mod element;
mod error;
mod integer;
mod marker;
mod pack;
mod reader;
mod tuple;
mod writer;

pub use derived::{
    format_iso8601_datetime, format_iso8601_duration, ipv4_to_value, ipv6_to_value,
    parse_iso8601_datetime, parse_iso8601_duration, value_to_bool, value_to_ip,
};
pub use element::Value;
pub use error::{Error, Result};
pub use integer::Integer;
pub use pack::{pack, pack_many, range, unpack, PackedBatch, TuplePack};
pub use reader::{FromElement, Reader, SliceRef};
pub use tuple::{next_prefix, Tuple, TupleIter};
pub use writer::Writer;
