//! Literal wire-format scenarios from spec.md §6/§8. These pin the byte
//! layout to the cross-language contract — if one of these changes, some
//! other implementation of the same tuple layer just went out of sync
//! with this one.

use tuple_layer::{pack, pack_many, range, unpack, Integer, Tuple, Value};

#[test]
fn empty_tuple_packs_to_zero_bytes() {
    assert_eq!(Tuple::new().to_bytes(), Vec::<u8>::new());
}

#[test]
fn small_integers() {
    assert_eq!(pack(&1i64), vec![0x15, 0x01]);
    assert_eq!(pack(&0i64), vec![0x14]);
    assert_eq!(pack(&(-1i64)), vec![0x13, 0xfe]);
    assert_eq!(pack(&(-256i64)), vec![0x12, 0xfe, 0xff]);
}

#[test]
fn string_and_bytes() {
    assert_eq!(pack("hello"), vec![0x02, b'h', b'e', b'l', b'l', b'o', 0x00]);
    assert_eq!(pack(&vec![0x00u8, 0x01]), vec![0x01, 0x00, 0xff, 0x01, 0x00]);
}

#[test]
fn nested_tuple() {
    let inner = Tuple::from_vec(vec![Value::Int(1i64.into()), Value::Int(2i64.into())]);
    assert_eq!(inner.to_bytes(), vec![0x15, 0x01, 0x15, 0x02]);
    let outer = Tuple::from_vec(vec![Value::Tuple(inner)]);
    assert_eq!(outer.to_bytes(), vec![0x03, 0x15, 0x01, 0x15, 0x02, 0x00]);
}

#[test]
fn null_top_level_vs_nested() {
    let top = Tuple::from_vec(vec![Value::Null]);
    assert_eq!(top.to_bytes(), vec![0x00]);

    let nested = Tuple::from_vec(vec![Value::Tuple(Tuple::from_vec(vec![Value::Null]))]);
    assert_eq!(nested.to_bytes(), vec![0x03, 0x00, 0xff, 0x00]);
}

#[test]
fn pack_with_prefix() {
    // ("Foo", 1) with prefix "abc" -> 61 62 63 02 46 6F 6F 00 15 01
    let t = Tuple::from_vec(vec![Value::Unicode("Foo".to_string()), Value::Int(1i64.into())]);
    assert_eq!(
        t.to_bytes_with_prefix(b"abc"),
        vec![0x61, 0x62, 0x63, 0x02, 0x46, 0x6f, 0x6f, 0x00, 0x15, 0x01]
    );
}

#[test]
fn embedded_zero_byte_string() {
    let bytes = pack(&vec![0x00u8]);
    assert_eq!(bytes, vec![0x01, 0x00, 0xff, 0x00]);
    let tuple = unpack(&bytes).unwrap();
    assert_eq!(tuple.get(0).unwrap(), Value::Bytes(vec![0x00]));
}

#[test]
fn doubly_nested_tuple() {
    // ((1, "a"), 2) -> 03 15 01 02 61 00 00 15 02
    let inner = Tuple::from_vec(vec![Value::Int(1i64.into()), Value::Unicode("a".to_string())]);
    let outer = Tuple::from_vec(vec![Value::Tuple(inner), Value::Int(2i64.into())]);
    assert_eq!(
        outer.to_bytes(),
        vec![0x03, 0x15, 0x01, 0x02, 0x61, 0x00, 0x00, 0x15, 0x02]
    );
}

#[test]
fn decode_first_and_last_of_a_flat_stream() {
    let bytes = [0x15, 0x01, 0x15, 0x02, 0x02, b'x', b'y', 0x00];
    let tuple = unpack(&bytes).unwrap();
    assert_eq!(tuple.get(0).unwrap(), Value::Int(Integer::from(1i64)));
    assert_eq!(tuple.get(2).unwrap(), Value::Unicode("xy".to_string()));
}

#[test]
fn range_worked_example() {
    let p = pack("Hello");
    let (begin, end) = range(&p);
    assert_eq!(begin, vec![0x02, b'H', b'e', b'l', b'l', b'o', 0x00, 0x00]);
    assert_eq!(end, Some(vec![0x02, b'H', b'e', b'l', b'l', b'o', 0x00, 0xff]));
}

#[test]
fn range_of_empty_prefix_is_open_ended() {
    let (begin, end) = range(&[]);
    assert_eq!(begin, Vec::<u8>::new());
    assert_eq!(end, None);
}

#[test]
fn pack_many_batches_null_items_as_empty_spans() {
    let batch = pack_many(b"k", &[Some(1i64), None, Some(3i64)]);
    assert_eq!(batch.get(0).unwrap(), &[b'k', 0x15, 0x01][..]);
    assert!(batch.get(1).unwrap().is_empty());
    assert_eq!(batch.get(2).unwrap(), &[b'k', 0x15, 0x03][..]);
}
