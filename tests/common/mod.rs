//! Random tuple generation shared by the property tests in this
//! directory. Not a public part of the crate — just test scaffolding.

use rand::Rng;
use tuple_layer::{Tuple, Value};

pub fn random_value(rng: &mut impl Rng) -> Value {
    match rng.gen_range(0..6) {
        0 => Value::Null,
        1 => Value::Bytes((0..rng.gen_range(0..6)).map(|_| rng.gen()).collect()),
        2 => Value::Unicode(random_string(rng)),
        3 => Value::Int(rng.gen::<i64>().into()),
        4 => Value::Float(rng.gen_range(-1e6f32..1e6f32)),
        _ => Value::Double(rng.gen_range(-1e12f64..1e12f64)),
    }
}

fn random_string(rng: &mut impl Rng) -> String {
    let len = rng.gen_range(0..8);
    (0..len)
        .map(|_| char::from_u32(rng.gen_range(0x20..0x7f)).unwrap())
        .collect()
}

pub fn random_tuple(rng: &mut impl Rng, max_len: usize) -> Tuple {
    let len = rng.gen_range(0..=max_len);
    Tuple::from_vec((0..len).map(|_| random_value(rng)).collect())
}
