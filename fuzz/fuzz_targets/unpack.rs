#![no_main]
use libfuzzer_sys::fuzz_target;
use tuple_layer::unpack;

fuzz_target!(|data: &[u8]| {
    let _ = unpack(data);
});
