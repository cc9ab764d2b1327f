//! Stateful encoder built on [`ByteBuffer`]. Owns nesting depth and exposes
//! one emitter per primitive logical type; it does not own type dispatch —
//! that lives in [`crate::element`] and [`crate::tuple`], which call these
//! emitters in the right order.

use crate::buffer::ByteBuffer;
use crate::depth::Depth;
use crate::integer::{self, Integer};
use crate::marker::{self, ESCAPE};

/// Flip the encoded big-endian float bytes so IEEE-754 order maps onto
/// unsigned byte order: flip every bit for negative numbers, flip only the
/// sign bit for non-negative numbers. The same transform inverts itself on
/// decode, since flipping twice is the identity.
pub(crate) fn mangle_float_bytes(b: &mut [u8]) {
    if b[0] & 0x80 != 0 {
        for byte in b.iter_mut() {
            *byte ^= 0xff;
        }
    } else {
        b[0] ^= 0x80;
    }
}

/// Reverse [`mangle_float_bytes`]: the wire bytes have the sign-bit
/// convention backwards from IEEE-754, so the test is on the *wire* byte's
/// top bit rather than the original float's sign.
pub(crate) fn unmangle_float_bytes(b: &mut [u8]) {
    if b[0] & 0x80 == 0 {
        for byte in b.iter_mut() {
            *byte ^= 0xff;
        }
    } else {
        b[0] ^= 0x80;
    }
}

/// Zero-escape `payload` into `buf`, per spec.md §3: every `0x00` byte is
/// written as `0x00 0xff`; the segment ends with a single `0x00` not
/// followed by `0xff`.
fn write_escaped(buf: &mut ByteBuffer, payload: &[u8]) {
    for &b in payload {
        buf.append(b);
        if b == 0 {
            buf.append(ESCAPE);
        }
    }
    buf.append(0x00);
}

/// The tuple-layer encoder. Wraps a [`ByteBuffer`] and tracks nesting
/// depth so `emit_null` can tell whether it's at the top level (a bare
/// `0x00`) or inside a nested tuple (where `0x00` alone would be mistaken
/// for that tuple's terminator, so it's escaped as `0x00 0xff`).
#[derive(Debug, Default)]
pub struct Writer {
    buf: ByteBuffer,
    depth: Depth,
}

impl Writer {
    /// Start a new, empty writer.
    pub fn new() -> Self {
        Self {
            buf: ByteBuffer::new(),
            depth: Depth::new(),
        }
    }

    /// Start a new writer, preallocating `hint` bytes.
    pub fn with_capacity(hint: usize) -> Self {
        Self {
            buf: ByteBuffer::with_capacity(hint),
            depth: Depth::new(),
        }
    }

    /// Current write position.
    pub fn position(&self) -> usize {
        self.buf.position()
    }

    /// Write raw bytes verbatim, bypassing all type dispatch. Used to
    /// splice in an opaque subspace prefix ahead of a packed tuple.
    pub fn write_raw(&mut self, bytes: &[u8]) {
        self.buf.append_slice(bytes);
    }

    pub fn emit_null(&mut self) {
        self.buf.append(marker::NULL);
        if self.depth.get() > 0 {
            self.buf.append(ESCAPE);
        }
    }

    pub fn emit_bytes(&mut self, payload: &[u8]) {
        self.buf.append(marker::BYTES);
        write_escaped(&mut self.buf, payload);
    }

    pub fn emit_string(&mut self, s: &str) {
        self.buf.append(marker::UNICODE);
        write_escaped(&mut self.buf, s.as_bytes());
    }

    pub fn emit_int(&mut self, v: Integer) {
        integer::encode_int(&mut self.buf, v);
    }

    pub fn emit_float32(&mut self, v: f32) {
        self.buf.append(marker::FLOAT);
        let mut bytes = v.to_bits().to_be_bytes();
        mangle_float_bytes(&mut bytes);
        self.buf.append_slice(&bytes);
    }

    pub fn emit_float64(&mut self, v: f64) {
        self.buf.append(marker::DOUBLE);
        let mut bytes = v.to_bits().to_be_bytes();
        mangle_float_bytes(&mut bytes);
        self.buf.append_slice(&bytes);
    }

    pub fn emit_uuid128(&mut self, bytes: [u8; 16]) {
        self.buf.append(marker::UUID128);
        self.buf.append_slice(&bytes);
    }

    pub fn emit_uuid64(&mut self, bytes: [u8; 8]) {
        self.buf.append(marker::UUID64);
        self.buf.append_slice(&bytes);
    }

    /// Open a nested tuple: emits the nested-tuple tag and increments
    /// depth. Must be paired with [`Writer::end_nested`].
    pub fn begin_nested(&mut self) {
        self.buf.append(marker::NESTED);
        self.depth.enter();
    }

    /// Close a nested tuple: emits its `0x00` terminator and decrements
    /// depth.
    pub fn end_nested(&mut self) {
        self.buf.append(marker::NULL);
        self.depth.exit();
    }

    /// Consume the writer, yielding the finalized byte sequence.
    pub fn finish(self) -> Vec<u8> {
        self.buf.into_slice()
    }
}
