//! Length-prefixed UTF-8 strings: `[len:u32 BE] [bytes...]`.
//!
//! Every read names the field's byte limit, and a hostile length prefix is rejected before the
//! body is copied.

use bytes::{Buf, BufMut};
use commonware_codec::{Error, FixedSize, ReadExt, Write};

const LEN_PREFIX: usize = u32::SIZE;

pub fn write_string(s: &str, writer: &mut impl BufMut) {
    (s.len() as u32).write(writer);
    writer.put_slice(s.as_bytes());
}

/// Read a string of at most `max_len` bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("String", "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let body = reader.copy_to_bytes(len);
    String::from_utf8(body.to_vec()).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

pub fn string_encode_size(s: &str) -> usize {
    LEN_PREFIX + s.len()
}
