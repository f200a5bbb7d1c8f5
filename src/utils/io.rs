// I/O utilities for reading Ogg streams and CAF buffers

use std::io::{ErrorKind, Read};

use crate::{Error, Result};

/// Fill `buf` from `reader`, stopping early only at end of stream.
///
/// Returns the number of bytes read, so callers can tell a clean end of stream
/// (0) from a truncated structure (0 < n < buf.len()).
pub fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Read exactly `buf.len()` bytes, reporting truncation as `Error::ShortRead`
pub fn read_exact_or_short<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let n = read_full(reader, buf)?;
    if n < buf.len() {
        return Err(Error::ShortRead {
            expected: buf.len(),
            actual: n,
        });
    }
    Ok(())
}

/// Forward-only cursor over a byte slice for big-endian CAF fields
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, pos: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current offset from the start of the buffer
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Take the next `n` bytes and advance
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::InsufficientData {
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Take everything left
    pub fn rest(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_be_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_be_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_be_i32(&mut self) -> Result<i32> {
        Ok(i32::from_be_bytes(self.read_array()?))
    }

    pub fn read_be_i64(&mut self) -> Result<i64> {
        Ok(i64::from_be_bytes(self.read_array()?))
    }

    pub fn read_be_f32(&mut self) -> Result<f32> {
        Ok(f32::from_be_bytes(self.read_array()?))
    }

    pub fn read_be_f64(&mut self) -> Result<f64> {
        Ok(f64::from_be_bytes(self.read_array()?))
    }

    /// Take bytes up to (not including) the next NUL, consuming the NUL
    pub fn read_nul_terminated(&mut self) -> Result<&'a [u8]> {
        let rest = &self.data[self.pos..];
        match rest.iter().position(|&b| b == 0) {
            Some(end) => {
                self.pos += end + 1;
                Ok(&rest[..end])
            }
            None => Err(Error::InvalidString(format!(
                "missing NUL terminator at offset {}",
                self.pos
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_full_reports_partial() {
        let mut reader = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 5];
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(read_full(&mut reader, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_exact_or_short() {
        let mut reader = Cursor::new(vec![0u8; 4]);
        let mut buf = [0u8; 6];
        match read_exact_or_short(&mut reader, &mut buf) {
            Err(Error::ShortRead { expected, actual }) => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 4);
            }
            other => panic!("expected short read, got {:?}", other),
        }
    }

    #[test]
    fn test_cursor_fields() {
        let data = [0x00, 0x01, 0xde, 0xad, 0xbe, 0xef, b'h', b'i', 0, 9];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(cursor.read_be_u16().unwrap(), 1);
        assert_eq!(cursor.read_be_u32().unwrap(), 0xdeadbeef);
        assert_eq!(cursor.read_nul_terminated().unwrap(), b"hi");
        assert_eq!(cursor.position(), 9);
        assert_eq!(cursor.remaining(), 1);
        assert!(matches!(
            cursor.read_be_u16(),
            Err(Error::InsufficientData { needed: 2, available: 1 })
        ));
        assert_eq!(cursor.rest(), &[9]);
        assert!(cursor.is_empty());
    }
}
