//! MSB-first bit writer and reader over an arbitrary byte stream.
//!
//! Used by `encoder`/`decoder` to pack the tree body. Errors are sticky: once
//! a writer or reader observes an I/O failure it latches that error and every
//! later call is a no-op returning the same error, matching the underlying
//! byte stream's own one-shot failure semantics.

use std::io::{Read, Write};

/// Errors a bit writer or reader can observe.
#[derive(thiserror::Error, Debug, Clone)]
pub enum BitError {
    #[error("unexpected end of bit stream")]
    UnexpectedEof,
    #[error("i/o error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BitError {
    fn from(e: std::io::Error) -> Self {
        BitError::Io(e.to_string())
    }
}

/// Accumulates bits MSB-first into bytes and writes them to `out`.
pub struct BitWriter<W: Write> {
    out: W,
    buffer: u8,
    pos: u8,
    total_bits: usize,
    error: Option<BitError>,
}

impl<W: Write> BitWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            buffer: 0,
            pos: 0,
            total_bits: 0,
            error: None,
        }
    }

    /// Append a single bit (`0` or `1`) at the current bit position.
    pub fn write_bit(&mut self, bit: u8) -> Result<(), BitError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        self.buffer |= (bit & 1) << (7 - self.pos);
        self.pos += 1;
        self.total_bits += 1;
        if self.pos == 8 {
            if let Err(e) = self.out.write_all(&[self.buffer]) {
                let e = BitError::from(e);
                self.error = Some(e.clone());
                return Err(e);
            }
            self.buffer = 0;
            self.pos = 0;
        }
        Ok(())
    }

    /// Append the `num_bits` most significant bits of `value`, MSB first.
    /// `num_bits` must be in `1..=32`.
    pub fn write_bits(&mut self, value: u32, num_bits: u32) -> Result<(), BitError> {
        debug_assert!((1..=32).contains(&num_bits));
        for i in 0..num_bits {
            self.write_bit(((value >> (num_bits - 1 - i)) & 1) as u8)?;
        }
        Ok(())
    }

    /// Emit the trailing partial byte, zero-padded. Idempotent.
    pub fn flush(&mut self) -> Result<(), BitError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        if self.pos == 0 {
            return Ok(());
        }
        if let Err(e) = self.out.write_all(&[self.buffer]) {
            let e = BitError::from(e);
            self.error = Some(e.clone());
            return Err(e);
        }
        self.buffer = 0;
        self.pos = 0;
        Ok(())
    }

    /// Number of bits appended so far, not counting flush padding.
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Pulls bits MSB-first out of bytes read from `src`.
pub struct BitReader<R: Read> {
    src: R,
    buffer: u8,
    pos: u8,
    error: Option<BitError>,
}

impl<R: Read> BitReader<R> {
    pub fn new(src: R) -> Self {
        Self {
            src,
            buffer: 0,
            pos: 8,
            error: None,
        }
    }

    /// Read a single bit, pulling a new byte from `src` when the current one
    /// is exhausted.
    pub fn read_bit(&mut self) -> Result<u8, BitError> {
        if let Some(e) = &self.error {
            return Err(e.clone());
        }
        if self.pos == 8 {
            let mut byte = [0u8; 1];
            match self.src.read(&mut byte) {
                Ok(1) => {
                    self.buffer = byte[0];
                    self.pos = 0;
                }
                Ok(_) => {
                    self.error = Some(BitError::UnexpectedEof);
                    return Err(BitError::UnexpectedEof);
                }
                Err(e) => {
                    let e = BitError::from(e);
                    self.error = Some(e.clone());
                    return Err(e);
                }
            }
        }
        let bit = (self.buffer >> (7 - self.pos)) & 1;
        self.pos += 1;
        Ok(bit)
    }

    /// Read `num_bits` (1..=8) MSB-first into a byte.
    pub fn read_bits(&mut self, num_bits: u32) -> Result<u8, BitError> {
        debug_assert!((1..=8).contains(&num_bits));
        let mut value = 0u8;
        for _ in 0..num_bits {
            value = (value << 1) | self.read_bit()?;
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn write_then_read_roundtrip() {
        let mut buf = Vec::new();
        {
            let mut w = BitWriter::new(&mut buf);
            w.write_bits(0b101, 3).unwrap();
            w.write_bit(1).unwrap();
            w.write_bits(0xAB, 8).unwrap();
            w.flush().unwrap();
        }
        let mut r = BitReader::new(Cursor::new(buf));
        assert_eq!(r.read_bits(3).unwrap(), 0b101);
        assert_eq!(r.read_bit().unwrap(), 1);
        assert_eq!(r.read_bits(8).unwrap(), 0xAB);
    }

    #[test]
    fn flush_is_idempotent() {
        let mut buf = Vec::new();
        let mut w = BitWriter::new(&mut buf);
        w.write_bit(1).unwrap();
        w.flush().unwrap();
        w.flush().unwrap();
        assert_eq!(buf, vec![0b1000_0000]);
    }

    #[test]
    fn total_bits_excludes_padding() {
        let mut buf = Vec::new();
        let mut w = BitWriter::new(&mut buf);
        w.write_bits(0b11, 2).unwrap();
        assert_eq!(w.total_bits(), 2);
        w.flush().unwrap();
        assert_eq!(w.total_bits(), 2);
    }

    #[test]
    fn reader_reports_eof() {
        let mut r = BitReader::new(Cursor::new(vec![0xFFu8]));
        for _ in 0..8 {
            r.read_bit().unwrap();
        }
        assert!(matches!(r.read_bit(), Err(BitError::UnexpectedEof)));
        // sticky: still fails
        assert!(matches!(r.read_bit(), Err(BitError::UnexpectedEof)));
    }

    #[test]
    fn writer_sticky_error() {
        struct FailWrite;
        impl Write for FailWrite {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let mut w = BitWriter::new(FailWrite);
        for _ in 0..7 {
            w.write_bit(1).unwrap();
        }
        assert!(w.write_bit(1).is_err());
        assert!(w.write_bit(0).is_err());
    }
}
