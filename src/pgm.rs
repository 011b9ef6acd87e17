//! Binary PGM (portable graymap) raster I/O.
//!
//! This is the codec's raster collaborator, not part of the core: it only
//! needs to produce a square, power-of-two pixel buffer with a max value of
//! 255, and accept the same back. Generic over `Read`/`Write` so callers
//! can pass a file, a cursor, or anything else that implements them.

use std::io::{Read, Write};

use crate::Error;

const MAGIC: &[u8; 2] = b"P5";

/// A decoded or to-be-written raster: a square, 8-bit grayscale pixel
/// buffer plus the header fields PGM requires.
pub struct Raster {
    pub side: u32,
    pub max_value: u8,
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Wrap a pixel buffer produced by the codec. `max_value` is always 255
    /// for codec output.
    pub fn new(side: u32, pixels: Vec<u8>) -> Result<Self, Error> {
        if pixels.len() != (side as usize) * (side as usize) {
            return Err(Error::InvalidParameter(format!(
                "pixel buffer has {} entries, expected {}",
                pixels.len(),
                (side as usize) * (side as usize)
            )));
        }
        Ok(Self {
            side,
            max_value: 255,
            pixels,
        })
    }
}

/// Read a binary PGM raster. Requires a square image whose side is a power
/// of two and a max value of 255, per the codec's contract.
pub fn read<R: Read>(input: &mut R) -> Result<Raster, Error> {
    let mut magic = [0u8; 2];
    input
        .read_exact(&mut magic)
        .map_err(|_| Error::Format("truncated PGM header".to_string()))?;
    if &magic != MAGIC {
        return Err(Error::Format(format!(
            "bad PGM magic {:?}, expected \"P5\"",
            String::from_utf8_lossy(&magic)
        )));
    }

    let width = read_uint_token(input)?;
    let height = read_uint_token(input)?;
    let max_value = read_uint_token(input)?;

    if width != height {
        return Err(Error::InvalidParameter(format!(
            "raster must be square, got {width}x{height}"
        )));
    }
    if !width.is_power_of_two() {
        return Err(Error::InvalidParameter(format!(
            "raster side {width} is not a power of two"
        )));
    }
    if max_value > 255 {
        return Err(Error::Format(format!("max value {max_value} exceeds 255")));
    }

    let pixel_count = (width as usize) * (width as usize);
    let mut pixels = vec![0u8; pixel_count];
    input
        .read_exact(&mut pixels)
        .map_err(|_| Error::Format("truncated PGM pixel data".to_string()))?;

    Ok(Raster {
        side: width,
        max_value: max_value as u8,
        pixels,
    })
}

/// Write a binary PGM raster: `P5\n<side> <side>\n<max_value>\n` followed by
/// the raw row-major pixel bytes.
pub fn write<W: Write>(raster: &Raster, out: &mut W) -> Result<(), Error> {
    out.write_all(MAGIC)?;
    writeln!(out)?;
    writeln!(out, "{} {}", raster.side, raster.side)?;
    writeln!(out, "{}", raster.max_value)?;
    out.write_all(&raster.pixels)?;
    Ok(())
}

/// Skip ASCII whitespace and `#`-introduced comments, then read one decimal
/// integer token, matching `pgm.c`'s `skip_ws_and_comments`/`fscanf` pair.
fn read_uint_token<R: Read>(input: &mut R) -> Result<u32, Error> {
    let mut byte = [0u8; 1];
    let mut c;
    loop {
        input
            .read_exact(&mut byte)
            .map_err(|_| Error::Format("truncated PGM header".to_string()))?;
        c = byte[0];
        if c == b'#' {
            loop {
                input
                    .read_exact(&mut byte)
                    .map_err(|_| Error::Format("truncated PGM header comment".to_string()))?;
                if byte[0] == b'\n' {
                    break;
                }
            }
            continue;
        }
        if !c.is_ascii_whitespace() {
            break;
        }
    }

    let mut digits = vec![c];
    loop {
        match input.read_exact(&mut byte) {
            Ok(()) => {
                if byte[0].is_ascii_digit() {
                    digits.push(byte[0]);
                } else {
                    break;
                }
            }
            Err(_) => break,
        }
    }

    std::str::from_utf8(&digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::Format("expected a decimal integer in PGM header".to_string()))
}
