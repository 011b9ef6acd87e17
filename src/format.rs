//! The compressed file's fixed header: magic, informational comments, and
//! the depth byte.

use std::io::{Read, Write};

use crate::Error;

pub const MAGIC: &[u8; 2] = b"Q1";

/// Write `Q1\n`, a timestamp comment, a compression-rate comment, and the
/// depth byte. The comments are informational only; nothing downstream
/// parses them back.
pub fn write_header<W: Write>(out: &mut W, levels: u32, compression_rate: f64) -> Result<(), Error> {
    out.write_all(MAGIC)?;
    out.write_all(b"\n")?;
    let timestamp = chrono::Local::now().format("%a %b %d %H:%M:%S %Y");
    writeln!(out, "# {timestamp}")?;
    writeln!(out, "# compression rate {compression_rate:.2}%")?;
    out.write_all(&[levels as u8])?;
    Ok(())
}

/// Read and validate the magic line, skip the two comment lines, and read
/// the depth byte. Returns the tree depth `L`.
pub fn read_header<R: Read>(input: &mut R) -> Result<u32, Error> {
    let mut magic = [0u8; 2];
    input
        .read_exact(&mut magic)
        .map_err(|_| Error::Format("truncated header".to_string()))?;
    if &magic != MAGIC {
        return Err(Error::Format(format!(
            "bad magic {:?}, expected \"Q1\"",
            String::from_utf8_lossy(&magic)
        )));
    }
    expect_byte(input, b'\n')?;

    skip_comment_line(input)?;
    skip_comment_line(input)?;

    let mut levels = [0u8; 1];
    input
        .read_exact(&mut levels)
        .map_err(|_| Error::Format("truncated header: missing depth byte".to_string()))?;
    let levels = levels[0] as u32;
    if !(1..=32).contains(&levels) {
        return Err(Error::Format(format!(
            "invalid tree depth {levels}, must be in 1..=32"
        )));
    }
    Ok(levels)
}

fn expect_byte<R: Read>(input: &mut R, expected: u8) -> Result<(), Error> {
    let mut b = [0u8; 1];
    input
        .read_exact(&mut b)
        .map_err(|_| Error::Format("truncated header".to_string()))?;
    if b[0] != expected {
        return Err(Error::Format(format!(
            "expected byte {expected:#x}, got {:#x}",
            b[0]
        )));
    }
    Ok(())
}

fn skip_comment_line<R: Read>(input: &mut R) -> Result<(), Error> {
    expect_byte(input, b'#')?;
    let mut b = [0u8; 1];
    loop {
        input
            .read_exact(&mut b)
            .map_err(|_| Error::Format("truncated header comment".to_string()))?;
        if b[0] == b'\n' {
            return Ok(());
        }
    }
}
