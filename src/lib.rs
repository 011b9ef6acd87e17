//! # Quadtree Codec
//!
//! Compress or expand square, power-of-two, 8-bit grayscale rasters using a
//! quadtree whose nodes store a mean intensity, a 2-bit rounding error, and a
//! uniformity flag.
//!
//! * `tree` is the node/tree data model and the parent-sum ("fourth mean")
//!   identity shared by the encoder and decoder.
//! * `builder` constructs a tree bottom-up from a pixel buffer.
//! * `encoder`/`decoder` are the breadth-first, bit-packed serializer and its
//!   inverse.
//! * `lossy` is the optional variance-threshold pruning pass.
//! * `render` turns a (possibly pruned) tree back into a pixel buffer.
//! * `pgm` and `grid` are the raster I/O and partition-visualization
//!   collaborators; `format` owns the compressed file's header.
//!
//! ## Buffer Example
//!
//! ```rs
//! use qtc::*;
//! let pixels = vec![7u8; 4];
//! let tree = builder::build(&pixels, 2).expect("build failed");
//! let mut out = Vec::new();
//! encoder::encode(&tree, &mut out).expect("encode failed");
//! ```

pub mod tools;
pub mod tree;
pub mod builder;
pub mod format;
pub mod encoder;
pub mod decoder;
pub mod lossy;
pub mod render;
pub mod pgm;
pub mod grid;

/// Errors surfaced by the codec core and its raster collaborator.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("format error: {0}")]
    Format(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<tools::bitstream::BitError> for Error {
    fn from(e: tools::bitstream::BitError) -> Self {
        match e {
            tools::bitstream::BitError::UnexpectedEof => {
                Error::Format("unexpected end of bit stream".to_string())
            }
            tools::bitstream::BitError::Io(msg) => {
                Error::Io(std::io::Error::new(std::io::ErrorKind::Other, msg))
            }
        }
    }
}

/// Options controlling a compress/decompress run.
///
/// Mirrors the command surface's `-a` flag so library callers don't need to
/// go through the CLI to drive the same behavior.
#[derive(Clone, Debug)]
pub struct Options {
    /// Lossy filter strength. The filter only runs when `alpha > 1.0`.
    pub alpha: f64,
}

pub const STD_OPTIONS: Options = Options { alpha: 1.0 };
