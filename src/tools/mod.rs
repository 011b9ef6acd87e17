//! Small self-contained helpers shared by the codec modules.

pub mod bitstream;
