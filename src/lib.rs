// See https://github.com/apache/parquet-format/blob/master/Encodings.md#run-length-encoding--bit-packing-hybrid-rle--3
pub mod bitio;
pub mod bitpacked;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod uleb128;

pub use bitpacked::Unpackable;
pub use decoder::{decode, Decoder};
pub use encoder::{max_buffer_size, min_buffer_size, Encoder, MAX_RUN_LENGTH_BUFFER};

/// Returns the ceil of value/8
#[inline]
pub fn ceil8(value: usize) -> usize {
    value / 8 + ((value % 8 != 0) as usize)
}
