use crate::ceil8;
use crate::uleb128;

/// Writes values of arbitrary bit width into a caller-provided byte buffer,
/// packing LSB-first within each byte.
///
/// Bits accumulate in a 64-bit word that is spilled to the buffer as it
/// fills; [`BitWriter::flush`] commits the partially filled tail byte,
/// zero-padded on the high side. Operations that would overrun the buffer
/// return `false` without writing anything.
pub struct BitWriter<'a> {
    buffer: &'a mut [u8],
    /// bytes committed to `buffer`
    byte_offset: usize,
    /// bits pending in `buffered_values`, always below 64
    bit_offset: usize,
    buffered_values: u64,
}

impl<'a> BitWriter<'a> {
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            byte_offset: 0,
            bit_offset: 0,
            buffered_values: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes the output occupies so far, the pending tail byte included.
    #[inline]
    pub fn bytes_written(&self) -> usize {
        self.byte_offset + ceil8(self.bit_offset)
    }

    /// Appends the `num_bits` low bits of `value`. The remaining bits of
    /// `value` must be zero.
    #[inline]
    pub fn put_value(&mut self, value: u64, num_bits: usize) -> bool {
        debug_assert!(num_bits <= 64);
        debug_assert!(num_bits == 64 || value >> num_bits == 0);
        if self.byte_offset * 8 + self.bit_offset + num_bits > self.buffer.len() * 8 {
            return false;
        }

        self.buffered_values |= value << self.bit_offset;
        self.bit_offset += num_bits;
        if self.bit_offset >= 64 {
            self.buffer[self.byte_offset..self.byte_offset + 8]
                .copy_from_slice(&self.buffered_values.to_le_bytes());
            self.byte_offset += 8;
            self.bit_offset -= 64;
            self.buffered_values = if self.bit_offset == 0 {
                0
            } else {
                value >> (num_bits - self.bit_offset)
            };
        }
        true
    }

    /// Appends raw bytes. The writer must sit on a byte boundary.
    pub fn put_bytes(&mut self, bytes: &[u8]) -> bool {
        debug_assert_eq!(self.bit_offset, 0);
        if self.byte_offset + bytes.len() > self.buffer.len() {
            return false;
        }
        self.buffer[self.byte_offset..self.byte_offset + bytes.len()].copy_from_slice(bytes);
        self.byte_offset += bytes.len();
        true
    }

    /// Appends the `num_bytes` low bytes of `value`, little-endian.
    pub fn put_aligned(&mut self, value: u64, num_bytes: usize) -> bool {
        debug_assert!(num_bytes <= 8);
        let bytes = value.to_le_bytes();
        self.put_bytes(&bytes[..num_bytes])
    }

    /// Appends an ULEB128-encoded `value`.
    pub fn put_uleb128(&mut self, value: u32) -> bool {
        let mut scratch = [0u8; uleb128::MAX_BYTE_LEN];
        let len = uleb128::encode(value, &mut scratch);
        self.put_bytes(&scratch[..len])
    }

    /// Skips one byte, zeroing it, and returns its position so it can be
    /// patched later with [`BitWriter::put_byte_at`].
    pub fn reserve_byte(&mut self) -> Option<usize> {
        debug_assert_eq!(self.bit_offset, 0);
        if self.byte_offset >= self.buffer.len() {
            return None;
        }
        let offset = self.byte_offset;
        self.buffer[offset] = 0;
        self.byte_offset += 1;
        Some(offset)
    }

    /// Overwrites a previously written (or reserved) byte.
    pub fn put_byte_at(&mut self, offset: usize, byte: u8) {
        debug_assert!(offset < self.byte_offset);
        self.buffer[offset] = byte;
    }

    /// Commits the partially filled tail byte, zero-padded on the high
    /// side, and returns the total number of bytes written.
    pub fn flush(&mut self) -> usize {
        let num_bytes = ceil8(self.bit_offset);
        self.buffer[self.byte_offset..self.byte_offset + num_bytes]
            .copy_from_slice(&self.buffered_values.to_le_bytes()[..num_bytes]);
        self.byte_offset += num_bytes;
        self.bit_offset = 0;
        self.buffered_values = 0;
        self.byte_offset
    }

    /// Rewinds the writer so the buffer can be reused.
    pub fn clear(&mut self) {
        self.byte_offset = 0;
        self.bit_offset = 0;
        self.buffered_values = 0;
    }
}
