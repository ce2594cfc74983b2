use crate::bitio::BitWriter;
use crate::bitpacked::Unpackable;
use crate::ceil8;
use crate::error::{Error, Result};
use crate::uleb128;

/// Number of values the encoder can stage before it must commit them to a
/// run; also the largest accepted `min_repeated_run_length`.
pub const MAX_RUN_LENGTH_BUFFER: usize = 48;

/// Largest repeat count a single repeated run can carry; longer runs are
/// split.
const MAX_RUN_LENGTH: usize = i32::MAX as usize;

/// Largest number of octet groups in one literal run. Keeps the literal
/// header in a single byte so it can be patched in place once the run's
/// payload is complete.
const MAX_LITERAL_GROUPS: usize = (1 << 6) - 1;

/// Smallest buffer [`Encoder::try_new`] accepts for `num_bits`: room for
/// one full literal octet plus a one-value repeated run.
pub fn min_buffer_size(num_bits: usize) -> usize {
    let literal_octet_size = 1 + ceil8(8 * num_bits);
    let repeated_run_size = 1 + ceil8(num_bits);
    literal_octet_size + repeated_run_size
}

/// Upper bound on the bytes produced by encoding any `num_values` values of
/// `num_bits` each, whatever their run structure.
pub fn max_buffer_size(num_bits: usize, num_values: usize) -> usize {
    let num_runs = ceil8(num_values);
    // every octet as its own literal run
    let literal_max_size = num_runs * (1 + num_bits);
    // every octet as a minimal repeated run
    let repeated_max_size = num_runs * (1 + ceil8(num_bits));
    literal_max_size.max(repeated_max_size) + min_buffer_size(num_bits)
}

/// Encodes a stream of values of a fixed bit width into the hybrid
/// run-length / bit-packed framing, writing into a caller-provided buffer.
///
/// Values are staged until the encoder can classify them: a trailing
/// sequence of at least `max(8, min_repeated_run_length)` identical values
/// becomes a repeated run; everything else is committed octet by octet to
/// bit-packed literal runs. A larger `min_repeated_run_length` keeps short
/// repeats inside literal runs, which encodes adversarial inputs (short
/// runs interleaved with literals) more compactly.
///
/// [`Encoder::put`] refuses values the buffer cannot accommodate in the
/// worst case, leaving the encoder unchanged, so [`Encoder::flush`] always
/// produces a valid stream of the values actually accepted.
pub struct Encoder<'a> {
    bit_writer: BitWriter<'a>,
    num_bits: usize,
    /// effective repeat threshold, `max(8, min_repeated_run_length)`
    repeat_threshold: usize,
    /// values not yet committed to either run kind
    buffered_values: [u64; MAX_RUN_LENGTH_BUFFER],
    num_buffered_values: usize,
    /// last value seen and the length of the identical trailing run
    current_value: u64,
    repeat_count: usize,
    /// values committed to the open literal run, always a multiple of 8
    literal_count: usize,
    /// position of the open literal run's header byte
    literal_indicator_offset: Option<usize>,
}

impl<'a> Encoder<'a> {
    /// Returns a new [`Encoder`] over `buffer`.
    ///
    /// `min_repeated_run_length` must be a multiple of 8 of at most
    /// [`MAX_RUN_LENGTH_BUFFER`]; 0 means "prefer repeated runs as soon as
    /// 8 identical values appear". Errors when `num_bits` exceeds 64 or
    /// `buffer` is smaller than [`min_buffer_size`].
    pub fn try_new(
        buffer: &'a mut [u8],
        num_bits: usize,
        min_repeated_run_length: usize,
    ) -> Result<Self> {
        if num_bits > 64 {
            return Err(Error::General(format!(
                "the bit width of an encoder must be at most 64, got {}",
                num_bits
            )));
        }
        if min_repeated_run_length % 8 != 0 || min_repeated_run_length > MAX_RUN_LENGTH_BUFFER {
            return Err(Error::General(format!(
                "min_repeated_run_length must be a multiple of 8 of at most {}, got {}",
                MAX_RUN_LENGTH_BUFFER, min_repeated_run_length
            )));
        }
        if buffer.len() < min_buffer_size(num_bits) {
            return Err(Error::General(format!(
                "a {}-bit encoder requires a buffer of at least {} bytes, got {}",
                num_bits,
                min_buffer_size(num_bits),
                buffer.len()
            )));
        }
        Ok(Self {
            bit_writer: BitWriter::new(buffer),
            num_bits,
            repeat_threshold: min_repeated_run_length.max(8),
            buffered_values: [0; MAX_RUN_LENGTH_BUFFER],
            num_buffered_values: 0,
            current_value: 0,
            repeat_count: 0,
            literal_count: 0,
            literal_indicator_offset: None,
        })
    }

    /// Appends one value, which must fit in `num_bits` bits. Returns
    /// `false`, changing nothing, when the buffer cannot accommodate the
    /// value in the worst case.
    pub fn put(&mut self, value: u64) -> bool {
        debug_assert!(self.num_bits == 64 || value < (1u64 << self.num_bits));

        if self.current_value == value && self.repeat_count < MAX_RUN_LENGTH {
            let new_count = self.repeat_count + 1;
            if new_count >= 8 {
                // runs of 8 or more always start octet-aligned and occupy
                // the whole staging buffer; whatever happens next, this
                // state flushes as a single repeated run
                if !self.fits(self.repeated_run_size(new_count)) {
                    return false;
                }
                self.repeat_count = new_count;
                if new_count > self.repeat_threshold {
                    // continuation of an already qualified run
                    debug_assert_eq!(self.num_buffered_values, 0);
                    return true;
                }
                self.buffered_values[self.num_buffered_values] = value;
                self.num_buffered_values += 1;
                if new_count == self.repeat_threshold {
                    // the run qualifies: stop staging and close the literal
                    // run it interrupts
                    debug_assert_eq!(self.num_buffered_values, new_count);
                    self.num_buffered_values = 0;
                    if self.literal_count > 0 {
                        self.flush_literal_run();
                    }
                }
                return true;
            }
            if !self.fits(self.staged_octet_size()) {
                return false;
            }
            self.repeat_count = new_count;
        } else {
            if self.repeat_count >= self.repeat_threshold {
                // a qualified run ends; `value` seeds fresh literal staging
                let run_size = self.repeated_run_size(self.repeat_count);
                if !self.fits(run_size + 1 + self.num_bits) {
                    return false;
                }
                self.flush_repeated_run();
            } else if self.num_buffered_values >= 8 {
                // a held candidate broke before qualifying; its whole
                // octets become literals and the remainder is restaged
                let octets = self.num_buffered_values / 8;
                if !self.fits((octets + 2) * self.num_bits + 3) {
                    return false;
                }
                self.drain_buffered_octets();
            } else if !self.fits(self.staged_octet_size()) {
                return false;
            }
            self.repeat_count = 1;
            self.current_value = value;
        }

        self.buffered_values[self.num_buffered_values] = value;
        self.num_buffered_values += 1;
        if self.num_buffered_values == 8 {
            debug_assert!(self.repeat_count < 8);
            self.flush_buffered_octet();
        }
        true
    }

    /// Commits all pending state and returns the total number of bytes
    /// written. The encoder is idle afterwards; [`Encoder::clear`] returns
    /// it to its initial state over the same buffer.
    pub fn flush(&mut self) -> usize {
        if self.literal_count > 0 || self.repeat_count > 0 || self.num_buffered_values > 0 {
            let all_repeat = self.repeat_count > 0
                && (self.repeat_count == self.num_buffered_values || self.num_buffered_values == 0);
            if all_repeat {
                if self.literal_count > 0 {
                    self.flush_literal_run();
                }
                self.flush_repeated_run();
            } else {
                debug_assert!(self.num_buffered_values < 8);
                if self.num_buffered_values > 0 {
                    // pad the staged tail to a full octet with zeros
                    self.buffered_values[self.num_buffered_values..8].fill(0);
                    self.num_buffered_values = 8;
                    self.flush_buffered_octet();
                }
                if self.literal_count > 0 {
                    self.flush_literal_run();
                }
            }
        }
        self.bit_writer.flush()
    }

    /// Resets the encoder; the underlying buffer is reused from the start.
    pub fn clear(&mut self) {
        self.bit_writer.clear();
        self.num_buffered_values = 0;
        self.current_value = 0;
        self.repeat_count = 0;
        self.literal_count = 0;
        self.literal_indicator_offset = None;
    }

    /// Bytes produced so far, pending (unflushed) state excluded.
    pub fn len(&self) -> usize {
        self.bit_writer.bytes_written()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn fits(&self, additional: usize) -> bool {
        self.bit_writer.bytes_written() + additional <= self.bit_writer.capacity()
    }

    /// Bytes a repeated run of `count` values occupies.
    #[inline]
    fn repeated_run_size(&self, count: usize) -> usize {
        uleb128::encoded_len((count as u32) << 1) + ceil8(self.num_bits)
    }

    /// Worst-case bytes to commit the octet the staged value belongs to.
    #[inline]
    fn staged_octet_size(&self) -> usize {
        usize::from(self.literal_indicator_offset.is_none()) + self.num_bits
    }

    fn flush_repeated_run(&mut self) {
        debug_assert!(self.repeat_count > 0);
        debug_assert!(self.repeat_count <= MAX_RUN_LENGTH);
        debug_assert_eq!(self.literal_count, 0);
        let indicator = (self.repeat_count as u32) << 1;
        let ok = self.bit_writer.put_uleb128(indicator);
        debug_assert!(ok);
        let ok = self
            .bit_writer
            .put_aligned(self.current_value, ceil8(self.num_bits));
        debug_assert!(ok);
        self.repeat_count = 0;
        self.num_buffered_values = 0;
    }

    /// Writes the open literal run's header into its reserved byte.
    fn flush_literal_run(&mut self) {
        debug_assert!(self.literal_count > 0 && self.literal_count % 8 == 0);
        if let Some(offset) = self.literal_indicator_offset.take() {
            let num_groups = self.literal_count / 8;
            self.bit_writer
                .put_byte_at(offset, ((num_groups << 1) | 1) as u8);
        }
        self.literal_count = 0;
    }

    /// Commits the staged octet as literals.
    fn flush_buffered_octet(&mut self) {
        debug_assert_eq!(self.num_buffered_values, 8);
        let mut octet = [0u64; 8];
        octet.copy_from_slice(&self.buffered_values[..8]);
        self.commit_literal_octet(&octet);
        self.num_buffered_values = 0;
        self.repeat_count = 0;
    }

    /// Commits the whole octets of a broken candidate as literals and
    /// moves the remainder to the front of the staging buffer.
    fn drain_buffered_octets(&mut self) {
        debug_assert_eq!(self.num_buffered_values, self.repeat_count);
        let mut start = 0;
        while self.num_buffered_values - start >= 8 {
            let mut octet = [0u64; 8];
            octet.copy_from_slice(&self.buffered_values[start..start + 8]);
            self.commit_literal_octet(&octet);
            start += 8;
        }
        self.buffered_values.copy_within(start..self.num_buffered_values, 0);
        self.num_buffered_values -= start;
        self.repeat_count = 0;
    }

    fn commit_literal_octet(&mut self, values: &[u64; 8]) {
        if self.literal_indicator_offset.is_none() {
            self.literal_indicator_offset = self.bit_writer.reserve_byte();
            debug_assert!(self.literal_indicator_offset.is_some());
        }
        let mut packed = [0u8; 64];
        u64::pack8(values, self.num_bits, &mut packed);
        let ok = self.bit_writer.put_bytes(&packed[..self.num_bits]);
        debug_assert!(ok);
        self.literal_count += 8;
        if self.literal_count / 8 == MAX_LITERAL_GROUPS {
            self.flush_literal_run();
        }
    }
}
