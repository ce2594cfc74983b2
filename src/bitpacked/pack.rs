macro_rules! pack8_impl {
    ($name:ident, $t:ty) => {
        /// Packs 8 values of `num_bits` each into the first `num_bits`
        /// bytes of `packed`, LSB-first. Bits of each value beyond
        /// `num_bits` must be zero.
        pub fn $name(unpacked: &[$t; 8], num_bits: usize, packed: &mut [u8]) {
            debug_assert!(num_bits <= std::mem::size_of::<$t>() * 8);
            debug_assert!(packed.len() >= num_bits);
            packed[..num_bits].fill(0);
            for (index, value) in unpacked.iter().enumerate() {
                let value = *value as u64;
                debug_assert!(num_bits == 64 || value >> num_bits == 0);
                let mut written = 0;
                let mut bit = index * num_bits;
                while written < num_bits {
                    let offset = bit % 8;
                    let take = (8 - offset).min(num_bits - written);
                    let bits = (value >> written) & ((1u64 << take) - 1);
                    packed[bit / 8] |= (bits as u8) << offset;
                    written += take;
                    bit += take;
                }
            }
        }
    };
}

pack8_impl!(pack8, u8);
pack8_impl!(pack16, u16);
pack8_impl!(pack32, u32);
pack8_impl!(pack64, u64);
