macro_rules! unpack8_impl {
    ($name:ident, $t:ty) => {
        /// Unpacks 8 values of `num_bits` each from the first `num_bits`
        /// bytes of `packed`.
        pub fn $name(packed: &[u8], num_bits: usize, unpacked: &mut [$t; 8]) {
            debug_assert!(num_bits <= std::mem::size_of::<$t>() * 8);
            debug_assert!(packed.len() >= num_bits);
            if num_bits == 0 {
                *unpacked = [0; 8];
                return;
            }
            for (index, unpacked) in unpacked.iter_mut().enumerate() {
                let mut value = 0u64;
                let mut read = 0;
                let mut bit = index * num_bits;
                while read < num_bits {
                    let byte = packed[bit / 8];
                    let offset = bit % 8;
                    let take = (8 - offset).min(num_bits - read);
                    let bits = u64::from(byte >> offset) & ((1u64 << take) - 1);
                    value |= bits << read;
                    read += take;
                    bit += take;
                }
                *unpacked = value as $t;
            }
        }
    };
}

unpack8_impl!(unpack8, u8);
unpack8_impl!(unpack16, u16);
unpack8_impl!(unpack32, u32);
unpack8_impl!(unpack64, u64);
