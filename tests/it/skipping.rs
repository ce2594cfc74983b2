use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use hybrid_rle::Decoder;

use super::{encode_into, legal_min_run_lengths};

/// initial literals, a repeated stretch, then closing literals
fn make_sequence(
    initial_literals: usize,
    repeats: usize,
    trailing_literals: usize,
    num_bits: usize,
) -> Vec<u64> {
    let modulus = if num_bits >= 64 {
        u64::MAX
    } else {
        1u64 << num_bits
    };
    let mut values = Vec::with_capacity(initial_literals + repeats + trailing_literals);
    values.extend((0..initial_literals).map(|i| i as u64 % modulus));
    values.extend(std::iter::repeat(1).take(repeats));
    values.extend((0..trailing_literals).map(|i| i as u64 % modulus));
    values
}

/// Decodes `values` around a skip of `skip_count` values at `skip_at`,
/// through both the per-value and the bulk path.
fn validate_skip(
    values: &[u64],
    num_bits: usize,
    min_run: usize,
    skip_at: usize,
    skip_count: usize,
) {
    assert!(skip_at + skip_count <= values.len());
    let mut buffer = vec![0u8; 64 * 1024];
    let encoded_len = encode_into(&mut buffer, values, num_bits, min_run);
    let encoded = &buffer[..encoded_len];

    let expected = values[..skip_at]
        .iter()
        .chain(&values[skip_at + skip_count..])
        .copied()
        .collect::<Vec<_>>();
    let context = format!(
        "num_bits = {} min_run = {} skip_at = {} skip_count = {}",
        num_bits, min_run, skip_at, skip_count
    );

    let mut decoder = Decoder::<u64>::new(encoded, num_bits);
    for _ in 0..2 {
        for (i, value) in expected[..skip_at].iter().enumerate() {
            assert_eq!(decoder.get_single_value(), Some(*value), "{} i = {}", context, i);
        }
        assert_eq!(decoder.skip_values(skip_count), skip_count, "{}", context);
        for (i, value) in expected[skip_at..].iter().enumerate() {
            assert_eq!(decoder.get_single_value(), Some(*value), "{} i = {}", context, i);
        }
        decoder.reset(encoded, num_bits);
    }

    let mut decoder = Decoder::<u64>::new(encoded, num_bits);
    for _ in 0..2 {
        let mut decoded = vec![0u64; expected.len()];
        let mut read = 0;
        if skip_at > 0 {
            read += decoder.get_values(&mut decoded[..skip_at]);
            assert_eq!(read, skip_at, "{}", context);
        }
        assert_eq!(decoder.skip_values(skip_count), skip_count, "{}", context);
        if expected.len() - read > 0 {
            read += decoder.get_values(&mut decoded[skip_at..]);
        }
        assert_eq!(read, expected.len(), "{}", context);
        assert_eq!(decoded, expected, "{}", context);
        decoder.reset(encoded, num_bits);
    }
}

#[test]
fn value_skipping() {
    let probes = [
        (0, 7),
        (0, 64),
        (0, 75),
        (0, 100),
        (0, 105),
        (0, 155),
        (0, 200),
        (0, 213),
        (0, 267),
        (0, 300),
        (7, 7),
        (35, 64),
        (55, 75),
        (99, 100),
        (100, 11),
        (101, 55),
        (102, 155),
        (104, 17),
        (122, 178),
        (200, 3),
        (200, 65),
        (203, 17),
        (215, 70),
        (217, 83),
    ];
    for min_run in legal_min_run_lengths() {
        for num_bits in [1usize, 3, 7, 8, 20, 32] {
            let values = make_sequence(100, 100, 100, num_bits);
            for (skip_at, skip_count) in probes {
                validate_skip(&values, num_bits, min_run, skip_at, skip_count);
            }
        }
    }
}

#[test]
fn value_skipping_fuzzy() {
    let mut rng = StdRng::seed_from_u64(0xda7a);
    const TOTAL_LENGTH: usize = 2048;
    for min_run in legal_min_run_lengths() {
        for _ in 0..4 {
            let num_bits = rng.gen_range(1..=32usize);
            let max_run_length = rng.gen_range(5..200usize);
            let modulus = 1u64 << num_bits;

            let mut values = Vec::with_capacity(TOTAL_LENGTH);
            let mut value = 0u64;
            while values.len() < TOTAL_LENGTH {
                let run_length = rng.gen_range(1..=max_run_length).min(TOTAL_LENGTH - values.len());
                value = (value + 1) % modulus;
                if rng.gen_bool(0.5) {
                    values.extend(std::iter::repeat(value).take(run_length));
                } else {
                    for _ in 0..run_length {
                        values.push(value);
                        value = (value + 1) % modulus;
                    }
                }
            }

            for _ in 0..25 {
                let skip_at = rng.gen_range(0..values.len());
                let skip_count = rng.gen_range(1..=values.len() - skip_at);
                validate_skip(&values, num_bits, min_run, skip_at, skip_count);
            }
        }
    }
}
