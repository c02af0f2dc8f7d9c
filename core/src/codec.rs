//! Variable-byte integer codec.
//!
//! Each value is written as its base-128 digits, most significant first. The
//! final digit carries the `0x80` marker bit, all preceding digits have it
//! clear, so encoded integers are byte aligned and self delimiting.

const MARKER: u8 = 0x80;

/// Append `value` to `out`. Returns the number of bytes written.
pub fn encode(value: u32, out: &mut Vec<u8>) -> usize {
    // At most five base-128 digits for a u32.
    let mut digits = [0u8; 5];
    let mut n = 0;
    let mut rest = value;
    loop {
        digits[n] = (rest % 128) as u8;
        n += 1;
        if rest < 128 {
            break;
        }
        rest /= 128;
    }
    digits[0] |= MARKER;
    out.extend(digits[..n].iter().rev());
    n
}

/// Decode one value starting at `start`. Returns `(value, bytes_consumed)`,
/// or `None` if the buffer ends before a terminal byte or the value does not
/// fit in a `u32`.
pub fn decode(buf: &[u8], start: usize) -> Option<(u32, usize)> {
    let mut value: u64 = 0;
    for (i, &byte) in buf.get(start..)?.iter().enumerate() {
        value = 128 * value + u64::from(byte & !MARKER);
        if value > u64::from(u32::MAX) {
            return None;
        }
        if byte & MARKER != 0 {
            return Some((value as u32, i + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encodes_known_widths() {
        let mut data = Vec::new();
        let widths: Vec<usize> = [21, 4, 70, 0, 127, 128, 512, 999, 214577, 134217728]
            .into_iter()
            .map(|v| encode(v, &mut data))
            .collect();
        assert_eq!(widths, vec![1, 1, 1, 1, 1, 2, 2, 2, 3, 4]);
        assert_eq!(data.len(), 18);
        assert_eq!(decode(&data, 0), Some((21, 1)));
        assert_eq!(decode(&data, 5), Some((128, 2)));
        assert_eq!(decode(&data, 9), Some((999, 2)));
        assert_eq!(decode(&data, 11), Some((214577, 3)));
        assert_eq!(decode(&data, 14), Some((134217728, 4)));
    }

    #[test]
    fn marker_sits_on_last_byte() {
        let mut data = Vec::new();
        encode(130, &mut data);
        assert_eq!(data, vec![0x01, 0x82]);
    }

    #[test]
    fn truncated_input_is_rejected() {
        let mut data = Vec::new();
        encode(210470, &mut data);
        assert_eq!(data.len(), 3);
        assert_eq!(decode(&data[..2], 0), None);
        assert_eq!(decode(&data, 4), None);
    }

    #[test]
    fn max_value_round_trips() {
        let mut data = Vec::new();
        assert_eq!(encode(u32::MAX, &mut data), 5);
        assert_eq!(decode(&data, 0), Some((u32::MAX, 5)));
        // Six continuation digits cannot be a u32.
        assert_eq!(decode(&[0x7f, 0x7f, 0x7f, 0x7f, 0x7f, 0xff], 0), None);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(value in any::<u32>()) {
            let mut data = vec![0xff];
            let written = encode(value, &mut data);
            prop_assert_eq!(decode(&data, 1), Some((value, written)));
        }
    }
}
