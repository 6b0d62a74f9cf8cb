#![no_main]
use lifescope::format::{FormatXBit, format_double_x_bit, format_float_x_bit};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // First 8 bytes: the value; next byte: precision (kept small)
    if data.len() < 9 {
        return;
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&data[..8]);
    let value = f64::from_le_bytes(raw);
    let bit = usize::from(data[8] % 32);

    let s = format_double_x_bit(value, bit);
    assert_eq!(s, value.format_x_bit(bit));

    if value.is_finite() {
        let body = s.strip_prefix('-').unwrap_or(&s);
        match body.split_once('.') {
            Some((int_part, frac)) => {
                assert!(bit > 0);
                assert!(!int_part.is_empty());
                assert_eq!(frac.len(), bit);
            }
            None => assert_eq!(bit, 0),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    let narrow = value as f32;
    assert_eq!(format_float_x_bit(narrow, bit), narrow.format_x_bit(bit));
});
