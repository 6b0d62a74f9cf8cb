use lifescope::format::{FixedPoint, FormatXBit, format_double_x_bit, format_float_x_bit, try_format_x_bit};

/// Optional minus, one or more digits, then `.` and exactly `bit` digits
/// (no separator at all when `bit` is zero)
fn has_fixed_shape(s: &str, bit: usize) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match body.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (body, None),
    };
    let int_ok = !int_part.is_empty() && int_part.bytes().all(|b| b.is_ascii_digit());
    let frac_ok = match (bit, frac_part) {
        (0, None) => true,
        (0, Some(_)) | (_, None) => false,
        (n, Some(f)) => f.len() == n && f.bytes().all(|b| b.is_ascii_digit()),
    };
    int_ok && frac_ok
}

#[test]
fn documented_examples() {
    assert_eq!(format_double_x_bit(3.14159, 2), "3.14");
    assert_eq!(format_double_x_bit(3.14159, 0), "3");
    assert_eq!(format_float_x_bit(2.5, 1), "2.5");
}

#[test]
fn finite_values_have_fixed_shape() {
    let values = [
        0.0,
        -0.0,
        1.0,
        -1.0,
        0.1,
        -0.004,
        3.14159,
        123_456.789,
        -98_765.432_1,
        f64::MIN_POSITIVE,
        1.0e15,
        -2.5e-7,
        f64::from(f32::MAX),
    ];
    for &v in &values {
        for bit in 0..=8 {
            let s = format_double_x_bit(v, bit);
            assert!(has_fixed_shape(&s, bit), "{} at {} -> {}", v, bit, s);
        }
    }
}

#[test]
fn zero_padding() {
    assert_eq!(format_double_x_bit(7.0, 4), "7.0000");
    assert_eq!(format_float_x_bit(0.5, 3), "0.500");
}

#[test]
fn method_and_free_function_agree() {
    let values = [0.0_f64, 1.5, -2.333_333, 1.0e-3, 42.424_242];
    for &v in &values {
        for bit in 0..6 {
            assert_eq!(v.format_x_bit(bit), format_double_x_bit(v, bit));
            assert_eq!(v.fixed(bit).to_string(), format_double_x_bit(v, bit));
        }
    }

    let floats = [0.0_f32, 2.5, -7.125, 1.0e-2];
    for &v in &floats {
        for bit in 0..6 {
            assert_eq!(v.format_x_bit(bit), format_float_x_bit(v, bit));
        }
    }
}

#[test]
fn float_widening_is_exact() {
    // 0.1f32 is 0.100000001490116..., which shows at ten digits
    assert_eq!(format_float_x_bit(0.1, 10), "0.1000000015");
    assert_eq!(format_float_x_bit(0.1, 2), "0.10");
}

#[test]
fn fixed_point_accessors() {
    let fp = FixedPoint::from_f32(2.5, 3);
    assert!((fp.value() - 2.5).abs() < f64::EPSILON);
    assert_eq!(fp.bit(), 3);
    assert_eq!(format!("{:>8}", fp.to_string()), "   2.500");
}

#[test]
fn checked_precision() {
    assert_eq!(try_format_x_bit(3.14159, 0).unwrap(), "3");
    assert!(try_format_x_bit(3.14159, -3).is_err());
}
